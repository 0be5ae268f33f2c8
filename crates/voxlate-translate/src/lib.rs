pub mod client;
pub mod response;
pub mod translator_trait;

pub use client::{get_translation, TranslationClient};
pub use response::{parse_response, split_lines};
pub use translator_trait::Translator;
