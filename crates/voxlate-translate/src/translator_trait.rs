use async_trait::async_trait;
use voxlate_core::TranslationResult;

/// Something that turns recognized text into a [`TranslationResult`].
///
/// Implementations never fail: every problem is reported as
/// [`TranslationResult::Failed`].
#[async_trait]
pub trait Translator: Send + Sync {
    /// Where requests go, for logging.
    fn endpoint(&self) -> &str;
    async fn get_translation(&self, text: &str) -> TranslationResult;
}
