mod chat;

use anyhow::{Context, Result};
use chat::{Chat, ChatSession};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use voxlate_core::AppConfig;
use voxlate_engine::{create_recognizer, EngineRegistry, RecognizerCallbacks};
use voxlate_translate::TranslationClient;

#[derive(Parser)]
#[command(name = "voxlate", about = "Speech recognition with remote translation")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "voxlate.toml")]
    config: PathBuf,

    /// Recognition engine to use (overrides the config file)
    #[arg(long)]
    engine: Option<String>,

    /// Translation endpoint URL (overrides the config file)
    #[arg(long)]
    endpoint: Option<String>,

    /// Show interim transcripts while speaking
    #[arg(long)]
    interim: bool,

    /// Language hint passed to the engine
    #[arg(long)]
    lang: Option<String>,

    /// List the available recognition engines and exit
    #[arg(long)]
    list_engines: bool,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = if cli.config.exists() {
        AppConfig::load_from_file(&cli.config)
            .with_context(|| format!("failed to load config from {:?}", cli.config))?
    } else {
        AppConfig::default()
    };

    if let Some(engine) = &cli.engine {
        config.recognizer.engine = engine.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.translation.endpoint = endpoint.clone();
    }
    if cli.interim {
        config.recognizer.interim_results = true;
    }
    if let Some(lang) = &cli.lang {
        config.recognizer.language = Some(lang.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout belongs to the chat, logs go to stderr
    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let registry = EngineRegistry::new();
    if cli.list_engines {
        for name in registry.list_engines() {
            println!("{name}");
        }
        return Ok(());
    }

    tracing::info!(
        engine = %config.recognizer.engine,
        endpoint = %config.translation.endpoint,
        "voxlate starting"
    );

    let chat = Arc::new(Chat::stdout());
    let client = TranslationClient::with_endpoint(config.translation.endpoint.clone());
    let session = Arc::new(ChatSession::new(
        Arc::clone(&chat),
        Arc::new(client),
        config.translation.timeout_secs.map(Duration::from_secs),
    ));

    let (end_tx, mut end_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
    let callbacks = RecognizerCallbacks::new()
        .on_start({
            let chat = Arc::clone(&chat);
            move || chat.status("listening (type a line and press Enter, Ctrl-C to stop)")
        })
        .on_interim({
            let chat = Arc::clone(&chat);
            move |text| chat.status(&format!("... {text}"))
        })
        .on_final({
            let session = Arc::clone(&session);
            move |text| session.handle_final(text)
        })
        .on_error({
            let chat = Arc::clone(&chat);
            move |err| chat.status(&format!("recognition error: {err}"))
        })
        .on_end(move || {
            let _ = end_tx.send(());
        });

    let recognizer = create_recognizer(
        &registry,
        &config.recognizer.engine,
        config.recognizer.to_recognizer_config(),
        callbacks,
    );

    if !recognizer.is_available() {
        chat.status("Sorry, speech recognition is not available.");
        return Ok(());
    }

    recognizer
        .start()
        .await
        .context("failed to start speech recognition")?;

    tokio::select! {
        _ = end_rx.recv() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, stopping recognition");
            recognizer.stop().await;
            if tokio::time::timeout(Duration::from_secs(2), end_rx.recv()).await.is_err() {
                tracing::warn!("engine did not confirm stop in time");
            }
        }
    }

    session.drain().await;
    recognizer.destroy().await;
    chat.status("stopped");
    tracing::info!("shutting down");

    Ok(())
}
