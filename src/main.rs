use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use headword::camera::Camera;
use headword::config::{Config, Secrets};
use headword::driver::Driver;
use headword::inference::FaceMeshDetector;
use headword::notify::{DisabledNotifier, Notifier, SmtpNotifier};
use headword::overlay::Overlay;
use headword::rotator::spawn_rotator;
use headword::suggest::{ChatCompletionsClient, DisabledSuggester, SuggestionService};
use headword::{Assistant, Policy, Session, WordList};

#[derive(Parser, Debug)]
#[command(name = "headword", about = "Pick words with head gestures, send them by opening your mouth")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, env = "HEADWORD_CONFIG", default_value = "headword.toml")]
    config: PathBuf,

    /// Camera index, overrides the config file
    #[arg(long)]
    camera: Option<i32>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    /// Write the default config to this path and exit
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Some(path) = cli.write_default_config {
        Config::default().save(&path)?;
        info!(path = %path.display(), "wrote default config");
        return Ok(());
    }

    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_env();
    if let Some(camera) = cli.camera {
        config.camera_id = camera;
    }
    config.validate()?;

    info!("headword starting");
    let secrets = Secrets::from_env();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let _guard = runtime.enter();

    let suggester = build_suggester(&config, &secrets);
    let notifier = build_notifier(&config, &secrets);

    let session = Session::new(WordList::defaults(), config.selection.debounce).shared();
    let assistant = Assistant::new(
        session.clone(),
        suggester,
        notifier,
        Policy::from_config(&config),
        runtime.handle().clone(),
    );
    assistant.refresh();

    let cancel = CancellationToken::new();
    let rotator = spawn_rotator(session, config.rotation_interval(), cancel.clone());

    let result = run_capture(&config, assistant.clone());

    cancel.cancel();
    runtime.block_on(async {
        if let Err(e) = rotator.await {
            warn!("word rotator ended abnormally: {e}");
        }
        assistant.settle().await;
    });

    if let Err(e) = &result {
        error!("capture loop failed: {e:#}");
    }
    info!("headword stopped");
    result
}

fn run_capture(config: &Config, assistant: Assistant) -> Result<()> {
    let camera = Camera::new(config.camera_id)?;
    let extractor = FaceMeshDetector::new(&config.model_path, config.presence_threshold)
        .with_context(|| format!("failed to load face mesh model {}", config.model_path))?;
    let overlay = Overlay::new(config.email.recipient.clone())?;

    Driver::new(camera, extractor, overlay, assistant, config.gesture).run()
}

fn build_suggester(config: &Config, secrets: &Secrets) -> Arc<dyn SuggestionService> {
    let template = match config.llm.load_prompt() {
        Ok(template) => template,
        Err(e) => {
            warn!("suggestions disabled: {e}");
            return Arc::new(DisabledSuggester::new(e.to_string()));
        }
    };

    match ChatCompletionsClient::new(&config.llm, secrets.llm_api_key.clone(), template) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!("suggestions disabled: {e}");
            Arc::new(DisabledSuggester::new(e.to_string()))
        }
    }
}

fn build_notifier(config: &Config, secrets: &Secrets) -> Arc<dyn Notifier> {
    match SmtpNotifier::new(
        &config.email,
        secrets.email_address.clone(),
        secrets.email_password.clone(),
    ) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            warn!("email disabled: {e}");
            Arc::new(DisabledNotifier::new(e.to_string()))
        }
    }
}
