use clap::Parser;
use futures::StreamExt;
use rtryon::{logger, AttemptState, GeminiConfig, Orchestrator, RawImage, SlotKind, TryOnError};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_stream::wrappers::WatchStream;

#[derive(Debug, Parser)]
#[command(name = "rtryon", version, about = "See yourself in a new dress, styled by Gemini")]
struct Cli {
    /// Full-body photo of yourself (PNG, JPEG or WEBP)
    #[arg(long)]
    subject: PathBuf,

    /// Photo of the dress (PNG, JPEG or WEBP)
    #[arg(long)]
    garment: PathBuf,

    /// Where to write the generated image
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Override the Gemini model
    #[arg(long)]
    model: Option<String>,

    /// Print the result as a data URL instead of writing a file
    #[arg(long)]
    print_data_url: bool,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,

    /// JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let log_config = if cli.json_logs {
        logger::LoggerConfig::production()
    } else if cli.verbose {
        logger::LoggerConfig::development()
    } else {
        logger::LoggerConfig::default()
    };
    if let Err(e) = logger::init_with_config(log_config) {
        eprintln!("{}", e);
    }
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using process environment");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), TryOnError> {
    let mut config = GeminiConfig::from_env()?;
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }
    logger::log_startup_info("rtryon", env!("CARGO_PKG_VERSION"), &config);

    let orchestrator = Orchestrator::from_config(&config)?;

    let subject = orchestrator
        .set_subject_image(RawImage::file(&cli.subject))
        .await?;
    log::info!(
        "{}: {} ({})",
        SlotKind::Subject.title(),
        cli.subject.display(),
        subject.media_type()
    );

    let garment = orchestrator
        .set_garment_image(RawImage::file(&cli.garment))
        .await?;
    log::info!(
        "{}: {} ({})",
        SlotKind::Garment.title(),
        cli.garment.display(),
        garment.media_type()
    );

    let mut status = WatchStream::new(orchestrator.status_messages());
    let status_printer = tokio::spawn(async move {
        while let Some(message) = status.next().await {
            if let Some(message) = message {
                eprintln!("✨ {}", message);
            }
        }
    });

    let outcome = orchestrator.invoke().await;
    status_printer.abort();

    match outcome? {
        AttemptState::Succeeded(image) => {
            if cli.print_data_url {
                println!("{}", image.to_data_url());
                return Ok(());
            }
            let bytes = image.decode().map_err(|e| {
                TryOnError::Generation(format!("Returned image is not valid base64: {}", e))
            })?;
            let path = cli.output.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "tryon_{}.{}",
                    chrono::Utc::now().timestamp(),
                    image.extension()
                ))
            });
            tokio::fs::write(&path, bytes).await.map_err(|e| {
                TryOnError::Generation(format!("Could not save {}: {}", path.display(), e))
            })?;
            log::info!("💾 Image saved to: {}", path.display());
            println!("{}", path.display());
            Ok(())
        }
        AttemptState::Failed(message) => Err(TryOnError::Generation(message)),
        other => Err(TryOnError::InvalidTransition {
            from: other.name(),
            event: "finish",
        }),
    }
}
