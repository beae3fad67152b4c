//! imagefx - generate four images from a prompt with Google ImageFX.

mod cli;

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use imagefx::config::{self, Config};
use imagefx::context::ServiceContext;
use imagefx::credential::CredentialResolver;
use imagefx::model::ModelType;
use imagefx::output::save_decoded;
use imagefx::params::{seed_from_host, validate_image_count, AspectRatio};
use imagefx::{Adapter, GenerationRequest, ImageFxError};

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "warn,imagefx=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ImageFxError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path).map_err(ImageFxError::Config)?;
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }

    let prompt = cli.resolve_prompt()?;

    // Validate parameters before touching credentials or the network
    let aspect_ratio: AspectRatio = cli
        .aspect_ratio
        .as_deref()
        .unwrap_or(config.defaults.aspect_ratio.as_str())
        .parse()
        .map_err(ImageFxError::InvalidArgument)?;
    let model: ModelType = cli
        .model
        .as_deref()
        .unwrap_or(config.defaults.model.as_str())
        .parse()
        .map_err(ImageFxError::InvalidArgument)?;
    let image_count = cli.count.unwrap_or(config.defaults.image_count);
    validate_image_count(image_count).map_err(ImageFxError::InvalidArgument)?;
    let placeholder = config.placeholder.to_policy().map_err(ImageFxError::Config)?;

    let request = GenerationRequest {
        prompt,
        seed: seed_from_host(cli.seed).map_err(ImageFxError::InvalidArgument)?,
        aspect_ratio,
        model,
        image_count,
    };

    // Live, recording or replaying provider
    let replay_path = std::env::var("IMAGEFX_REPLAY").ok();
    let is_recording = std::env::var("IMAGEFX_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        tracing::info!("replaying from {cassette_path}");
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        tracing::info!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(&config.http)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&config.http)?, None)
    };

    let token_file = cli.token_file.as_deref().map(Path::new);
    let resolver = CredentialResolver::standard(&config.auth, token_file);
    let adapter = Adapter::new(resolver, ctx.generator, placeholder);

    let outcome = adapter.generate(&request, cli.debug).await;
    drop(adapter);

    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    let output = match outcome {
        Ok(output) => output,
        Err(failure) => {
            if cli.debug {
                eprintln!("{}", failure.log.render());
            }
            return Err(failure.error);
        }
    };

    if cli.debug {
        eprintln!("{}", output.log_text());
    }

    let output_dir = cli.output_dir.map_or(config.output.dir, PathBuf::from);
    for path in save_decoded(&output.result, &request.prompt, &output_dir)? {
        eprintln!("Saved: {}", path.display());
    }
    eprintln!("Generated {} of 4 image(s)", output.result.decoded_count());

    Ok(())
}
