use std::sync::Arc;

use anyhow::Context;
use booth_genai::api::GenAiApi;
use booth_genai::dispatcher::Dispatcher;
use booth_worker::cli::Args;
use booth_worker::config::WorkerConfig;
use booth_worker::output::load_photo;
use booth_worker::run::run_jobs;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booth_worker=debug,booth_genai=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = WorkerConfig::from_env()?;
    let model = args.model.unwrap_or(config.model);

    let photo = load_photo(&args.input)
        .await
        .with_context(|| format!("reading input photo {}", args.input.display()))?;

    let api = GenAiApi::new(config.api_url, config.api_key);
    let dispatcher = Dispatcher::new(Arc::new(api));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling outstanding jobs");
                cancel.cancel();
            }
        });
    }

    tracing::info!(
        model = %model,
        jobs = args.instructions.len(),
        output_dir = %args.output_dir.display(),
        "Worker starting",
    );

    let summary = run_jobs(
        &dispatcher,
        &model,
        &photo,
        &args.instructions,
        &args.output_dir,
        &cancel,
    )
    .await;

    tracing::info!(
        written = summary.written.len(),
        cancelled = summary.cancelled,
        failed = summary.failed,
        "Worker finished",
    );

    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} jobs failed",
            summary.failed,
            args.instructions.len()
        );
    }
    Ok(())
}
