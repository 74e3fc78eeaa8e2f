mod batch;
mod client;
mod config;
mod error;
mod export;
mod logging;
mod render;
mod scraper;
mod utils;

use crate::batch::BatchJob;
use crate::config::Config;
use crate::error::Result;
use crate::logging::{init_logging, LoggerConfig};

const DEFAULT_CONFIG: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let config = Config::from_file(&config_path)?;
    init_logging(LoggerConfig::try_from(&config.logging)?)?;

    log_info!(
        "[main] Loaded {} with {} job(s), renderer {:?}",
        config_path,
        config.jobs.len(),
        config.renderer
    );

    // One browser session serves every job
    let renderer = render::from_config(&config)?;
    let settings = config.fetch_settings();
    let batch = BatchJob::new(renderer.as_ref(), &settings);

    let mut outcome = Ok(());
    for job in &config.jobs {
        log_info!(
            "[main] Starting job '{}' ({} funds)",
            job.name,
            job.fund_ids.len()
        );

        let records = batch.run(job).await;
        let succeeded = records.iter().filter(|r| r.is_success()).count();
        log_info!(
            "[main] Job '{}' finished: {} ok, {} failed",
            job.name,
            succeeded,
            records.len() - succeeded
        );

        if let Err(e) = export::write_records(&job.output, &records) {
            log_error!(&e => "[main] Could not save results for job '{}'", job.name);
            outcome = Err(e);
            continue;
        }
        log_info!("[main] Saved results to {}", job.output);
    }

    if let Err(e) = renderer.close().await {
        log_warn!("[main] Failed to close renderer: {}", e);
    }

    outcome
}
