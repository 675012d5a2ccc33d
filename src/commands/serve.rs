use anyhow::{Context, Result};

use wikireel::config::Config;
use wikireel::service::{SummarizationService, SummaryServer};

use super::crawl::shutdown_signal;

/// Start the summarization server
pub async fn serve(config: Config) -> Result<()> {
    let service =
        SummarizationService::from_config(&config).context("Failed to build summarization chain")?;
    let server = SummaryServer::new(&config.server, service)?;

    println!("Summarization server on http://{}", server.bind_address());
    println!("Press Ctrl+C to stop");

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .context("Summarization server failed")?;

    println!("Summarization server stopped.");
    Ok(())
}
