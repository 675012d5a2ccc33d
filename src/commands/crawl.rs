use anyhow::{Context, Result};

use wikireel::config::Config;
use wikireel::crawler::pipeline::ContentPipeline;
use wikireel::crawler::WikiCrawler;
use wikireel::error::ClassifiedError;
use wikireel::scheduler::Scheduler;

/// One pipeline run; `dry_run` prints the batch instead of storing it
pub async fn crawl(config: Config, dry_run: bool) -> Result<()> {
    if dry_run {
        let mut crawler = WikiCrawler::from_config(&config).context("Failed to build crawler")?;
        let outcome = crawler.crawl().await;

        let json = serde_json::to_string_pretty(&outcome.articles)
            .context("Failed to serialize articles")?;
        println!("{json}");

        tracing::info!(
            collected = outcome.stats.collected,
            candidates = outcome.stats.candidates,
            missing_audio = outcome.stats.missing_audio,
            "Dry run finished"
        );
        return Ok(());
    }

    let mut pipeline = ContentPipeline::from_config(&config)
        .await
        .context("Failed to build pipeline")?;

    match pipeline.run_once().await {
        Ok(report) => {
            println!("Crawl Summary");
            println!("========================");
            println!("Run ID: {}", report.run_id);
            println!("Fetched: {}", report.fetched);
            println!("Inserted: {}", report.inserted);
            println!("Attempts: {}", report.stats.attempts);
            println!("Candidates: {}", report.stats.candidates);
            println!("Missing audio: {}", report.stats.missing_audio);
            println!("Elapsed: {:.2}s", report.elapsed.as_secs_f64());
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                category = e.category().as_str(),
                recoverable = e.is_recoverable(),
                "Crawl run failed"
            );
            Err(e.into())
        }
    }
}

/// Periodic pipeline runs until Ctrl+C
pub async fn schedule(config: Config) -> Result<()> {
    let pipeline = ContentPipeline::from_config(&config)
        .await
        .context("Failed to build pipeline")?;
    let scheduler = Scheduler::from_config(&config.schedule);

    let stats = scheduler.run_until(pipeline, shutdown_signal()).await;

    println!(
        "Scheduler stopped: {} runs, {} skipped, {} failed",
        stats.triggered, stats.skipped_overlap, stats.failed
    );
    Ok(())
}

/// Resolves on Ctrl+C
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, stopping..."),
        Err(e) => tracing::error!("Failed to wait for Ctrl+C: {}", e),
    }
}
