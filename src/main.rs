//! signal-radar — binary entrypoint.
//! Runs the pipeline once: load config + dictionary, ingest, classify, aggregate,
//! write results.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use signal_radar::config::PipelineConfig;
use signal_radar::ingest::providers::{JsonFileProvider, RssFeedProvider};
use signal_radar::ingest::types::SourceProvider;
use signal_radar::pipeline::run_and_store;
use signal_radar::sink::{JsonFileSink, RowSink};
use signal_radar::telemetry::TextfileMetrics;
use signal_radar::{Classifier, KeywordDictionary};

/// Compact logs by default; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("signal_radar=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn build_providers(cfg: &PipelineConfig) -> Vec<Box<dyn SourceProvider>> {
    let mut providers: Vec<Box<dyn SourceProvider>> = Vec::new();
    if let Some(path) = &cfg.input_path {
        providers.push(Box::new(JsonFileProvider::new(path.clone())));
    }
    if let Some(rss) = &cfg.rss {
        providers.push(Box::new(
            RssFeedProvider::from_path(rss.path.clone(), &rss.platform, &rss.language)
                .with_region(rss.region.clone()),
        ));
    }
    providers
}

async fn run() -> Result<()> {
    let cfg = PipelineConfig::load_default().context("loading pipeline config")?;

    let metrics = match &cfg.metrics_path {
        Some(_) => Some(TextfileMetrics::install()?),
        None => None,
    };

    // Fatal before any classification happens.
    let dictionary = match &cfg.keywords_path {
        Some(p) => KeywordDictionary::load(p)?,
        None => KeywordDictionary::load_default()?,
    };
    let classifier = Classifier::new(Arc::new(dictionary));
    let dict = classifier.dictionary();
    if dict.is_empty() {
        tracing::warn!("keyword dictionary has no keywords; every item will be unmatched");
    }
    info!(
        categories = dict.categories().count(),
        languages = dict.languages().len(),
        keywords = dict.keyword_count(),
        "classifier ready"
    );

    let providers = build_providers(&cfg);
    if providers.is_empty() {
        anyhow::bail!("no sources configured (set INPUT_PATH or an [rss] feed)");
    }

    let sink = JsonFileSink::new(cfg.output_path.clone());
    let report = run_and_store(
        &providers,
        &cfg.platforms,
        &classifier,
        cfg.on_data_error,
        &sink,
    )
    .await?;

    info!(
        sink = sink.name(),
        output = %cfg.output_path.display(),
        rows = report.rows.len(),
        rejected = report.rejected.len(),
        "done"
    );

    if let (Some(m), Some(path)) = (&metrics, &cfg.metrics_path) {
        m.write_to(path)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(e) = run().await {
        error!(error = ?e, "run failed");
        process::exit(1);
    }
}
