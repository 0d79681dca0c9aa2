use anyhow::{bail, Context, Result};
use awful_news_trends::{
    load_items, render_topics_markdown, render_topics_text, Configuration, NewsItem,
    TrendService, TrendingTopic,
};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Md,
    Json,
    Text,
}

/// Awful News Trends - replay a recorded feed and rank what is bursting
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Recorded items, as a JSON array or JSON lines
    input: PathBuf,

    /// Path to a JSON configuration file (overrides TREND_CONFIG)
    #[arg(short, long, env = "TREND_CONFIG")]
    config: Option<PathBuf>,

    /// Query trending every this many seconds of feed time while replaying
    #[arg(long)]
    step: Option<f64>,

    #[arg(long)]
    topic_limit: Option<usize>,

    /// Short window in seconds
    #[arg(long)]
    short_window: Option<f64>,

    /// Baseline window in seconds
    #[arg(long)]
    baseline_window: Option<f64>,

    #[arg(short, long, value_enum, default_value = "md")]
    format: OutputFormat,

    /// Timezone for displayed times
    #[arg(long, default_value = "America/New_York")]
    tz: String,

    /// Write the ranking here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn load_configuration(args: &Args) -> Result<Configuration> {
    let mut cfg = match &args.config {
        Some(path) => {
            debug!("Using config file - path={}", path.display());
            Configuration::from_json_file(path)?
        }
        None => {
            debug!("No config file given, using defaults");
            Configuration::default()
        }
    };
    if let Some(limit) = args.topic_limit {
        cfg.topic_limit = limit;
    }
    if let Some(secs) = args.short_window {
        cfg.short_window_secs = secs;
    }
    if let Some(secs) = args.baseline_window {
        cfg.baseline_window_secs = secs;
    }
    if cfg.short_window_secs <= 0.0 || cfg.baseline_window_secs <= 0.0 {
        bail!("windows must be positive");
    }
    Ok(cfg)
}

fn secs(secs: f64) -> Duration {
    Duration::milliseconds((secs * 1000.0) as i64)
}

async fn replay(
    service: &TrendService,
    items: Vec<NewsItem>,
    step: Option<f64>,
    tz: &Tz,
) -> Result<DateTime<Utc>> {
    let Some(last) = items.last().map(|item| item.published_at) else {
        bail!("no items to replay");
    };
    let Some(step) = step else {
        service.ingest_at(items, last).await;
        return Ok(last);
    };
    if step <= 0.0 {
        bail!("--step must be positive");
    }

    let mut checkpoint = items[0].published_at + secs(step);
    let mut batch = Vec::new();
    for item in items {
        while item.published_at >= checkpoint {
            service.ingest_at(std::mem::take(&mut batch), checkpoint).await;
            let topics = service.trending(checkpoint).await;
            info!(
                "Replay checkpoint - at={}, topics={}, top={}",
                checkpoint.with_timezone(tz).format("%Y-%m-%d %H:%M %Z"),
                topics.len(),
                topics.first().map(|t| t.term.as_str()).unwrap_or("-")
            );
            checkpoint += secs(step);
        }
        batch.push(item);
    }
    service.ingest_at(batch, last).await;
    Ok(last)
}

fn render(topics: &[TrendingTopic], format: OutputFormat, tz: &Tz, at: DateTime<Utc>) -> Result<String> {
    Ok(match format {
        OutputFormat::Md => {
            let title = format!("Trending as of {}", at.with_timezone(tz).format("%Y-%m-%d %H:%M %Z"));
            render_topics_markdown(topics, tz, &title)
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(topics).context("Encoding topics as JSON")? + "\n"
        }
        OutputFormat::Text => render_topics_text(topics, tz),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting awful_news_trends");

    let args = Args::parse();
    let tz: Tz = args
        .tz
        .parse()
        .map_err(|e| anyhow::anyhow!("unknown timezone {}: {}", args.tz, e))?;
    let cfg = load_configuration(&args)?;
    info!(
        "Configuration - short={}s, baseline={}s, bucket={}s, topic_limit={}",
        cfg.short_window_secs, cfg.baseline_window_secs, cfg.bucket_size_secs, cfg.topic_limit
    );

    let items = load_items(&args.input)?;
    let service = TrendService::new(cfg);
    let at = replay(&service, items, args.step, &tz).await?;

    let topics = service.trending(at).await;
    let stats = service.stats().await;
    info!(
        "Replay completed - topics={}, buckets={}, tracked_terms={}, dynamic_stopwords={}",
        topics.len(),
        stats.buckets,
        stats.tracked_terms,
        stats.dynamic_stopwords
    );

    let rendered = render(&topics, args.format, &tz, at)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Writing output {}", path.display()))?;
            info!("Ranking written - path={}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
