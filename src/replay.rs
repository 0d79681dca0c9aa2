use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::NewsItem;

/// Load a recorded feed: a JSON array of items, or one item per line (JSONL).
pub fn load_items<P: AsRef<Path>>(path: P) -> Result<Vec<NewsItem>> {
    let path = path.as_ref();
    let start = std::time::Instant::now();
    debug!("Loading replay input - path={}", path.display());

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Reading replay input {}", path.display()))?;
    let items = parse_items(&raw).with_context(|| format!("Decoding {}", path.display()))?;

    info!(
        "Replay input loaded - path={}, items={}, duration={:.2}s",
        path.display(),
        items.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(normalize_items(items))
}

pub fn parse_items(raw: &str) -> Result<Vec<NewsItem>> {
    let trimmed = raw.trim_start();
    if trimmed.is_empty() {
        bail!("replay input is empty");
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Decoding JSON array of items");
    }

    let mut items = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item: NewsItem = serde_json::from_str(line)
            .with_context(|| format!("Decoding JSON line {}", idx + 1))?;
        items.push(item);
    }
    Ok(items)
}

/// Trims titles, drops items left without one, and orders by publication.
pub fn normalize_items(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
    for item in items.iter_mut() {
        item.title = item.title.trim().to_string();
    }
    let before = items.len();
    items.retain(|item| !item.title.is_empty());
    if items.len() < before {
        warn!("Dropped untitled items - count={}", before - items.len());
    }
    items.sort_by_key(|item| item.published_at);
    items
}
