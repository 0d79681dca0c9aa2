// src/render.rs
use chrono::TimeZone;
use std::fmt::Display;

use crate::models::TrendingTopic;

pub fn render_topics_text<Tz>(topics: &[TrendingTopic], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if topics.is_empty() {
        return "No trending topics.\n".to_string();
    }

    let mut out = String::new();
    for (rank, t) in topics.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {} (score {:.2}, z {:.2}, x{:.1}, {} mentions / {} baseline, {} sources, last {})\n",
            rank + 1,
            t.term,
            t.score,
            t.burst_z,
            t.burst_ratio,
            t.short_count,
            t.baseline_count,
            t.unique_sources,
            t.last_seen_at.with_timezone(tz).format("%H:%M %Z"),
        ));
        for h in t.sample_headlines.iter().take(3) {
            out.push_str(&format!("      - {}\n", h));
        }
    }
    out
}

pub fn render_topics_markdown<Tz>(topics: &[TrendingTopic], tz: &Tz, title: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", title.trim()));

    if topics.is_empty() {
        md.push_str("_No trending topics._\n");
        return md;
    }

    md.push_str("| # | Term | Score | Burst z | Ratio | Mentions | Baseline | Sources | Title share | Last seen |\n");
    md.push_str("|---|------|------:|--------:|------:|---------:|---------:|--------:|------------:|-----------|\n");
    for (rank, t) in topics.iter().enumerate() {
        md.push_str(&format!(
            "| {} | **{}** | {:.2} | {:.2} | {:.2} | {} | {} | {} | {:.0}% | {} |\n",
            rank + 1,
            t.term.replace('|', "\\|"),
            t.score,
            t.burst_z,
            t.burst_ratio,
            t.short_count,
            t.baseline_count,
            t.unique_sources,
            t.title_share * 100.0,
            t.last_seen_at.with_timezone(tz).format("%Y-%m-%d %H:%M %Z"),
        ));
    }

    let with_samples: Vec<&TrendingTopic> =
        topics.iter().filter(|t| !t.sample_headlines.is_empty()).collect();
    if !with_samples.is_empty() {
        md.push_str("\n## Headlines\n");
        for t in with_samples {
            md.push_str(&format!("\n### {}\n", t.term));
            for h in &t.sample_headlines {
                md.push_str(&format!("- {}\n", h));
            }
        }
    }

    md
}
