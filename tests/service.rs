use awful_news_trends::{Configuration, NewsItem, TrendService};
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use std::collections::HashMap;

fn item(source: &str, title: &str, at: DateTime<Utc>) -> NewsItem {
    NewsItem {
        feed_id: "feed".into(),
        source: source.into(),
        title: title.into(),
        body: Some(format!("{title} as reported by {source}")),
        url: format!("https://{source}.example/{}", at.timestamp_micros())
            .parse()
            .unwrap(),
        published_at: at,
        ingested_at: at,
    }
}

fn config() -> Configuration {
    Configuration {
        short_window_secs: 60.0,
        baseline_window_secs: 600.0,
        bucket_size_secs: 1.0,
        enable_dynamic_stopwords: false,
        max_items_per_source_per_bucket: None,
        ..Configuration::default()
    }
}

#[tokio::test]
async fn concurrent_ingest_is_serialized() {
    let now = Utc::now();
    let service = TrendService::new(config());

    let calls = (0..16).map(|i| {
        let service = service.clone();
        let at = now - Duration::milliseconds(i * 10);
        async move {
            let source = format!("outlet{}", i % 4);
            service
                .ingest_at(vec![item(&source, &format!("Wildfire spreads north {i}"), at)], now)
                .await
        }
    });
    let reports = join_all(calls).await;
    assert_eq!(reports.iter().map(|r| r.accepted).sum::<usize>(), 16);

    let topics = service.trending(now).await;
    let wildfire = topics.iter().find(|t| t.term == "wildfire").unwrap();
    // title and body mentions of one item merge into a single occurrence
    assert_eq!(wildfire.short_count, 16);
    assert_eq!(wildfire.unique_sources, 4);
    assert_eq!(wildfire.title_share, 1.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_producers_share_one_detector() {
    let now = Utc::now();
    let service = TrendService::new(config());

    let handles: Vec<_> = ["wire", "desk", "post"]
        .into_iter()
        .map(|source| {
            let service = service.clone();
            tokio::spawn(async move {
                for i in 0..5 {
                    let at = now - Duration::seconds(i);
                    let title = format!("{source} says NATO summit opens, day {}", i + 1);
                    service.ingest_at(vec![item(source, &title, at)], now).await;
                }
            })
        })
        .collect();
    for joined in join_all(handles).await {
        joined.unwrap();
    }

    let stats = service.stats().await;
    assert_eq!(stats.dedup_urls, 15);
    let topics = service.trending(now).await;
    let nato = topics.iter().find(|t| t.term == "NATO").unwrap();
    assert_eq!(nato.unique_sources, 3);
    assert!(nato.sample_headlines.len() <= 5);
}

#[tokio::test]
async fn admin_calls_go_through_the_handle() {
    let now = Utc::now();
    let service = TrendService::new(config());
    service
        .update_alias_map(HashMap::from([("Fed".to_string(), "Federal Reserve".to_string())]))
        .await;
    service.add_stopwords(vec!["Rates".to_string()]).await;
    service.add_phrase_stopwords(vec!["holds".to_string()]).await;

    let cfg = service.configuration().await;
    assert_eq!(cfg.alias_map.get("fed").map(String::as_str), Some("federal reserve"));
    assert!(cfg.stopwords.contains("rates"));

    service
        .ingest_at(
            vec![
                item("wire", "Fed holds rates steady", now),
                item("desk", "Fed holds rates again", now),
            ],
            now,
        )
        .await;
    let topics = service.trending(now).await;
    let found: Vec<&str> = topics.iter().map(|t| t.term.as_str()).collect();
    assert!(found.contains(&"federal reserve"));
    assert!(!found.contains(&"rates"));
    assert!(!found.iter().any(|t| t.contains("holds ")));

    service.remove_stopwords(vec!["rates".to_string()]).await;
    service.remove_phrase_stopwords(vec!["holds".to_string()]).await;
    service
        .add_alias_mappings(HashMap::from([(
            "ECB".to_string(),
            "European Central Bank".to_string(),
        )]))
        .await;
    let cfg = service.configuration().await;
    assert!(!cfg.stopwords.contains("rates"));
    assert_eq!(cfg.alias_map.len(), 2);

    service.clear_dynamic_stopwords().await;
    assert!(service.dynamic_stopwords().await.is_empty());
    service.reset().await;
    assert!(service.trending_now().await.is_empty());
    assert_eq!(service.stats().await.buckets, 0);
}
