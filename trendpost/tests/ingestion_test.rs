use common::FeedsConfig;
use trendpost::ingestion;

/// Minimal RSS 2.0 document with the given channel title and items.
fn rss_feed(channel: &str, items: &[(&str, &str)]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel>"#);
    xml.push_str(&format!(
        "<title>{}</title><link>https://example.com</link><description>test</description>",
        channel
    ));
    for (title, link) in items {
        xml.push_str(&format!("<item><title>{}</title><link>{}</link></item>", title, link));
    }
    xml.push_str("</channel></rss>");
    xml
}

fn feeds_config(urls: Vec<String>) -> FeedsConfig {
    FeedsConfig {
        urls,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_collects_leading_entries_as_bullets() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/frontend.xml")
        .with_status(200)
        .with_header("content-type", "application/rss+xml")
        .with_body(rss_feed(
            "Frontend Weekly",
            &[
                ("Signals land in the framework", "https://example.com/signals"),
                ("CSS anchor positioning ships", "https://example.com/anchor"),
            ],
        ))
        .create_async()
        .await;

    let config = feeds_config(vec![format!("{}/frontend.xml", server.url())]);
    let digest = ingestion::collect_digest(&config).await;

    assert_eq!(
        digest,
        "- [Signals land in the framework](https://example.com/signals)\n\
         - [CSS anchor positioning ships](https://example.com/anchor)"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_caps_entries_per_feed() {
    let mut server = mockito::Server::new_async().await;

    let items: Vec<(String, String)> = (1..=5)
        .map(|i| (format!("Article number {}", i), format!("https://example.com/{}", i)))
        .collect();
    let items: Vec<(&str, &str)> = items.iter().map(|(t, l)| (t.as_str(), l.as_str())).collect();

    let _mock = server
        .mock("GET", "/busy.xml")
        .with_status(200)
        .with_body(rss_feed("Busy Feed", &items))
        .create_async()
        .await;

    let config = feeds_config(vec![format!("{}/busy.xml", server.url())]);
    let digest = ingestion::collect_digest(&config).await;

    let lines: Vec<&str> = digest.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(digest.contains("Article number 3"));
    assert!(!digest.contains("Article number 4"));
}

#[tokio::test]
async fn test_deduplicates_across_feeds() {
    let mut server = mockito::Server::new_async().await;

    let _first = server
        .mock("GET", "/a.xml")
        .with_status(200)
        .with_body(rss_feed(
            "Feed A",
            &[
                ("React 19 released", "https://a.example/react"),
                ("Vite 6 beta", "https://a.example/vite"),
            ],
        ))
        .create_async()
        .await;

    let _second = server
        .mock("GET", "/b.xml")
        .with_status(200)
        .with_body(rss_feed(
            "Feed B",
            &[
                ("React 19 released", "https://b.example/react"),
                ("Astro islands in practice", "https://b.example/astro"),
            ],
        ))
        .create_async()
        .await;

    let config = feeds_config(vec![
        format!("{}/a.xml", server.url()),
        format!("{}/b.xml", server.url()),
    ]);
    let digest = ingestion::collect_digest(&config).await;

    let lines: Vec<&str> = digest.lines().collect();
    assert_eq!(lines.len(), 3);
    // The first-seen link wins for a repeated title
    assert!(digest.contains("https://a.example/react"));
    assert!(!digest.contains("https://b.example/react"));
    assert_eq!(digest.matches("React 19 released").count(), 1);
}

#[tokio::test]
async fn test_a_failing_feed_does_not_abort_collection() {
    let mut server = mockito::Server::new_async().await;

    let _broken = server
        .mock("GET", "/broken.xml")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let _healthy = server
        .mock("GET", "/healthy.xml")
        .with_status(200)
        .with_body(rss_feed(
            "Healthy",
            &[("Web performance in 2025", "https://example.com/perf")],
        ))
        .create_async()
        .await;

    let config = feeds_config(vec![
        format!("{}/broken.xml", server.url()),
        format!("{}/healthy.xml", server.url()),
    ]);
    let digest = ingestion::collect_digest(&config).await;

    assert_eq!(digest, "- [Web performance in 2025](https://example.com/perf)");
}

#[tokio::test]
async fn test_all_feeds_failing_yields_an_empty_digest() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/dead.xml")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let config = feeds_config(vec![format!("{}/dead.xml", server.url())]);
    let digest = ingestion::collect_digest(&config).await;

    assert!(digest.is_empty());
}

#[tokio::test]
async fn test_entries_without_a_link_are_skipped() {
    let mut server = mockito::Server::new_async().await;

    let body = r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel>
        <title>Partial</title><link>https://example.com</link><description>test</description>
        <item><title>No link here</title></item>
        <item><title>Complete entry</title><link>https://example.com/ok</link></item>
    </channel></rss>"#;

    let _mock = server
        .mock("GET", "/partial.xml")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let config = feeds_config(vec![format!("{}/partial.xml", server.url())]);
    let digest = ingestion::collect_digest(&config).await;

    assert_eq!(digest, "- [Complete entry](https://example.com/ok)");
}

#[tokio::test]
async fn test_fetch_rejects_http_errors() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/gone.xml")
        .with_status(500)
        .with_body("server error")
        .create_async()
        .await;

    let result = ingestion::fetch_and_parse_feed(&format!("{}/gone.xml", server.url()), 10).await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("status"));
}

#[tokio::test]
async fn test_fetch_rejects_unparseable_bodies() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/not-a-feed.html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body>definitely not a feed</body></html>")
        .create_async()
        .await;

    let result =
        ingestion::fetch_and_parse_feed(&format!("{}/not-a-feed.html", server.url()), 10).await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("parse"));
}
