//! Crawl sampling and qualification tests

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use wikireel::config::CrawlConfig;
use wikireel::models::TopicCategory;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::*;

fn ok_providers() -> (Arc<StaticEmbedder>, Arc<StaticAudio>) {
    (Arc::new(StaticEmbedder::default()), Arc::new(StaticAudio::ok()))
}

#[tokio::test]
async fn test_crawl_collects_qualifying_articles() {
    let server = MockServer::start().await;
    mount_category(&server, "Physics", &[(1, "Atom"), (2, "Photon"), (3, "Quark")]).await;
    mount_good_page(&server, 1, "Atom").await;
    mount_good_page(&server, 2, "Photon").await;
    mount_good_page(&server, 3, "Quark").await;

    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(
        &server,
        single_topic_config("Physics"),
        embedder.clone(),
        audio.clone(),
    );
    let outcome = crawler.crawl().await;

    assert_eq!(outcome.articles.len(), 3);
    let mut ids: Vec<i64> = outcome.articles.iter().map(|a| a.article_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);

    let atom = outcome
        .articles
        .iter()
        .find(|a| a.article_id == 1)
        .unwrap();
    assert_eq!(atom.tags, ["Physics & Chemistry".to_string(), "Physics".to_string()]);
    assert_eq!(atom.article_data.article_sub_tag, "Physics");
    assert_eq!(atom.article_data.article_heading, "Atom");
    assert_eq!(atom.article_data.article_summary, "Atom is a test page.");
    assert_eq!(atom.article_data.article_link, "https://en.wikipedia.org/wiki/Atom");
    assert_eq!(
        atom.article_data.article_image,
        "https://upload.wikimedia.org/wikipedia/commons/1.jpg"
    );
    assert_eq!(atom.article_embedding.len(), 8);
    assert_eq!(atom.audio_data, Some(sample_audio_data()));

    // Later attempts see the same members again
    assert_eq!(outcome.stats.attempts, 3);
    assert_eq!(outcome.stats.skipped_duplicate, 6);
    assert_eq!(outcome.stats.collected, 3);

    let requests = audio.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    let photon = requests.iter().find(|r| r.article_id == 2).unwrap();
    assert_eq!(photon.article_title, "Photon");
    assert_eq!(photon.article_description, "Photon is a test page.");
}

#[tokio::test]
async fn test_long_extract_is_truncated() {
    let server = MockServer::start().await;
    let extract = "é".repeat(600);
    mount_category(&server, "Physics", &[(11, "Long article")]).await;
    mount_page(&server, 11, "Long article", &extract, &["File:Long.png"]).await;
    mount_image(&server, "File:Long.png", "https://upload.wikimedia.org/long.png").await;

    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, single_topic_config("Physics"), embedder, audio);
    let outcome = crawler.crawl().await;

    let summary = &outcome.articles[0].article_data.article_summary;
    assert_eq!(summary.chars().count(), 503);
    assert!(summary.ends_with("..."));
    assert!(summary.starts_with("éé"));
}

#[tokio::test]
async fn test_articles_without_supported_image_are_excluded() {
    let server = MockServer::start().await;
    mount_category(
        &server,
        "Physics",
        &[(21, "Diagram only"), (22, "Shouting"), (23, "Photo")],
    )
    .await;
    mount_page(
        &server,
        21,
        "Diagram only",
        "Only vector art.",
        &["File:Diagram.svg", "File:Anim.gif"],
    )
    .await;
    // Extension matching is case-sensitive
    mount_page(&server, 22, "Shouting", "Upper-case file.", &["File:PHOTO.JPG"]).await;
    mount_good_page(&server, 23, "Photo").await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("prop", "imageinfo"))
        .and(query_param("titles", "File:Diagram.svg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, single_topic_config("Physics"), embedder.clone(), audio);
    let outcome = crawler.crawl().await;

    assert_eq!(outcome.articles.len(), 1);
    assert_eq!(outcome.articles[0].article_id, 23);
    assert_eq!(outcome.stats.skipped_no_image, 6);
    // Excluded candidates never reach the embedder
    assert_eq!(embedder.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_first_resolvable_image_wins() {
    let server = MockServer::start().await;
    mount_category(&server, "Physics", &[(31, "Gallery")]).await;
    mount_page(
        &server,
        31,
        "Gallery",
        "Many pictures.",
        &["File:Icon.svg", "File:Lost.jpg", "File:Kept.jpeg", "File:Later.png"],
    )
    .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("prop", "imageinfo"))
        .and(query_param("titles", "File:Lost.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": [{"title": "File:Lost.jpg", "missing": true}]}
        })))
        .mount(&server)
        .await;
    mount_image(&server, "File:Kept.jpeg", "https://upload.wikimedia.org/kept.jpeg").await;
    mount_image(&server, "File:Later.png", "https://upload.wikimedia.org/later.png").await;

    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, single_topic_config("Physics"), embedder, audio);
    let outcome = crawler.crawl().await;

    assert_eq!(
        outcome.articles[0].article_data.article_image,
        "https://upload.wikimedia.org/kept.jpeg"
    );
}

#[tokio::test]
async fn test_embedding_failure_drops_article() {
    let server = MockServer::start().await;
    mount_category(&server, "Physics", &[(1, "Atom"), (2, "Photon")]).await;
    mount_good_page(&server, 1, "Atom").await;
    mount_good_page(&server, 2, "Photon").await;

    let embedder = Arc::new(StaticEmbedder::failing_for(&["Photon"]));
    let audio = Arc::new(StaticAudio::ok());
    let mut crawler = crawler(&server, single_topic_config("Physics"), embedder, audio.clone());
    let outcome = crawler.crawl().await;

    assert_eq!(outcome.articles.len(), 1);
    assert_eq!(outcome.articles[0].article_data.article_heading, "Atom");
    assert_eq!(outcome.stats.skipped_no_embedding, 3);
    // No audio is requested for a dropped article
    assert!(audio.requests.lock().unwrap().iter().all(|r| r.article_id == 1));
}

#[tokio::test]
async fn test_audio_failure_keeps_article() {
    let server = MockServer::start().await;
    mount_category(&server, "Physics", &[(1, "Atom"), (2, "Photon")]).await;
    mount_good_page(&server, 1, "Atom").await;
    mount_good_page(&server, 2, "Photon").await;

    let embedder = Arc::new(StaticEmbedder::default());
    let audio = Arc::new(StaticAudio::failing());
    let mut crawler = crawler(&server, single_topic_config("Physics"), embedder, audio);
    let outcome = crawler.crawl().await;

    assert_eq!(outcome.articles.len(), 2);
    assert!(outcome.articles.iter().all(|a| a.audio_data.is_none()));
    assert_eq!(outcome.stats.missing_audio, 2);
}

#[tokio::test]
async fn test_per_category_quota() {
    let server = MockServer::start().await;
    let members: Vec<(i64, String)> = (1..=6).map(|i| (i, format!("Particle {i}"))).collect();
    let refs: Vec<(i64, &str)> = members.iter().map(|(i, t)| (*i, t.as_str())).collect();
    mount_category(&server, "Physics", &refs).await;
    for (id, title) in &members {
        mount_good_page(&server, *id, title).await;
    }

    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, single_topic_config("Physics"), embedder, audio);
    let outcome = crawler.crawl().await;

    assert_eq!(outcome.articles.len(), 4);
    assert_eq!(outcome.stats.attempts, 1);
    assert_eq!(outcome.stats.candidates, 4);
}

#[tokio::test]
async fn test_global_cap_across_topics() {
    let server = MockServer::start().await;
    let physics: Vec<(i64, String)> = (1..=4).map(|i| (i, format!("Physics {i}"))).collect();
    let music: Vec<(i64, String)> = (11..=14).map(|i| (i, format!("Music {i}"))).collect();

    for (subcategory, members) in [("Physics", &physics), ("Music", &music)] {
        let refs: Vec<(i64, &str)> = members.iter().map(|(i, t)| (*i, t.as_str())).collect();
        mount_category(&server, subcategory, &refs).await;
        for (id, title) in members {
            mount_good_page(&server, *id, title).await;
        }
    }

    let config = CrawlConfig {
        seed: Some(42),
        max_articles: 5,
        categories: vec![
            TopicCategory::new("Physics & Chemistry", &["Physics"]),
            TopicCategory::new("Music History", &["Music"]),
        ],
        ..Default::default()
    };
    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, config, embedder, audio);
    let outcome = crawler.crawl().await;

    assert_eq!(outcome.articles.len(), 5);

    let mut per_topic: HashMap<&str, usize> = HashMap::new();
    for article in &outcome.articles {
        *per_topic.entry(article.main_category()).or_default() += 1;
    }
    assert_eq!(per_topic["Physics & Chemistry"], 4);
    assert_eq!(per_topic["Music History"], 1);
}

#[tokio::test]
async fn test_default_catalog_stops_at_run_cap() {
    let server = MockServer::start().await;
    let catalog = TopicCategory::catalog();

    let mut next_id = 1;
    for topic in &catalog {
        for subcategory in &topic.subcategories {
            let members: Vec<(i64, String)> = (0..6)
                .map(|i| (next_id + i, format!("{subcategory} {i}")))
                .collect();
            next_id += 6;

            let refs: Vec<(i64, &str)> = members.iter().map(|(i, t)| (*i, t.as_str())).collect();
            mount_category(&server, subcategory, &refs).await;
            for (id, title) in &members {
                mount_good_page(&server, *id, title).await;
            }
        }
    }

    let config = CrawlConfig {
        seed: Some(2024),
        ..Default::default()
    };
    assert_eq!(config.categories.len(), 14);
    assert_eq!(config.max_articles, 26);

    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, config, embedder, audio);
    let outcome = crawler.crawl().await;

    assert_eq!(outcome.articles.len(), 26);
    assert_eq!(outcome.stats.collected, 26);

    let mut per_topic: HashMap<&str, usize> = HashMap::new();
    for article in &outcome.articles {
        *per_topic.entry(article.main_category()).or_default() += 1;
    }
    for topic in &catalog[..6] {
        assert_eq!(per_topic[topic.name.as_str()], 4, "topic {}", topic.name);
    }
    assert_eq!(per_topic[catalog[6].name.as_str()], 2);
    assert!(catalog[7..]
        .iter()
        .all(|topic| !per_topic.contains_key(topic.name.as_str())));
}

#[tokio::test]
async fn test_empty_category_consumes_attempts() {
    let server = MockServer::start().await;
    mount_category(&server, "Physics", &[]).await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("prop", "extracts|images"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, single_topic_config("Physics"), embedder, audio);
    let outcome = crawler.crawl().await;

    assert!(outcome.articles.is_empty());
    assert_eq!(outcome.stats.attempts, 3);
    assert_eq!(outcome.stats.empty_categories, 3);
}

#[tokio::test]
async fn test_category_error_consumes_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("list", "categorymembers"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, single_topic_config("Physics"), embedder, audio);
    let outcome = crawler.crawl().await;

    assert!(outcome.articles.is_empty());
    assert_eq!(outcome.stats.failed_requests, 3);
}

#[tokio::test]
async fn test_missing_and_empty_pages_are_skipped() {
    let server = MockServer::start().await;
    mount_category(&server, "Physics", &[(41, "Ghost"), (42, "Blank"), (43, "Real")]).await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("prop", "extracts|images"))
        .and(query_param("titles", "Ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": [{"ns": 0, "title": "Ghost", "missing": true}]}
        })))
        .mount(&server)
        .await;
    mount_page(&server, 42, "Blank", "   ", &["File:Blank.jpg"]).await;
    mount_good_page(&server, 43, "Real").await;

    let config = CrawlConfig {
        max_attempts: 1,
        ..single_topic_config("Physics")
    };
    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, config, embedder, audio);
    let outcome = crawler.crawl().await;

    assert_eq!(outcome.articles.len(), 1);
    assert_eq!(outcome.articles[0].article_id, 43);
    assert_eq!(outcome.stats.skipped_missing, 1);
    assert_eq!(outcome.stats.skipped_no_summary, 1);
}

#[tokio::test]
async fn test_page_error_skips_only_that_candidate() {
    let server = MockServer::start().await;
    mount_category(&server, "Physics", &[(51, "Broken"), (52, "Fine")]).await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("prop", "extracts|images"))
        .and(query_param("titles", "Broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_good_page(&server, 52, "Fine").await;

    let config = CrawlConfig {
        max_attempts: 1,
        ..single_topic_config("Physics")
    };
    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, config, embedder, audio);
    let outcome = crawler.crawl().await;

    assert_eq!(outcome.articles.len(), 1);
    assert_eq!(outcome.articles[0].article_id, 52);
    assert_eq!(outcome.stats.failed_requests, 1);
}

#[tokio::test]
async fn test_links_are_percent_encoded() {
    let server = MockServer::start().await;
    mount_category(&server, "Physics", &[(61, "Schrödinger equation")]).await;
    mount_good_page(&server, 61, "Schrödinger equation").await;

    let (embedder, audio) = ok_providers();
    let mut crawler = crawler(&server, single_topic_config("Physics"), embedder, audio);
    let outcome = crawler.crawl().await;

    assert_eq!(
        outcome.articles[0].article_data.article_link,
        "https://en.wikipedia.org/wiki/Schr%C3%B6dinger_equation"
    );
}
