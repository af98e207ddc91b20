use bw_core::Article;
use chrono::{DateTime, Utc};

const PLACEHOLDER_SOURCE: &str = "biaswatch";

/// Static articles served when retrieval produces nothing in time.
pub fn placeholder_articles(query: &str, now: DateTime<Utc>) -> Vec<Article> {
    let stories = [
        (
            "live-results-unavailable",
            format!("Live coverage of \"{}\" is temporarily unavailable", query),
            "The news search service did not respond in time. Results shown here are placeholders \
             and will be replaced with live coverage on the next request.",
        ),
        (
            "how-scores-work",
            "How bias scores are assigned".to_string(),
            "Each article receives a score from 0 (strongly left-leaning) to 100 (strongly right-leaning), \
             a label, a confidence value and the evidence behind it.",
        ),
        (
            "try-again",
            format!("Try searching \"{}\" again shortly", query),
            "Search outages are usually brief. Repeating the query in a minute normally brings back \
             live results.",
        ),
    ];

    stories
        .into_iter()
        .map(|(slug, title, content)| Article {
            url: format!("https://biaswatch.invalid/placeholder/{}", slug),
            title,
            content: content.to_string(),
            source: PLACEHOLDER_SOURCE.to_string(),
            published_at: now,
            author: None,
            image: None,
        })
        .collect()
}
