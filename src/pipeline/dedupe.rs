//! Stable deduplication on [`Article::identity_key`].

use crate::models::Article;
use itertools::Itertools;

/// First occurrence of each identity key wins; later ones are dropped.
pub fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    articles
        .into_iter()
        .unique_by(|a| a.identity_key().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, url: &str, title: &str) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            summary: String::new(),
            source: "autohome".to_string(),
            source_name: None,
            url: url.to_string(),
            publish_time: None,
        }
    }

    #[test]
    fn test_first_article_per_url_wins() {
        let out = dedupe(vec![
            article("1", "https://a.com/x", "A"),
            article("2", "https://a.com/y", "B"),
            article("3", "https://a.com/x", "C"),
            article("4", "https://a.com/x", "D"),
        ]);
        let ids: Vec<_> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_placeholder_urls_dedupe_on_title() {
        let out = dedupe(vec![
            article("1", "#", "同一标题"),
            article("2", "#", "另一标题"),
            article("3", "", "同一标题"),
        ]);
        let ids: Vec<_> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_same_title_different_urls_are_kept() {
        let out = dedupe(vec![
            article("1", "https://a.com/1", "T"),
            article("2", "https://b.com/1", "T"),
        ]);
        assert_eq!(out.len(), 2);
    }
}
