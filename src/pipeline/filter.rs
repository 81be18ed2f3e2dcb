//! Keyword quality filter.
//!
//! Precision over recall: an exclude hit rejects the article no matter what
//! else it mentions, and a kept article must mention at least one include
//! term. Dropping a relevant article is acceptable, keeping noise is not.

use crate::config::{EXCLUDE_KEYWORDS, INCLUDE_KEYWORDS};
use crate::models::Article;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    /// Contains the given noise marker.
    Excluded(usize),
    /// No market-moving term at all.
    Irrelevant,
}

#[derive(Debug, Clone)]
pub struct QualityFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::new(INCLUDE_KEYWORDS, EXCLUDE_KEYWORDS)
    }
}

impl QualityFilter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Self {
        let lower = |terms: &[S]| {
            terms
                .iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect::<Vec<String>>()
        };
        Self {
            include: lower(include),
            exclude: lower(exclude),
        }
    }

    pub fn classify(&self, article: &Article) -> Verdict {
        let haystack = article.haystack();
        if let Some(i) = self.exclude.iter().position(|t| haystack.contains(t.as_str())) {
            return Verdict::Excluded(i);
        }
        if self.include.iter().any(|t| haystack.contains(t.as_str())) {
            Verdict::Keep
        } else {
            Verdict::Irrelevant
        }
    }

    pub fn filter(&self, articles: Vec<Article>) -> Vec<Article> {
        articles
            .into_iter()
            .filter(|a| match self.classify(a) {
                Verdict::Keep => true,
                Verdict::Excluded(i) => {
                    debug!(title = %a.title, term = %self.exclude[i], "Dropped noisy article");
                    false
                }
                Verdict::Irrelevant => {
                    debug!(title = %a.title, "Dropped irrelevant article");
                    false
                }
            })
            .collect()
    }
}
