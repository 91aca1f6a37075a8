//! Skill demand ranking from listing titles and categories.

use indexmap::IndexMap;
use regex::Regex;

use crate::config::SkillConfig;
use crate::domain::{JobRow, RunDate, SkillFrequencyRow};
use crate::error::{AppError, Result};

/// Counts alphabetic tokens across job listings and keeps the most frequent.
///
/// Tokens are maximal runs of ASCII letters of at least `min_token_len`,
/// taken from the lowercased `title + " " + category`. Stopwords are dropped.
/// Ranking is by count descending; equal counts keep first-seen order.
pub struct SkillTokenExtractor<'a> {
    config: &'a SkillConfig,
    token: Regex,
}

impl<'a> SkillTokenExtractor<'a> {
    pub fn new(config: &'a SkillConfig) -> Result<Self> {
        let min = config.min_token_len.max(1);
        let token = Regex::new(&format!("[a-zA-Z]{{{min},}}"))
            .map_err(|e| AppError::Config(format!("invalid skill token pattern: {e}")))?;
        Ok(Self { config, token })
    }

    /// Tokens of one text, stopwords removed.
    pub fn tokenize<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> {
        self.token
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|t| !self.config.stopwords.contains(*t))
    }

    /// Frequency of every token across `jobs`, in first-seen order.
    pub fn count(&self, jobs: &[JobRow]) -> IndexMap<String, usize> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for job in jobs {
            let text = format!(
                "{} {}",
                job.title.as_deref().unwrap_or(""),
                job.category.as_deref().unwrap_or("")
            )
            .to_lowercase();

            for token in self.tokenize(&text) {
                *counts.entry(token.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn extract(&self, jobs: &[JobRow], run_date: RunDate) -> Vec<SkillFrequencyRow> {
        let mut ranked: Vec<(String, usize)> = self.count(jobs).into_iter().collect();
        // Stable sort keeps insertion order among ties.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.config.top_n);

        ranked
            .into_iter()
            .map(|(skill, count)| SkillFrequencyRow { skill, count, run_date })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, category: Option<&str>) -> JobRow {
        JobRow {
            title: Some(title.to_string()),
            category: category.map(str::to_string),
            ..JobRow::default()
        }
    }

    fn run_date() -> RunDate {
        RunDate::parse("2025-05-02").unwrap()
    }

    fn pairs(rows: &[SkillFrequencyRow]) -> Vec<(&str, usize)> {
        rows.iter().map(|r| (r.skill.as_str(), r.count)).collect()
    }

    #[test]
    fn ranks_python_over_backend() {
        let config = SkillConfig::with_stopwords(&["senior", "developer", "engineer"]);
        let extractor = SkillTokenExtractor::new(&config).unwrap();
        let jobs = [
            job("Senior Python Developer", None),
            job("Python Backend Engineer", None),
        ];
        let rows = extractor.extract(&jobs, run_date());
        assert_eq!(pairs(&rows), vec![("python", 2), ("backend", 1)]);
        assert!(rows.iter().all(|r| r.run_date == run_date()));
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let config = SkillConfig::with_stopwords(&[]);
        let extractor = SkillTokenExtractor::new(&config).unwrap();
        let jobs = [job("zeta alpha", Some("mid")), job("alpha zeta", Some("beta"))];
        let rows = extractor.extract(&jobs, run_date());
        assert_eq!(pairs(&rows), vec![("zeta", 2), ("alpha", 2), ("mid", 1), ("beta", 1)]);
    }

    #[test]
    fn short_tokens_digits_and_nulls() {
        let config = SkillConfig::default();
        let extractor = SkillTokenExtractor::new(&config).unwrap();
        let jobs = [
            job("Go/C++ dev - K8s & AWS", None),
            JobRow::default(),
        ];
        let rows = extractor.extract(&jobs, run_date());
        // "go", "c", "k" and "s" are too short.
        assert_eq!(pairs(&rows), vec![("dev", 1), ("aws", 1)]);
    }

    #[test]
    fn output_is_capped_at_top_n() {
        let config = SkillConfig::default();
        let extractor = SkillTokenExtractor::new(&config).unwrap();
        let words: Vec<String> = (0..40)
            .map(|i| {
                let a = (b'a' + (i / 26) as u8) as char;
                let b = (b'a' + (i % 26) as u8) as char;
                format!("x{a}{b}")
            })
            .collect();
        let jobs = [job(&words.join(" "), Some("Data"))];
        let rows = extractor.extract(&jobs, run_date());
        assert_eq!(rows.len(), 30);
        assert_eq!(rows[0].skill, "xaa");
    }

    #[test]
    fn category_tokens_count_and_default_stopwords_apply() {
        let config = SkillConfig::default();
        let extractor = SkillTokenExtractor::new(&config).unwrap();
        let jobs = [
            job("Senior Rust Engineer", Some("Software Development")),
            job("Rust Developer", Some("DevOps")),
        ];
        let rows = extractor.extract(&jobs, run_date());
        assert_eq!(pairs(&rows), vec![("rust", 2), ("development", 1), ("devops", 1)]);
    }
}
