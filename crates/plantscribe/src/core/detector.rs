//! Core detector trait for diagram type identification
//!
//! Detectors recognise a diagram type from the wording of a free-text
//! description. They back the offline classifier and the local first pass
//! of the `keywords_first` strategy.

use regex::Regex;

use super::types::DiagramType;

/// Weighted keyword hits for one diagram type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordScore {
    pub high: usize,
    pub medium: usize,
}

impl KeywordScore {
    /// High-priority hits count double
    pub fn total(&self) -> usize {
        self.high * 2 + self.medium
    }
}

/// Compiled high and medium priority keyword patterns
#[derive(Debug, Clone)]
pub struct KeywordPatterns {
    high: Vec<Regex>,
    medium: Vec<Regex>,
}

impl KeywordPatterns {
    pub fn new(high: Vec<Regex>, medium: Vec<Regex>) -> Self {
        Self { high, medium }
    }

    pub fn compile(high: &[&str], medium: &[&str]) -> Result<Self, regex::Error> {
        let build = |sources: &[&str]| -> Result<Vec<Regex>, regex::Error> {
            sources.iter().map(|s| Regex::new(s)).collect()
        };
        Ok(Self::new(build(high)?, build(medium)?))
    }

    /// Count every match of every pattern in already-lowercased text
    pub fn score(&self, lowered: &str) -> KeywordScore {
        let count = |patterns: &[Regex]| -> usize {
            patterns.iter().map(|p| p.find_iter(lowered).count()).sum()
        };
        KeywordScore {
            high: count(&self.high),
            medium: count(&self.medium),
        }
    }
}

/// Core trait for diagram type detectors
///
/// Each diagram type plugin provides a detector that scores how strongly a
/// description reads like that type.
pub trait Detector: Send + Sync {
    /// Detect if the input reads like this diagram type
    fn detect(&self, input: &str) -> bool;

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// Raw keyword hits, used to compare detectors against each other
    fn score(&self, input: &str) -> KeywordScore;

    /// The diagram type this detector recognises
    fn diagram_type(&self) -> DiagramType;

    /// Get key phrases that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}

/// Confidence of a single detector from its own score
pub fn confidence_from_score(score: KeywordScore) -> f64 {
    if score.total() == 0 {
        return 0.0;
    }
    if score.high > 0 {
        return (0.6 + score.total() as f64 * 0.1).min(0.9);
    }
    (0.4 + score.medium as f64 * 0.1).min(0.6)
}
