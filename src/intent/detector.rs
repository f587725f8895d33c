//! Intent detector
//!
//! Classifies a question by the first intent category in precedence order with
//! any pattern hit, then pulls table names and metric families out of the text.

use super::patterns::{intent_patterns, INTENT_PRECEDENCE, KNOWN_TABLES, METRIC_FAMILIES};
use super::{Intent, IntentType};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use tracing::info;

lazy_static! {
    static ref COMPILED_INTENTS: HashMap<IntentType, Vec<Regex>> = INTENT_PRECEDENCE
        .iter()
        .map(|t| {
            let compiled = intent_patterns(*t)
                .iter()
                .filter_map(|p| Regex::new(&format!("(?i){}", p)).ok())
                .collect();
            (*t, compiled)
        })
        .collect();
    static ref COMPILED_METRICS: Vec<(&'static str, Regex)> = METRIC_FAMILIES
        .iter()
        .filter_map(|(name, p)| Regex::new(&format!("(?i){}", p)).ok().map(|re| (*name, re)))
        .collect();
}

struct EntityMatcher {
    table: String,
    patterns: Vec<Regex>,
}

impl EntityMatcher {
    fn new(table: &str) -> Option<Self> {
        let escaped = regex::escape(table);
        let patterns = [
            format!(r"(?i)\b{}\b", escaped),
            format!("(?i){}s", escaped),
            format!("(?i){}es", escaped),
        ]
        .iter()
        .map(|p| Regex::new(p))
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
        Some(Self {
            table: table.to_string(),
            patterns,
        })
    }

    fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

pub struct IntentDetector {
    entities: Vec<EntityMatcher>,
}

impl Default for IntentDetector {
    fn default() -> Self {
        Self::with_vocabulary(KNOWN_TABLES.iter().copied())
    }
}

impl IntentDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector that recognises the given table names as entities.
    pub fn with_vocabulary<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entities = tables
            .into_iter()
            .filter_map(|t| EntityMatcher::new(t.as_ref()))
            .collect();
        Self { entities }
    }

    pub fn detect(&self, question: &str) -> Intent {
        let intent_type = INTENT_PRECEDENCE
            .iter()
            .copied()
            .find(|t| Self::pattern_matches(*t, question) > 0)
            .unwrap_or(IntentType::Unknown);

        let entities = self.extract_entities(question);
        let metrics = Self::extract_metrics(question);
        let confidence = Self::confidence(intent_type, question);

        info!(
            intent_type = %intent_type,
            entities = ?entities,
            metrics = ?metrics,
            confidence,
            "Intent detected"
        );

        Intent::new(intent_type, entities, metrics, confidence)
    }

    /// Number of a category's patterns that hit the question.
    pub fn pattern_matches(intent_type: IntentType, question: &str) -> usize {
        COMPILED_INTENTS
            .get(&intent_type)
            .map(|patterns| patterns.iter().filter(|re| re.is_match(question)).count())
            .unwrap_or(0)
    }

    pub fn extract_entities(&self, question: &str) -> BTreeSet<String> {
        let lowered = question.to_lowercase();
        self.entities
            .iter()
            .filter(|m| m.matches(&lowered))
            .map(|m| m.table.clone())
            .collect()
    }

    pub fn extract_metrics(question: &str) -> BTreeSet<String> {
        COMPILED_METRICS
            .iter()
            .filter(|(_, re)| re.is_match(question))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn confidence(intent_type: IntentType, question: &str) -> f64 {
        if intent_type == IntentType::Unknown {
            return 0.3;
        }
        match Self::pattern_matches(intent_type, question) {
            n if n >= 2 => 0.9,
            1 => 0.7,
            _ => 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(q: &str) -> Intent {
        IntentDetector::default().detect(q)
    }

    #[test]
    fn test_correlation_takes_precedence() {
        // Also hits trend ("increase") and aggregate ("top").
        let intent = detect("Is there a correlation between rental rate and top increase?");
        assert_eq!(intent.intent_type, IntentType::Correlation);
        assert!(intent.analysis_required);
    }

    #[test]
    fn test_correlation_beats_equally_strong_aggregate() {
        let q = "Is there a correlation between rental rate and revenue, and are they related to how many top customers?";
        assert_eq!(IntentDetector::pattern_matches(IntentType::Correlation, q), 2);
        assert_eq!(IntentDetector::pattern_matches(IntentType::Aggregate, q), 2);

        let intent = detect(q);
        assert_eq!(intent.intent_type, IntentType::Correlation);
        assert_eq!(intent.confidence, 0.9);
    }

    #[test]
    fn test_precedence_is_first_matching_category() {
        let questions = [
            "show all films",
            "how many customers are there",
            "compare stores",
            "payments over time",
            "relationship between length and rate",
            "ما هي الفئات",
        ];
        for q in questions {
            let intent = detect(q);
            let first = INTENT_PRECEDENCE
                .iter()
                .copied()
                .find(|t| IntentDetector::pattern_matches(*t, q) > 0)
                .unwrap();
            assert_eq!(intent.intent_type, first, "question: {}", q);
        }
    }

    #[test]
    fn test_list_and_aggregate() {
        assert_eq!(detect("Show all categories").intent_type, IntentType::List);
        assert_eq!(detect("How many films are there?").intent_type, IntentType::Aggregate);
        assert_eq!(detect("كم عدد الأفلام").intent_type, IntentType::Aggregate);
        assert!(!detect("Show all categories").analysis_required);
    }

    #[test]
    fn test_unknown_has_low_confidence() {
        let intent = detect("xyz");
        assert_eq!(intent.intent_type, IntentType::Unknown);
        assert!((intent.confidence - 0.3).abs() < f64::EPSILON);
        assert!(!intent.analysis_required);
        assert!(intent.analysis_type.is_none());
    }

    #[test]
    fn test_confidence_by_match_count() {
        // "how many" and "top": two aggregate patterns.
        assert!((detect("how many top films").confidence - 0.9).abs() < f64::EPSILON);
        assert!((detect("how many films").confidence - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_entities_and_metrics() {
        let intent = detect("Show the revenue by customer and film category");
        assert!(intent.entities.contains("customer"));
        assert!(intent.entities.contains("film"));
        assert!(intent.entities.contains("category"));
        assert!(intent.metrics.contains("revenue"));
        assert!(!intent.metrics.contains("price"));
    }

    #[test]
    fn test_plural_entity() {
        let intent = detect("list all payments");
        assert!(intent.entities.contains("payment"));
    }

    #[test]
    fn test_custom_vocabulary() {
        let detector = IntentDetector::with_vocabulary(["orders"]);
        let intent = detector.detect("count orders by month");
        assert_eq!(intent.entities.into_iter().collect::<Vec<_>>(), vec!["orders"]);
    }

    #[test]
    fn test_confidence_in_range() {
        for q in ["", "show", "trend growth over time during", "علاقة بين السعر والتقييم"] {
            let c = detect(q).confidence;
            assert!((0.0..=1.0).contains(&c));
        }
    }
}
