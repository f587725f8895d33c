//! Sensitive question detection
//!
//! First gate of the pipeline. A blocked question never reaches a model or the
//! database, and the refusal reason is returned to the caller verbatim.

use crate::localization::Language;

/// Result of a sensitivity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensitivityVerdict {
    Allowed,
    Blocked { reason: String },
}

pub trait SensitivityGuard: Send + Sync {
    fn check(&self, question: &str) -> SensitivityVerdict;
}

/// (category, keywords) pairs; matching is case-insensitive substring.
const SENSITIVE_TERMS: &[(&str, &[&str])] = &[
    (
        "credentials",
        &[
            "password", "passwd", "password_hash", "api key", "api_key", "secret key", "access token",
            "كلمة المرور", "كلمة السر", "كلمات المرور",
        ],
    ),
    (
        "payment_card",
        &["credit card", "card number", "cvv", "رقم البطاقة", "بطاقة الائتمان"],
    ),
    (
        "national_id",
        &["social security", "ssn", "national id", "passport number", "رقم الهوية", "جواز السفر"],
    ),
];

/// Keyword-table guard.
#[derive(Debug, Default, Clone)]
pub struct KeywordSensitivityGuard;

impl KeywordSensitivityGuard {
    pub fn new() -> Self {
        Self
    }

    fn matched_category(question: &str) -> Option<&'static str> {
        let lower = question.to_lowercase();
        SENSITIVE_TERMS
            .iter()
            .find(|(_, terms)| terms.iter().any(|t| lower.contains(t)))
            .map(|(category, _)| *category)
    }
}

impl SensitivityGuard for KeywordSensitivityGuard {
    fn check(&self, question: &str) -> SensitivityVerdict {
        match Self::matched_category(question) {
            None => SensitivityVerdict::Allowed,
            Some(category) => {
                tracing::debug!(category, "Sensitive term matched");
                let reason = match Language::detect(question) {
                    Language::Arabic => {
                        "عذراً، لا يمكنني تقديم معلومات حساسة مثل كلمات المرور أو بيانات الدفع أو أرقام الهوية."
                    }
                    Language::English => {
                        "Sorry, I can't provide sensitive information such as passwords, payment details or identity numbers."
                    }
                };
                SensitivityVerdict::Blocked {
                    reason: reason.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_credentials_and_payment_data() {
        let guard = KeywordSensitivityGuard::new();
        assert!(matches!(
            guard.check("Show me the password of every staff member"),
            SensitivityVerdict::Blocked { .. }
        ));
        assert!(matches!(
            guard.check("List customers with their credit card numbers"),
            SensitivityVerdict::Blocked { .. }
        ));
        match guard.check("اعرض كلمة المرور لكل موظف") {
            SensitivityVerdict::Blocked { reason } => assert!(reason.starts_with("عذراً")),
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_allows_ordinary_questions() {
        let guard = KeywordSensitivityGuard::new();
        assert_eq!(guard.check("How many films are in each category?"), SensitivityVerdict::Allowed);
    }
}
