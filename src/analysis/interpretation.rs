//! Narrative text for findings, in the language of the question.

use super::{
    AggregateResult, AnalysisError, AnalysisKind, CorrelationDirection, CorrelationResult, CorrelationStrength,
    TrendDirection, TrendResult,
};
use crate::localization::Language;

fn strength_label(strength: CorrelationStrength, lang: Language) -> &'static str {
    match (strength, lang) {
        (CorrelationStrength::VeryWeak, Language::Arabic) => "ضعيفة جداً",
        (CorrelationStrength::Weak, Language::Arabic) => "ضعيفة",
        (CorrelationStrength::Moderate, Language::Arabic) => "متوسطة",
        (CorrelationStrength::Strong, Language::Arabic) => "قوية",
        (CorrelationStrength::VeryStrong, Language::Arabic) => "قوية جداً",
        (CorrelationStrength::VeryWeak, Language::English) => "very weak",
        (CorrelationStrength::Weak, Language::English) => "weak",
        (CorrelationStrength::Moderate, Language::English) => "moderate",
        (CorrelationStrength::Strong, Language::English) => "strong",
        (CorrelationStrength::VeryStrong, Language::English) => "very strong",
    }
}

pub fn correlation(result: &CorrelationResult, lang: Language) -> String {
    let r = result.correlation_coefficient;
    let (x, y) = (&result.x_variable, &result.y_variable);
    let strength = strength_label(result.strength, lang);
    match lang {
        Language::Arabic => {
            let direction = match result.direction {
                CorrelationDirection::Positive => "موجبة",
                CorrelationDirection::Negative => "سالبة",
            };
            let effect = if r.abs() < 0.3 {
                format!("مما يعني أن {} **ليس عاملًا مؤثرًا بشكل واضح** على {}.", x, y)
            } else if r.abs() < 0.6 {
                format!("مما يعني أن {} له **تأثير متوسط** على {}.", x, y)
            } else {
                format!("مما يعني أن {} له **تأثير قوي** على {}.", x, y)
            };
            format!(
                "التحليل الإحصائي يظهر أن معامل الارتباط بين {} و {} هو **{:.3}**.\n\nهذا يشير إلى **علاقة {}** ({})، {}",
                x, y, r, strength, direction, effect
            )
        }
        Language::English => {
            let direction = match result.direction {
                CorrelationDirection::Positive => "positive",
                CorrelationDirection::Negative => "negative",
            };
            let effect = if r.abs() < 0.3 {
                format!("so {} is **not a clear driver** of {}.", x, y)
            } else if r.abs() < 0.6 {
                format!("so {} has a **moderate effect** on {}.", x, y)
            } else {
                format!("so {} has a **strong effect** on {}.", x, y)
            };
            format!(
                "The correlation coefficient between {} and {} is **{:.3}**.\n\nThis indicates a **{} {} relationship**, {}",
                x, y, r, strength, direction, effect
            )
        }
    }
}

/// Grouped comparison. `highest`/`lowest` carry the group label and its mean.
pub fn comparison_grouped(
    metric: &str,
    highest: Option<(&str, f64)>,
    lowest: Option<(&str, f64)>,
    lang: Language,
) -> String {
    let ((max_group, max_val), (min_group, min_val)) = match (highest, lowest) {
        (Some(h), Some(l)) => (h, l),
        _ => {
            return match lang {
                Language::Arabic => format!("تم تحليل المقارنة بين المجموعات المختلفة لـ {}.", metric),
                Language::English => format!("Compared {} across the different groups.", metric),
            }
        }
    };

    let mut text = match lang {
        Language::Arabic => format!(
            "التحليل المقارن يظهر أن:\n\n• **{}** لديه أعلى قيمة في {} بمتوسط **{:.2}**\n• **{}** لديه أقل قيمة في {} بمتوسط **{:.2}**",
            max_group, metric, max_val, min_group, metric, min_val
        ),
        Language::English => format!(
            "The comparison shows:\n\n• **{}** has the highest {} with an average of **{:.2}**\n• **{}** has the lowest {} with an average of **{:.2}**",
            max_group, metric, max_val, min_group, metric, min_val
        ),
    };

    if max_val > 0.0 {
        let gap = (max_val - min_val) / max_val * 100.0;
        match lang {
            Language::Arabic => text.push_str(&format!("\n\nالفرق بين الأعلى والأقل هو **{:.1}%**.", gap)),
            Language::English => text.push_str(&format!("\n\nThe gap between highest and lowest is **{:.1}%**.", gap)),
        }
    }
    text
}

pub fn comparison_overall(metric: &str, average: f64, maximum: f64, minimum: f64, lang: Language) -> String {
    match lang {
        Language::Arabic => format!(
            "متوسط {}: {:.2}, الحد الأقصى: {:.2}, الحد الأدنى: {:.2}",
            metric, average, maximum, minimum
        ),
        Language::English => format!(
            "Average {}: {:.2}, maximum: {:.2}, minimum: {:.2}",
            metric, average, maximum, minimum
        ),
    }
}

pub fn trend(result: &TrendResult, lang: Language) -> String {
    let pct = result.strength * 100.0;
    let mut text = match lang {
        Language::Arabic => {
            let direction = match result.direction {
                TrendDirection::Increasing => "تصاعدي",
                TrendDirection::Decreasing => "تنازلي",
            };
            let band = if result.strength < 0.1 {
                "(اتجاه ضعيف)"
            } else if result.strength < 0.3 {
                "(اتجاه متوسط)"
            } else {
                "(اتجاه قوي)"
            };
            format!(
                "التحليل يظهر **اتجاه {}** في {}.\n\nقوة الاتجاه: **{:.1}%** {}",
                direction, result.metric, pct, band
            )
        }
        Language::English => {
            let direction = match result.direction {
                TrendDirection::Increasing => "increasing",
                TrendDirection::Decreasing => "decreasing",
            };
            let band = if result.strength < 0.1 {
                "(weak trend)"
            } else if result.strength < 0.3 {
                "(moderate trend)"
            } else {
                "(strong trend)"
            };
            format!(
                "The analysis shows an **{} trend** in {}.\n\nTrend strength: **{:.1}%** {}",
                direction, result.metric, pct, band
            )
        }
    };

    if result.time_ordered == Some(false) {
        match lang {
            Language::Arabic => text.push_str("\n\nملاحظة: الصفوف ليست مرتبة زمنياً."),
            Language::English => text.push_str("\n\nNote: the rows are not in chronological order."),
        }
    }
    text
}

pub fn aggregate(result: &AggregateResult, lang: Language) -> String {
    let show = |v: Option<f64>| v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "-".to_string());
    let std = result.std.unwrap_or(0.0);
    match lang {
        Language::Arabic => format!(
            "إحصائيات {}: المتوسط {}، الوسيط {}، الانحراف المعياري {:.2}",
            result.metric,
            show(result.mean),
            show(result.median),
            std
        ),
        Language::English => format!(
            "Statistics for {}: mean {}, median {}, standard deviation {:.2}",
            result.metric,
            show(result.mean),
            show(result.median),
            std
        ),
    }
}

/// Explanation for a branch that could not run.
pub fn degraded(kind: AnalysisKind, error: &AnalysisError, lang: Language) -> String {
    match (kind, error, lang) {
        (AnalysisKind::Correlation, AnalysisError::NotEnoughNumericColumns { .. }, Language::Arabic) => {
            "لا توجد أعمدة رقمية كافية لتحليل الارتباط".to_string()
        }
        (AnalysisKind::Correlation, AnalysisError::NotEnoughNumericColumns { .. }, Language::English) => {
            "Not enough numeric columns for a correlation analysis".to_string()
        }
        (AnalysisKind::Correlation, AnalysisError::NotEnoughRows { .. }, Language::Arabic) => {
            "لا توجد بيانات كافية لتحليل الارتباط".to_string()
        }
        (AnalysisKind::Correlation, AnalysisError::NotEnoughRows { .. }, Language::English) => {
            "Not enough data for a correlation analysis".to_string()
        }
        (AnalysisKind::Comparison, AnalysisError::NotEnoughNumericColumns { .. }, Language::Arabic) => {
            "لا توجد أعمدة رقمية للمقارنة".to_string()
        }
        (AnalysisKind::Comparison, AnalysisError::NotEnoughNumericColumns { .. }, Language::English) => {
            "No numeric columns to compare".to_string()
        }
        (AnalysisKind::Trend, AnalysisError::NotEnoughNumericColumns { .. }, Language::Arabic) => {
            "لا توجد بيانات رقمية لتحليل الاتجاه".to_string()
        }
        (AnalysisKind::Trend, AnalysisError::NotEnoughNumericColumns { .. }, Language::English) => {
            "No numeric data for a trend analysis".to_string()
        }
        (AnalysisKind::Trend, AnalysisError::NotEnoughRows { .. }, Language::Arabic) => {
            "لا توجد بيانات كافية لتحليل الاتجاه".to_string()
        }
        (AnalysisKind::Trend, AnalysisError::NotEnoughRows { .. }, Language::English) => {
            "Not enough data for a trend analysis".to_string()
        }
        (AnalysisKind::Aggregate, AnalysisError::NotEnoughNumericColumns { .. }, Language::Arabic) => {
            "لا توجد بيانات رقمية للإحصائيات".to_string()
        }
        (AnalysisKind::Aggregate, AnalysisError::NotEnoughNumericColumns { .. }, Language::English) => {
            "No numeric data for summary statistics".to_string()
        }
        (_, other, Language::Arabic) => format!("فشل التحليل الإحصائي: {}", other),
        (_, other, Language::English) => format!("Statistical analysis failed: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_text_follows_language() {
        let result = CorrelationResult {
            correlation_coefficient: 0.85,
            strength: CorrelationStrength::VeryStrong,
            direction: CorrelationDirection::Positive,
            x_variable: "rental_rate".into(),
            y_variable: "revenue".into(),
            sample_size: 10,
        };
        let en = correlation(&result, Language::English);
        assert!(en.contains("0.850"));
        assert!(en.contains("very strong positive"));
        let ar = correlation(&result, Language::Arabic);
        assert!(ar.contains("قوية جداً"));
        assert!(ar.contains("تأثير قوي"));
    }

    #[test]
    fn test_comparison_gap() {
        let text = comparison_grouped("amount", Some(("B", 50.0)), Some(("A", 10.0)), Language::English);
        assert!(text.contains("**B** has the highest amount"));
        assert!(text.contains("80.0%"));
    }

    #[test]
    fn test_degraded_message() {
        let err = AnalysisError::NotEnoughRows { required: 3, found: 2 };
        assert_eq!(
            degraded(AnalysisKind::Correlation, &err, Language::English),
            "Not enough data for a correlation analysis"
        );
        let err = AnalysisError::NonFinite("mean".into());
        assert!(degraded(AnalysisKind::Aggregate, &err, Language::English).starts_with("Statistical analysis failed"));
    }
}
