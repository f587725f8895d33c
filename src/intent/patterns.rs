//! Intent pattern tables
//!
//! Bilingual (Arabic/English) keyword patterns per intent category. Matching is
//! case-insensitive regex search; categories are tried in `INTENT_PRECEDENCE`
//! order and the first category with any match wins.

use super::IntentType;

/// Most specific first, so broad words like "top" do not shadow stronger signals.
pub const INTENT_PRECEDENCE: [IntentType; 5] = [
    IntentType::Correlation,
    IntentType::Trend,
    IntentType::Comparison,
    IntentType::Aggregate,
    IntentType::List,
];

const LIST_PATTERNS: &[&str] = &[
    r"عرض|أعرض|اعرض|عرض جميع|أظهر|أظهر جميع|show|list|display|get all",
    r"جميع|كل|all|every",
    r"ما هي|ما هم|what are|what is",
];

const AGGREGATE_PATTERNS: &[&str] = &[
    r"كم|عدد|count|how many|total|sum|average|avg|متوسط|إجمالي",
    r"أكثر|أقل|most|least|highest|lowest|الأكثر|الأقل",
    r"أعلى|أقل|top|bottom|maximum|minimum",
];

const COMPARISON_PATTERNS: &[&str] = &[
    r"قارن|مقارنة|compare|comparison|versus|vs|مقارنة بين",
    r"أفضل|أسوأ|better|worse|best|worst",
    r"أكثر من|أقل من|more than|less than|greater|smaller",
];

const TREND_PATTERNS: &[&str] = &[
    r"اتجاه|اتجاهات|trend|trends|تطور|تطورات",
    r"بمرور الوقت|over time|over the years|خلال|during",
    r"نمو|انخفاض|growth|decline|increase|decrease",
];

const CORRELATION_PATTERNS: &[&str] = &[
    r"علاقة|ارتباط|relationship|correlation|correlate",
    r"هل يؤثر|does.*affect|impact|تأثير",
    r"يرتبط|related|linked|connected",
];

/// Raw patterns for a category. `Unknown` has none.
pub fn intent_patterns(intent_type: IntentType) -> &'static [&'static str] {
    match intent_type {
        IntentType::List => LIST_PATTERNS,
        IntentType::Aggregate => AGGREGATE_PATTERNS,
        IntentType::Comparison => COMPARISON_PATTERNS,
        IntentType::Trend => TREND_PATTERNS,
        IntentType::Correlation => CORRELATION_PATTERNS,
        IntentType::Unknown => &[],
    }
}

/// Default table vocabulary for entity extraction.
pub const KNOWN_TABLES: &[&str] = &[
    "film", "category", "actor", "customer", "rental", "payment", "store", "staff", "inventory",
    "address", "city", "country", "language", "film_actor", "film_category",
];

/// Abstract metric name -> keyword pattern.
pub const METRIC_FAMILIES: &[(&str, &str)] = &[
    ("revenue", r"إيراد|revenue|income|money|مبلغ"),
    ("count", r"عدد|count|number|quantity"),
    ("price", r"سعر|price|cost|تكلفة"),
    ("rate", r"معدل|rate|rating|تقييم"),
    ("amount", r"مبلغ|amount|value|قيمة"),
];
