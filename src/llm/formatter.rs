//! Response formatting
//!
//! A code-built summary plus a small sample of rows goes to the assistant
//! model, which phrases the answer and says whether a chart is wanted. The
//! model's reply is parsed leniently and then checked: anything that looks
//! like a data dump instead of an answer is replaced with a mechanical one.

use super::{prompts, LanguageModel, StageAttempt};
use crate::analysis::{stats, StatisticalFinding};
use crate::execution::{ColumnKind, ResultSet};
use crate::localization::{professional_error_message, ErrorKind, Language};
use crate::observability::prefix;
use crate::visualization::mentions_visual;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Rows shown to the model.
const SAMPLE_ROWS: usize = 10;
/// Distinct values kept per text column.
const TOP_VALUES: usize = 5;
/// Longest answer accepted from the model, in characters.
const MAX_ANSWER_CHARS: usize = 400;

const METRIC_HINTS: &[&str] = &["total", "amount", "total_payments", "count", "sum", "avg", "max"];

lazy_static! {
    static ref RESPONSE_BEFORE_KEY: Regex =
        Regex::new(r#"(?s)"response"\s*:\s*"(.*?)"\s*,\s*"(?:data|needs_visualization|visualization_type)""#)
            .expect("valid response regex");
    static ref RESPONSE_ANY: Regex =
        Regex::new(r#"(?s)"response"\s*:\s*"(.*?)"\s*[,}]"#).expect("valid response regex");
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Code-computed overview of a result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub has_numeric: bool,
    pub has_text: bool,
    pub numeric_stats: BTreeMap<String, NumericSummary>,
    pub top_values: BTreeMap<String, Vec<ValueCount>>,
}

impl DataSummary {
    pub fn from_results(results: &ResultSet) -> Self {
        let mut numeric_stats = BTreeMap::new();
        let mut top_values = BTreeMap::new();
        let mut has_numeric = false;
        let mut has_text = false;

        for (idx, name) in results.columns().iter().enumerate() {
            match results.column_kind(idx) {
                ColumnKind::Numeric => {
                    has_numeric = true;
                    match stats::describe(&results.numeric_values(idx)) {
                        Ok(stats::Summary {
                            min: Some(min),
                            max: Some(max),
                            mean: Some(avg),
                            sum,
                            ..
                        }) => {
                            numeric_stats.insert(name.clone(), NumericSummary { min, max, sum, avg });
                        }
                        Ok(_) => {}
                        Err(e) => warn!(column = %name, error = %e, "Column summary skipped"),
                    }
                }
                ColumnKind::Text => {
                    has_text = true;
                    let top: Vec<ValueCount> = results
                        .column(idx)
                        .filter_map(|v| v.as_text())
                        .filter(|s| !s.is_empty())
                        .counts()
                        .into_iter()
                        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
                        .take(TOP_VALUES)
                        .map(|(value, count)| ValueCount {
                            value: value.to_string(),
                            count,
                        })
                        .collect();
                    if !top.is_empty() {
                        top_values.insert(name.clone(), top);
                    }
                }
                _ => {}
            }
        }

        Self {
            row_count: results.row_count(),
            column_count: results.columns().len(),
            has_numeric,
            has_text,
            numeric_stats,
            top_values,
        }
    }

    fn to_prompt_text(&self) -> String {
        let mut text = format!(
            "Data Summary:\n- Total rows: {}\n- Columns: {}\n- Has numeric data: {}\n- Has text data: {}\n",
            self.row_count, self.column_count, self.has_numeric, self.has_text
        );
        if !self.numeric_stats.is_empty() {
            if let Ok(json) = serde_json::to_string_pretty(&self.numeric_stats) {
                text.push_str(&format!("\nNumeric Statistics:\n{}", json));
            }
        }
        if !self.top_values.is_empty() {
            if let Ok(json) = serde_json::to_string_pretty(&self.top_values) {
                text.push_str(&format!("\nTop Values:\n{}", json));
            }
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedResponse {
    pub response: String,
    pub needs_visualization: bool,
    /// As the model said it: may be generic ("chart", "graph").
    pub visualization_type: String,
}

pub struct ResponseFormatter {
    model: Option<Arc<dyn LanguageModel>>,
}

impl ResponseFormatter {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    pub async fn format(
        &self,
        question: &str,
        sql: &str,
        results: &ResultSet,
        finding: &StatisticalFinding,
    ) -> StageAttempt<FormattedResponse> {
        let Some(model) = &self.model else {
            return StageAttempt::skipped("no assistant model configured");
        };

        let summary = DataSummary::from_results(results);
        let messages = prompts::response_formatting(
            question,
            sql,
            &data_section(&summary, results),
            &insights_section(finding),
        );

        match model.generate(&messages).await {
            Ok(reply) => {
                let parsed = parse_model_reply(&reply);
                let formatted = enforce_concise(parsed, question, results);
                info!(
                    question = prefix(question, 100),
                    needs_visualization = formatted.needs_visualization,
                    total_rows = results.row_count(),
                    sample_sent = results.row_count().min(SAMPLE_ROWS),
                    "Response formatted"
                );
                StageAttempt::Attempted(formatted)
            }
            Err(e) => {
                warn!(question = prefix(question, 100), error = %e, "Response formatting failed, using fallback");
                StageAttempt::skipped(format!("formatting failed: {}", e))
            }
        }
    }
}

fn data_section(summary: &DataSummary, results: &ResultSet) -> String {
    let records = results.to_records();
    let sample: Vec<_> = records.iter().take(SAMPLE_ROWS).collect();
    let sample_json = serde_json::to_string_pretty(&sample).unwrap_or_else(|_| "[]".to_string());
    if results.row_count() > SAMPLE_ROWS {
        format!(
            "{}\n\nSample Data ({} of {} rows):\n{}",
            summary.to_prompt_text(),
            SAMPLE_ROWS,
            results.row_count(),
            sample_json
        )
    } else {
        format!("{}\n\nData:\n{}", summary.to_prompt_text(), sample_json)
    }
}

fn insights_section(finding: &StatisticalFinding) -> String {
    if !finding.has_analysis {
        return String::new();
    }
    let mut text = format!(
        "\n\nStatistical Analysis:\n{}\n",
        finding.interpretation.as_deref().unwrap_or_default()
    );
    if !finding.statistical_result.is_empty() {
        if let Ok(json) = serde_json::to_string_pretty(&finding.statistical_result) {
            text.push_str(&format!("Results: {}", json));
        }
    }
    text
}

/// Parse the model's reply: strict JSON object first, then the `response`
/// field out of malformed JSON, then the raw text.
pub fn parse_model_reply(reply: &str) -> FormattedResponse {
    let text = reply.trim().replace("```json", "").replace("```", "");
    let text = text.trim();

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(serde_json::Value::Object(obj)) = serde_json::from_str::<serde_json::Value>(&text[start..=end]) {
                if let Some(response) = obj.get("response").and_then(|v| v.as_str()) {
                    return FormattedResponse {
                        response: response.trim().to_string(),
                        needs_visualization: obj
                            .get("needs_visualization")
                            .and_then(|v| v.as_bool())
                            .unwrap_or(false),
                        visualization_type: obj
                            .get("visualization_type")
                            .and_then(|v| v.as_str())
                            .unwrap_or("none")
                            .to_string(),
                    };
                }
            }
        }
    }

    if let Some(response) = extract_response_field(text) {
        return FormattedResponse {
            response,
            needs_visualization: false,
            visualization_type: "none".to_string(),
        };
    }

    let lowered = reply.to_lowercase();
    let needs_visualization = mentions_visual(&lowered);
    let visualization_type = if !needs_visualization {
        "none"
    } else if ["chart", "رسم بياني", "مخطط"].iter().any(|k| lowered.contains(k)) {
        "chart"
    } else if ["graph", "رسم"].iter().any(|k| lowered.contains(k)) {
        "graph"
    } else {
        "none"
    };
    FormattedResponse {
        response: reply.trim().to_string(),
        needs_visualization,
        visualization_type: visualization_type.to_string(),
    }
}

fn extract_response_field(text: &str) -> Option<String> {
    let raw = RESPONSE_BEFORE_KEY
        .captures(text)
        .or_else(|| RESPONSE_ANY.captures(text))?
        .get(1)?
        .as_str();
    let unescaped = serde_json::from_str::<String>(&format!("\"{}\"", raw))
        .unwrap_or_else(|_| raw.replace("\\n", "\n").replace("\\t", "\t"));
    Some(unescaped.trim().to_string())
}

fn looks_like_payload(answer: &str) -> bool {
    if answer.is_empty() {
        return false;
    }
    answer.contains("```")
        || (answer.trim_start().starts_with('{') && (answer.contains("\"data\"") || answer.contains("\"response\"")))
        || (answer.contains('|') && answer.contains("\n|"))
}

/// Replace payload-like or overlong answers with a short mechanical one.
pub fn enforce_concise(mut formatted: FormattedResponse, question: &str, results: &ResultSet) -> FormattedResponse {
    let answer = formatted.response.trim();
    if !looks_like_payload(answer) && answer.chars().count() <= MAX_ANSWER_CHARS {
        return formatted;
    }

    let hint = METRIC_HINTS.iter().find_map(|hint| {
        let idx = results.columns().iter().position(|c| c.to_lowercase().contains(hint))?;
        let value = results.rows().first()?.get(idx)?;
        Some((results.columns()[idx].as_str(), value.to_string()))
    });

    let rows = results.row_count();
    formatted.response = match Language::detect(question) {
        Language::Arabic => {
            let hint = hint
                .map(|(col, v)| format!(" أعلى نتيجة في الصف الأول: {}={}.", col, v))
                .unwrap_or_default();
            format!("تم تنفيذ الاستعلام بنجاح وإرجاع {} صف.{} يمكنك عرض التفاصيل في حقل البيانات.", rows, hint)
        }
        Language::English => {
            let hint = hint
                .map(|(col, v)| format!(" Top result in the first row: {}={}.", col, v))
                .unwrap_or_default();
            format!("The query ran successfully and returned {} rows.{} Full details are in the data field.", rows, hint)
        }
    };
    formatted
}

/// Mechanical answer used when the model is unavailable or fails. Uses the
/// statistical interpretation when there is one.
pub fn fallback_response(question: &str, results: &ResultSet, finding: &StatisticalFinding) -> FormattedResponse {
    let lang = Language::detect(question);
    let response = match (&finding.interpretation, finding.has_analysis) {
        (Some(interpretation), true) => interpretation.clone(),
        _ => match (results.row_count(), lang) {
            (0, _) => professional_error_message(question, ErrorKind::NoData),
            (1, lang) => {
                let record = results
                    .to_records()
                    .into_iter()
                    .next()
                    .map(|r| serde_json::Value::Object(r).to_string())
                    .unwrap_or_default();
                match lang {
                    Language::Arabic => format!("النتيجة: {}", record),
                    Language::English => format!("Result: {}", record),
                }
            }
            (n, Language::Arabic) => format!("تم العثور على {} نتيجة.", n),
            (n, Language::English) => format!("Found {} results.", n),
        },
    };

    let needs_visualization = mentions_visual(question);
    FormattedResponse {
        response,
        needs_visualization,
        visualization_type: if needs_visualization { "chart" } else { "none" }.to_string(),
    }
}
