//! Keyword relevance scoring over column names.

use super::TableInfo;
use std::collections::HashSet;

/// Concept families: a column scores when both it and the question mention
/// a keyword of the same family.
pub const SEMANTIC_FAMILIES: &[(&str, &[&str])] = &[
    ("price", &["price", "cost", "amount", "rate", "fee", "rental"]),
    ("revenue", &["revenue", "income", "total", "amount", "sum"]),
    ("date", &["date", "time", "created", "updated"]),
    ("count", &["count", "number", "total"]),
    ("status", &["status", "state", "active"]),
    ("name", &["name", "title", "label"]),
    ("id", &["id"]),
];

const FAMILY_MATCH: u32 = 3;
const DIRECT_MENTION: u32 = 2;

fn score(table: &TableInfo, question: &str) -> u32 {
    let asked: Vec<&[&str]> = SEMANTIC_FAMILIES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| question.contains(k)))
        .map(|(_, keywords)| *keywords)
        .collect();

    table
        .columns
        .iter()
        .map(|col| {
            let name = col.name.to_lowercase();
            let family_points: u32 = asked
                .iter()
                .filter(|keywords| keywords.iter().any(|k| name.contains(k)))
                .map(|_| FAMILY_MATCH)
                .sum();
            let mention = if question.contains(&name) { DIRECT_MENTION } else { 0 };
            family_points + mention
        })
        .sum()
}

/// Highest-scoring `top_k` tables (catalog order on ties), or the first
/// `top_k` when nothing scores, followed by their foreign-key targets.
pub fn select_tables<'a>(tables: &'a [TableInfo], question: &str, top_k: usize) -> Vec<&'a TableInfo> {
    let question = question.to_lowercase();

    let mut scored: Vec<(u32, &TableInfo)> = tables
        .iter()
        .map(|t| (score(t, &question), t))
        .filter(|(s, _)| *s > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut selected: Vec<&TableInfo> = scored.into_iter().take(top_k).map(|(_, t)| t).collect();
    if selected.is_empty() {
        selected = tables.iter().take(top_k).collect();
    }

    let mut seen: HashSet<&str> = selected.iter().map(|t| t.name.as_str()).collect();
    let targets: Vec<&str> = selected
        .iter()
        .flat_map(|t| t.foreign_keys.iter().map(|fk| fk.foreign_table.as_str()))
        .collect();
    for target in targets {
        if seen.insert(target) {
            if let Some(table) = tables.iter().find(|t| t.name == target) {
                selected.push(table);
            }
        }
    }
    selected
}
