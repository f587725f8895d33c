//! Statement extraction and completeness checks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FENCE: Regex = Regex::new(r"```[A-Za-z]*").expect("valid fence regex");
    static ref SELECT_TO_LIMIT: Regex =
        Regex::new(r"(?is)(SELECT\s.+?\sLIMIT\s+\d+)").expect("valid extraction regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
    static ref FROM_KEYWORD: Regex = Regex::new(r"(?i)\bFROM\b").expect("valid FROM regex");
}

/// Words that open a clause; none of them can be a table name.
const CLAUSE_WORDS: &[&str] = &[
    "LIMIT", "WHERE", "GROUP", "ORDER", "HAVING", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "CROSS", "ON",
];

/// Cut the `SELECT ... LIMIT n` span out of a model reply, dropping fence
/// markers and surrounding prose, with whitespace collapsed.
pub fn extract_sql(reply: &str) -> Option<String> {
    let unfenced = FENCE.replace_all(reply, " ");
    let span = SELECT_TO_LIMIT.captures(&unfenced)?.get(1)?.as_str();
    Some(WHITESPACE.replace_all(span, " ").trim().to_string())
}

/// Reason the statement is structurally incomplete, if it is.
pub fn check_completeness(sql: &str) -> Option<&'static str> {
    let sql = sql.trim();
    if !sql.to_uppercase().starts_with("SELECT") {
        return Some("Query must start with SELECT");
    }

    let Some(from) = FROM_KEYWORD.find(sql) else {
        return Some("Query missing FROM clause");
    };

    let after_from = sql[from.end()..].trim_start();
    let next_word: String = after_from
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_uppercase();

    if after_from.is_empty() || CLAUSE_WORDS.contains(&next_word.as_str()) {
        return Some("Query missing table name after FROM clause");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_fenced_reply_with_prose() {
        let reply = "Here is the query:\n```sql\nSELECT name,\n   COUNT(*)\nFROM category\nGROUP BY name\nLIMIT 10;\n```\nThis lists categories.";
        assert_eq!(
            extract_sql(reply).as_deref(),
            Some("SELECT name, COUNT(*) FROM category GROUP BY name LIMIT 10")
        );
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        assert_eq!(
            extract_sql("select title from film limit 5").as_deref(),
            Some("select title from film limit 5")
        );
    }

    #[test]
    fn test_extract_requires_limit() {
        assert_eq!(extract_sql("SELECT * FROM film"), None);
        assert_eq!(extract_sql("I cannot answer that."), None);
    }

    #[test]
    fn test_completeness_reasons() {
        assert_eq!(check_completeness("SELECT * FROM film LIMIT 10"), None);
        assert_eq!(
            check_completeness("WITH x AS (SELECT 1) SELECT * FROM x LIMIT 1"),
            Some("Query must start with SELECT")
        );
        assert_eq!(check_completeness("SELECT 1 LIMIT 1"), Some("Query missing FROM clause"));
        assert_eq!(
            check_completeness("SELECT * FROM LIMIT 10"),
            Some("Query missing table name after FROM clause")
        );
        assert_eq!(
            check_completeness("SELECT * FROM JOIN rental ON true LIMIT 10"),
            Some("Query missing table name after FROM clause")
        );
        assert_eq!(check_completeness("SELECT * FROM"), Some("Query missing table name after FROM clause"));
    }

    #[test]
    fn test_from_inside_identifier_is_not_a_keyword() {
        assert_eq!(
            check_completeness("SELECT from_date LIMIT 1"),
            Some("Query missing FROM clause")
        );
        assert_eq!(check_completeness("SELECT from_date FROM rental LIMIT 1"), None);
    }
}
