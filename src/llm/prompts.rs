//! Prompt builders
//!
//! Each stage gets a system message carrying its rules and context, and the
//! question as the user message.

use super::ChatMessage;

const SQL_GENERATION_RULES: &str = r#"You are a senior SQL engineer for a PostgreSQL analytics database.
Generate a SINGLE, COMPLETE and EXECUTABLE SELECT query that answers the user's question.

Rules:
1. Generate ONLY a SELECT query. Never DELETE, UPDATE, INSERT, DROP or TRUNCATE.
2. Clause order: SELECT, FROM, [JOIN], [WHERE], [GROUP BY], [HAVING], [ORDER BY], LIMIT.
3. FROM must name at least one table.
4. LIMIT is mandatory and must come last (default LIMIT 100).
5. When aggregate functions are mixed with plain columns, GROUP BY those columns.
6. Use explicit JOIN ... ON syntax for multiple tables.
7. Use only tables and columns that exist in the schema.

Return ONLY the SQL query. No explanations, no comments, no markdown."#;

pub fn sql_generation(schema_context: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "{}\n\nDatabase schema:\n{}\n\nUser question:\n{}",
            SQL_GENERATION_RULES, schema_context, question
        )),
        ChatMessage::user(question),
    ]
}

const REFINEMENT_RULES: &str = r#"You are a senior data analyst assisting a database chatbot.
Rewrite the user's question as a clear, precise analytical instruction in English.

Rules:
- Do not generate SQL.
- Do not mention column names unless the user did.
- Do not invent thresholds or metric definitions.
- Do not ask follow-up questions.
- Preserve the original intent exactly; phrase analytical yes/no questions as analysis instructions.

Return ONLY the rewritten question."#;

pub fn refinement(schema_context: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "{}\n\nDatabase schema (context only):\n{}\n\nOriginal question:\n{}",
            REFINEMENT_RULES, schema_context, question
        )),
        ChatMessage::user(question),
    ]
}

const CLASSIFICATION_RULES: &str = r#"You classify questions for a database analytics assistant.

DATABASE: the question asks for actual data values, lists, counts, statistics, comparisons,
trends or relationships in the stored data (e.g. "show all categories", "كم عدد الأفلام في كل فئة؟").
GENERAL: the question asks about concepts, definitions, theory or best practices
(e.g. "what is a JOIN?", "ما هو الفرق بين COUNT و SUM؟").
When in doubt and the question names business entities, answer database.

Return ONLY "database" or "general"."#;

pub fn classification(question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!("{}\n\nUser question: {}", CLASSIFICATION_RULES, question)),
        ChatMessage::user(question),
    ]
}

const GENERAL_ANSWER_RULES: &str = r#"You are an assistant specialised in database analytics and statistics.
Answer questions about databases, SQL, statistics and interpreting data professionally,
in the same language as the user (Arabic or English).
If the question is outside that scope, say so politely and suggest asking about the data instead."#;

pub fn general_answer(question: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(GENERAL_ANSWER_RULES), ChatMessage::user(question)]
}

const FORMATTING_RULES: &str = r#"You are a business analytics response writer.
Turn query results into a concise, professional answer for decision makers.

Rules:
- 1 to 3 sentences, in the same language as the user's question.
- Never mention table names, column names, SQL or schema details; use business terms.
- No markdown tables, code blocks, JSON blocks or full record listings; the data is delivered separately.
- Set needs_visualization to true when the user asks for a chart, graph, plot or visualization,
  or the question implies ranking, comparison, trend or correlation.
- visualization_type: "bar" for rankings/comparisons, "line" for trends, "scatter" for correlations,
  "chart" for general, "none" otherwise."#;

const FORMATTING_OUTPUT: &str = r#"Reply with a valid JSON object with exactly these keys:
- "response": the answer text
- "needs_visualization": true or false
- "visualization_type": "bar", "line", "scatter", "chart" or "none"
Return ONLY the JSON object."#;

pub fn response_formatting(question: &str, sql: &str, data_section: &str, insights: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "{}\n\nUser question:\n{}\n\nSQL query (context only, never mention):\n{}\n\nQuery results:\n{}{}",
            FORMATTING_RULES, question, sql, data_section, insights
        )),
        ChatMessage::user(FORMATTING_OUTPUT),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_sql_prompt_carries_schema_and_question() {
        let messages = sql_generation("Table: film", "How many films?");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("Table: film"));
        assert_eq!(messages[1].content, "How many films?");
    }
}
