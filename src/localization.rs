//! Language detection and professional user-facing messages.
//!
//! Technical errors never reach the end user; they are logged by the caller and
//! replaced with one of the messages below, in the language of the question.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref ARABIC_CHAR: Regex =
        Regex::new(r"[\x{0600}-\x{06FF}\x{0750}-\x{077F}\x{08A0}-\x{08FF}\x{FB50}-\x{FDFF}\x{FE70}-\x{FEFF}]")
            .expect("valid arabic range");
    static ref LETTER: Regex = Regex::new(r"[a-zA-Z\x{0600}-\x{06FF}]").expect("valid letter range");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Arabic,
}

impl Language {
    /// Arabic when more than 30% of the letters are Arabic.
    pub fn detect(text: &str) -> Self {
        let total = LETTER.find_iter(text).count();
        if total == 0 {
            return Language::English;
        }
        let arabic = ARABIC_CHAR.find_iter(text).count();
        if arabic as f64 / total as f64 > 0.3 {
            Language::Arabic
        } else {
            Language::English
        }
    }

    pub fn is_arabic(self) -> bool {
        self == Language::Arabic
    }
}

/// User-facing failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SqlGeneration,
    SqlExecution,
    IncompleteQuery,
    NoData,
    GeneralError,
}

impl ErrorKind {
    /// Execution failures mentioning "incomplete" get the incomplete-query message.
    pub fn from_execution_error(technical_error: &str) -> Self {
        if technical_error.to_lowercase().contains("incomplete") {
            ErrorKind::IncompleteQuery
        } else {
            ErrorKind::SqlExecution
        }
    }
}

pub fn professional_error_message(question: &str, kind: ErrorKind) -> String {
    let lang = Language::detect(question);
    match (kind, lang) {
        (ErrorKind::SqlGeneration, Language::Arabic) => concat!(
            "عذراً، لا يمكنني الإجابة على هذا السؤال في الوقت الحالي.\n\n",
            "السبب: السؤال غير واضح أو لا توجد بيانات كافية في قاعدة البيانات للإجابة عليه.\n\n",
            "اقتراحات:\n",
            "• حاول إعادة صياغة السؤال بشكل أكثر وضوحاً\n",
            "• تأكد من أن السؤال يتعلق بالبيانات المتوفرة في قاعدة البيانات\n",
            "• استخدم مصطلحات واضحة مثل: 'اعرض'، 'كم عدد'، 'ما هي'"
        )
        .to_string(),
        (ErrorKind::SqlGeneration, Language::English) => concat!(
            "I apologize, but I cannot answer this question at the moment.\n\n",
            "Reason: The question is unclear or there is insufficient data in the database to answer it.\n\n",
            "Suggestions:\n",
            "• Try rephrasing your question more clearly\n",
            "• Make sure your question relates to the data available in the database\n",
            "• Use clear terms like: 'show', 'how many', 'what are'"
        )
        .to_string(),
        (ErrorKind::SqlExecution, Language::Arabic) | (ErrorKind::IncompleteQuery, Language::Arabic) => concat!(
            "عذراً، لا يمكنني الإجابة على هذا السؤال.\n\n",
            "السبب: السؤال غير واضح أو لا توجد بيانات كافية في قاعدة البيانات للإجابة عليه.\n\n",
            "اقتراحات:\n",
            "• حاول إعادة صياغة السؤال بشكل أكثر تحديداً\n",
            "• تأكد من ذكر الجداول أو البيانات التي تريد الاستعلام عنها\n",
            "• مثال: 'اعرض جميع الفئات' أو 'كم عدد الأفلام في كل فئة؟'"
        )
        .to_string(),
        (ErrorKind::SqlExecution, Language::English) | (ErrorKind::IncompleteQuery, Language::English) => concat!(
            "I apologize, but I cannot answer this question.\n\n",
            "Reason: The question is unclear or there is insufficient data in the database to answer it.\n\n",
            "Suggestions:\n",
            "• Try rephrasing your question more specifically\n",
            "• Make sure to mention the tables or data you want to query\n",
            "• Example: 'Show all categories' or 'How many films are in each category?'"
        )
        .to_string(),
        (ErrorKind::NoData, Language::Arabic) => concat!(
            "تم تنفيذ الاستعلام بنجاح، لكن لم يتم العثور على أي بيانات.\n\n",
            "هذا يعني أن قاعدة البيانات لا تحتوي على بيانات تطابق معايير البحث الخاصة بك."
        )
        .to_string(),
        (ErrorKind::NoData, Language::English) => concat!(
            "The query was executed successfully, but no data was found.\n\n",
            "This means the database does not contain any data matching your search criteria."
        )
        .to_string(),
        (ErrorKind::GeneralError, Language::Arabic) => concat!(
            "عذراً، حدث خطأ أثناء معالجة سؤالك.\n\n",
            "يرجى المحاولة مرة أخرى أو إعادة صياغة السؤال."
        )
        .to_string(),
        (ErrorKind::GeneralError, Language::English) => concat!(
            "I apologize, an error occurred while processing your question.\n\n",
            "Please try again or rephrase your question."
        )
        .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(Language::detect("Show all categories"), Language::English);
        assert_eq!(Language::detect("اعرض جميع الفئات"), Language::Arabic);
        assert_eq!(Language::detect("12345 ?"), Language::English);
        // Mostly Arabic with a table name mixed in.
        assert_eq!(Language::detect("كم عدد الأفلام في film"), Language::Arabic);
    }

    #[test]
    fn test_execution_error_kind() {
        assert_eq!(
            ErrorKind::from_execution_error("Generated SQL is INCOMPLETE"),
            ErrorKind::IncompleteQuery
        );
        assert_eq!(
            ErrorKind::from_execution_error("relation \"films\" does not exist"),
            ErrorKind::SqlExecution
        );
    }

    #[test]
    fn test_message_never_echoes_technical_detail() {
        let msg = professional_error_message("How many films?", ErrorKind::SqlExecution);
        assert!(msg.starts_with("I apologize"));
        let msg = professional_error_message("كم عدد الأفلام؟", ErrorKind::SqlGeneration);
        assert!(msg.starts_with("عذراً"));
    }
}
