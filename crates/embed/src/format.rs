//! Instruction formatting for BGE-family retrieval models.
//!
//! These models expect queries to carry a fixed retrieval instruction while
//! documents are embedded verbatim.

const BGE_QUERY_INSTRUCTION_EN: &str =
    "Represent this sentence for searching relevant passages:";
const BGE_QUERY_INSTRUCTION_ZH: &str = "为这个句子生成表示以用于检索相关文章：";

/// Prefixes the model's query instruction, when it has one.
pub fn format_query(model: &str, query: &str) -> String {
    match query_instruction(model) {
        Some(instruction) => format!("{instruction} {query}"),
        None => query.to_string(),
    }
}

/// Document-side formatting. BGE models embed documents unchanged.
pub fn format_text(_model: &str, text: &str) -> String {
    text.to_string()
}

fn query_instruction(model: &str) -> Option<&'static str> {
    let model = model.to_ascii_lowercase();
    if !model.contains("bge") {
        return None;
    }

    if model.contains("-zh") {
        Some(BGE_QUERY_INSTRUCTION_ZH)
    } else {
        Some(BGE_QUERY_INSTRUCTION_EN)
    }
}
