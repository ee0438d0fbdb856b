use super::types::ChatTurn;

pub const REPLY_INSTRUCTIONS: &str = "You are a medical chatbot. Use the provided medical context to answer the user's question accurately. \
If symptoms are mentioned, note them in uppercase in your response.";

pub const EXTRACTION_INSTRUCTIONS: &str = r#"You extract medical entities from a user's message for a knowledge-base lookup.

Return ONLY a JSON object with exactly these keys:
{
  "diseases": [disease names, e.g. "Typoiad", "Malaria"],
  "parasite_types": [parasite types, e.g. "Bacteria", "Virus", "Protozoa"],
  "symptoms": [symptoms, e.g. "FEVER", "COUGH"],
  "names": [first names of people, e.g. "Bisrat"],
  "vulnerabilities": [vulnerability conditions in lowerCamelCase, e.g. "lowImmuneSystem"],
  "intent": one of "causes", "symptoms", "treatments", "users", "correlations", "vulnerability", "general"
}

Use empty arrays for categories that are not mentioned. Do not add commentary."#;

/// Render history as `role: content` lines, oldest first.
pub fn render_history(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the final reply prompt: instructions, knowledge context, and the
/// whole conversation so far.
pub fn build_reply_prompt(context: &str, history: &[ChatTurn]) -> String {
    format!(
        "{REPLY_INSTRUCTIONS} Medical context: {context}\nConversation history:\n{}",
        render_history(history)
    )
}

pub fn build_extraction_prompt(utterance: &str) -> String {
    format!("{EXTRACTION_INSTRUCTIONS}\n\nUser message: {utterance}")
}
