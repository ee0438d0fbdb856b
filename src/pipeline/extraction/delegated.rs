use std::sync::Arc;

use serde::Deserialize;

use super::EntityExtractor;
use crate::llm::LlmGenerate;
use crate::pipeline::canonical::canonicalize;
use crate::pipeline::prompt::build_extraction_prompt;
use crate::pipeline::types::{ExtractedEntities, Intent};

/// Extraction delegated to the language model.
///
/// The model is asked for a strict JSON object. Anything that goes wrong
/// (transport failure, prose instead of JSON, wrong shapes) degrades to
/// empty entities with a `general` intent.
pub struct LlmEntityExtractor {
    llm: Arc<dyn LlmGenerate>,
}

impl LlmEntityExtractor {
    pub fn new(llm: Arc<dyn LlmGenerate>) -> Self {
        Self { llm }
    }
}

impl EntityExtractor for LlmEntityExtractor {
    fn extract(&self, utterance: &str) -> ExtractedEntities {
        let prompt = build_extraction_prompt(utterance);

        let raw = match self.llm.generate(&prompt) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Entity extraction call failed, using empty entities");
                return ExtractedEntities::default();
            }
        };

        match parse_extraction(&raw) {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!(error = %e, "Entity extraction returned invalid JSON, using empty entities");
                ExtractedEntities::default()
            }
        }
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// JSON object the model is asked to produce. Missing keys are empty.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawExtraction {
    diseases: Vec<String>,
    parasite_types: Vec<String>,
    symptoms: Vec<String>,
    names: Vec<String>,
    vulnerabilities: Vec<String>,
    intent: Option<String>,
}

/// Parse (and canonicalize) the model's extraction answer.
pub fn parse_extraction(raw: &str) -> Result<ExtractedEntities, serde_json::Error> {
    let parsed: RawExtraction = serde_json::from_str(strip_code_fence(raw))?;

    let entities = ExtractedEntities {
        diseases: parsed.diseases.into_iter().collect(),
        parasite_types: parsed.parasite_types.into_iter().collect(),
        symptoms: parsed.symptoms.into_iter().collect(),
        person_names: parsed.names.into_iter().collect(),
        vulnerabilities: parsed.vulnerabilities.into_iter().collect(),
        intent: parsed
            .intent
            .as_deref()
            .map(Intent::from_label)
            .unwrap_or_default(),
    };

    Ok(canonicalize(&entities))
}

/// Remove an optional Markdown code fence (```` ```json ... ``` ````).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") up to the end of the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches("json"),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{BoundModel, MockLlmClient};
    use std::collections::BTreeSet;

    fn extractor(response: &str) -> LlmEntityExtractor {
        LlmEntityExtractor::new(Arc::new(BoundModel::new(
            MockLlmClient::new(response),
            "gemini-1.5-flash",
        )))
    }

    #[test]
    fn parses_full_object() {
        let entities = parse_extraction(
            r#"{
                "diseases": ["typoiad"],
                "parasite_types": ["bacteria"],
                "symptoms": ["fever", "cough"],
                "names": ["bisrat"],
                "vulnerabilities": ["low immune system"],
                "intent": "correlations"
            }"#,
        )
        .unwrap();

        assert!(entities.diseases.contains("Typoiad"));
        assert!(entities.parasite_types.contains("Bacteria"));
        assert_eq!(
            entities.symptoms,
            ["COUGH", "FEVER"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>()
        );
        assert!(entities.person_names.contains("Bisrat"));
        assert!(entities.vulnerabilities.contains("lowImmuneSystem"));
        assert_eq!(entities.intent, Intent::Correlations);
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let entities = parse_extraction(r#"{"intent": "users"}"#).unwrap();
        assert!(entities.is_empty());
        assert_eq!(entities.intent, Intent::Users);
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n{\"diseases\": [\"Malaria\"], \"intent\": \"causes\"}\n```";
        let entities = parse_extraction(raw).unwrap();
        assert!(entities.diseases.contains("Malaria"));
        assert_eq!(entities.intent, Intent::Causes);

        let bare_fence = "```\n{\"names\": [\"Sara\"]}\n```\n";
        assert!(parse_extraction(bare_fence)
            .unwrap()
            .person_names
            .contains("Sara"));
    }

    #[test]
    fn strip_code_fence_variants() {
        assert_eq!(strip_code_fence("{}"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json{}```"), "{}");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn invalid_json_is_an_error_for_the_parser() {
        assert!(parse_extraction("not json").is_err());
        assert!(parse_extraction("{\"diseases\": \"Malaria\"}").is_err());
        assert!(parse_extraction("```json\n{broken\n```").is_err());
    }

    #[test]
    fn invalid_json_falls_back_to_empty_general() {
        for raw in ["not json", "{", "[1, 2]", "```json\n{\"intent\": 3}\n```", ""] {
            let entities = extractor(raw).extract("What causes Typoiad?");
            assert_eq!(entities, ExtractedEntities::default(), "{raw:?}");
            assert_eq!(entities.intent, Intent::General);
        }
    }

    #[test]
    fn llm_failure_falls_back_to_empty_general() {
        let extractor = LlmEntityExtractor::new(Arc::new(BoundModel::new(
            MockLlmClient::failing(),
            "m",
        )));
        assert_eq!(extractor.extract("hello"), ExtractedEntities::default());
    }

    #[test]
    fn prompt_contains_utterance() {
        let client = MockLlmClient::new("{}");
        let model = Arc::new(BoundModel::new(client, "m"));
        let extractor = LlmEntityExtractor::new(model.clone());
        extractor.extract("Why is Amina sick?");

        let prompts = model.client().prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Why is Amina sick?"));
        assert!(prompts[0].contains("parasite_types"));
    }
}
