use std::collections::BTreeSet;

use crate::knowledge::{format_result, Atom, KnowledgeEngine, KnowledgeError, KnowledgeGateway, Symbol};

use super::types::{ContextBlock, ExtractedEntities, Intent, RETRIEVAL_ERROR_LINE};

/// Turns extracted entities into knowledge-base lookups and the lookups
/// into context lines.
///
/// Lines follow category order: diseases, parasite types, people,
/// vulnerabilities, all users, then mentioned symptoms. Every applicable
/// query runs; empty results add nothing. A failing query is isolated: it
/// adds the retrieval error line (once per block) and assembly continues.
pub struct ContextAssembler<'a, E: KnowledgeEngine + ?Sized> {
    gateway: KnowledgeGateway<'a, E>,
}

impl<'a, E: KnowledgeEngine + ?Sized> ContextAssembler<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self {
            gateway: KnowledgeGateway::new(engine),
        }
    }

    pub fn assemble(&self, entities: &ExtractedEntities, utterance: &str) -> ContextBlock {
        let gw = &self.gateway;
        let mut lines = ContextLines::default();

        for disease in symbols(&entities.diseases) {
            lines.record(format!("Causes of {disease}"), gw.causes_of_disease(&disease));
            lines.record(
                format!("Parasite info for {disease}"),
                gw.parasite_for_disease(&disease),
            );
        }

        for parasite in symbols(&entities.parasite_types) {
            lines.record(
                format!("Symptoms of {parasite} parasites"),
                gw.parasite_symptoms(&parasite),
            );
        }

        for person in symbols(&entities.person_names) {
            lines.record(
                format!("Causes of {person}'s diseases"),
                gw.disease_causes_for_person(&person),
            );
            lines.record(
                format!("Diseases and correlations for {person}"),
                gw.diseases_and_correlations_for_person(&person),
            );
        }

        for condition in symbols(&entities.vulnerabilities) {
            let readable = humanize(condition.as_str());
            lines.record(
                format!("Diseases linked to {readable}"),
                gw.diseases_from_vulnerability(&condition),
            );
            lines.record(
                format!("Treatments for diseases vulnerable to {readable}"),
                gw.vulnerability_treatments(&condition),
            );
        }

        if entities.intent == Intent::Users || asks_for_users(utterance) {
            lines.record("All users".to_string(), gw.all_users());
        }

        if !entities.symptoms.is_empty() {
            let listed: Vec<&str> = entities.symptoms.iter().map(String::as_str).collect();
            lines.push(format!("Mentioned symptoms: {}", listed.join(", ")));
        }

        ContextBlock { lines: lines.lines }
    }
}

#[derive(Default)]
struct ContextLines {
    lines: Vec<String>,
    failed: bool,
}

impl ContextLines {
    fn record(&mut self, label: String, result: Result<Vec<Atom>, KnowledgeError>) {
        match result {
            Ok(atoms) if atoms.is_empty() => {}
            Ok(atoms) => self.push(format!("{label}: {}", format_result(&atoms))),
            Err(_) if self.failed => {}
            Err(_) => {
                self.failed = true;
                self.push(RETRIEVAL_ERROR_LINE.to_string());
            }
        }
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }
}

/// Entities that are valid engine symbols. Anything else is skipped, so
/// free-form text can never reach the query language.
fn symbols(values: &BTreeSet<String>) -> Vec<Symbol> {
    values
        .iter()
        .filter_map(|v| match Symbol::parse(v) {
            Ok(symbol) => Some(symbol),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping entity that is not a knowledge symbol");
                None
            }
        })
        .collect()
}

fn asks_for_users(utterance: &str) -> bool {
    let lower = utterance.to_lowercase();
    lower.contains("who") || lower.contains("users")
}

/// `lowImmuneSystem` → `low immune system`.
fn humanize(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    for c in identifier.chars() {
        if c.is_uppercase() && !out.is_empty() {
            out.push(' ');
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{NamedQuery, StaticKnowledgeEngine};
    use crate::pipeline::types::FALLBACK_CONTEXT;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn typoiad_engine() -> StaticKnowledgeEngine {
        StaticKnowledgeEngine::new().with_facts(
            NamedQuery::CausesOfDisease,
            "Typoiad",
            [Atom::symbol("poorSanitation")],
        )
    }

    fn rich_engine() -> StaticKnowledgeEngine {
        typoiad_engine()
            .with_facts(NamedQuery::ParasiteForDisease, "Typoiad", [Atom::symbol("Bacteria")])
            .with_facts(
                NamedQuery::ParasiteSymptoms,
                "Virus",
                [Atom::expression([
                    Atom::symbol("Cold"),
                    Atom::symbol("symptoms are"),
                    Atom::expression([Atom::symbol("COUGH"), Atom::symbol("FEVER")]),
                ])],
            )
            .with_facts(
                NamedQuery::DiseaseCausesForPerson,
                "Bisrat",
                [Atom::expression([
                    Atom::symbol("Typoiad"),
                    Atom::expression([Atom::symbol("poorSanitation")]),
                ])],
            )
            .with_facts(
                NamedQuery::DiseasesAndCorrelationsForPerson,
                "Bisrat",
                [Atom::expression([Atom::symbol("Typoiad"), Atom::symbol("Malaria")])],
            )
            .with_facts(
                NamedQuery::DiseasesFromVulnerability,
                "lowImmuneSystem",
                [Atom::symbol("Malaria")],
            )
            .with_facts(
                NamedQuery::VulnerabilityTreatments,
                "lowImmuneSystem",
                [Atom::expression([
                    Atom::symbol("Malaria"),
                    Atom::expression([Atom::symbol("Artemisinin")]),
                ])],
            )
            .with_facts(NamedQuery::AllUsers, "", [Atom::symbol("Bisrat"), Atom::symbol("Amina")])
    }

    #[test]
    fn single_disease_cause() {
        let engine = typoiad_engine();
        let entities = ExtractedEntities {
            diseases: set(&["Typoiad"]),
            intent: Intent::Causes,
            ..Default::default()
        };
        let block = ContextAssembler::new(&engine).assemble(&entities, "What causes Typoiad?");
        assert_eq!(block.text(), "Causes of Typoiad: [poorSanitation]");
        // causedBy + findParasite
        assert_eq!(engine.call_count(), 2);
    }

    #[test]
    fn empty_entities_without_user_words_is_fallback() {
        let engine = rich_engine();
        let block =
            ContextAssembler::new(&engine).assemble(&ExtractedEntities::default(), "hello there");
        assert!(block.is_fallback());
        assert_eq!(block.text(), FALLBACK_CONTEXT);
        assert_eq!(engine.call_count(), 0);
    }

    #[test]
    fn every_category_in_order() {
        let engine = rich_engine();
        let entities = ExtractedEntities {
            diseases: set(&["Typoiad"]),
            parasite_types: set(&["Virus"]),
            symptoms: set(&["FEVER", "COUGH"]),
            person_names: set(&["Bisrat"]),
            vulnerabilities: set(&["lowImmuneSystem"]),
            intent: Intent::Users,
        };
        let block = ContextAssembler::new(&engine).assemble(&entities, "tell me everything");

        assert_eq!(
            block.lines,
            vec![
                "Causes of Typoiad: [poorSanitation]",
                "Parasite info for Typoiad: [Bacteria]",
                "Symptoms of Virus parasites: [[Cold, symptoms are, [COUGH, FEVER]]]",
                "Causes of Bisrat's diseases: [[Typoiad, [poorSanitation]]]",
                "Diseases and correlations for Bisrat: [[Typoiad, Malaria]]",
                "Diseases linked to low immune system: [Malaria]",
                "Treatments for diseases vulnerable to low immune system: [[Malaria, [Artemisinin]]]",
                "All users: [Bisrat, Amina]",
                "Mentioned symptoms: COUGH, FEVER",
            ]
        );
    }

    #[test]
    fn users_query_triggered_by_utterance() {
        let engine = rich_engine();
        let block =
            ContextAssembler::new(&engine).assemble(&ExtractedEntities::default(), "Who is here?");
        assert_eq!(block.text(), "All users: [Bisrat, Amina]");

        let block = ContextAssembler::new(&engine)
            .assemble(&ExtractedEntities::default(), "List the USERS please");
        assert_eq!(block.text(), "All users: [Bisrat, Amina]");
    }

    #[test]
    fn symptoms_alone_produce_single_line() {
        let engine = StaticKnowledgeEngine::new();
        let entities = ExtractedEntities {
            symptoms: set(&["FEVER"]),
            ..Default::default()
        };
        let block = ContextAssembler::new(&engine).assemble(&entities, "I have a fever");
        assert_eq!(block.text(), "Mentioned symptoms: FEVER");
    }

    #[test]
    fn assembly_is_idempotent() {
        let engine = rich_engine();
        let assembler = ContextAssembler::new(&engine);
        let entities = ExtractedEntities {
            diseases: set(&["Typoiad", "Malaria"]),
            person_names: set(&["Bisrat"]),
            symptoms: set(&["PAIN"]),
            ..Default::default()
        };
        let first = assembler.assemble(&entities, "why");
        let second = assembler.assemble(&entities, "why");
        assert_eq!(first, second);
    }

    #[test]
    fn failing_query_is_isolated() {
        let engine = rich_engine()
            .with_failure(NamedQuery::CausesOfDisease)
            .with_failure(NamedQuery::ParasiteSymptoms);
        let entities = ExtractedEntities {
            diseases: set(&["Typoiad"]),
            parasite_types: set(&["Virus"]),
            ..Default::default()
        };
        let block = ContextAssembler::new(&engine).assemble(&entities, "why");

        assert_eq!(
            block.lines,
            vec![
                RETRIEVAL_ERROR_LINE.to_string(),
                "Parasite info for Typoiad: [Bacteria]".to_string(),
            ]
        );
    }

    #[test]
    fn invalid_symbols_are_skipped() {
        let engine = typoiad_engine();
        let entities = ExtractedEntities {
            diseases: set(&["Typoiad", "Yellow fever", "x) !(findAllUsers"]),
            ..Default::default()
        };
        let block = ContextAssembler::new(&engine).assemble(&entities, "why");
        assert_eq!(block.text(), "Causes of Typoiad: [poorSanitation]");
        assert_eq!(engine.call_count(), 2);
    }

    #[test]
    fn humanize_splits_camel_case() {
        assert_eq!(humanize("lowImmuneSystem"), "low immune system");
        assert_eq!(humanize("pregnancy"), "pregnancy");
        assert_eq!(humanize("HighAge"), "high age");
    }
}
