//! Casing rules the knowledge base stores its identifiers under.
//!
//! Proper nouns (diseases, parasite types, people) are `Capitalized`,
//! symptoms are `UPPERCASE`, vulnerability conditions are `lowerCamelCase`.
//! A mismatch does not fail, it simply matches no facts.

use std::collections::BTreeSet;

use super::types::ExtractedEntities;

/// First letter upper-cased, the rest lower-cased: `typoiad` → `Typoiad`.
pub fn proper_noun(text: &str) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn symptom(text: &str) -> String {
    text.trim().to_uppercase()
}

/// `low immune system`, `low_immune_system` and `lowImmuneSystem` all
/// become `lowImmuneSystem`.
pub fn vulnerability(text: &str) -> String {
    let words: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .collect();

    match words.as_slice() {
        [] => String::new(),
        [single] => lower_first(single),
        [first, rest @ ..] => {
            let mut out = first.to_lowercase();
            for word in rest {
                out.push_str(&proper_noun(word));
            }
            out
        }
    }
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn canonical_set(values: &BTreeSet<String>, rule: fn(&str) -> String) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| rule(v))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Apply the casing rules to every entity category.
pub fn canonicalize(entities: &ExtractedEntities) -> ExtractedEntities {
    ExtractedEntities {
        diseases: canonical_set(&entities.diseases, proper_noun),
        parasite_types: canonical_set(&entities.parasite_types, proper_noun),
        symptoms: canonical_set(&entities.symptoms, symptom),
        person_names: canonical_set(&entities.person_names, proper_noun),
        vulnerabilities: canonical_set(&entities.vulnerabilities, vulnerability),
        intent: entities.intent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proper_nouns_are_capitalized() {
        assert_eq!(proper_noun("typoiad"), "Typoiad");
        assert_eq!(proper_noun("MALARIA"), "Malaria");
        assert_eq!(proper_noun(" bisrat "), "Bisrat");
        assert_eq!(proper_noun(""), "");
    }

    #[test]
    fn symptoms_are_uppercased() {
        assert_eq!(symptom("memoryloss"), "MEMORYLOSS");
        assert_eq!(symptom("Fever"), "FEVER");
    }

    #[test]
    fn vulnerabilities_are_lower_camel_case() {
        assert_eq!(vulnerability("lowImmuneSystem"), "lowImmuneSystem");
        assert_eq!(vulnerability("LowImmuneSystem"), "lowImmuneSystem");
        assert_eq!(vulnerability("low immune system"), "lowImmuneSystem");
        assert_eq!(vulnerability("Low_Immune_System"), "lowImmuneSystem");
        assert_eq!(vulnerability("  "), "");
    }

    #[test]
    fn canonicalize_applies_rule_per_category() {
        let raw = ExtractedEntities {
            diseases: ["typoiad".to_string(), "COLD".to_string()].into(),
            symptoms: ["fever".to_string()].into(),
            person_names: ["amina".to_string()].into(),
            vulnerabilities: ["low immune system".to_string(), " ".to_string()].into(),
            ..Default::default()
        };
        let canonical = canonicalize(&raw);
        assert_eq!(
            canonical.diseases,
            ["Cold".to_string(), "Typoiad".to_string()].into()
        );
        assert!(canonical.symptoms.contains("FEVER"));
        assert!(canonical.person_names.contains("Amina"));
        assert_eq!(canonical.vulnerabilities.len(), 1);
        assert!(canonical.vulnerabilities.contains("lowImmuneSystem"));
    }
}
