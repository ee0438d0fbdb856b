use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::KnowledgeError;

/// Identifiers the engine accepts as query arguments.
static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid symbol regex"));

// ═══════════════════════════════════════════════════════════
// Named queries
// ═══════════════════════════════════════════════════════════

/// The fixed set of queries the knowledge base exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedQuery {
    CausesOfDisease,
    ParasiteForDisease,
    DiseasesAndCorrelationsForPerson,
    DiseasesFromVulnerability,
    AllUsers,
    ParasiteSymptoms,
    VulnerabilityTreatments,
    DiseaseCausesForPerson,
}

impl NamedQuery {
    pub const ALL: [NamedQuery; 8] = [
        NamedQuery::CausesOfDisease,
        NamedQuery::ParasiteForDisease,
        NamedQuery::DiseasesAndCorrelationsForPerson,
        NamedQuery::DiseasesFromVulnerability,
        NamedQuery::AllUsers,
        NamedQuery::ParasiteSymptoms,
        NamedQuery::VulnerabilityTreatments,
        NamedQuery::DiseaseCausesForPerson,
    ];

    /// Function name as defined in the knowledge base.
    pub fn function(&self) -> &'static str {
        match self {
            Self::CausesOfDisease => "causedBy",
            Self::ParasiteForDisease => "findParasite",
            Self::DiseasesAndCorrelationsForPerson => "getDiseaseAndCorrelatedDisease",
            // Spelled this way in the knowledge base.
            Self::DiseasesFromVulnerability => "findDisreaseFromVulnerability",
            Self::AllUsers => "findAllUsers",
            Self::ParasiteSymptoms => "parasiteSymptoms",
            Self::VulnerabilityTreatments => "vulnerableTreatments",
            Self::DiseaseCausesForPerson => "userDiseaseCauses",
        }
    }

    pub fn from_function(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.function() == name)
    }

    pub fn takes_argument(&self) -> bool {
        !matches!(self, Self::AllUsers)
    }
}

impl fmt::Display for NamedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function())
    }
}

// ═══════════════════════════════════════════════════════════
// Symbols
// ═══════════════════════════════════════════════════════════

/// A validated engine identifier.
///
/// Only letters, digits, `_` and `-` are allowed, so a symbol can never
/// close an expression or inject a second one into the rendered query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(text: &str) -> Result<Self, KnowledgeError> {
        if SYMBOL_PATTERN.is_match(text) {
            Ok(Self(text.to_string()))
        } else {
            Err(KnowledgeError::InvalidSymbol(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════
// Parameterized query
// ═══════════════════════════════════════════════════════════

/// A named query bound to its (optional) argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeQuery {
    pub query: NamedQuery,
    pub argument: Option<Symbol>,
}

impl KnowledgeQuery {
    pub fn with_argument(query: NamedQuery, argument: Symbol) -> Self {
        Self {
            query,
            argument: Some(argument),
        }
    }

    pub fn all_users() -> Self {
        Self {
            query: NamedQuery::AllUsers,
            argument: None,
        }
    }

    /// Render into the engine's query language, e.g. `!(causedBy Typoiad)`.
    pub fn to_program(&self) -> Result<String, KnowledgeError> {
        match (&self.argument, self.query.takes_argument()) {
            (Some(arg), true) => Ok(format!("!({} {})", self.query.function(), arg)),
            (None, true) => Err(KnowledgeError::MissingArgument {
                query: self.query.function(),
            }),
            (_, false) => Ok(format!("!({})", self.query.function())),
        }
    }
}

impl fmt::Display for KnowledgeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(arg) => write!(f, "{}({})", self.query, arg),
            None => write!(f, "{}()", self.query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_accept_engine_identifiers() {
        assert!(Symbol::parse("Typoiad").is_ok());
        assert!(Symbol::parse("lowImmuneSystem").is_ok());
        assert!(Symbol::parse("MEMORYLOSS").is_ok());
        assert!(Symbol::parse("type-2_diabetes").is_ok());
    }

    #[test]
    fn symbols_reject_query_syntax() {
        assert!(Symbol::parse("").is_err());
        assert!(Symbol::parse("Typoiad) !(findAllUsers").is_err());
        assert!(Symbol::parse("Yellow fever").is_err());
        assert!(Symbol::parse("$x").is_err());
        assert!(Symbol::parse("\"quoted\"").is_err());
    }

    #[test]
    fn renders_program_with_argument() {
        let q = KnowledgeQuery::with_argument(
            NamedQuery::CausesOfDisease,
            Symbol::parse("Typoiad").unwrap(),
        );
        assert_eq!(q.to_program().unwrap(), "!(causedBy Typoiad)");
        assert_eq!(q.to_string(), "causedBy(Typoiad)");
    }

    #[test]
    fn renders_all_users_without_argument() {
        assert_eq!(
            KnowledgeQuery::all_users().to_program().unwrap(),
            "!(findAllUsers)"
        );
    }

    #[test]
    fn missing_argument_is_an_error() {
        let q = KnowledgeQuery {
            query: NamedQuery::ParasiteSymptoms,
            argument: None,
        };
        assert!(matches!(
            q.to_program(),
            Err(KnowledgeError::MissingArgument { query: "parasiteSymptoms" })
        ));
    }

    #[test]
    fn function_names_round_trip() {
        for q in NamedQuery::ALL {
            assert_eq!(NamedQuery::from_function(q.function()), Some(q));
        }
        assert_eq!(NamedQuery::from_function("unknown"), None);
    }

    #[test]
    fn vulnerability_query_keeps_knowledge_base_spelling() {
        assert_eq!(
            NamedQuery::DiseasesFromVulnerability.function(),
            "findDisreaseFromVulnerability"
        );
    }
}
