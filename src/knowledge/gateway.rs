use super::atom::Atom;
use super::engine::KnowledgeEngine;
use super::query::{KnowledgeQuery, NamedQuery, Symbol};
use super::KnowledgeError;

/// One typed operation per named knowledge-base query.
///
/// No caching and no retry: each call goes straight to the engine and any
/// engine failure is returned to the caller unchanged.
pub struct KnowledgeGateway<'a, E: KnowledgeEngine + ?Sized> {
    engine: &'a E,
}

impl<'a, E: KnowledgeEngine + ?Sized> KnowledgeGateway<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    pub fn causes_of_disease(&self, disease: &Symbol) -> Result<Vec<Atom>, KnowledgeError> {
        self.run_with(NamedQuery::CausesOfDisease, disease)
    }

    pub fn parasite_for_disease(&self, disease: &Symbol) -> Result<Vec<Atom>, KnowledgeError> {
        self.run_with(NamedQuery::ParasiteForDisease, disease)
    }

    pub fn diseases_and_correlations_for_person(
        &self,
        person: &Symbol,
    ) -> Result<Vec<Atom>, KnowledgeError> {
        self.run_with(NamedQuery::DiseasesAndCorrelationsForPerson, person)
    }

    pub fn disease_causes_for_person(&self, person: &Symbol) -> Result<Vec<Atom>, KnowledgeError> {
        self.run_with(NamedQuery::DiseaseCausesForPerson, person)
    }

    pub fn diseases_from_vulnerability(
        &self,
        condition: &Symbol,
    ) -> Result<Vec<Atom>, KnowledgeError> {
        self.run_with(NamedQuery::DiseasesFromVulnerability, condition)
    }

    pub fn vulnerability_treatments(
        &self,
        condition: &Symbol,
    ) -> Result<Vec<Atom>, KnowledgeError> {
        self.run_with(NamedQuery::VulnerabilityTreatments, condition)
    }

    pub fn parasite_symptoms(&self, parasite_type: &Symbol) -> Result<Vec<Atom>, KnowledgeError> {
        self.run_with(NamedQuery::ParasiteSymptoms, parasite_type)
    }

    pub fn all_users(&self) -> Result<Vec<Atom>, KnowledgeError> {
        self.run(&KnowledgeQuery::all_users())
    }

    fn run_with(&self, query: NamedQuery, argument: &Symbol) -> Result<Vec<Atom>, KnowledgeError> {
        self.run(&KnowledgeQuery::with_argument(query, argument.clone()))
    }

    fn run(&self, query: &KnowledgeQuery) -> Result<Vec<Atom>, KnowledgeError> {
        match self.engine.run(query) {
            Ok(result) => {
                tracing::debug!(query = %query, matches = result.len(), "Knowledge query");
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Knowledge query failed");
                Err(e)
            }
        }
    }
}
