use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use super::atom::Atom;
use super::query::{KnowledgeQuery, NamedQuery};
use super::KnowledgeError;

/// Executes parameterized queries against a symbolic knowledge base.
///
/// Implementations are synchronous: every call reaches the engine, nothing
/// is cached, nothing is retried.
pub trait KnowledgeEngine: Send + Sync {
    fn run(&self, query: &KnowledgeQuery) -> Result<Vec<Atom>, KnowledgeError>;
}

// ═══════════════════════════════════════════════════════════
// Remote engine over HTTP
// ═══════════════════════════════════════════════════════════

/// Client for a knowledge engine served over HTTP.
///
/// Sends `POST {base_url}/run` with `{"program": "!(causedBy Typoiad)"}`.
/// The engine answers with one result list per evaluated expression; the
/// program always holds exactly one, so the first list is the result.
pub struct HttpKnowledgeEngine {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct RunRequest<'a> {
    program: &'a str,
}

impl HttpKnowledgeEngine {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, KnowledgeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| KnowledgeError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl KnowledgeEngine for HttpKnowledgeEngine {
    fn run(&self, query: &KnowledgeQuery) -> Result<Vec<Atom>, KnowledgeError> {
        let program = query.to_program()?;
        let url = format!("{}/run", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&RunRequest { program: &program })
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    KnowledgeError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    KnowledgeError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    KnowledgeError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(KnowledgeError::Engine {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Vec<Vec<Atom>> = response
            .json()
            .map_err(|e| KnowledgeError::MalformedResponse(e.to_string()))?;

        Ok(parsed.into_iter().next().unwrap_or_default())
    }
}

// ═══════════════════════════════════════════════════════════
// In-process fact table
// ═══════════════════════════════════════════════════════════

/// Knowledge engine backed by a static fact table.
///
/// The table maps engine function names to argument → result lists:
///
/// ```json
/// {
///   "causedBy": { "Typoiad": ["poorSanitation"] },
///   "findAllUsers": { "": ["Bisrat", "Amina", "Sara"] }
/// }
/// ```
///
/// Queries without an argument are stored under the empty key. Anything not
/// in the table yields an empty result, exactly like an engine with no
/// matching facts.
#[derive(Default)]
pub struct StaticKnowledgeEngine {
    facts: HashMap<NamedQuery, HashMap<String, Vec<Atom>>>,
    failing: HashSet<NamedQuery>,
    calls: AtomicUsize,
}

impl StaticKnowledgeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fact table from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, KnowledgeError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, KnowledgeError> {
        let table: HashMap<String, HashMap<String, Vec<Atom>>> =
            serde_json::from_str(raw).map_err(|e| KnowledgeError::FactTable(e.to_string()))?;

        let mut engine = Self::new();
        for (function, entries) in table {
            let query = NamedQuery::from_function(&function).ok_or_else(|| {
                KnowledgeError::FactTable(format!("unknown query function: {function}"))
            })?;
            engine.facts.insert(query, entries);
        }
        Ok(engine)
    }

    /// Add facts for one query + argument (`""` for argument-less queries).
    pub fn with_facts(
        mut self,
        query: NamedQuery,
        argument: &str,
        result: impl IntoIterator<Item = Atom>,
    ) -> Self {
        self.facts
            .entry(query)
            .or_default()
            .insert(argument.to_string(), result.into_iter().collect());
        self
    }

    /// Make every call to `query` fail with a retrieval error.
    pub fn with_failure(mut self, query: NamedQuery) -> Self {
        self.failing.insert(query);
        self
    }

    /// Number of queries executed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl KnowledgeEngine for StaticKnowledgeEngine {
    fn run(&self, query: &KnowledgeQuery) -> Result<Vec<Atom>, KnowledgeError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        // Same arity check the remote engine gets through rendering.
        query.to_program()?;

        if self.failing.contains(&query.query) {
            return Err(KnowledgeError::Retrieval(format!("{query} failed")));
        }

        let key = query
            .argument
            .as_ref()
            .map(|a| a.as_str())
            .unwrap_or_default();

        Ok(self
            .facts
            .get(&query.query)
            .and_then(|entries| entries.get(key))
            .cloned()
            .unwrap_or_default())
    }
}
