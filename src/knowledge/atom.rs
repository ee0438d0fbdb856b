use serde::{Deserialize, Serialize};

/// One value returned by the knowledge engine.
///
/// The engine speaks in symbolic atoms: bare symbols (`poorSanitation`),
/// expressions grouping other atoms (`(Typoiad (Fever Chills))`), and
/// grounded values such as quoted strings or numbers. On the JSON wire a
/// symbol is a string, an expression is an array, and anything else is a
/// grounded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Atom {
    Symbol(String),
    Expression(Vec<Atom>),
    Value(serde_json::Value),
}

impl Atom {
    pub fn symbol(name: impl Into<String>) -> Self {
        Atom::Symbol(name.into())
    }

    pub fn expression(children: impl IntoIterator<Item = Atom>) -> Self {
        Atom::Expression(children.into_iter().collect())
    }

    /// The symbolic name, if this atom has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Atom::Symbol(name) => Some(name),
            _ => None,
        }
    }
}

impl From<&str> for Atom {
    fn from(name: &str) -> Self {
        Atom::Symbol(name.to_string())
    }
}
