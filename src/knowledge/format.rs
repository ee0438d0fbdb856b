//! Result formatting: engine atoms to plain text.

use std::fmt;

use super::atom::Atom;

/// An atom normalized to plain data: a string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatted {
    Text(String),
    List(Vec<Formatted>),
}

impl fmt::Display for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatted::Text(text) => f.write_str(text),
            Formatted::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Normalize one atom. Symbols yield their name, expressions are mapped
/// element-wise, grounded values (numbers, booleans, objects) render as
/// their JSON text. Decoded JSON strings are always symbols.
pub fn format_atom(atom: &Atom) -> Formatted {
    match atom {
        Atom::Symbol(name) => Formatted::Text(name.clone()),
        Atom::Expression(children) => Formatted::List(children.iter().map(format_atom).collect()),
        Atom::Value(other) => Formatted::Text(other.to_string()),
    }
}

/// Normalize a full query result (the engine's list of matches).
pub fn format_result(result: &[Atom]) -> Formatted {
    Formatted::List(result.iter().map(format_atom).collect())
}
