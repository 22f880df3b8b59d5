//! An agenda-based bottom-up chart recognizer and parser for multiple
//! context-free grammars (MCFGs) restricted to chart-normal form: every
//! non-epsilon rule has exactly two right-side elements.

mod agenda;
mod chart;
mod error;
mod grammar;
mod parse_grammar;
mod rules;
mod tree;

pub use chart::{BackPointer, Chart, ChartEntry};
pub use error::Error;
pub use grammar::{Grammar, ParseResult};
pub use rules::{Component, Rule, RuleElement, RuleElementInstance, Span};
pub use tree::Tree;
