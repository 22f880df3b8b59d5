use std::fmt;

/// Error taxonomy for grammar construction, rule construction, rule-text
/// parsing, and parser misuse. Runtime no-matches (a rule instantiation
/// failing its adjacency check, an input not being recognized) are ordinary
/// values, never errors — see `Rule::instantiate_left_side` and
/// `Grammar::recognize`/`Grammar::parse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// Raised at `Grammar::new`: alphabet/variables overlap, a start variable
  /// not in the variable set, or a rule referencing an unregistered symbol.
  GrammarValidation(String),
  /// Raised at `Rule::new`: right-side variables shared across right-side
  /// elements, or the left side's variable set doesn't match the right
  /// side's variable union.
  RuleConstruction(String),
  /// Raised by the textual rule loader: duplicated right-side variable
  /// names, or a malformed element list.
  RuleSyntax(String),
  /// Raised when `Grammar::run` is called with a mode other than
  /// `"recognize"` or `"parse"`.
  ParserMisuse(String),
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::GrammarValidation(msg) => write!(f, "grammar validation: {msg}"),
      Self::RuleConstruction(msg) => write!(f, "rule construction: {msg}"),
      Self::RuleSyntax(msg) => write!(f, "rule syntax: {msg}"),
      Self::ParserMisuse(msg) => write!(f, "parser misuse: {msg}"),
    }
  }
}

impl std::error::Error for Error {}
