use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::agenda;
use crate::error::Error;
use crate::parse_grammar;
use crate::rules::{Rule, RuleElementInstance};
use crate::tree::Tree;

type ReduceKey = ((String, usize), (String, usize));

/// A multiple context-free grammar: the rule set plus the derived or
/// supplied alphabet/variable/start-variable sets, and the indexes the
/// agenda engine needs at its hot paths.
pub struct Grammar {
  rules: Vec<Rc<Rule>>,
  start_variables: HashSet<String>,
  alphabet: HashSet<String>,
  variables: HashSet<String>,
  by_lhs: HashMap<String, Vec<Rc<Rule>>>,
  by_word: HashMap<String, Vec<Rc<Rule>>>,
  reduce_cache: RefCell<HashMap<ReduceKey, Vec<Rc<Rule>>>>,
}

/// The result of `Grammar::run`'s dynamic-mode dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
  Recognized(bool),
  Parsed(Vec<Tree>),
}

impl Grammar {
  pub fn new(
    rules: Vec<Rule>,
    start_variables: HashSet<String>,
    alphabet: Option<HashSet<String>>,
    variables: Option<HashSet<String>>,
  ) -> Result<Self, Error> {
    // `rules` is a set in the data model (spec.md §3.4, mirrored by the
    // reference's `set[MCFGRule]`): collapse structurally-identical rule
    // definitions here so a grammar with a repeated rule-text line doesn't
    // produce two distinct `Rc<Rule>`s that `reduce`/`lexical` both return,
    // doubling up derivations in the chart.
    let mut seen_rules = HashSet::new();
    let rules: Vec<Rc<Rule>> = rules
      .into_iter()
      .filter(|rule| seen_rules.insert(rule.clone()))
      .map(Rc::new)
      .collect();

    let variables = variables.unwrap_or_else(|| {
      rules
        .iter()
        .flat_map(|r| {
          std::iter::once(r.left_side.variable.clone())
            .chain(r.right_side.iter().map(|e| e.variable.clone()))
        })
        .collect()
    });

    let alphabet = alphabet.unwrap_or_else(|| {
      rules
        .iter()
        .filter_map(|r| r.terminal_word().map(|w| w.to_string()))
        .collect()
    });

    if !alphabet.is_disjoint(&variables) {
      warn!("grammar validation failed: alphabet and variables overlap");
      return Err(Error::GrammarValidation(
        "alphabet and variables must not share elements".to_string(),
      ));
    }

    for start in &start_variables {
      if !variables.contains(start) {
        warn!(start = %start, "grammar validation failed: start variable not in variables");
        return Err(Error::GrammarValidation(format!(
          "start variable {start} must be in the set of variables"
        )));
      }
    }

    for rule in &rules {
      if rule.is_epsilon() {
        let word = rule.terminal_word().expect("epsilon rule always has a terminal word");
        if !alphabet.contains(word) {
          return Err(Error::GrammarValidation(format!(
            "epsilon rule {rule} introduces {word:?}, which is not in the alphabet"
          )));
        }
      } else {
        if !variables.contains(&rule.left_side.variable) {
          return Err(Error::GrammarValidation(format!(
            "rule {rule}'s left side {} is not a registered variable",
            rule.left_side.variable
          )));
        }
        for elem in &rule.right_side {
          if !variables.contains(&elem.variable) {
            return Err(Error::GrammarValidation(format!(
              "rule {rule}'s right side references unregistered variable {}",
              elem.variable
            )));
          }
        }
      }
    }

    let mut by_lhs: HashMap<String, Vec<Rc<Rule>>> = HashMap::new();
    let mut by_word: HashMap<String, Vec<Rc<Rule>>> = HashMap::new();
    for rule in &rules {
      by_lhs.entry(rule.left_side.variable.clone()).or_default().push(Rc::clone(rule));
      if let Some(word) = rule.terminal_word() {
        by_word.entry(word.to_string()).or_default().push(Rc::clone(rule));
      }
    }

    debug!(rule_count = rules.len(), variable_count = variables.len(), "grammar constructed");

    Ok(Self {
      rules,
      start_variables,
      alphabet,
      variables,
      by_lhs,
      by_word,
      reduce_cache: RefCell::new(HashMap::new()),
    })
  }

  pub fn alphabet(&self) -> &HashSet<String> {
    &self.alphabet
  }

  pub fn variables(&self) -> &HashSet<String> {
    &self.variables
  }

  pub fn start_variables(&self) -> &HashSet<String> {
    &self.start_variables
  }

  pub fn is_start(&self, variable: &str) -> bool {
    self.start_variables.contains(variable)
  }

  pub fn rules(&self) -> &[Rc<Rule>] {
    &self.rules
  }

  /// Rules whose left-side variable name equals `name`.
  pub fn rules_by_lhs(&self, name: &str) -> &[Rc<Rule>] {
    self.by_lhs.get(name).map(Vec::as_slice).unwrap_or(&[])
  }

  /// ε-rules whose left side's single terminal literal equals `word`.
  pub fn lexical(&self, word: &str) -> &[Rc<Rule>] {
    self.by_word.get(word).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Rules whose right side is exactly length 2 and aligns, in that order,
  /// with `(current, other)`. Memoized by the pair's shape (variable name
  /// and component count), since that's all alignment depends on.
  pub fn reduce(&self, current: &RuleElementInstance, other: &RuleElementInstance) -> Vec<Rc<Rule>> {
    let key = (
      (current.variable.clone(), current.spans.len()),
      (other.variable.clone(), other.spans.len()),
    );
    if let Some(cached) = self.reduce_cache.borrow().get(&key) {
      return cached.clone();
    }

    let matches: Vec<Rc<Rule>> = self
      .rules
      .iter()
      .filter(|rule| rule.right_side.len() == 2 && rule.aligns(&[current.clone(), other.clone()]))
      .cloned()
      .collect();

    self.reduce_cache.borrow_mut().insert(key, matches.clone());
    matches
  }

  pub fn recognize(&self, input: &[&str]) -> bool {
    agenda::recognize(self, input)
  }

  pub fn parse(&self, input: &[&str]) -> Vec<Tree> {
    agenda::parse(self, input)
  }

  /// The full chart built by the agenda loop over `input`, exposed for
  /// diagnostics (the CLI's `--chart` flag prints this).
  pub fn chart(&self, input: &[&str]) -> crate::chart::Chart {
    agenda::fill_chart(self, input)
  }

  /// Dynamic-mode entry point for callers coming from outside the type
  /// system (the textual grammar format's own CLI, for instance).
  pub fn run(&self, input: &[&str], mode: &str) -> Result<ParseResult, Error> {
    match mode {
      "recognize" => Ok(ParseResult::Recognized(self.recognize(input))),
      "parse" => Ok(ParseResult::Parsed(self.parse(input))),
      other => Err(Error::ParserMisuse(format!(
        "mode must be \"recognize\" or \"parse\", got {other:?}"
      ))),
    }
  }

  pub fn read_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
    let text = std::fs::read_to_string(path.as_ref())
      .map_err(|e| Error::RuleSyntax(format!("could not read grammar file: {e}")))?;
    text.parse()
  }
}

impl FromStr for Grammar {
  type Err = Error;

  /// One rule per non-blank, non-`#`-comment line. The first rule's
  /// left-side variable becomes the grammar's sole start variable, since
  /// the textual syntax carries no separate start-symbol marker.
  fn from_str(text: &str) -> Result<Self, Error> {
    let mut rules = Vec::new();
    let mut start_variables = HashSet::new();

    for line in text.lines() {
      let line = line.trim();
      if line.is_empty() || line.starts_with('#') {
        continue;
      }
      let rule = parse_grammar::parse_rule_text(line)?;
      if rules.is_empty() {
        start_variables.insert(rule.left_side.variable.clone());
      }
      rules.push(rule);
    }

    Grammar::new(rules, start_variables, None, None)
  }
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for rule in &self.rules {
      writeln!(f, "{rule}")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rules::{Component, RuleElement};

  fn calibration_snippet() -> Grammar {
    // D(the) ; N(human) ; S(uv) -> D(u) N(v)
    let d = Rule::new(RuleElement::new("D", vec![Component::Terminal("the".into())]), vec![]).unwrap();
    let n = Rule::new(RuleElement::new("N", vec![Component::Terminal("human".into())]), vec![]).unwrap();
    let s = Rule::new(
      RuleElement::new("S", vec![Component::Vars(vec![0, 1])]),
      vec![
        RuleElement::new("D", vec![Component::Vars(vec![0])]),
        RuleElement::new("N", vec![Component::Vars(vec![1])]),
      ],
    )
    .unwrap();
    Grammar::new(vec![d, n, s], ["S".to_string()].into_iter().collect(), None, None).unwrap()
  }

  #[test]
  fn test_derives_alphabet_and_variables() {
    let g = calibration_snippet();
    assert!(g.alphabet().contains("the"));
    assert!(g.alphabet().contains("human"));
    assert!(g.variables().contains("S"));
    assert!(g.variables().contains("D"));
  }

  #[test]
  fn test_recognize_and_parse() {
    let g = calibration_snippet();
    assert!(g.recognize(&["the", "human"]));
    let trees = g.parse(&["the", "human"]);
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].data, "S");
  }

  #[test]
  fn test_rejects_unknown_word() {
    let g = calibration_snippet();
    assert!(!g.recognize(&["the", "dog"]));
    assert!(g.parse(&["the", "dog"]).is_empty());
  }

  #[test]
  fn test_rules_by_lhs() {
    let g = calibration_snippet();
    let s_rules = g.rules_by_lhs("S");
    assert_eq!(s_rules.len(), 1);
    assert_eq!(s_rules[0].left_side.variable, "S");
    assert!(g.rules_by_lhs("nope").is_empty());
  }

  #[test]
  fn test_duplicate_rule_definitions_collapse() {
    let d = Rule::new(RuleElement::new("D", vec![Component::Terminal("the".into())]), vec![]).unwrap();
    let g = Grammar::new(
      vec![d.clone(), d],
      HashSet::new(),
      None,
      None,
    )
    .unwrap();
    assert_eq!(g.rules().len(), 1);
  }

  #[test]
  fn test_rejects_start_variable_not_in_variables() {
    let rule = Rule::new(RuleElement::new("D", vec![Component::Terminal("the".into())]), vec![]).unwrap();
    let err = Grammar::new(vec![rule], ["S".to_string()].into_iter().collect(), None, None).unwrap_err();
    assert!(matches!(err, Error::GrammarValidation(_)));
  }

  #[test]
  fn test_no_start_variable_never_recognizes() {
    let d = Rule::new(RuleElement::new("D", vec![Component::Terminal("the".into())]), vec![]).unwrap();
    let g = Grammar::new(vec![d], HashSet::new(), None, None).unwrap();
    assert!(!g.recognize(&["the"]));
  }

  #[test]
  fn test_empty_input_never_recognizes() {
    let g = calibration_snippet();
    assert!(!g.recognize(&[]));
    assert!(g.parse(&[]).is_empty());
  }
}
