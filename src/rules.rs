use std::collections::HashMap;
use std::fmt;

use crate::error::Error;

/// One component of a rule element: either a concatenation of right-hand
/// side string-variable ids (the normal case), or a terminal word literal
/// (only ever the sole component of an epsilon rule's left side).
///
/// This is the tagged-variant replacement for the duck-typed mix of ints and
/// strings the reference implementation stores in the same tuple slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Component {
  Vars(Vec<usize>),
  Terminal(String),
}

/// A multiple context-free grammar rule element: a nonterminal symbol with
/// an ordered tuple of components describing how its instances are
/// assembled from string-variable ids scoped to the enclosing `Rule`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleElement {
  pub variable: String,
  pub components: Vec<Component>,
}

impl RuleElement {
  pub fn new(variable: impl Into<String>, components: Vec<Component>) -> Self {
    Self {
      variable: variable.into(),
      components,
    }
  }

  /// All string-variable ids referenced by this element's components, in
  /// no particular order. Empty for the `Terminal` epsilon case.
  pub fn unique_ids(&self) -> Vec<usize> {
    self
      .components
      .iter()
      .flat_map(|c| match c {
        Component::Vars(ids) => ids.clone(),
        Component::Terminal(_) => Vec::new(),
      })
      .collect()
  }
}

impl fmt::Display for RuleElement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts = self
      .components
      .iter()
      .map(|c| match c {
        Component::Vars(ids) => ids.iter().map(|i| i.to_string()).collect::<String>(),
        Component::Terminal(word) => word.clone(),
      })
      .collect::<Vec<_>>()
      .join(", ");
    write!(f, "{}({})", self.variable, parts)
  }
}

/// A half-open span `(begin, end)` into the input token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
  pub begin: usize,
  pub end: usize,
}

impl Span {
  pub fn new(begin: usize, end: usize) -> Self {
    Self { begin, end }
  }
}

impl fmt::Display for Span {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}, {}]", self.begin, self.end)
  }
}

/// A `RuleElement` whose string variables have been bound to concrete
/// half-open input spans.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleElementInstance {
  pub variable: String,
  pub spans: Vec<Span>,
}

impl RuleElementInstance {
  pub fn new(variable: impl Into<String>, spans: Vec<Span>) -> Self {
    Self {
      variable: variable.into(),
      spans,
    }
  }
}

impl fmt::Display for RuleElementInstance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts = self
      .spans
      .iter()
      .map(|s| s.to_string())
      .collect::<Vec<_>>()
      .join(", ");
    write!(f, "{}({})", self.variable, parts)
  }
}

/// A linear MCFG rule: a left-side element plus an ordered right-side of
/// elements. An empty right side marks an epsilon/lexical rule, whose left
/// side carries a single `Component::Terminal` naming the word it
/// introduces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
  pub left_side: RuleElement,
  pub right_side: Vec<RuleElement>,
}

impl Rule {
  /// Constructs a rule, checking the well-formedness invariants from the
  /// data model: right-side variable ids are pairwise disjoint across
  /// elements, and (for non-epsilon rules) the left side's variable set
  /// exactly matches the right side's variable union.
  pub fn new(left_side: RuleElement, right_side: Vec<RuleElement>) -> Result<Self, Error> {
    if right_side.is_empty() {
      match left_side.components.as_slice() {
        [Component::Terminal(_)] => return Ok(Self { left_side, right_side }),
        _ => {
          return Err(Error::RuleConstruction(format!(
            "epsilon rule's left side must carry exactly one terminal literal, got {left_side}"
          )));
        }
      }
    }

    let mut seen = std::collections::HashSet::new();
    for elem in &right_side {
      for id in elem.unique_ids() {
        if !seen.insert(id) {
          return Err(Error::RuleConstruction(format!(
            "right side variable {id} is shared across multiple elements in a rule with left side {left_side}"
          )));
        }
      }
    }

    let right_ids: std::collections::HashSet<usize> =
      right_side.iter().flat_map(|e| e.unique_ids()).collect();
    let left_ids: std::collections::HashSet<usize> = left_side.unique_ids().into_iter().collect();
    if left_ids != right_ids {
      return Err(Error::RuleConstruction(format!(
        "left side variables {left_ids:?} do not match right side variables {right_ids:?} in rule with left side {left_side}"
      )));
    }

    Ok(Self { left_side, right_side })
  }

  pub fn is_epsilon(&self) -> bool {
    self.right_side.is_empty()
  }

  /// The terminal word this rule introduces, if it's an epsilon rule.
  pub fn terminal_word(&self) -> Option<&str> {
    match self.left_side.components.first() {
      Some(Component::Terminal(word)) if self.is_epsilon() => Some(word),
      _ => None,
    }
  }

  /// Whether `rhs` aligns with this rule's right side: same arity, same
  /// variable names in order, same per-element component count.
  pub(crate) fn aligns(&self, rhs: &[RuleElementInstance]) -> bool {
    if rhs.len() != self.right_side.len() {
      return false;
    }
    self
      .right_side
      .iter()
      .zip(rhs)
      .all(|(elem, inst)| elem.variable == inst.variable && elem.components.len() == inst.spans.len())
  }

  /// Given an ordered tuple of right-side instances matching this rule's
  /// shape, produce the instantiated left side, or `None` if the
  /// instantiation doesn't satisfy the rule (alignment failure or a
  /// concatenation adjacency violation). `None` is an ordinary value here,
  /// not an error — it just means this right side doesn't satisfy the rule.
  pub fn instantiate_left_side(&self, rhs: &[RuleElementInstance]) -> Option<RuleElementInstance> {
    if self.is_epsilon() {
      if rhs.len() != 1 {
        return None;
      }
      let word = self.terminal_word()?;
      if word == rhs[0].variable {
        return Some(RuleElementInstance::new(
          self.left_side.variable.clone(),
          rhs[0].spans.clone(),
        ));
      }
      return None;
    }

    if !self.aligns(rhs) {
      return None;
    }

    let span_map = self.build_span_map(rhs);

    let mut new_spans = Vec::with_capacity(self.left_side.components.len());
    for component in &self.left_side.components {
      let Component::Vars(ids) = component else {
        // Non-epsilon rules only ever carry Vars components on the left side.
        return None;
      };
      if ids.is_empty() {
        return None;
      }
      for pair in ids.windows(2) {
        let end_prev = span_map.get(&pair[0])?.end;
        let begin_curr = span_map.get(&pair[1])?.begin;
        if end_prev != begin_curr {
          return None;
        }
      }
      let begin = span_map.get(&ids[0])?.begin;
      let end = span_map.get(ids.last().unwrap())?.end;
      new_spans.push(Span::new(begin, end));
    }

    Some(RuleElementInstance::new(self.left_side.variable.clone(), new_spans))
  }

  /// Maps each right-side string-variable id to the span bound to it by
  /// `rhs`. Assumes `aligns(rhs)` already holds.
  fn build_span_map(&self, rhs: &[RuleElementInstance]) -> HashMap<usize, Span> {
    let mut map = HashMap::new();
    for (elem, inst) in self.right_side.iter().zip(rhs) {
      for (component, span) in elem.components.iter().zip(&inst.spans) {
        if let Component::Vars(ids) = component {
          for id in ids {
            map.insert(*id, *span);
          }
        }
      }
    }
    map
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_epsilon() {
      return write!(f, "{}", self.left_side);
    }
    write!(f, "{} ->", self.left_side)?;
    for elem in &self.right_side {
      write!(f, " {elem}")?;
    }
    Ok(())
  }
}

#[test]
fn test_instantiate_left_side() {
  // VPwhrc(v, uw) -> Vpres(u) Sbarwhrc(v, w)
  let rule = Rule::new(
    RuleElement::new("VPwhrc", vec![Component::Vars(vec![1]), Component::Vars(vec![0, 2])]),
    vec![
      RuleElement::new("Vpres", vec![Component::Vars(vec![0])]),
      RuleElement::new("Sbarwhrc", vec![Component::Vars(vec![1]), Component::Vars(vec![2])]),
    ],
  )
  .unwrap();

  let got = rule.instantiate_left_side(&[
    RuleElementInstance::new("Vpres", vec![Span::new(3, 4)]),
    RuleElementInstance::new("Sbarwhrc", vec![Span::new(1, 2), Span::new(4, 7)]),
  ]);
  assert_eq!(
    got,
    Some(RuleElementInstance::new(
      "VPwhrc",
      vec![Span::new(1, 2), Span::new(3, 7)]
    ))
  );

  // non-adjacent spans fail
  let fail = rule.instantiate_left_side(&[
    RuleElementInstance::new("Vpres", vec![Span::new(3, 4)]),
    RuleElementInstance::new("Sbarwhrc", vec![Span::new(1, 2), Span::new(5, 7)]),
  ]);
  assert_eq!(fail, None);
}

#[test]
fn test_instantiate_epsilon_rule() {
  let rule = Rule::new(
    RuleElement::new("D", vec![Component::Terminal("the".to_string())]),
    Vec::new(),
  )
  .unwrap();

  let phantom = RuleElementInstance::new("the", vec![Span::new(3, 4)]);
  assert_eq!(
    rule.instantiate_left_side(&[phantom]),
    Some(RuleElementInstance::new("D", vec![Span::new(3, 4)]))
  );

  let wrong_word = RuleElementInstance::new("a", vec![Span::new(3, 4)]);
  assert_eq!(rule.instantiate_left_side(&[wrong_word]), None);
}

#[test]
fn test_rule_construction_rejects_shared_rhs_variables() {
  let err = Rule::new(
    RuleElement::new("VPwhrc", vec![Component::Vars(vec![1]), Component::Vars(vec![0, 2])]),
    vec![
      RuleElement::new("Vpres", vec![Component::Vars(vec![0])]),
      RuleElement::new("Sbarwhrc", vec![Component::Vars(vec![0]), Component::Vars(vec![2])]),
    ],
  )
  .unwrap_err();
  assert!(matches!(err, Error::RuleConstruction(_)));
}

#[test]
fn test_rule_construction_rejects_unbound_left_side_variable() {
  let err = Rule::new(
    RuleElement::new("VPwhrc", vec![Component::Vars(vec![1]), Component::Vars(vec![0, 5])]),
    vec![
      RuleElement::new("Vpres", vec![Component::Vars(vec![0])]),
      RuleElement::new("Sbarwhrc", vec![Component::Vars(vec![1]), Component::Vars(vec![2])]),
    ],
  )
  .unwrap_err();
  assert!(matches!(err, Error::RuleConstruction(_)));
}

#[test]
fn test_display() {
  let rule = Rule::new(
    RuleElement::new("VPwhrc", vec![Component::Vars(vec![1]), Component::Vars(vec![0, 2])]),
    vec![
      RuleElement::new("Vpres", vec![Component::Vars(vec![0])]),
      RuleElement::new("Sbarwhrc", vec![Component::Vars(vec![1]), Component::Vars(vec![2])]),
    ],
  )
  .unwrap();
  assert_eq!(rule.to_string(), "VPwhrc(1, 02) -> Vpres(0) Sbarwhrc(1, 2)");

  let lexical = Rule::new(
    RuleElement::new("D", vec![Component::Terminal("the".to_string())]),
    Vec::new(),
  )
  .unwrap();
  assert_eq!(lexical.to_string(), "D(the)");
}
