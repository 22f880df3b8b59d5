use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;
use crate::rules::{Component, Rule, RuleElement};

lazy_static! {
  static ref ELEMENT: Regex = Regex::new(r"(\w+)\(((?:\w+,? ?)+?)\)").unwrap();
}

/// One `NAME(vars)` element extracted from a rule-text line, with `vars`
/// split on commas but not yet resolved to ids.
struct ParsedElement {
  variable: String,
  vars: Vec<String>,
}

fn extract_elements(text: &str) -> Vec<ParsedElement> {
  ELEMENT
    .captures_iter(text)
    .map(|caps| {
      let variable = caps[1].to_string();
      let vars = caps[2].split(',').map(|v| v.trim().to_string()).collect();
      ParsedElement { variable, vars }
    })
    .collect()
}

/// Parses one line of rule text, e.g. `"VPwhrc(v, uw) -> Vpres(u) Sbarwhrc(v, w)"`
/// or the epsilon form `"D(the)"`.
pub fn parse_rule_text(text: &str) -> Result<Rule, Error> {
  let elements = extract_elements(text);

  let Some((left, right)) = elements.split_first() else {
    return Err(Error::RuleSyntax(format!("no rule elements found in {text:?}")));
  };

  if right.is_empty() {
    if left.vars.len() != 1 {
      return Err(Error::RuleSyntax(format!(
        "epsilon rule {text:?} must declare exactly one terminal literal"
      )));
    }
    let left_side = RuleElement::new(left.variable.clone(), vec![Component::Terminal(left.vars[0].clone())]);
    return Rule::new(left_side, Vec::new());
  }

  // Each distinct right-side variable name gets an id by first-appearance
  // order, scanning left-to-right across the right-side elements.
  let mut strvars: Vec<String> = Vec::new();
  for elem in right {
    for v in &elem.vars {
      strvars.push(v.clone());
    }
  }

  let mut seen = std::collections::HashSet::new();
  for v in &strvars {
    if !seen.insert(v.clone()) {
      return Err(Error::RuleSyntax(format!("variable {v} duplicated on right side of {text:?}")));
    }
  }

  // Concatenated left-side component strings (e.g. "uw") have no delimiter
  // between variable names, so split them by scanning for the known
  // right-side variable names via an alternation pattern, in the same
  // order they were first assigned ids.
  let alternation = Regex::new(&format!("({})", strvars.join("|")))
    .map_err(|e| Error::RuleSyntax(format!("could not build variable-scanning pattern for {text:?}: {e}")))?;

  let left_components = left
    .vars
    .iter()
    .map(|component_text| {
      let ids: Vec<usize> = alternation
        .find_iter(component_text)
        .map(|m| {
          strvars
            .iter()
            .position(|v| v == m.as_str())
            .expect("every match came from the alternation built over strvars")
        })
        .collect();
      Component::Vars(ids)
    })
    .collect();

  let left_side = RuleElement::new(left.variable.clone(), left_components);

  let right_side = right
    .iter()
    .map(|elem| {
      let components = elem
        .vars
        .iter()
        .map(|v| {
          let id = strvars
            .iter()
            .position(|sv| sv == v)
            .expect("right-side variable was just collected into strvars above");
          Component::Vars(vec![id])
        })
        .collect();
      RuleElement::new(elem.variable.clone(), components)
    })
    .collect();

  Rule::new(left_side, right_side)
}

#[test]
fn test_parse_epsilon_rule() {
  let rule = parse_rule_text("D(the)").unwrap();
  assert!(rule.is_epsilon());
  assert_eq!(rule.terminal_word(), Some("the"));
}

#[test]
fn test_parse_binary_rule() {
  let rule = parse_rule_text("S(uv) -> D(u) N(v)").unwrap();
  assert!(!rule.is_epsilon());
  assert_eq!(rule.right_side.len(), 2);
  assert_eq!(rule.right_side[0].variable, "D");
  assert_eq!(rule.right_side[1].variable, "N");
}

#[test]
fn test_parse_discontinuous_left_side() {
  // VPwhrc(v, uw) -> Vpres(u) Sbarwhrc(v, w)
  let rule = parse_rule_text("VPwhrc(v, uw) -> Vpres(u) Sbarwhrc(v, w)").unwrap();
  assert_eq!(rule.left_side.variable, "VPwhrc");
  assert_eq!(
    rule.left_side.components,
    vec![Component::Vars(vec![1]), Component::Vars(vec![0, 2])]
  );
}

#[test]
fn test_parse_rejects_duplicate_right_side_variable() {
  let err = parse_rule_text("S(uu) -> D(u) N(u)").unwrap_err();
  assert!(matches!(err, Error::RuleSyntax(_)));
}

#[test]
fn test_round_trip() {
  let rule = parse_rule_text("VPwhrc(v, uw) -> Vpres(u) Sbarwhrc(v, w)").unwrap();
  let reparsed = parse_rule_text(&rule.to_string()).unwrap();
  assert_eq!(rule, reparsed);
}
