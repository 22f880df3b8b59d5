use std::collections::HashSet;

use mcfg_chart::Grammar;

fn calibration() -> Grammar {
  let text = include_str!("../grammars/calibration.mcfg");
  text.parse().expect("calibration grammar must load")
}

fn tree_strings(grammar: &Grammar, tokens: &[&str]) -> HashSet<String> {
  grammar.parse(tokens).into_iter().map(|t| t.to_string()).collect()
}

#[test]
fn test_simple_declarative() {
  let grammar = calibration();
  let tokens = ["the", "human", "saw", "the", "greyhound"];
  assert!(grammar.recognize(&tokens));

  let expected: HashSet<String> = [
    "S\n--NP\n  --D(the)\n  --N(human)\n--VP\n  --Vpres(saw)\n  --NP\n    --D(the)\n    --N(greyhound)\n",
  ]
  .into_iter()
  .map(String::from)
  .collect();
  assert_eq!(tree_strings(&grammar, &tokens), expected);
}

#[test]
fn test_embedded_clause() {
  let grammar = calibration();
  let tokens = [
    "the", "human", "believes", "that", "the", "greyhound", "saw", "a", "salmon",
  ];
  assert!(grammar.recognize(&tokens));
  let trees = grammar.parse(&tokens);
  assert_eq!(trees.len(), 1);
  assert_eq!(trees[0].data, "S");
}

#[test]
fn test_wh_relative_clause() {
  let grammar = calibration();
  let tokens = [
    "which", "human", "that", "saw", "a", "salmon", "believes", "the", "greyhound",
  ];
  assert!(grammar.recognize(&tokens));
  assert_eq!(grammar.parse(&tokens).len(), 1);
}

#[test]
fn test_ambiguous_subject_dislocation() {
  let grammar = calibration();
  let tokens = [
    "the", "human", "that", "believes", "the", "salmon", "that", "believes", "a", "human", "saw", "the", "greyhound",
  ];
  assert!(grammar.recognize(&tokens));
  let trees = grammar.parse(&tokens);
  assert_eq!(trees.len(), 2);
  let roots: HashSet<&str> = trees.iter().map(|t| t.children[0].data.as_str()).collect();
  assert!(roots.contains("NP"));
  assert!(roots.contains("NPdisloc"));
}

#[test]
fn test_pp_attachment_ambiguity() {
  let grammar = calibration();
  let tokens = ["the", "human", "saw", "the", "greyhound", "with", "a", "salmon"];
  assert!(grammar.recognize(&tokens));
  assert_eq!(grammar.parse(&tokens).len(), 2);
}

#[test]
fn test_rejects_missing_determiner() {
  let grammar = calibration();
  let tokens = ["the", "human", "saw", "greyhound"];
  assert!(!grammar.recognize(&tokens));
  assert!(grammar.parse(&tokens).is_empty());
}

#[test]
fn test_rejects_wrong_verb_form() {
  let grammar = calibration();
  let tokens = [
    "the", "human", "believe", "that", "the", "greyhound", "saw", "a", "salmon",
  ];
  assert!(!grammar.recognize(&tokens));
}

#[test]
fn test_rejects_wh_word_outside_relative_clause() {
  let grammar = calibration();
  let tokens = ["who", "saw", "a", "salmon"];
  assert!(!grammar.recognize(&tokens));
}

#[test]
fn test_empty_input_is_not_recognized() {
  let grammar = calibration();
  assert!(!grammar.recognize(&[]));
  assert!(grammar.parse(&[]).is_empty());
}

#[test]
fn test_unknown_word_is_not_recognized() {
  let grammar = calibration();
  assert!(!grammar.recognize(&["xyzzy"]));
}

#[test]
fn test_recognize_parse_consistency() {
  let grammar = calibration();
  let examples: [&[&str]; 4] = [
    &["the", "human", "saw", "the", "greyhound"],
    &["the", "human", "saw", "greyhound"],
    &["who", "saw", "a", "salmon"],
    &[],
  ];
  for tokens in examples {
    assert_eq!(grammar.recognize(tokens), !grammar.parse(tokens).is_empty());
  }
}
