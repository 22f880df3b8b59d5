use std::collections::VecDeque;
use std::rc::Rc;

use tracing::trace;

use crate::chart::{BackPointer, Chart, ChartEntry};
use crate::grammar::Grammar;
use crate::rules::{Rule, RuleElementInstance, Span};
use crate::tree::Tree;

/// Tries `grammar.reduce(current, element)` first; only falls back to the
/// reversed orientation when that first query returns no rules at all (not
/// when instantiation later produces no matches). Returns the orientation
/// that was used (`false` = current-then-element, `true` = reversed) paired
/// with every successfully instantiated left side.
fn combine(
  grammar: &Grammar,
  current: &RuleElementInstance,
  element: &RuleElementInstance,
) -> (bool, Vec<(Rc<Rule>, RuleElementInstance)>) {
  let forward = grammar.reduce(current, element);
  if !forward.is_empty() {
    let results = forward
      .into_iter()
      .filter_map(|rule| rule.instantiate_left_side(&[current.clone(), element.clone()]).map(|inst| (rule, inst)))
      .collect();
    return (false, results);
  }

  let backward = grammar.reduce(element, current);
  if backward.is_empty() {
    return (false, Vec::new());
  }
  let results = backward
    .into_iter()
    .filter_map(|rule| rule.instantiate_left_side(&[element.clone(), current.clone()]).map(|inst| (rule, inst)))
    .collect();
  (true, results)
}

/// Runs the full agenda-based bottom-up chart construction over `input`.
pub(crate) fn fill_chart(grammar: &Grammar, input: &[&str]) -> Chart {
  let mut agenda: VecDeque<ChartEntry> = VecDeque::new();

  for (idx, word) in input.iter().enumerate() {
    for rule in grammar.lexical(word) {
      let phantom = RuleElementInstance::new(*word, vec![Span::new(idx, idx + 1)]);
      if let Some(symbol) = rule.instantiate_left_side(&[phantom]) {
        agenda.push_back(ChartEntry::Leaf { id: 0, symbol });
      }
    }
  }

  let seed_count = agenda.len();
  for (id, entry) in agenda.iter_mut().enumerate() {
    match entry {
      ChartEntry::Leaf { id: entry_id, .. } => *entry_id = id,
      ChartEntry::Derived { .. } => unreachable!("seeds are always leaves"),
    }
  }
  let mut next_id = seed_count;

  let mut chart = Chart::new();
  while let Some(current) = agenda.pop_front() {
    for element in chart.iter() {
      let (reversed, combinations) = combine(grammar, current.symbol(), element.symbol());
      for (rule, symbol) in combinations {
        let (left, right) = if reversed {
          (
            BackPointer {
              id: element.id(),
              variable: element.symbol().variable.clone(),
            },
            BackPointer {
              id: current.id(),
              variable: current.symbol().variable.clone(),
            },
          )
        } else {
          (
            BackPointer {
              id: current.id(),
              variable: current.symbol().variable.clone(),
            },
            BackPointer {
              id: element.id(),
              variable: element.symbol().variable.clone(),
            },
          )
        };
        trace!(%symbol, rule = %rule, "agenda: produced combination");
        agenda.push_back(ChartEntry::Derived {
          id: next_id,
          symbol,
          rule,
          left,
          right,
        });
        next_id += 1;
      }
    }
    if !chart.contains_id(current.id()) {
      chart.push(current);
    }
  }

  chart
}

/// Chart entries whose symbol names a start variable and whose spans cover
/// the entire input in one component.
fn start_entries<'c>(grammar: &Grammar, chart: &'c Chart, input_len: usize) -> Vec<&'c ChartEntry> {
  chart
    .iter()
    .filter(|entry| {
      let symbol = entry.symbol();
      grammar.is_start(&symbol.variable) && symbol.spans.as_slice() == [Span::new(0, input_len)]
    })
    .collect()
}

pub fn recognize(grammar: &Grammar, input: &[&str]) -> bool {
  let chart = fill_chart(grammar, input);
  !start_entries(grammar, &chart, input.len()).is_empty()
}

pub fn parse(grammar: &Grammar, input: &[&str]) -> Vec<Tree> {
  let chart = fill_chart(grammar, input);
  start_entries(grammar, &chart, input.len())
    .into_iter()
    .map(|entry| build_tree(&chart, input, entry))
    .collect()
}

fn build_tree(chart: &Chart, input: &[&str], entry: &ChartEntry) -> Tree {
  match entry {
    ChartEntry::Leaf { symbol, .. } => {
      let span = symbol.spans[0];
      Tree::leaf(&symbol.variable, input[span.begin])
    }
    ChartEntry::Derived { symbol, left, right, .. } => {
      let left_entry = chart
        .get(left.id)
        .expect("back-pointer must resolve to a chart entry present at forest extraction time");
      let right_entry = chart
        .get(right.id)
        .expect("back-pointer must resolve to a chart entry present at forest extraction time");
      Tree::branch(
        symbol.variable.clone(),
        vec![build_tree(chart, input, left_entry), build_tree(chart, input, right_entry)],
      )
    }
  }
}
