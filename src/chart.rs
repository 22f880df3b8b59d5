use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::rules::{Rule, RuleElementInstance};

/// Reference to the chart entry that produced one side of a combination,
/// carried alongside the producing entry's symbol name for display purposes
/// (matching the reference implementation's `(id, variable)` pair).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackPointer {
  pub id: usize,
  pub variable: String,
}

impl fmt::Display for BackPointer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.id, self.variable)
  }
}

/// One item in the chart: either a lexical seed with no back-pointers, or a
/// combination of exactly two earlier entries via a chart-normal-form rule.
/// This is the tagged-variant replacement for the duck-typed
/// "all-null-backpointers-means-leaf" sentinel in the reference chart.
#[derive(Debug, Clone)]
pub enum ChartEntry {
  Leaf {
    id: usize,
    symbol: RuleElementInstance,
  },
  Derived {
    id: usize,
    symbol: RuleElementInstance,
    rule: Rc<Rule>,
    left: BackPointer,
    right: BackPointer,
  },
}

impl ChartEntry {
  pub fn id(&self) -> usize {
    match self {
      Self::Leaf { id, .. } => *id,
      Self::Derived { id, .. } => *id,
    }
  }

  pub fn symbol(&self) -> &RuleElementInstance {
    match self {
      Self::Leaf { symbol, .. } => symbol,
      Self::Derived { symbol, .. } => symbol,
    }
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf { .. })
  }
}

impl fmt::Display for ChartEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf { id, symbol } => write!(f, "{id}:{symbol}"),
      Self::Derived {
        id,
        symbol,
        left,
        right,
        ..
      } => write!(f, "{id}:{symbol} -> {left} {right}"),
    }
  }
}

/// The chart built up by the agenda loop: an ordered list of entries plus
/// an id index, so entries deduplicate by id only, never by symbol — the
/// same (variable, spans) pair may legitimately appear at several ids,
/// each carrying a distinct derivation.
#[derive(Debug, Default)]
pub struct Chart {
  entries: Vec<ChartEntry>,
  index: HashMap<usize, usize>,
}

impl Chart {
  pub fn new() -> Self {
    Self {
      entries: Vec::new(),
      index: HashMap::new(),
    }
  }

  pub fn contains_id(&self, id: usize) -> bool {
    self.index.contains_key(&id)
  }

  pub fn push(&mut self, entry: ChartEntry) {
    let id = entry.id();
    self.index.insert(id, self.entries.len());
    self.entries.push(entry);
  }

  pub fn get(&self, id: usize) -> Option<&ChartEntry> {
    self.index.get(&id).map(|&pos| &self.entries[pos])
  }

  pub fn iter(&self) -> impl Iterator<Item = &ChartEntry> {
    self.entries.iter()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl fmt::Display for Chart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for entry in &self.entries {
      writeln!(f, "{entry}")?;
    }
    Ok(())
  }
}
