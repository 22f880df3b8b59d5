use std::fmt;

/// A concrete derivation tree. Leaves carry a preterminal label in the
/// shape `Var(word)`; internal nodes carry the producing rule's left-side
/// variable name. Forests are sets of these, materialized independently
/// per derivation rather than shared as a DAG.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tree {
  pub data: String,
  pub children: Vec<Tree>,
}

impl Tree {
  pub fn leaf(variable: &str, word: &str) -> Self {
    Self {
      data: format!("{variable}({word})"),
      children: Vec::new(),
    }
  }

  pub fn branch(data: impl Into<String>, children: Vec<Tree>) -> Self {
    Self {
      data: data.into(),
      children,
    }
  }

  pub fn is_leaf(&self) -> bool {
    self.children.is_empty()
  }

  /// The leaf labels in left-to-right order.
  pub fn terminal_yield(&self) -> Vec<&str> {
    if self.children.is_empty() {
      vec![self.data.as_str()]
    } else {
      self.children.iter().flat_map(|c| c.terminal_yield()).collect()
    }
  }

  fn render(&self, depth: usize, out: &mut String) {
    if depth > 0 {
      out.push_str(&"  ".repeat(depth - 1));
      out.push_str("--");
    }
    out.push_str(&self.data);
    out.push('\n');
    for child in &self.children {
      child.render(depth + 1, out);
    }
  }
}

impl fmt::Display for Tree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut out = String::new();
    self.render(0, &mut out);
    write!(f, "{out}")
  }
}

#[test]
fn test_render() {
  let tree = Tree::branch(
    "S",
    vec![
      Tree::leaf("D", "the"),
      Tree::branch("VP", vec![Tree::leaf("V", "ran")]),
    ],
  );
  assert_eq!(tree.to_string(), "S\n--D(the)\n--VP\n----V(ran)\n");
}

#[test]
fn test_terminal_yield() {
  let tree = Tree::branch(
    "S",
    vec![Tree::leaf("D", "the"), Tree::leaf("N", "dog")],
  );
  assert_eq!(tree.terminal_yield(), vec!["D(the)", "N(dog)"]);
}
