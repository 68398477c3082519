//! Tree model shared by all matchers.
//!
//! Nodes live in an arena owned by their [`Tree`]; every cross reference
//! (`parent`, `relative`, `next`, `buddy`) is a plain [`NodeId`] and never
//! keeps a node alive on its own.  Dropping the tree drops all of them.

use std::fmt::Write;
use std::ops::{Index, IndexMut};

use crate::language::Language;
use crate::stypes::SType;
use crate::types::Type;

/// Matching verdict attached to every node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum State {
  #[default]
  Unchanged,
  Deleted,
  Inserted,
  Updated,
}

/// Index of a node within its owning tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
  pub fn index(self) -> usize {
    self.0
  }

  #[cfg(test)]
  pub(crate) fn from_raw(index: usize) -> NodeId {
    NodeId(index)
  }
}

#[derive(Debug, Default)]
pub struct Node {
  /// Text of this syntactic unit; multi-line for coarsened subtrees.
  pub label: String,
  /// Original spelling with whitespace preserved.
  pub spelling: String,
  pub children: Vec<NodeId>,
  /// Post-order index, assigned at matching time.
  pub po_id: usize,
  pub state: State,
  /// 1-based source position; 0 marks a synthetic node.
  pub line: u32,
  pub col: u32,
  /// Matched counterpart in the other tree.
  pub relative: Option<NodeId>,
  pub parent: Option<NodeId>,
  /// Decorative node: inherits its parent's state, never matched on its own.
  pub satellite: bool,
  pub ty: Type,
  pub stype: SType,
  /// Link consumed by render clients stitching diffable spellings.
  pub next: Option<NodeId>,
  /// Index into `children` of the value child, when the node has one.
  pub value_child: Option<usize>,
  pub moved: bool,
  pub last: bool,
  /// Rename partner established by the edit-distance backtracker.
  pub buddy: Option<NodeId>,
}

impl Node {
  pub fn has_value(&self) -> bool {
    self.value_child.is_some()
  }

  pub fn value(&self) -> Option<NodeId> {
    self.value_child.map(|i| self.children[i])
  }

  pub fn is_leaf(&self) -> bool {
    self.children.is_empty()
  }
}

/// Arena of nodes.  The root is created eagerly so an empty input still has
/// a well-formed, childless tree.
pub struct Tree {
  nodes: Vec<Node>,
  root: NodeId,
}

impl Default for Tree {
  fn default() -> Self {
    Tree::new()
  }
}

impl Tree {
  pub fn new() -> Self {
    Tree {
      nodes: vec![Node::default()],
      root: NodeId(0),
    }
  }

  pub fn root(&self) -> NodeId {
    self.root
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self[self.root].children.is_empty() && self[self.root].label.is_empty()
  }

  pub fn make_node(&mut self) -> NodeId {
    self.nodes.push(Node::default());
    NodeId(self.nodes.len() - 1)
  }
}

impl Index<NodeId> for Tree {
  type Output = Node;
  fn index(&self, id: NodeId) -> &Node {
    &self.nodes[id.0]
  }
}

impl IndexMut<NodeId> for Tree {
  fn index_mut(&mut self, id: NodeId) -> &mut Node {
    &mut self.nodes[id.0]
  }
}

/// Collects non-satellite nodes in post-order and assigns `po_id`.
pub fn post_order(tree: &mut Tree) -> Vec<NodeId> {
  let mut po = Vec::new();
  collect(tree, tree.root(), false, &mut po);
  po
}

/// Like [`post_order`], but also resets `relative` and `parent`, preparing
/// the tree for a fresh matching run.
pub fn post_order_and_init(tree: &mut Tree) -> Vec<NodeId> {
  let mut po = Vec::new();
  collect(tree, tree.root(), true, &mut po);
  po
}

fn collect(tree: &mut Tree, id: NodeId, init: bool, po: &mut Vec<NodeId>) {
  if tree[id].satellite {
    return;
  }

  if init {
    tree[id].relative = None;
    tree[id].parent = None;
  }

  let children = tree[id].children.clone();
  for child in children {
    collect(tree, child, init, po);
  }
  tree[id].po_id = po.len();
  po.push(id);
}

/// Post-order index of the leftmost non-satellite leaf under `id`.
pub fn lml(tree: &Tree, id: NodeId) -> usize {
  let node = &tree[id];
  if node.is_leaf() {
    return node.po_id;
  }
  for &child in &node.children {
    if !tree[child].satellite {
      return lml(tree, child);
    }
  }
  node.po_id
}

/// Number of leaves under `id`; `Separator` subtrees count as zero.
pub fn count_leaves(tree: &Tree, id: NodeId) -> usize {
  let node = &tree[id];
  if node.stype == SType::Separator {
    return 0;
  }
  if node.is_leaf() {
    return 1;
  }
  node.children.iter().map(|&c| count_leaves(tree, c)).sum()
}

/// Leaf mass hidden under satellite subtrees of `id`.
pub fn count_satellite_nodes(tree: &Tree, id: NodeId) -> usize {
  let node = &tree[id];
  if node.satellite {
    return if node.stype == SType::Separator {
      0
    } else {
      count_leaves(tree, id)
    };
  }
  node
    .children
    .iter()
    .map(|&c| count_satellite_nodes(tree, c))
    .sum()
}

/// Flags a subtree as moved, leaving unmovable nodes alone.
pub fn mark_as_moved(tree: &mut Tree, id: NodeId, lang: &dyn Language) {
  if lang.is_unmovable(&tree[id]) {
    return;
  }
  tree[id].moved = true;
  let children = tree[id].children.clone();
  for child in children {
    mark_as_moved(tree, child, lang);
  }
}

/// Renders the tree structure with ids, positions and states.  Used by the
/// `--dump-tree` debugging path.
pub fn dump(tree: &Tree, other: Option<&Tree>) -> String {
  let mut out = String::new();
  dump_node(tree, other, tree.root(), 0, &mut out);
  out
}

fn dump_node(tree: &Tree, other: Option<&Tree>, id: NodeId, lvl: usize, out: &mut String) {
  let node = &tree[id];
  if node.satellite {
    return;
  }

  let suffix = match node.state {
    State::Unchanged => String::new(),
    State::Deleted => " (deleted)".to_string(),
    State::Inserted => " (inserted)".to_string(),
    State::Updated => {
      let partner = node.relative.or(node.buddy);
      match (partner, other) {
        (Some(rel), Some(other)) => format!(" (updated with {})", other[rel].label),
        _ => " (updated)".to_string(),
      }
    }
  };

  let prefix = if lvl > 0 { "`---" } else { "" };
  let _ = writeln!(
    out,
    "{:>pad$}{}[{}]({};{}){}",
    prefix,
    node.label,
    node.po_id,
    node.line,
    node.col,
    suffix,
    pad = 4 * lvl
  );

  for &child in &node.children {
    dump_node(tree, other, child, lvl + 1, out);
  }
}
