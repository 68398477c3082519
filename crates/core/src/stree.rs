//! Semantic-tree construction.
//!
//! Promotes the flat parse tree of a [`TreeBuilder`] into a [`Tree`] the
//! matchers operate on.  The language object drives every shaping decision:
//! splicing dissolves grouping layers that add no value, numbered flattening
//! passes collapse structurally uninteresting subtrees into single leaves,
//! and layer breaks protect subtrees that must keep their inner structure.

use crate::language::Language;
use crate::ptree::{PNodeId, ParseError, TreeBuilder};
use crate::tree::{NodeId, Tree};
use crate::types::Type;

/// Number of flattening passes; deeper levels collapse more aggressively.
const FLATTEN_LEVELS: u32 = 4;

/// Builds the layered semantic tree used for coarse-grained comparison.
pub fn build_tree(tb: &TreeBuilder, lang: &dyn Language) -> Result<Tree, ParseError> {
  let mut tree = promote(tb, lang)?;
  let root = tree.root();
  splice(&mut tree, lang, root);
  for level in 0..FLATTEN_LEVELS {
    flatten_pass(&mut tree, lang, root, level);
  }
  Ok(tree)
}

/// Builds the fine-grained tree: a direct promotion without any layering.
pub fn build_fine_tree(tb: &TreeBuilder, lang: &dyn Language) -> Result<Tree, ParseError> {
  promote(tb, lang)
}

fn promote(tb: &TreeBuilder, lang: &dyn Language) -> Result<Tree, ParseError> {
  if tb.has_failed() {
    return Err(ParseError::Syntax);
  }
  let Some(proot) = tb.root() else {
    return Err(ParseError::Syntax);
  };

  let mut tree = Tree::new();
  let root = tree.root();
  convert(tb, lang, &mut tree, proot, root);
  Ok(tree)
}

fn convert(tb: &TreeBuilder, lang: &dyn Language, tree: &mut Tree, pid: PNodeId, id: NodeId) {
  let pnode = tb.node(pid);
  let stype = pnode.stype;
  let spelling = tb.text(pid).to_string();

  if pnode.children.is_empty() {
    let label = if lang.should_drop_leading_ws(stype) {
      spelling.trim_start().to_string()
    } else {
      spelling.clone()
    };
    let node = &mut tree[id];
    node.stype = stype;
    node.satellite = lang.is_satellite(stype);
    node.spelling = spelling;
    node.label = label;
    node.line = pnode.line;
    node.col = pnode.col;
    node.ty = lang.map_token(pnode.token);
    return;
  }

  let mut children = Vec::with_capacity(pnode.children.len());
  for &pchild in &pnode.children {
    let cid = tree.make_node();
    convert(tb, lang, tree, pchild, cid);
    children.push(cid);
  }

  let value_child = children
    .iter()
    .position(|&c| lang.is_value_node(tree[c].stype));

  let node = &mut tree[id];
  node.stype = stype;
  node.satellite = lang.is_satellite(stype);
  node.spelling = spelling;
  node.children = children;
  node.value_child = value_child;
}

fn splice(tree: &mut Tree, lang: &dyn Language, id: NodeId) {
  let stype = tree[id].stype;
  // child positions of a fixed-structure node are a schema, leave them be
  let mut i = 0;
  while i < tree[id].children.len() && !lang.has_fixed_structure(&tree[id]) {
    let child = tree[id].children[i];
    if !tree[child].is_leaf() && lang.should_splice(stype, &tree[child]) {
      let grandchildren = tree[child].children.clone();
      tree[id].children.splice(i..=i, grandchildren);
      // re-examine the same position, a spliced-in child may splice again
      continue;
    }
    i += 1;
  }

  let children = tree[id].children.clone();
  let value_child = children
    .iter()
    .position(|&c| lang.is_value_node(tree[c].stype));
  tree[id].value_child = value_child;

  for child in children {
    splice(tree, lang, child);
  }
}

fn flatten_pass(tree: &mut Tree, lang: &dyn Language, id: NodeId, level: u32) {
  let children = tree[id].children.clone();
  for child in children {
    if tree[child].is_leaf() {
      continue;
    }
    // a layer break keeps its own shape and pushes flattening inside
    if !lang.is_layer_break(tree[child].stype)
      && lang.can_be_flattened(&tree[id], &tree[child], level)
    {
      flatten(tree, lang, child);
    } else {
      flatten_pass(tree, lang, child, level);
    }
  }
}

/// Collapses a subtree into a single leaf whose label is the raw source
/// slice of the whole construct.
fn flatten(tree: &mut Tree, lang: &dyn Language, id: NodeId) {
  let (line, col) = first_position(tree, id);
  let stype = tree[id].stype;
  let label = if lang.should_drop_leading_ws(stype) {
    tree[id].spelling.trim_start().to_string()
  } else {
    tree[id].spelling.clone()
  };

  let node = &mut tree[id];
  node.label = label;
  node.children.clear();
  node.value_child = None;
  node.line = line;
  node.col = col;
  node.ty = Type::Virtual;
}

fn first_position(tree: &Tree, id: NodeId) -> (u32, u32) {
  let node = &tree[id];
  if node.line != 0 && node.col != 0 {
    return (node.line, node.col);
  }
  for &child in &node.children {
    let pos = first_position(tree, child);
    if pos != (0, 0) {
      return pos;
    }
  }
  (0, 0)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::stypes::SType;
  use crate::testing::{ptree_of, TestLang};

  #[test]
  fn failed_parse_stops_the_pipeline() {
    let mut tb = TreeBuilder::new("int x ==".to_string());
    let r = tb.add_node(Vec::new(), SType::TranslationUnit);
    tb.set_root(r);
    tb.finish(true);
    assert!(matches!(
      build_tree(&tb, &TestLang),
      Err(ParseError::Syntax)
    ));
  }

  #[test]
  fn promotion_keeps_positions_and_kinds() {
    let tb = ptree_of("f ( x )");
    let tree = build_fine_tree(&tb, &TestLang).unwrap();
    let root = tree.root();
    assert_eq!(tree[root].stype, SType::TranslationUnit);
    assert_eq!(tree[root].children.len(), 4);
    let first = tree[root].children[0];
    assert_eq!(tree[first].label, "f");
    assert_eq!((tree[first].line, tree[first].col), (1, 1));
  }

  #[test]
  fn satellites_are_classified_during_promotion() {
    let tb = ptree_of("f ( x )");
    let tree = build_fine_tree(&tb, &TestLang).unwrap();
    let root = tree.root();
    let satellites: Vec<bool> = tree[root]
      .children
      .iter()
      .map(|&c| tree[c].satellite)
      .collect();
    assert_eq!(satellites, [false, true, false, true]);
  }

  #[test]
  fn splicing_dissolves_temporary_containers() {
    // TranslationUnit -> TemporaryContainer -> (a b) becomes
    // TranslationUnit -> (a b)
    let mut tb = TreeBuilder::new("a b".to_string());
    let a = tb.add_leaf(0..1, 1, 1, 1, SType::None);
    let b = tb.add_leaf(2..3, 1, 3, 1, SType::None);
    let tmp = tb.add_node(vec![a, b], SType::TemporaryContainer);
    let root = tb.add_node(vec![tmp], SType::TranslationUnit);
    tb.set_root(root);
    tb.finish(false);

    let tree = build_tree(&tb, &TestLang).unwrap();
    let root = tree.root();
    let labels: Vec<_> = tree[root]
      .children
      .iter()
      .map(|&c| tree[c].label.clone())
      .collect();
    assert_eq!(labels, ["a", "b"]);
  }

  #[test]
  fn flattening_collapses_statements_into_leaves() {
    // a statement subtree turns into one leaf labeled with its source slice
    let mut tb = TreeBuilder::new("x = 1 ;".to_string());
    let x = tb.add_leaf(0..1, 1, 1, 1, SType::None);
    let eq = tb.add_leaf(2..3, 1, 3, 3, SType::None);
    let one = tb.add_leaf(4..5, 1, 5, 4, SType::None);
    let semi = tb.add_leaf(6..7, 1, 7, 2, SType::Separator);
    let stmt = tb.add_node(vec![x, eq, one, semi], SType::ExprStatement);
    let root = tb.add_node(vec![stmt], SType::TranslationUnit);
    tb.set_root(root);
    tb.finish(false);

    let tree = build_tree(&tb, &TestLang).unwrap();
    let root = tree.root();
    assert_eq!(tree[root].children.len(), 1);
    let stmt = tree[root].children[0];
    assert!(tree[stmt].is_leaf());
    assert_eq!(tree[stmt].label, "x = 1 ;");
    assert_eq!((tree[stmt].line, tree[stmt].col), (1, 1));
    assert_eq!(tree[stmt].ty, Type::Virtual);
  }

  #[test]
  fn layer_breaks_are_never_flattened() {
    // CompoundStatement is a layer break for TestLang: the statement inside
    // it still flattens, the compound itself keeps its structure
    let mut tb = TreeBuilder::new("{ x ; }".to_string());
    let open = tb.add_leaf(0..1, 1, 1, 2, SType::Punctuation);
    let x = tb.add_leaf(2..3, 1, 3, 1, SType::None);
    let semi = tb.add_leaf(4..5, 1, 5, 2, SType::Separator);
    let stmt = tb.add_node(vec![x, semi], SType::ExprStatement);
    let close = tb.add_leaf(6..7, 1, 7, 2, SType::Punctuation);
    let block = tb.add_node(vec![open, stmt, close], SType::CompoundStatement);
    let root = tb.add_node(vec![block], SType::TranslationUnit);
    tb.set_root(root);
    tb.finish(false);

    let tree = build_tree(&tb, &TestLang).unwrap();
    let root = tree.root();
    let block = tree[root].children[0];
    assert!(!tree[block].is_leaf());
    let stmt = tree[block].children[1];
    assert!(tree[stmt].is_leaf());
    assert_eq!(tree[stmt].label, "x ;");
  }

  #[test]
  fn value_children_are_recorded() {
    let mut tb = TreeBuilder::new("int x".to_string());
    let int = tb.add_leaf(0..3, 1, 1, 5, SType::None);
    let x = tb.add_leaf(4..5, 1, 5, 1, SType::None);
    let decl = tb.add_node(vec![x], SType::Declarator);
    let def = tb.add_node(vec![int, decl], SType::Declaration);
    let root = tb.add_node(vec![def], SType::TranslationUnit);
    tb.set_root(root);
    tb.finish(false);

    let tree = build_fine_tree(&tb, &TestLang).unwrap();
    let root = tree.root();
    let def = tree[root].children[0];
    assert_eq!(tree[def].value_child, Some(1));
    let value = tree[def].value().unwrap();
    assert_eq!(tree[value].stype, SType::Declarator);
  }
}
