//! Change distilling: heuristic matching of two semantic trees.
//!
//! The matcher works in phases that prefer cheap, highly confident matches
//! first and widen the net later: leaves are paired by label similarity,
//! internal nodes by the overlap of their already-matched leaves, and a
//! final sweep picks up internal nodes with any common leaf at all.  The
//! whole sequence runs twice; the second pass re-sorts leaf candidates with
//! tie-breakers that only become available once parent structure from the
//! first pass is known.  This two-pass discipline is part of the algorithm,
//! not an optimization.

use std::cmp::Ordering;

use crate::dice::DiceString;
use crate::language::Language;
use crate::stypes::SType;
use crate::tree::{
  count_satellite_nodes, lml, mark_as_moved, post_order_and_init, Node, NodeId, State, Tree,
};
use crate::types::Type;

struct Candidate {
  /// Post-order indices into the two trees.
  x: usize,
  y: usize,
  similarity: f32,
  common: usize,
  /// Whether first-pass results matched the parents of this pair to each
  /// other.  Captured between the passes.
  consistent: bool,
}

/// Matches the nodes of `t1` against `t2`, leaving every non-satellite node
/// with a final [`State`] and matched pairs linked through `relative`.
///
/// Matching cannot fail: the worst outcome is a fully deleted/inserted pair
/// of trees, which is a valid result.
pub fn distill(t1: &mut Tree, t2: &mut Tree, lang: &dyn Language) {
  let po1 = post_order_and_init(t1);
  let po2 = post_order_and_init(t2);

  let dice1: Vec<DiceString> = po1.iter().map(|&id| DiceString::new(&t1[id].label)).collect();
  let dice2: Vec<DiceString> = po2.iter().map(|&id| DiceString::new(&t2[id].label)).collect();

  let mut candidates = collect_leaf_candidates(t1, t2, &po1, &po2, &dice1, &dice2);
  sort_candidates(&mut candidates, false);

  distill_leafs(t1, t2, &po1, &po2, &candidates);
  distill_internal(t1, t2, &po1, &po2, &dice1, &dice2, lang);
  distill_internal_extra(t1, t2, &po1, &po2, &dice1, &dice2);

  for c in &mut candidates {
    let xp = t1[po1[c.x]].parent;
    let yp = t2[po2[c.y]].parent;
    c.consistent = match xp {
      Some(p) => t1[p].relative == yp,
      None => yp.is_none(),
    };
  }

  let (r1, r2) = (t1.root(), t2.root());
  clear(t1, r1);
  clear(t2, r2);
  sort_candidates(&mut candidates, true);

  distill_leafs(t1, t2, &po1, &po2, &candidates);
  distill_internal(t1, t2, &po1, &po2, &dice1, &dice2, lang);
  distill_internal_extra(t1, t2, &po1, &po2, &dice1, &dice2);

  for &x in &po1 {
    if t1[x].relative.is_none() {
      mark_node(t1, x, State::Deleted);
    }
  }
  for &y in &po2 {
    if t2[y].relative.is_none() {
      mark_node(t2, y, State::Inserted);
    }
  }

  detect_moves(t1, t2, &po1, lang);
}

/// Flags matched children whose order crossed under a matched parent, so
/// the renderer can tell a move from an edit.  Travelling nodes relocate
/// freely and fixed-structure parents renumber rather than reorder.
fn detect_moves(t1: &mut Tree, t2: &mut Tree, po1: &[NodeId], lang: &dyn Language) {
  for &x in po1 {
    if t1[x].is_leaf() || lang.has_fixed_structure(&t1[x]) {
      continue;
    }
    let Some(y) = t1[x].relative else {
      continue;
    };

    let y_children = t2[y].children.clone();
    let children = t1[x].children.clone();
    let mut last = None;
    for child in children {
      if t1[child].satellite || lang.is_travelling_node(&t1[child]) {
        continue;
      }
      let Some(rel) = t1[child].relative else {
        continue;
      };
      let Some(pos) = y_children.iter().position(|&c| c == rel) else {
        continue;
      };
      match last {
        Some(prev) if pos < prev => {
          mark_as_moved(t1, child, lang);
          mark_as_moved(t2, rel, lang);
        }
        _ => last = Some(pos),
      }
    }
  }
}

fn can_match(x: &Node, y: &Node) -> bool {
  let xt = x.ty.canonize();
  let yt = y.ty.canonize();

  if xt != Type::Virtual && xt == yt && x.label == y.label {
    return true;
  }

  if xt >= Type::NonInterchangeable || yt >= Type::NonInterchangeable || xt != yt {
    return false;
  }

  if xt == Type::Virtual && x.stype != y.stype {
    return false;
  }

  true
}

fn collect_leaf_candidates(
  t1: &Tree,
  t2: &Tree,
  po1: &[NodeId],
  po2: &[NodeId],
  dice1: &[DiceString],
  dice2: &[DiceString],
) -> Vec<Candidate> {
  let mut candidates = Vec::new();
  for (xi, &x) in po1.iter().enumerate() {
    if !t1[x].is_leaf() {
      continue;
    }
    for (yi, &y) in po2.iter().enumerate() {
      if !t2[y].is_leaf() {
        continue;
      }
      if !can_match(&t1[x], &t2[y]) {
        continue;
      }
      let similarity = dice1[xi].compare(&dice2[yi]);
      if similarity >= 0.6 || (t1[x].ty != Type::Virtual && t2[y].ty != Type::Virtual) {
        let common = common_area_size(t1, t2, po1, po2, xi, yi);
        candidates.push(Candidate {
          x: xi,
          y: yi,
          similarity,
          common,
          consistent: false,
        });
      }
    }
  }
  candidates
}

/// Number of consecutive label-equal neighbours around a candidate pair.
/// The walk is backward only.
fn common_area_size(t1: &Tree, t2: &Tree, po1: &[NodeId], po2: &[NodeId], x: usize, y: usize) -> usize {
  let mut size = 1;
  let mut i = x as isize - 1;
  let mut j = y as isize - 1;
  while i >= 0 && j >= 0 && t1[po1[i as usize]].label == t2[po2[j as usize]].label {
    size += 1;
    i -= 1;
    j -= 1;
  }
  size
}

/// Descending similarity, quantized so near-equal scores fall into the same
/// bucket and defer to the contextual tie-breakers.
fn sort_candidates(candidates: &mut [Candidate], enriched: bool) {
  candidates.sort_by(|a, b| {
    let ka = (a.similarity * 100.0).round() as i32;
    let kb = (b.similarity * 100.0).round() as i32;
    kb.cmp(&ka)
      .then_with(|| b.common.cmp(&a.common))
      .then_with(|| {
        if enriched {
          b.consistent.cmp(&a.consistent)
        } else {
          Ordering::Equal
        }
      })
  });
}

fn distill_leafs(t1: &mut Tree, t2: &mut Tree, po1: &[NodeId], po2: &[NodeId], candidates: &[Candidate]) {
  for c in candidates {
    let (x, y) = (po1[c.x], po2[c.y]);
    if t1[x].relative.is_some() || t2[y].relative.is_some() {
      continue;
    }

    t1[x].relative = Some(y);
    t2[y].relative = Some(x);

    let state = if c.similarity == 1.0 && t1[x].label == t2[y].label {
      State::Unchanged
    } else {
      State::Updated
    };
    t1[x].state = state;
    t2[y].state = state;
  }
}

fn unmatched_internal(tree: &Tree, id: NodeId) -> bool {
  !tree[id].children.is_empty() && tree[id].relative.is_none()
}

/// Relative that `x`'s container parent requires `y`'s parent value to be.
fn container_requirement(t1: &Tree, lang: &dyn Language, x: NodeId) -> Option<NodeId> {
  if !lang.is_container(&t1[x]) {
    return None;
  }
  let parent = t1[x].parent?;
  let value = t1[parent].value()?;
  t1[value].relative
}

fn parent_value(tree: &Tree, id: NodeId) -> Option<NodeId> {
  let parent = tree[id].parent?;
  tree[parent].value()
}

fn distill_internal(
  t1: &mut Tree,
  t2: &mut Tree,
  po1: &[NodeId],
  po2: &[NodeId],
  dice1: &[DiceString],
  dice2: &[DiceString],
  lang: &dyn Language,
) {
  for xi in 0..po1.len() {
    let x = po1[xi];
    if !unmatched_internal(t1, x) {
      continue;
    }

    for (yi, &y) in po2.iter().enumerate() {
      if !unmatched_internal(t2, y) || !can_match(&t1[x], &t2[y]) {
        continue;
      }

      let state;
      if lang.always_matches(&t2[y]) {
        state = State::Unchanged;
      } else if let Some(required) = container_requirement(t1, lang, x) {
        // a container follows its parent's value: the counterpart must hang
        // under the node that value is matched to
        if parent_value(t2, y) != Some(required) {
          continue;
        }
        state = State::Unchanged;
      } else {
        let x_from = lml(t1, x);
        let x_po = t1[x].po_id;
        let y_po = t2[y].po_id;

        let mut common = 0usize;
        let mut y_leaves = 0usize;
        for i in lml(t2, y)..y_po {
          let n = po2[i];
          if !t2[n].is_leaf() {
            continue;
          }
          y_leaves += 1;

          if let Some(p) = t2[n].parent {
            if t2[p].relative.is_none() {
              // skip children of unmatched internal nodes
              continue;
            }
          }

          let Some(rel) = t2[n].relative else {
            continue;
          };
          let rel_po = t1[rel].po_id;
          if rel_po >= x_from && rel_po < x_po {
            common += 1;
          }
        }

        let mut x_leaves = po1[x_from..x_po]
          .iter()
          .filter(|&&id| t1[id].is_leaf())
          .count();

        let x_extra = count_satellite_nodes(t1, x);
        let y_extra = count_satellite_nodes(t2, y);
        x_leaves += x_extra;
        y_leaves += y_extra;
        common += x_extra.min(y_extra);

        let threshold = if x_leaves.min(y_leaves) <= 4 { 0.4 } else { 0.6 };

        let similarity2 = common as f32 / x_leaves.max(y_leaves) as f32;
        if similarity2 < threshold {
          continue;
        }

        let similarity1 = dice1[xi].compare(&dice2[yi]);
        if similarity1 < 0.6 && similarity2 < 0.8 {
          continue;
        }

        state = if similarity1 == 1.0 && t1[x].label == t2[y].label && similarity2 == 1.0 {
          State::Unchanged
        } else {
          State::Updated
        };
      }

      mark_node(t1, x, state);
      mark_node(t2, y, state);

      t1[x].relative = Some(y);
      t2[y].relative = Some(x);

      break;
    }
  }
}

/// Second sweep: once internal nodes are matched properly, pair up internal
/// nodes that still share at least one common leaf.
fn distill_internal_extra(
  t1: &mut Tree,
  t2: &mut Tree,
  po1: &[NodeId],
  po2: &[NodeId],
  dice1: &[DiceString],
  dice2: &[DiceString],
) {
  struct Extra {
    x: usize,
    y: usize,
    common: usize,
  }

  let mut extras = Vec::new();

  for (xi, &x) in po1.iter().enumerate() {
    if !unmatched_internal(t1, x) {
      continue;
    }

    for (yi, &y) in po2.iter().enumerate() {
      if !unmatched_internal(t2, y) || !can_match(&t1[x], &t2[y]) {
        continue;
      }

      let x_from = lml(t1, x);
      let x_po = t1[x].po_id;
      let mut common = 0usize;
      for i in lml(t2, y)..t2[y].po_id {
        let n = po2[i];
        if !t2[n].is_leaf() {
          continue;
        }
        let Some(rel) = t2[n].relative else {
          continue;
        };
        let rel_po = t1[rel].po_id;
        if rel_po >= x_from && rel_po < x_po {
          common += 1;
        }
      }

      let similarity = dice1[xi].compare(&dice2[yi]);
      if common > 0 && similarity >= 0.5 {
        extras.push(Extra { x: xi, y: yi, common });
      }
    }
  }

  extras.sort_by(|a, b| b.common.cmp(&a.common));

  for e in extras {
    let (x, y) = (po1[e.x], po2[e.y]);
    if t1[x].relative.is_some() || t2[y].relative.is_some() {
      continue;
    }
    mark_node(t1, x, State::Unchanged);
    mark_node(t2, y, State::Unchanged);
    t1[x].relative = Some(y);
    t2[y].relative = Some(x);
  }
}

/// Applies a state to a node and propagates it onto satellite children,
/// re-threading `parent` links along the way.
pub(crate) fn mark_node(tree: &mut Tree, id: NodeId, state: State) {
  tree[id].state = state;

  let leaf_state = if state == State::Updated {
    State::Unchanged
  } else {
    state
  };

  let children = tree[id].children.clone();
  let has_value = tree[id].has_value();
  for child in children {
    tree[child].parent = Some(id);
    if tree[child].satellite
      && (tree[child].stype == SType::None || has_value || tree[child].relative.is_none())
    {
      tree[child].state = leaf_state;
    }
  }
}

fn clear(tree: &mut Tree, id: NodeId) {
  if tree[id].satellite {
    return;
  }
  tree[id].relative = None;
  tree[id].state = State::Unchanged;
  let children = tree[id].children.clone();
  for child in children {
    clear(tree, child);
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::testing::{internal, leaf, set_root, TestLang};

  fn matched_pair(t1: &Tree, t2: &Tree, x: NodeId) -> Option<NodeId> {
    let y = t1[x].relative?;
    assert_eq!(t2[y].relative, Some(x), "relative links must be mutual");
    Some(y)
  }

  fn check_side(tree: &Tree, other: &Tree, own: State) {
    for i in 0..tree.len() {
      let id = NodeId::from_raw(i);
      let node = &tree[id];
      if node.satellite {
        continue;
      }
      match node.relative {
        Some(rel) => {
          assert!(matches!(node.state, State::Unchanged | State::Updated));
          assert_eq!(other[rel].relative, Some(id));
        }
        None => assert_eq!(node.state, own),
      }
    }
  }

  fn assert_totality(t1: &Tree, t2: &Tree) {
    check_side(t1, t2, State::Deleted);
    check_side(t2, t1, State::Inserted);
  }

  #[test]
  fn pure_rename_of_a_leaf() {
    // `int x;` vs `int y;`
    let mut t1 = Tree::new();
    let ty1 = leaf(&mut t1, "int", Type::Types);
    let id1 = leaf(&mut t1, "x", Type::Identifiers);
    set_root(&mut t1, vec![ty1, id1]);

    let mut t2 = Tree::new();
    let ty2 = leaf(&mut t2, "int", Type::Types);
    let id2 = leaf(&mut t2, "y", Type::Identifiers);
    set_root(&mut t2, vec![ty2, id2]);

    distill(&mut t1, &mut t2, &TestLang);

    assert_eq!(t1[ty1].state, State::Unchanged);
    assert_eq!(matched_pair(&t1, &t2, ty1), Some(ty2));
    assert_eq!(t1[id1].state, State::Updated);
    assert_eq!(t2[id2].state, State::Updated);
    assert_eq!(matched_pair(&t1, &t2, id1), Some(id2));
    assert_totality(&t1, &t2);
  }

  #[test]
  fn addition_only_inserts() {
    let mut t1 = Tree::new();
    let s1 = leaf(&mut t1, "a = 1 ;", Type::Virtual);
    t1[s1].stype = SType::ExprStatement;
    set_root(&mut t1, vec![s1]);

    let mut t2 = Tree::new();
    let s2 = leaf(&mut t2, "a = 1 ;", Type::Virtual);
    t2[s2].stype = SType::ExprStatement;
    let added = leaf(&mut t2, "int b ;", Type::Virtual);
    t2[added].stype = SType::ExprStatement;
    set_root(&mut t2, vec![s2, added]);

    distill(&mut t1, &mut t2, &TestLang);

    assert_eq!(t1[s1].state, State::Unchanged);
    assert_eq!(matched_pair(&t1, &t2, s1), Some(s2));
    assert_eq!(t2[added].state, State::Inserted);
    assert_eq!(t2[added].relative, None);
    let (r1, r2) = (t1.root(), t2.root());
    assert_eq!(t1[r1].state, State::Unchanged);
    assert_eq!(t2[r2].state, State::Unchanged);
    assert_totality(&t1, &t2);
  }

  #[test]
  fn statement_reorder_keeps_both_unchanged() {
    let mut t1 = Tree::new();
    let a1 = leaf(&mut t1, "x = 1 ;", Type::Virtual);
    t1[a1].stype = SType::ExprStatement;
    let b1 = leaf(&mut t1, "y = 2 ;", Type::Virtual);
    t1[b1].stype = SType::ExprStatement;
    set_root(&mut t1, vec![a1, b1]);

    let mut t2 = Tree::new();
    let b2 = leaf(&mut t2, "y = 2 ;", Type::Virtual);
    t2[b2].stype = SType::ExprStatement;
    let a2 = leaf(&mut t2, "x = 1 ;", Type::Virtual);
    t2[a2].stype = SType::ExprStatement;
    set_root(&mut t2, vec![b2, a2]);

    distill(&mut t1, &mut t2, &TestLang);

    // relatives cross, everything stays unchanged
    assert_eq!(t1[a1].state, State::Unchanged);
    assert_eq!(t1[b1].state, State::Unchanged);
    assert_eq!(matched_pair(&t1, &t2, a1), Some(a2));
    assert_eq!(matched_pair(&t1, &t2, b1), Some(b2));
    let root = t1.root();
    assert_eq!(t1[root].state, State::Unchanged);

    // the crossing statement is flagged as moved for the renderer
    assert!(t1[b1].moved);
    assert!(t2[b2].moved);
    assert!(!t1[a1].moved);
    assert_totality(&t1, &t2);
  }

  #[test]
  fn root_always_matches_despite_different_content() {
    let mut t1 = Tree::new();
    let s1 = leaf(&mut t1, "alpha ;", Type::Virtual);
    t1[s1].stype = SType::ExprStatement;
    set_root(&mut t1, vec![s1]);

    let mut t2 = Tree::new();
    let s2 = leaf(&mut t2, "omega ( ) ;", Type::Virtual);
    t2[s2].stype = SType::ExprStatement;
    set_root(&mut t2, vec![s2]);

    distill(&mut t1, &mut t2, &TestLang);

    let (r1, r2) = (t1.root(), t2.root());
    assert_eq!(t1[r1].state, State::Unchanged);
    assert_eq!(matched_pair(&t1, &t2, r1), Some(r2));
    assert_eq!(t1[s1].state, State::Deleted);
    assert_eq!(t2[s2].state, State::Inserted);
    assert_totality(&t1, &t2);
  }

  #[test]
  fn self_match_is_identity() {
    let build = || {
      let mut t = Tree::new();
      let ty = leaf(&mut t, "int", Type::Types);
      let name = leaf(&mut t, "x", Type::Identifiers);
      let decl = internal(&mut t, SType::Declaration, vec![ty, name]);
      let s = leaf(&mut t, "x = compute ( 1 ) ;", Type::Virtual);
      t[s].stype = SType::ExprStatement;
      set_root(&mut t, vec![decl, s]);
      t
    };
    let mut t1 = build();
    let mut t2 = build();

    distill(&mut t1, &mut t2, &TestLang);

    for i in 0..t1.len() {
      let id = crate::tree::NodeId::from_raw(i);
      assert_eq!(t1[id].state, State::Unchanged, "node {i} changed");
      // identically built arenas pair up index by index
      assert_eq!(t1[id].relative, Some(id));
    }
    assert_totality(&t1, &t2);
  }

  #[test]
  fn container_matches_through_its_parents_value() {
    // two functions with identical bodies: each body must match the body of
    // the function whose name matched, not the other one
    let mut t1 = Tree::new();
    build_into(&mut t1, &["f", "g"], "ping ( ) ;");
    let mut t2 = Tree::new();
    build_into(&mut t2, &["g", "f"], "ping ( ) ;");

    distill(&mut t1, &mut t2, &TestLang);

    // find the two bodies in t1 and check each follows its function's name
    for i in 0..t1.len() {
      let id = crate::tree::NodeId::from_raw(i);
      if t1[id].stype != SType::CompoundStatement {
        continue;
      }
      let body_rel = t1[id].relative.expect("bodies must match");
      let def = t1[id].parent.expect("threaded parent");
      let name = t1[def].value().expect("function value");
      let name_rel = t1[name].relative.expect("names must match");
      let other_def = t2[body_rel].parent.expect("threaded parent");
      assert_eq!(t2[other_def].value(), Some(name_rel));
    }
    assert_totality(&t1, &t2);
  }

  // helper used by the container test
  fn build_into(t: &mut Tree, names: &[&str], body: &str) -> Vec<NodeId> {
    let mut defs = Vec::new();
    for name in names {
      let id = leaf(t, name, Type::Functions);
      let declarator = internal(t, SType::Declarator, vec![id]);
      let stmt = leaf(t, body, Type::Virtual);
      t[stmt].stype = SType::ExprStatement;
      let block = internal(t, SType::CompoundStatement, vec![stmt]);
      let def = internal(t, SType::FunctionDefinition, vec![declarator, block]);
      t[def].value_child = Some(0);
      defs.push(def);
    }
    set_root(t, defs.clone());
    defs
  }
}
