//! Zhang–Shasha tree edit distance with full backtracking.
//!
//! The forward pass computes the classic keyroot-driven forest tables and
//! fills the tree-distance table.  The backward pass recovers which edit
//! produced each node: it regenerates only the forest tables that are needed
//! to trace the solution, starting from the cell holding the answer, and
//! splits the trace whenever a subtree boundary is crossed.

use std::collections::BTreeMap;

use crate::tree::{post_order, NodeId, State, Tree};

const WDEL: usize = 1;
const WINS: usize = 1;
const WREN: usize = 1;

#[derive(Clone, Copy)]
struct Change {
  cost: usize,
  // keyroot pair whose forest pass produced this cell
  i: usize,
  j: usize,
}

type Queue = BTreeMap<(usize, usize), Vec<(isize, isize)>>;

/// Computes the edit distance between two trees and marks every node with
/// the edit that maps one tree onto the other.  Renamed pairs are linked
/// through `buddy`.
pub fn ted(t1: &mut Tree, t2: &mut Tree) -> usize {
  let po1 = post_order(t1);
  let po2 = post_order(t2);

  let l1 = lmld(t1, &po1);
  let l2 = lmld(t2, &po2);

  let n1 = po1.len();
  let n2 = po2.len();

  let mut td = vec![
    vec![
      Change {
        cost: usize::MAX,
        i: 0,
        j: 0
      };
      n2
    ];
    n1
  ];

  let k1 = make_kr(&l1, count_leaves(t1, &po1));
  let k2 = make_kr(&l2, count_leaves(t2, &po2));

  // forest table, shifted by one so row/column -1 lands on index 0
  let mut fd = vec![vec![0usize; n2 + 1]; n1 + 1];

  for &x in &k1 {
    for &y in &k2 {
      forest_dist(x, y, &l1, &l2, &mut td, &mut fd, t1, t2, &po1, &po2);
    }
  }

  let mut queue: Queue = BTreeMap::new();
  queue
    .entry((k1[k1.len() - 1], k2[k2.len() - 1]))
    .or_default()
    .push((n1 as isize - 1, n2 as isize - 1));
  while let Some((key, entries)) = queue.pop_last() {
    backtrack_forests(key, entries, &l1, &l2, &td, &mut fd, t1, t2, &po1, &po2, &mut queue);
  }

  td[n1 - 1][n2 - 1].cost
}

/// Leftmost-leaf descendant (by post-order index) for every node.
fn lmld(tree: &Tree, po: &[NodeId]) -> Vec<usize> {
  let mut l = vec![0usize; po.len()];
  for (idx, &id) in po.iter().enumerate() {
    let first = tree[id]
      .children
      .iter()
      .copied()
      .find(|&c| !tree[c].satellite);
    l[idx] = match first {
      Some(child) => l[tree[child].po_id],
      None => idx,
    };
  }
  l
}

/// Number of nodes with no non-satellite children.
fn count_leaves(tree: &Tree, po: &[NodeId]) -> usize {
  po.iter()
    .filter(|&&id| tree[id].children.iter().all(|&c| tree[c].satellite))
    .count()
}

/// Keyroots: nodes whose leftmost leaf is not the leftmost leaf of any
/// larger node, found by a right-to-left scan emitting first-seen values.
fn make_kr(l: &[usize], leaves: usize) -> Vec<usize> {
  let mut visited = vec![false; l.len()];
  let mut kr = Vec::with_capacity(leaves);

  let mut k = leaves;
  let mut i = l.len() - 1;
  loop {
    if k == 0 {
      break;
    }
    if !visited[l[i]] {
      kr.push(i);
      visited[l[i]] = true;
      k -= 1;
    }
    if i == 0 {
      break;
    }
    i -= 1;
  }

  kr.sort_unstable();
  kr
}

fn rename_cost(t1: &Tree, t2: &Tree, x: NodeId, y: NodeId) -> usize {
  if t1[x].label == t2[y].label {
    0
  } else {
    WREN
  }
}

#[allow(clippy::too_many_arguments)]
fn forest_dist(
  i: usize,
  j: usize,
  l1: &[usize],
  l2: &[usize],
  td: &mut [Vec<Change>],
  fd: &mut [Vec<usize>],
  t1: &Tree,
  t2: &Tree,
  po1: &[NodeId],
  po2: &[NodeId],
) {
  let li = l1[i];
  let lj = l2[j];

  fd[li][lj] = 0;
  for di in li..=i {
    fd[di + 1][lj] = fd[di][lj] + WDEL;
  }
  for dj in lj..=j {
    fd[li][dj + 1] = fd[li][dj] + WINS;
  }

  for di in li..=i {
    let ldi = l1[di];
    for dj in lj..=j {
      let ldj = l2[dj];
      if ldi == li && ldj == lj {
        let ren = rename_cost(t1, t2, po1[di], po2[dj]);
        let cost = (fd[di][dj + 1] + WDEL)
          .min(fd[di + 1][dj] + WINS)
          .min(fd[di][dj] + ren);
        fd[di + 1][dj + 1] = cost;
        td[di][dj] = Change { cost, i, j };
      } else {
        fd[di + 1][dj + 1] = (fd[di][dj + 1] + WDEL)
          .min(fd[di + 1][dj] + WINS)
          .min(fd[ldi][ldj] + td[di][dj].cost);
      }
    }
  }
}

#[allow(clippy::too_many_arguments)]
fn backtrack_forests(
  (i, j): (usize, usize),
  entries: Vec<(isize, isize)>,
  l1: &[usize],
  l2: &[usize],
  td: &[Vec<Change>],
  fd: &mut [Vec<usize>],
  t1: &mut Tree,
  t2: &mut Tree,
  po1: &[NodeId],
  po2: &[NodeId],
  queue: &mut Queue,
) {
  let li = l1[i];
  let lj = l2[j];

  // identical to the forward pass, except the tree table is final by now
  // and is only read
  fd[li][lj] = 0;
  for di in li..=i {
    fd[di + 1][lj] = fd[di][lj] + WDEL;
  }
  for dj in lj..=j {
    fd[li][dj + 1] = fd[li][dj] + WINS;
  }
  for di in li..=i {
    for dj in lj..=j {
      if l1[di] == li && l2[dj] == lj {
        let ren = rename_cost(t1, t2, po1[di], po2[dj]);
        fd[di + 1][dj + 1] = (fd[di][dj + 1] + WDEL)
          .min(fd[di + 1][dj] + WINS)
          .min(fd[di][dj] + ren);
      } else {
        fd[di + 1][dj + 1] = (fd[di][dj + 1] + WDEL)
          .min(fd[di + 1][dj] + WINS)
          .min(fd[l1[di]][l2[dj]] + td[di][dj].cost);
      }
    }
  }

  let bottom_i = li as isize - 1;
  let bottom_j = lj as isize - 1;

  for (mut di, mut dj) in entries {
    while di > bottom_i || dj > bottom_j {
      let f = |a: isize, b: isize| fd[(a + 1) as usize][(b + 1) as usize];
      if di == bottom_i {
        t2[po2[dj as usize]].state = State::Inserted;
        dj -= 1;
      } else if dj == bottom_j {
        t1[po1[di as usize]].state = State::Deleted;
        di -= 1;
      } else if l1[di as usize] == li && l2[dj as usize] == lj {
        if f(di, dj) == f(di - 1, dj) + WDEL {
          t1[po1[di as usize]].state = State::Deleted;
          di -= 1;
        } else if f(di, dj) == f(di, dj - 1) + WINS {
          t2[po2[dj as usize]].state = State::Inserted;
          dj -= 1;
        } else if f(di, dj) != f(di - 1, dj - 1) {
          let (x, y) = (po1[di as usize], po2[dj as usize]);
          t1[x].buddy = Some(y);
          t2[y].buddy = Some(x);
          t1[x].state = State::Updated;
          t2[y].state = State::Updated;
          di -= 1;
          dj -= 1;
        } else {
          di -= 1;
          dj -= 1;
        }
      } else if f(di, dj) == f(di - 1, dj) + WDEL {
        t1[po1[di as usize]].state = State::Deleted;
        di -= 1;
      } else if f(di, dj) == f(di, dj - 1) + WINS {
        t2[po2[dj as usize]].state = State::Inserted;
        dj -= 1;
      } else {
        // subtree boundary: hand the rest of this trace to the keyroot
        // pair that owns the boundary cell
        let change = td[di as usize][dj as usize];
        queue.entry((change.i, change.j)).or_default().push((di, dj));
        di = l1[di as usize] as isize - 1;
        dj = l2[dj as usize] as isize - 1;
      }
    }
  }
}
