//! Flat parse-tree layer produced by grammar front-ends.
//!
//! A [`TreeBuilder`] is the hand-off point between a parser and the
//! semantic-tree construction: an arena of [`PNode`]s over the original
//! source text, plus a failure flag for inputs the grammar rejected.

use std::ops::Range;

use thiserror::Error;

use crate::stypes::SType;

#[derive(Debug, Error)]
pub enum ParseError {
  /// The grammar rejected the input; no tree is available.
  #[error("syntax error prevented parsing")]
  Syntax,
  /// The grammar itself could not be loaded.
  #[error("grammar rejected by the parser: {0}")]
  Grammar(String),
  #[error("no language is registered for `{0}`")]
  UnsupportedLanguage(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PNodeId(usize);

#[derive(Debug)]
pub struct PNode {
  /// Byte range of this node's spelling within the source.
  pub range: Range<usize>,
  /// 1-based position; 0 for synthetic nodes.
  pub line: u32,
  pub col: u32,
  /// Grammar token id; meaningful for leaves only.
  pub token: u16,
  pub stype: SType,
  pub children: Vec<PNodeId>,
}

pub struct TreeBuilder {
  contents: String,
  nodes: Vec<PNode>,
  root: Option<PNodeId>,
  failed: bool,
}

impl TreeBuilder {
  pub fn new(contents: String) -> Self {
    TreeBuilder {
      contents,
      nodes: Vec::new(),
      root: None,
      failed: false,
    }
  }

  /// Adds a leaf backed by a single token.
  pub fn add_leaf(
    &mut self,
    range: Range<usize>,
    line: u32,
    col: u32,
    token: u16,
    stype: SType,
  ) -> PNodeId {
    self.nodes.push(PNode {
      range,
      line,
      col,
      token,
      stype,
      children: Vec::new(),
    });
    PNodeId(self.nodes.len() - 1)
  }

  /// Adds an internal node spanning its children.
  pub fn add_node(&mut self, children: Vec<PNodeId>, stype: SType) -> PNodeId {
    let range = children
      .iter()
      .map(|&c| self.node(c).range.clone())
      .reduce(|acc, r| acc.start.min(r.start)..acc.end.max(r.end))
      .unwrap_or(0..0);
    self.nodes.push(PNode {
      range,
      line: 0,
      col: 0,
      token: 0,
      stype,
      children,
    });
    PNodeId(self.nodes.len() - 1)
  }

  pub fn set_root(&mut self, root: PNodeId) {
    self.root = Some(root);
  }

  /// Seals the builder; a failed parse invalidates the tree.
  pub fn finish(&mut self, failed: bool) {
    if failed {
      self.failed = true;
    }
  }

  pub fn has_failed(&self) -> bool {
    self.failed || self.root.is_none()
  }

  pub fn root(&self) -> Option<PNodeId> {
    self.root
  }

  pub fn node(&self, id: PNodeId) -> &PNode {
    &self.nodes[id.0]
  }

  pub fn contents(&self) -> &str {
    &self.contents
  }

  /// Source slice behind a node.
  pub fn text(&self, id: PNodeId) -> &str {
    &self.contents[self.node(id).range.clone()]
  }
}
