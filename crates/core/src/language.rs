//! Language capability interface.
//!
//! Everything the tree builder and the matchers need to know about a
//! concrete grammar is funnelled through this trait, so the core stays
//! agnostic of any particular front-end.

use crate::ptree::{ParseError, TreeBuilder};
use crate::stypes::SType;
use crate::tree::Node;
use crate::types::Type;

pub trait Language {
  /// Maps a grammar token id to its leaf-token category.
  fn map_token(&self, token: u16) -> Type;

  /// Parses source into a flat parse tree.
  fn parse(&self, contents: &str, file_name: &str) -> Result<TreeBuilder, ParseError>;

  /// Whether the node has no fixed position and can move between internal
  /// nodes as long as the post-order of leaves is preserved.
  fn is_travelling_node(&self, _node: &Node) -> bool {
    false
  }

  /// Whether the node enforces a fixed child schema.
  fn has_fixed_structure(&self, _node: &Node) -> bool {
    false
  }

  /// Whether the child can be collapsed into a single leaf on the given
  /// flattening level.
  fn can_be_flattened(&self, parent: &Node, child: &Node, level: u32) -> bool;

  /// Whether the node must not be marked as moved.
  fn is_unmovable(&self, node: &Node) -> bool;

  /// Whether the node groups siblings on behalf of its parent.
  fn is_container(&self, node: &Node) -> bool;

  /// Whether the node's spelling is meaningfully diffable by render clients.
  fn is_diffable(&self, _node: &Node) -> bool {
    false
  }

  /// Whether the node matches any counterpart of the same kind regardless
  /// of content.
  fn always_matches(&self, node: &Node) -> bool {
    node.stype == SType::TranslationUnit
  }

  /// Whether the child should be replaced in its parent by its own
  /// children.
  fn should_splice(&self, parent: SType, child: &Node) -> bool;

  /// Whether the kind identifies the value child of its parent.
  fn is_value_node(&self, stype: SType) -> bool;

  /// Whether the subtree of a node of this kind lives one layer deeper.
  fn is_layer_break(&self, stype: SType) -> bool;

  /// Whether leading whitespace of the label is dropped for comparison.
  fn should_drop_leading_ws(&self, _stype: SType) -> bool {
    false
  }

  /// Whether nodes of this kind are secondary for comparison.
  fn is_satellite(&self, stype: SType) -> bool;

  fn stype_name(&self, stype: SType) -> &'static str {
    stype.name()
  }
}
