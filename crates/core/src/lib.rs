/*!
This crate is the core library for diffscope.

It provides the tree model, the semantic-tree construction, and the two
matchers (change distilling and tree edit distance) used to compare two
versions of a source file, plus the side-by-side printer that renders the
result.  Usually you will only need the diffscope CLI instead of this crate,
but everything here works standalone on trees supplied by any grammar
front-end implementing [`Language`].
*/

pub mod dice;
pub mod distill;
pub mod language;
pub mod printer;
pub mod ptree;
pub mod stree;
pub mod stypes;
pub mod ted;
pub mod tree;
pub mod types;

pub use dice::DiceString;
pub use distill::distill;
pub use language::Language;
pub use printer::{DiffLine, Printer};
pub use ptree::{PNode, PNodeId, ParseError, TreeBuilder};
pub use stree::{build_fine_tree, build_tree};
pub use stypes::SType;
pub use ted::ted;
pub use tree::{Node, NodeId, State, Tree};
pub use types::Type;
