/*!
This crate defines the languages diffscope can compare.

Each language is a thin capability object over a tree-sitter grammar: it
parses source into the parse-tree layer of diffscope-core and answers the
structural queries that drive semantic-tree construction and matching.  The
two C-family grammars share their classification tables.
*/

mod clike;

use std::path::Path;

use diffscope_core::{Language, Node, ParseError, SType, TreeBuilder, Type};
use tree_sitter as ts;

/// Implements the shared C-family behavior for a grammar.
macro_rules! impl_clike_lang {
  ($lang:ident, $parser:expr) => {
    #[derive(Clone, Copy, Debug)]
    pub struct $lang;

    impl $lang {
      fn ts_language() -> ts::Language {
        $parser.into()
      }
    }

    impl Language for $lang {
      fn map_token(&self, token: u16) -> Type {
        clike::token_type(&Self::ts_language(), token)
      }

      fn parse(&self, contents: &str, _file_name: &str) -> Result<TreeBuilder, ParseError> {
        clike::parse(Self::ts_language(), contents)
      }

      fn is_travelling_node(&self, node: &Node) -> bool {
        matches!(node.stype, SType::Comment | SType::Directive)
      }

      fn has_fixed_structure(&self, node: &Node) -> bool {
        matches!(
          node.stype,
          SType::IfStmt | SType::WhileStmt | SType::DoWhileStmt | SType::ForStmt
        )
      }

      fn can_be_flattened(&self, parent: &Node, child: &Node, level: u32) -> bool {
        clike::can_be_flattened(parent, child, level)
      }

      fn is_unmovable(&self, node: &Node) -> bool {
        matches!(node.stype, SType::TranslationUnit | SType::CompoundStatement)
      }

      fn is_container(&self, node: &Node) -> bool {
        matches!(
          node.stype,
          SType::CompoundStatement
            | SType::Statements
            | SType::ArgumentList
            | SType::ParameterList
            | SType::InitializerList
        )
      }

      fn is_diffable(&self, node: &Node) -> bool {
        matches!(node.ty, Type::Comments | Type::StrConstants)
      }

      fn should_splice(&self, _parent: SType, child: &Node) -> bool {
        child.stype == SType::TemporaryContainer
          || (child.stype == SType::Expression && child.children.len() == 1)
      }

      fn is_value_node(&self, stype: SType) -> bool {
        matches!(
          stype,
          SType::Declarator | SType::DirectDeclarator | SType::PointerDecl
        )
      }

      fn is_layer_break(&self, stype: SType) -> bool {
        stype == SType::CompoundStatement
      }

      fn is_satellite(&self, stype: SType) -> bool {
        matches!(stype, SType::Separator | SType::Punctuation)
      }
    }
  };
}

impl_clike_lang!(C, tree_sitter_c::LANGUAGE);
impl_clike_lang!(Cpp, tree_sitter_cpp::LANGUAGE);

/// Picks a language from a file extension; headers default to C.
pub fn from_path(path: &Path) -> Option<Box<dyn Language>> {
  match path.extension()?.to_str()? {
    "c" | "h" => Some(Box::new(C)),
    "cpp" | "cxx" | "cc" | "hpp" | "hxx" | "hh" | "ipp" => Some(Box::new(Cpp)),
    _ => None,
  }
}

/// Resolves an explicit language name from the command line.
pub fn from_name(name: &str) -> Option<Box<dyn Language>> {
  match name {
    "c" => Some(Box::new(C)),
    "cpp" | "c++" | "cxx" => Some(Box::new(Cpp)),
    _ => None,
  }
}
