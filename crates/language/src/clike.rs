//! Shared plumbing for the C-family front-ends: promotion of tree-sitter
//! trees into the parse-tree layer and the kind/token classification both
//! grammars agree on.

use diffscope_core::ptree::PNodeId;
use diffscope_core::{Node, ParseError, SType, TreeBuilder, Type};
use tree_sitter as ts;

pub(crate) fn parse(ts_lang: ts::Language, contents: &str) -> Result<TreeBuilder, ParseError> {
  let mut parser = ts::Parser::new();
  parser
    .set_language(&ts_lang)
    .map_err(|e| ParseError::Grammar(e.to_string()))?;

  let Some(tree) = parser.parse(contents, None) else {
    return Err(ParseError::Syntax);
  };

  let mut tb = TreeBuilder::new(contents.to_string());
  let root = convert(&mut tb, tree.root_node());
  tb.set_root(root);
  tb.finish(tree.root_node().has_error());
  Ok(tb)
}

fn convert(tb: &mut TreeBuilder, node: ts::Node) -> PNodeId {
  if node.child_count() == 0 || is_atomic(node.kind()) {
    let pos = node.start_position();
    return tb.add_leaf(
      node.start_byte()..node.end_byte(),
      pos.row as u32 + 1,
      pos.column as u32 + 1,
      node.kind_id(),
      leaf_stype(&node),
    );
  }

  let mut cursor = node.walk();
  let ts_children: Vec<ts::Node> = node.children(&mut cursor).collect();
  drop(cursor);

  let children = ts_children.into_iter().map(|c| convert(tb, c)).collect();
  tb.add_node(children, node_stype(node.kind()))
}

/// Multi-token constructs promoted as single leaves.
fn is_atomic(kind: &str) -> bool {
  matches!(
    kind,
    "string_literal" | "char_literal" | "concatenated_string" | "system_lib_string" | "raw_string_literal"
  )
}

fn leaf_stype(node: &ts::Node) -> SType {
  if node.is_named() {
    return match node.kind() {
      "comment" => SType::Comment,
      // an empty file parses to a childless root
      "translation_unit" => SType::TranslationUnit,
      _ => SType::None,
    };
  }
  match node.kind() {
    ";" | "," => SType::Separator,
    "(" | ")" | "{" | "}" | "[" | "]" => SType::Punctuation,
    _ => SType::None,
  }
}

fn node_stype(kind: &str) -> SType {
  match kind {
    "translation_unit" => SType::TranslationUnit,
    "function_definition" => SType::FunctionDefinition,
    "declaration" | "field_declaration" | "enumerator" | "type_definition" => SType::Declaration,
    "compound_statement" => SType::CompoundStatement,
    "field_declaration_list" | "enumerator_list" => SType::Statements,
    "if_statement" => SType::IfStmt,
    "else_clause" => SType::IfElse,
    "while_statement" => SType::WhileStmt,
    "do_statement" => SType::DoWhileStmt,
    "for_statement" => SType::ForStmt,
    "switch_statement" => SType::SwitchStmt,
    "case_statement" | "labeled_statement" => SType::LabelStmt,
    "break_statement" => SType::BreakStmt,
    "continue_statement" => SType::ContinueStmt,
    "goto_statement" => SType::GotoStmt,
    "return_statement" => SType::ReturnValueStmt,
    "expression_statement" => SType::ExprStatement,
    "init_declarator" => SType::Declarator,
    "function_declarator" | "array_declarator" | "parenthesized_declarator" => {
      SType::DirectDeclarator
    }
    "pointer_declarator" | "abstract_pointer_declarator" | "reference_declarator" => {
      SType::PointerDecl
    }
    "initializer_list" => SType::InitializerList,
    "initializer_pair" => SType::InitializerElement,
    "argument_list" => SType::ArgumentList,
    "parameter_list" => SType::ParameterList,
    "parameter_declaration" | "variadic_parameter" => SType::Parameter,
    "call_expression" => SType::CallExpr,
    "assignment_expression" => SType::AssignmentExpr,
    "conditional_expression" => SType::ConditionExpr,
    "struct_specifier" | "union_specifier" | "enum_specifier" | "class_specifier" => {
      SType::Specifiers
    }
    "preproc_include" | "preproc_def" | "preproc_function_def" | "preproc_undef"
    | "preproc_call" | "preproc_if" | "preproc_ifdef" | "preproc_else" | "preproc_elif" => {
      SType::Directive
    }
    "ERROR" => SType::TemporaryContainer,
    _ => SType::Expression,
  }
}

pub(crate) fn can_be_flattened(parent: &Node, child: &Node, level: u32) -> bool {
  match level {
    0 => matches!(
      child.stype,
      SType::ExprStatement
        | SType::ReturnValueStmt
        | SType::ReturnNothingStmt
        | SType::BreakStmt
        | SType::ContinueStmt
        | SType::GotoStmt
        | SType::LabelStmt
        | SType::Directive
        | SType::Macro
    ),
    1 => {
      matches!(
        parent.stype,
        SType::IfStmt | SType::WhileStmt | SType::DoWhileStmt | SType::ForStmt | SType::SwitchStmt
      ) && matches!(
        child.stype,
        SType::Expression
          | SType::AssignmentExpr
          | SType::CallExpr
          | SType::ComparisonExpr
          | SType::ConditionExpr
          | SType::Declaration
      )
    }
    2 => matches!(
      child.stype,
      SType::Declaration | SType::Parameter | SType::InitializerElement
    ),
    3 => matches!(child.stype, SType::FunctionDeclaration | SType::Specifiers),
    _ => false,
  }
}

pub(crate) fn token_type(ts_lang: &ts::Language, token: u16) -> Type {
  let kind = ts_lang.node_kind_for_id(token).unwrap_or("");
  match kind {
    "identifier" | "field_identifier" | "statement_identifier" | "namespace_identifier" => {
      Type::Identifiers
    }
    "type_identifier" => Type::UserTypes,
    "primitive_type" | "sized_type_specifier" | "auto" => Type::Types,
    "break" | "continue" | "goto" => Type::Jumps,
    "extern" | "static" | "register" | "inline" | "const" | "volatile" | "restrict"
    | "_Atomic" | "_Noreturn" | "signed" | "unsigned" | "virtual" | "constexpr" => {
      Type::Specifiers
    }
    "comment" => Type::Comments,
    "string_literal" | "concatenated_string" | "system_lib_string" | "raw_string_literal" => {
      Type::StrConstants
    }
    "number_literal" | "true" | "false" | "null" | "nullptr" => Type::IntConstants,
    "char_literal" | "character" | "escape_sequence" => Type::CharConstants,
    "(" | "{" | "[" => Type::LeftBrackets,
    ")" | "}" | "]" => Type::RightBrackets,
    "<" | ">" | "<=" | ">=" | "==" | "!=" => Type::Comparisons,
    "&&" | "||" => Type::LogicalOperators,
    "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "<<=" | ">>=" | "&=" | "^=" | "|=" => {
      Type::Assignments
    }
    "+" | "-" | "*" | "/" | "%" | "&" | "|" | "^" | "~" | "!" | "++" | "--" | "<<" | ">>" => {
      Type::Operators
    }
    "#include" | "#define" | "#undef" | "#if" | "#ifdef" | "#ifndef" | "#else" | "#elif"
    | "#endif" | "preproc_directive" | "preproc_arg" => Type::Directives,
    "if" | "else" | "while" | "do" | "for" | "switch" | "case" | "default" | "return"
    | "sizeof" | "struct" | "union" | "enum" | "typedef" | "class" | "namespace" | "new"
    | "delete" | "template" | "using" => Type::Keywords,
    _ => Type::Other,
  }
}
