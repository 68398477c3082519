//! Structural node kinds shared by all language front-ends.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SType {
  #[default]
  None,
  TranslationUnit,
  Declaration,
  FunctionDeclaration,
  FunctionDefinition,
  Comment,
  Directive,
  LineGlue,
  Macro,
  CompoundStatement,
  Separator,
  Punctuation,
  Statements,
  ExprStatement,
  IfStmt,
  IfCond,
  IfThen,
  IfElse,
  WhileStmt,
  DoWhileStmt,
  WhileCond,
  ForStmt,
  LabelStmt,
  ForHead,
  Expression,
  Declarator,
  Initializer,
  InitializerList,
  Specifiers,
  WithInitializer,
  WithoutInitializer,
  InitializerElement,
  SwitchStmt,
  GotoStmt,
  ContinueStmt,
  BreakStmt,
  ReturnValueStmt,
  ReturnNothingStmt,
  ArgumentList,
  Argument,
  ParameterList,
  Parameter,
  CallExpr,
  AssignmentExpr,
  ConditionExpr,
  ComparisonExpr,
  AdditiveExpr,
  PointerDecl,
  DirectDeclarator,
  TemporaryContainer,
  Bundle,
  BundleComma,
}

impl SType {
  pub fn name(self) -> &'static str {
    match self {
      SType::None => "None",
      SType::TranslationUnit => "TranslationUnit",
      SType::Declaration => "Declaration",
      SType::FunctionDeclaration => "FunctionDeclaration",
      SType::FunctionDefinition => "FunctionDefinition",
      SType::Comment => "Comment",
      SType::Directive => "Directive",
      SType::LineGlue => "LineGlue",
      SType::Macro => "Macro",
      SType::CompoundStatement => "CompoundStatement",
      SType::Separator => "Separator",
      SType::Punctuation => "Punctuation",
      SType::Statements => "Statements",
      SType::ExprStatement => "ExprStatement",
      SType::IfStmt => "IfStmt",
      SType::IfCond => "IfCond",
      SType::IfThen => "IfThen",
      SType::IfElse => "IfElse",
      SType::WhileStmt => "WhileStmt",
      SType::DoWhileStmt => "DoWhileStmt",
      SType::WhileCond => "WhileCond",
      SType::ForStmt => "ForStmt",
      SType::LabelStmt => "LabelStmt",
      SType::ForHead => "ForHead",
      SType::Expression => "Expression",
      SType::Declarator => "Declarator",
      SType::Initializer => "Initializer",
      SType::InitializerList => "InitializerList",
      SType::Specifiers => "Specifiers",
      SType::WithInitializer => "WithInitializer",
      SType::WithoutInitializer => "WithoutInitializer",
      SType::InitializerElement => "InitializerElement",
      SType::SwitchStmt => "SwitchStmt",
      SType::GotoStmt => "GotoStmt",
      SType::ContinueStmt => "ContinueStmt",
      SType::BreakStmt => "BreakStmt",
      SType::ReturnValueStmt => "ReturnValueStmt",
      SType::ReturnNothingStmt => "ReturnNothingStmt",
      SType::ArgumentList => "ArgumentList",
      SType::Argument => "Argument",
      SType::ParameterList => "ParameterList",
      SType::Parameter => "Parameter",
      SType::CallExpr => "CallExpr",
      SType::AssignmentExpr => "AssignmentExpr",
      SType::ConditionExpr => "ConditionExpr",
      SType::ComparisonExpr => "ComparisonExpr",
      SType::AdditiveExpr => "AdditiveExpr",
      SType::PointerDecl => "PointerDecl",
      SType::DirectDeclarator => "DirectDeclarator",
      SType::TemporaryContainer => "TemporaryContainer",
      SType::Bundle => "Bundle",
      SType::BundleComma => "BundleComma",
    }
  }
}

impl fmt::Display for SType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
