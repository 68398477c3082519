//! Leaf-token categories.
//!
//! `Type` is an ordered enumeration: all variants below the
//! [`Type::NonInterchangeable`] watermark describe tokens whose labels may
//! legitimately differ between two versions of a file (an identifier can be
//! renamed, a constant can change its value).  Variants at or above the
//! watermark only ever match a token with the identical label.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
  /// Nodes synthesized by tree construction, not backed by a single token.
  #[default]
  Virtual,

  Functions,
  UserTypes,
  Identifiers,
  Jumps,
  Specifiers,
  Types,
  LeftBrackets,
  RightBrackets,
  Comparisons,
  Operators,
  LogicalOperators,
  Assignments,
  Directives,
  Comments,
  StrConstants,
  IntConstants,
  FPConstants,
  CharConstants,

  /// Watermark.  Everything below is interchangeable within its category,
  /// everything from here on matches only an identical label.
  NonInterchangeable,

  Keywords,
  Other,
}

impl Type {
  /// Folds categories that are interchangeable for matching purposes into
  /// a single representative.  Function names and type names are renamed
  /// the same way ordinary identifiers are, and a literal stays a literal
  /// even when its kind changes (`1` to `1.0`).
  pub fn canonize(self) -> Type {
    match self {
      Type::Functions | Type::UserTypes | Type::Identifiers => Type::Identifiers,
      Type::StrConstants | Type::IntConstants | Type::FPConstants | Type::CharConstants => {
        Type::IntConstants
      }
      other => other,
    }
  }
}
