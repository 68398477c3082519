use ansi_term::{Color, Style};
use anyhow::{Error, Result};

use std::fmt;

/// Errors with a dedicated exit code and a suggested fix.  Everything else
/// is reported through anyhow's default chain.
#[derive(Debug, Clone)]
pub enum ErrorContext {
  CannotGuessLanguage,
  UnknownLanguage(String),
}

impl ErrorContext {
  fn exit_code(&self) -> i32 {
    2
  }
}

impl fmt::Display for ErrorContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let err_msg = ErrorMessage::from_context(self);
    write!(f, "{}", err_msg.title)
  }
}

struct ErrorMessage {
  title: String,
  description: String,
}

impl ErrorMessage {
  fn new<S: ToString>(title: S, description: S) -> Self {
    Self {
      title: title.to_string(),
      description: description.to_string(),
    }
  }

  fn from_context(ctx: &ErrorContext) -> ErrorMessage {
    use ErrorContext::*;
    match ctx {
      CannotGuessLanguage => Self::new(
        "Cannot guess the source language.",
        "Neither file extension maps to a known language. Pass --lang to pick one explicitly.",
      ),
      UnknownLanguage(name) => Self::new(
        format!("Unknown language `{name}`."),
        "Run with --help to see the supported language names.".to_string(),
      ),
    }
  }
}

pub fn exit_with_error(error: Error) -> Result<()> {
  if let Some(e) = error.downcast_ref::<clap::Error>() {
    e.exit()
  }
  if let Some(e) = error.downcast_ref::<ErrorContext>() {
    let error_fmt = ErrorFormat {
      context: e,
      inner: &error,
    };
    eprintln!("{error_fmt}");
    std::process::exit(e.exit_code())
  }
  // use anyhow's default error reporting
  Err(error)
}

struct ErrorFormat<'a> {
  context: &'a ErrorContext,
  inner: &'a Error,
}

impl fmt::Display for ErrorFormat<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let ErrorMessage { title, description } = ErrorMessage::from_context(self.context);
    let bold = Style::new().bold();
    let error = Color::Red.paint("Error:");
    let message = bold.paint(title);
    writeln!(f, "{error} {message}")?;
    let help = Color::Blue.paint("Help:");
    writeln!(f, "{help} {description}")?;
    for err in self.inner.chain().skip(1) {
      let prefix = Color::Red.paint("╰▻");
      writeln!(f, "{prefix} {err}")?;
    }
    Ok(())
  }
}
