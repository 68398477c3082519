mod error;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};

use diffscope_core::{build_fine_tree, build_tree, distill, ted, tree, Language, Printer, Tree};
use error::{exit_with_error, ErrorContext};

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
  /// Color terminal output, keep piped output plain
  Auto,
  /// Always color the output
  Always,
  /// Never color the output
  Never,
}

impl ColorArg {
  fn should_use_color(self) -> bool {
    match self {
      ColorArg::Always => true,
      ColorArg::Never => false,
      ColorArg::Auto => atty::is(atty::Stream::Stdout) && env_allows_color(),
    }
  }
}

fn env_allows_color() -> bool {
  match env::var_os("TERM") {
    None => cfg!(windows),
    Some(k) => k != "dumb",
  }
}

/// Compare two versions of a source file by syntax, not by text.
#[derive(Parser)]
#[clap(author, version, about)]
struct App {
  /// Old version of the file
  old: PathBuf,
  /// New version of the file
  new: PathBuf,
  /// When to color the output
  #[clap(long, default_value = "auto", value_name = "WHEN")]
  color: ColorArg,
  /// Match with tree edit distance instead of change distilling
  #[clap(long)]
  ted: bool,
  /// Compare fine-grained parse trees without coarse layering
  #[clap(long)]
  fine_only: bool,
  /// Dump the annotated trees instead of rendering the diff
  #[clap(long)]
  dump_tree: bool,
  /// Language to parse both files with, instead of guessing by extension
  #[clap(short, long)]
  lang: Option<String>,
}

fn main() -> Result<()> {
  match run(App::parse()) {
    Err(error) => exit_with_error(error),
    ok => ok,
  }
}

fn run(app: App) -> Result<()> {
  let lang = pick_language(&app)?;

  let mut old = load_tree(&*lang, &app.old, app.fine_only)?;
  let mut new = load_tree(&*lang, &app.new, app.fine_only)?;

  if app.ted {
    ted(&mut old, &mut new);
  } else {
    distill(&mut old, &mut new, &*lang);
  }

  if app.dump_tree {
    print!("{}", tree::dump(&old, Some(&new)));
    print!("{}", tree::dump(&new, Some(&old)));
    return Ok(());
  }

  let stdout = std::io::stdout();
  let mut sink = stdout.lock();
  Printer::new(&old, &new, app.color.should_use_color()).print(&mut sink)?;
  Ok(())
}

fn pick_language(app: &App) -> Result<Box<dyn Language>> {
  if let Some(name) = &app.lang {
    return diffscope_language::from_name(name)
      .ok_or_else(|| anyhow!(ErrorContext::UnknownLanguage(name.clone())));
  }
  diffscope_language::from_path(&app.old)
    .or_else(|| diffscope_language::from_path(&app.new))
    .ok_or_else(|| anyhow!(ErrorContext::CannotGuessLanguage))
}

fn load_tree(lang: &dyn Language, path: &Path, fine_only: bool) -> Result<Tree> {
  let contents =
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let tb = lang
    .parse(&contents, &path.to_string_lossy())
    .with_context(|| format!("failed to parse {}", path.display()))?;
  let built = if fine_only {
    build_fine_tree(&tb, lang)
  } else {
    build_tree(&tb, lang)
  };
  built.with_context(|| format!("failed to parse {}", path.display()))
}
