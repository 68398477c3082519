use anyhow::Result;
use std::fs;
use tempfile::TempDir;

pub fn create_test_files<'a>(
  files: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<TempDir> {
  let dir = TempDir::new()?;
  for (path, contents) in files {
    fs::write(dir.path().join(path), contents)?;
  }
  Ok(dir)
}
