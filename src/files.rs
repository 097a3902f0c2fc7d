use std::fs;
use std::path::Path;

/// Makes sure the directory for `path` exists. A path with an extension is taken to be a file.
pub fn with_dir(path: &str) -> std::io::Result<()> {
  let path = Path::new(path);

  let dir = if path.extension().is_some() {
    path.parent().unwrap_or_else(|| Path::new("/"))
  } else {
    path
  };

  if !dir.as_os_str().is_empty() && !dir.exists() {
    fs::create_dir_all(dir)?;
  }
  Ok(())
}
