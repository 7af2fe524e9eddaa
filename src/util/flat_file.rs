use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

use anyhow::{Context, Result};

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Reads the single integer kept in a counter file. A missing or empty file counts as 0.
pub fn read_counter(path: &Path) -> Result<u64> {
    let content = read_optional(path)
        .with_context(|| format!("Error reading counter file {}", path.display()))?
        .unwrap_or_default();

    let content = content.trim();
    if content.is_empty() {
        return Ok(0);
    }

    content.parse::<u64>()
        .with_context(|| format!("Counter file {} does not hold a number: {}", path.display(), content))
}

pub fn write_counter(path: &Path, value: u64) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, format!("{}\n", value))
        .with_context(|| format!("Error writing counter file {}", path.display()))
}

/// Increments the counter and returns the new value.
pub fn bump_counter(path: &Path) -> Result<u64> {
    let next = read_counter(path)? + 1;
    write_counter(path, next)?;
    Ok(next)
}

/// Reads a list with one entry per line, ignoring blank lines.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = read_optional(path)
        .with_context(|| format!("Error reading {}", path.display()))?
        .unwrap_or_default();

    let lines = content.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect();
    Ok(lines)
}

/// Rewrites the whole list.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    ensure_parent(path)?;
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)
        .with_context(|| format!("Error writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("counter.txt");
        assert_eq!(read_counter(&path).unwrap(), 0);
        assert_eq!(bump_counter(&path).unwrap(), 1);
        assert_eq!(bump_counter(&path).unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "2\n");

        fs::write(&path, "  ").unwrap();
        assert_eq!(read_counter(&path).unwrap(), 0);

        fs::write(&path, "abc").unwrap();
        assert!(read_counter(&path).is_err());
    }

    #[test]
    fn test_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("used.txt");
        assert!(read_lines(&path).unwrap().is_empty());

        write_lines(&path, &["Inconsciente".to_string(), "Sublimação".to_string()]).unwrap();
        fs::write(&path, fs::read_to_string(&path).unwrap() + "\n\n").unwrap();
        assert_eq!(read_lines(&path).unwrap(), ["Inconsciente", "Sublimação"]);

        write_lines(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
