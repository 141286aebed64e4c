use std::path::Path;

use anyhow::{Context, Result};

/// URLs from `--url` flags followed by those in `file`, one per line.
///
/// Blank lines and `#` comments are skipped. Validation is left to
/// `ScrapeRequest::new`.
pub fn collect_urls(flags: &[String], file: Option<&Path>) -> Result<Vec<String>> {
    let mut urls: Vec<String> = flags.iter().map(|u| u.trim().to_string()).collect();

    if let Some(path) = file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read URL file: {}", path.display()))?;
        urls.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_flags_then_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "https://b.com\n\n  # partners\n  https://c.com  \n").unwrap();

        let urls = collect_urls(&["https://a.com".to_string()], Some(file.path())).unwrap();
        assert_eq!(urls, vec!["https://a.com", "https://b.com", "https://c.com"]);
    }

    #[test]
    fn test_flags_only() {
        let urls = collect_urls(&[" https://a.com ".to_string()], None).unwrap();
        assert_eq!(urls, vec!["https://a.com"]);
    }

    #[test]
    fn test_missing_file() {
        let err = collect_urls(&[], Some(Path::new("/definitely/not/here.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read URL file"));
    }
}
