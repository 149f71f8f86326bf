use anyhow::Result;
use std::path::Path;
use url::Url;

/// File extensions the backend accepts for upload.
const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["mp3", "mp4", "wav", "webm"];

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Whether the input names a local file rather than a URL.
pub fn is_local_file(input: &str) -> bool {
    if input.starts_with("http://") || input.starts_with("https://") {
        return false;
    }
    Path::new(input).exists()
}

/// Check an upload candidate before any request goes out: the file must
/// exist and carry an extension the backend accepts.
pub fn check_upload_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()) {
        anyhow::bail!(
            "Unsupported file type '.{}' (allowed: {})",
            ext,
            ALLOWED_UPLOAD_EXTENSIONS.join(", ")
        );
    }

    Ok(())
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }

    #[test]
    fn test_validate_and_normalize_url() {
        assert!(validate_and_normalize_url("https://youtube.com/watch?v=1").is_ok());
        assert!(validate_and_normalize_url("http://example.com").is_ok());
        assert!(validate_and_normalize_url("ftp://example.com").is_err());
        assert!(validate_and_normalize_url("not-a-url").is_err());
    }

    #[test]
    fn test_is_local_file() {
        assert!(!is_local_file("https://youtu.be/abc"));
        assert!(!is_local_file("no-such-file.mp3"));
    }

    #[test]
    fn test_check_upload_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("talk.mp3");
        fs_err::write(&good, b"audio").unwrap();
        assert!(check_upload_file(&good).is_ok());

        let bad = dir.path().join("talk.flac");
        fs_err::write(&bad, b"audio").unwrap();
        assert!(check_upload_file(&bad).is_err());

        assert!(check_upload_file(dir.path().join("missing.mp3").as_path()).is_err());
    }
}
