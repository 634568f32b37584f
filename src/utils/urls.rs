//! `file://` URL helpers for locally stored lesson media

use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";

/// Percent-encoded `file://` URL for a local path
pub fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let encoded: Vec<String> = raw
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    let joined = encoded.join("/");
    if joined.starts_with('/') {
        format!("{}{}", FILE_SCHEME, joined)
    } else {
        format!("{}/{}", FILE_SCHEME, joined)
    }
}

/// Local path behind a `file://` URL, or a bare path. `None` for other schemes.
pub fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(rest) = url.strip_prefix(FILE_SCHEME) {
        let decoded = urlencoding::decode(rest).ok()?;
        return Some(PathBuf::from(decoded.into_owned()));
    }
    if url.contains("://") {
        return None;
    }
    Some(PathBuf::from(url))
}

/// Whether `url` names a resource outside the local filesystem
pub fn is_remote(url: &str) -> bool {
    url.contains("://") && !url.starts_with(FILE_SCHEME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_roundtrip_with_spaces() {
        let path = Path::new("/tmp/My Lessons/intro #1.lesson/audio.webm");
        let url = file_url(path);

        assert!(url.starts_with("file:///tmp/My%20Lessons/"));
        assert!(!url.contains(' '));
        assert_eq!(local_path(&url).as_deref(), Some(path));
    }

    #[test]
    fn test_remote_urls_have_no_local_path() {
        assert_eq!(local_path("https://cdn.example.com/a.pdf"), None);
        assert!(is_remote("https://cdn.example.com/a.pdf"));
        assert!(!is_remote("file:///a.pdf"));
        assert_eq!(local_path("slides"), Some(PathBuf::from("slides")));
    }
}
