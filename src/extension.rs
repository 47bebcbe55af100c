/// Extension classification and discovery.
///
/// Files are grouped purely by the textual extension of their name; no
/// content sniffing is involved. The classification rule follows the usual
/// splitext convention: the extension starts at the last dot, provided that
/// dot is preceded by at least one non-dot character. Dotfiles such as
/// `.bashrc` therefore have no extension.
///
/// # Examples
///
/// ```
/// use mediatidy::extension::classify;
///
/// assert_eq!(classify("photo.JPG").folder_name(), "jpg");
/// assert_eq!(classify("archive.tar.gz").folder_name(), "gz");
/// assert_eq!(classify("README").folder_name(), "");
/// assert_eq!(classify(".bashrc").folder_name(), "");
/// ```
use std::path::Path;
use walkdir::WalkDir;

use crate::transfer::{OrganizeError, OrganizeResult};

/// A lowercase file extension used as a destination partition key.
///
/// The empty key represents files without an extension. Joining its (empty)
/// folder name onto a destination path resolves to the destination itself,
/// so extensionless files land directly in the destination root. That is
/// intentional and must not be special-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionKey(String);

impl ExtensionKey {
    fn new(ext: &str) -> Self {
        Self(ext.to_lowercase())
    }

    /// The key for files without an extension.
    pub fn none() -> Self {
        Self(String::new())
    }

    /// Returns true for the no-extension key.
    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    /// The destination subfolder name: the lowercase extension without its
    /// leading dot, or the empty string.
    pub fn folder_name(&self) -> &str {
        &self.0
    }

    /// The dotted display form used in the summary report.
    pub fn label(&self) -> String {
        if self.0.is_empty() {
            "(no extension)".to_string()
        } else {
            format!(".{}", self.0)
        }
    }
}

impl std::fmt::Display for ExtensionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Maps a file name to its extension key.
///
/// Pure function; lowercases the result. A trailing dot yields an empty
/// extension and collapses into the no-extension key.
pub fn classify(file_name: &str) -> ExtensionKey {
    match file_name.rfind('.') {
        Some(idx) if file_name[..idx].chars().any(|c| c != '.') => {
            ExtensionKey::new(&file_name[idx + 1..])
        }
        _ => ExtensionKey::none(),
    }
}

/// Walks the source tree once and returns the distinct extension keys found,
/// in first-seen order.
///
/// The result is informational: it labels the summary but never restricts
/// which files get processed. An unreadable directory anywhere in the tree
/// is a fatal error.
pub fn scan_extensions(source_root: &Path) -> OrganizeResult<Vec<ExtensionKey>> {
    let mut found: Vec<ExtensionKey> = Vec::new();

    for entry in WalkDir::new(source_root) {
        let entry = entry.map_err(|e| walk_error(source_root, e))?;
        if !is_file_entry(&entry) {
            continue;
        }
        let key = classify(&entry.file_name().to_string_lossy());
        if !found.contains(&key) {
            found.push(key);
        }
    }

    Ok(found)
}

/// Returns true for entries that transfer as files: regular files, plus
/// symlinks whose target is a file. The walk does not follow links, so
/// link entries must be probed explicitly or they would be dropped.
pub(crate) fn is_file_entry(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file() || (entry.file_type().is_symlink() && entry.path().is_file())
}

/// Converts a walkdir failure into the fatal enumeration error, keeping the
/// offending path when walkdir knows it.
pub(crate) fn walk_error(root: &Path, err: walkdir::Error) -> OrganizeError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("directory traversal failed"));
    OrganizeError::EnumerationFailed { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_classify_lowercases() {
        assert_eq!(classify("photo.JPG"), classify("photo.jpg"));
        assert_eq!(classify("CLIP.Mp4").folder_name(), "mp4");
    }

    #[test]
    fn test_classify_takes_last_dot() {
        assert_eq!(classify("archive.tar.gz").folder_name(), "gz");
    }

    #[test]
    fn test_classify_no_extension() {
        let key = classify("README");
        assert!(key.is_none());
        assert_eq!(key.folder_name(), "");
    }

    #[test]
    fn test_classify_dotfile_has_no_extension() {
        assert!(classify(".bashrc").is_none());
        assert!(classify("..config").is_none());
    }

    #[test]
    fn test_classify_trailing_dot_collapses_to_none() {
        assert!(classify("notes.").is_none());
    }

    #[test]
    fn test_labels() {
        assert_eq!(classify("song.mp3").label(), ".mp3");
        assert_eq!(classify("README").label(), "(no extension)");
    }

    #[test]
    fn test_scan_finds_distinct_extensions_recursively() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("a.jpg"), b"x").unwrap();
        fs::write(root.join("b.JPG"), b"x").unwrap();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested").join("c.mp4"), b"x").unwrap();
        fs::write(root.join("nested").join("README"), b"x").unwrap();

        let found = scan_extensions(root).expect("scan failed");
        assert_eq!(found.len(), 3);
        assert!(found.contains(&classify("x.jpg")));
        assert!(found.contains(&classify("x.mp4")));
        assert!(found.contains(&ExtensionKey::none()));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_counts_symlinked_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("real.jpg"), b"x").unwrap();
        std::os::unix::fs::symlink(root.join("real.jpg"), root.join("alias.mp4")).unwrap();

        let found = scan_extensions(root).expect("scan failed");
        assert_eq!(found.len(), 2);
        assert!(found.contains(&classify("x.mp4")));
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("nope");
        assert!(scan_extensions(&missing).is_err());
    }
}
