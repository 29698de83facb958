use std::path::{Path, PathBuf};

/// Unicode-safe truncation with an ellipsis marker.
pub fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }

    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }

    if max <= 3 {
        return s.chars().take(max).collect();
    }

    let truncated: String = s.chars().take(max - 3).collect();
    format!("{}...", truncated)
}

/// Resolve a path named in remediation text against the repo root.
/// Absolute paths are taken as-is; everything else is joined to the root.
pub fn resolve_target_path(root: &Path, candidate: &str) -> PathBuf {
    let path = Path::new(candidate);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_unicode_safe() {
        let input = "ééééé";
        assert_eq!(truncate(input, 4), "é...");
    }

    #[test]
    fn test_truncate_small_max() {
        let input = "こんにちは";
        assert_eq!(truncate(input, 3), "こんに");
        assert_eq!(truncate(input, 0), "");
    }

    #[test]
    fn test_resolve_target_path_relative() {
        let root = Path::new("/repo");
        assert_eq!(
            resolve_target_path(root, "modules/vpc/main.tf"),
            PathBuf::from("/repo/modules/vpc/main.tf")
        );
    }

    #[test]
    fn test_resolve_target_path_absolute() {
        let root = Path::new("/repo");
        assert_eq!(
            resolve_target_path(root, "/tmp/main.tf"),
            PathBuf::from("/tmp/main.tf")
        );
    }
}
