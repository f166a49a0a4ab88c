//! Stored filename generation
//!
//! Names look like `<tag>-<epoch millis>-<random 0..=1e9><ext>`, keeping the
//! extension of the client's original filename.

use chrono::Utc;
use rand::Rng;

const RANDOM_MAX: u32 = 1_000_000_000;

/// Extension of `original` including the leading dot, or `""`.
///
/// Only the last path component is looked at. The extension runs from the
/// last dot to the end, kept verbatim; a name whose only dot is its first
/// character (`.bashrc`) or that is `..` has none.
pub fn extension_of(original: &str) -> &str {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    if base == ".." {
        return "";
    }
    match base.rfind('.') {
        Some(dot) if dot > 0 => &base[dot..],
        _ => "",
    }
}

/// Compose a stored filename from its parts
pub fn compose(tag: &str, millis: i64, random: u32, original: &str) -> String {
    format!("{tag}-{millis}-{random}{}", extension_of(original))
}

/// Draw a fresh filename for `original` using the current time
pub fn fresh(tag: &str, original: &str) -> String {
    let random = rand::thread_rng().gen_range(0..=RANDOM_MAX);
    compose(tag, Utc::now().timestamp_millis(), random, original)
}

/// Whether `name` is a plain file name (no separators, not `.` or `..`)
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.png"), ".png");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("photo"), "");
        assert_eq!(extension_of(".bashrc"), "");
        assert_eq!(extension_of("a."), ".");
        assert_eq!(extension_of("C:\\Users\\me\\shot.JPG"), ".JPG");
        assert_eq!(extension_of("../../etc/passwd.txt"), ".txt");
        assert_eq!(extension_of("..png"), ".png");
        assert_eq!(extension_of("..."), ".");
        assert_eq!(extension_of(".."), "");
    }

    #[test]
    fn test_extension_kept_verbatim() {
        assert_eq!(extension_of("photo.jpé"), ".jpé");
        assert_eq!(compose("image", 1, 2, "photo.jpé"), "image-1-2.jpé");
        assert_eq!(compose("image", 1, 2, "scan.p g"), "image-1-2.p g");
        assert_eq!(compose("image", 1, 2, "evil.p?ng"), "image-1-2.p?ng");
    }

    #[test]
    fn test_compose() {
        assert_eq!(
            compose("image", 1_700_000_000_000, 42, "a.png"),
            "image-1700000000000-42.png"
        );
        assert_eq!(compose("image", 1, 2, "noext"), "image-1-2");
    }

    #[test]
    fn test_fresh_shape() {
        let name = fresh("image", "cat.jpeg");
        let parts: Vec<&str> = name.trim_end_matches(".jpeg").split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "image");
        assert!(parts[1].parse::<i64>().is_ok());
        assert!(parts[2].parse::<u32>().unwrap() <= RANDOM_MAX);
        assert!(name.ends_with(".jpeg"));
    }

    #[test]
    fn test_fresh_names_differ() {
        assert_ne!(fresh("image", "a.png"), fresh("image", "a.png"));
    }

    #[test]
    fn test_is_plain_name() {
        assert!(is_plain_name("image-1-2.png"));
        assert!(!is_plain_name(""));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("a/b"));
        assert!(!is_plain_name("a\\b"));
    }
}
