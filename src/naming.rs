//! Centralized filename classification for the front/back convention.
//!
//! Every postcard is scanned as a set of image files sharing a base name:
//!
//! ```text
//! eagle.jpg        → front
//! eagle_001.jpg    → back
//! eagle_002.jpg    → alternate-effect imagery (ignored)
//! eagle_003.jpg    → alternate-effect imagery (ignored)
//! ```
//!
//! A *numbered variant* is a file whose stem ends in `_` plus exactly three
//! ASCII digits, directly before the extension. Only the rightmost group
//! counts: `a_001_002.jpg` is a `_002` variant of `a_001` and is ignored.
//!
//! All matching lives in [`classify`] so the catalog and the derived-asset
//! jobs agree on what a back image is.

/// Extensions recognized as postcard images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Suffix value that marks the back of a postcard.
const BACK_SUFFIX: &str = "001";

/// Role of a file in the postcard naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRole {
    /// Front image, keyed by its stem.
    Front(String),
    /// Back image (`_001`), keyed by its stem with the suffix removed.
    Back(String),
    /// Not an image, or a numbered variant other than `_001`.
    Ignored,
}

impl FileRole {
    /// Pairing key for fronts and backs.
    pub fn key(&self) -> Option<&str> {
        match self {
            FileRole::Front(key) | FileRole::Back(key) => Some(key),
            FileRole::Ignored => None,
        }
    }
}

/// Split a filename into `(stem, extension)` at the last dot.
///
/// Returns `None` when there is no dot at all.
pub fn split_extension(filename: &str) -> Option<(&str, &str)> {
    let dot = filename.rfind('.')?;
    Some((&filename[..dot], &filename[dot + 1..]))
}

/// Whether the filename carries one of [`IMAGE_EXTENSIONS`].
pub fn is_image_file(filename: &str) -> bool {
    has_extension(filename, IMAGE_EXTENSIONS)
}

/// Case-insensitive extension check against an arbitrary list.
pub fn has_extension(filename: &str, extensions: &[&str]) -> bool {
    split_extension(filename)
        .map(|(_, ext)| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Split a trailing `_NNN` group off a stem.
///
/// `"eagle_001"` → `Some(("eagle", "001"))`, `"eagle"` → `None`,
/// `"eagle_1001"` → `None` (the underscore must sit right before the digits).
pub fn split_numbered_suffix(stem: &str) -> Option<(&str, &str)> {
    let bytes = stem.as_bytes();
    if bytes.len() < 4 {
        return None;
    }
    let split = bytes.len() - 4;
    let (base, tail) = (&bytes[..split], &bytes[split..]);
    if tail[0] == b'_' && tail[1..].iter().all(u8::is_ascii_digit) {
        // Both halves sit on ASCII boundaries, so the str slices are valid.
        Some((&stem[..base.len()], &stem[split + 1..]))
    } else {
        None
    }
}

/// Classify a filename under the front/back convention.
pub fn classify(filename: &str) -> FileRole {
    let Some((stem, ext)) = split_extension(filename) else {
        return FileRole::Ignored;
    };
    if !IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
        return FileRole::Ignored;
    }
    match split_numbered_suffix(stem) {
        Some((base, BACK_SUFFIX)) => FileRole::Back(base.to_string()),
        Some(_) => FileRole::Ignored,
        None => FileRole::Front(stem.to_string()),
    }
}

/// Display name for a pairing key: one trailing `_NNN` group is stripped.
///
/// Keys produced by [`classify`] never end in a suffix, but a key fed in from
/// elsewhere might, so this strips defensively.
pub fn display_name(key: &str) -> &str {
    split_numbered_suffix(key).map_or(key, |(base, _)| base)
}

/// Display name for a category folder: underscores become spaces.
pub fn category_display_name(folder: &str) -> String {
    folder.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_image_is_front() {
        assert_eq!(classify("eagle.jpg"), FileRole::Front("eagle".into()));
    }

    #[test]
    fn suffix_001_is_back() {
        assert_eq!(classify("eagle_001.jpg"), FileRole::Back("eagle".into()));
    }

    #[test]
    fn higher_suffixes_are_ignored() {
        assert_eq!(classify("eagle_002.jpg"), FileRole::Ignored);
        assert_eq!(classify("eagle_003.png"), FileRole::Ignored);
        assert_eq!(classify("eagle_999.webp"), FileRole::Ignored);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(classify("Owl.PNG"), FileRole::Front("Owl".into()));
        assert_eq!(classify("Owl_001.JpEg"), FileRole::Back("Owl".into()));
    }

    #[test]
    fn non_images_are_ignored() {
        assert_eq!(classify("notes.txt"), FileRole::Ignored);
        assert_eq!(classify("README"), FileRole::Ignored);
        assert_eq!(classify("eagle.gif"), FileRole::Ignored);
    }

    #[test]
    fn only_rightmost_group_counts() {
        assert_eq!(classify("a_001_002.jpg"), FileRole::Ignored);
        assert_eq!(classify("a_002_001.jpg"), FileRole::Back("a_002".into()));
    }

    #[test]
    fn suffix_must_be_exactly_three_digits_after_underscore() {
        assert_eq!(classify("a_01.jpg"), FileRole::Front("a_01".into()));
        assert_eq!(classify("a_1001.jpg"), FileRole::Front("a_1001".into()));
        assert_eq!(classify("a-001.jpg"), FileRole::Front("a-001".into()));
        assert_eq!(classify("a_00x.jpg"), FileRole::Front("a_00x".into()));
    }

    #[test]
    fn multi_dot_names_use_last_extension() {
        assert_eq!(
            classify("st.louis_001.jpg"),
            FileRole::Back("st.louis".into())
        );
    }

    #[test]
    fn split_numbered_suffix_handles_non_ascii_stems() {
        assert_eq!(split_numbered_suffix("café_001"), Some(("café", "001")));
        assert_eq!(split_numbered_suffix("café"), None);
        assert_eq!(split_numbered_suffix("é"), None);
    }

    #[test]
    fn role_key() {
        assert_eq!(FileRole::Front("a".into()).key(), Some("a"));
        assert_eq!(FileRole::Back("b".into()).key(), Some("b"));
        assert_eq!(FileRole::Ignored.key(), None);
    }

    #[test]
    fn display_name_strips_one_trailing_suffix() {
        assert_eq!(display_name("eagle"), "eagle");
        assert_eq!(display_name("eagle_002"), "eagle");
        assert_eq!(display_name("eagle_001_002"), "eagle_001");
    }

    #[test]
    fn category_names_swap_underscores_for_spaces() {
        assert_eq!(category_display_name("Old_Postcards"), "Old Postcards");
        assert_eq!(category_display_name("Birds"), "Birds");
    }

    #[test]
    fn has_extension_checks_custom_lists() {
        assert!(has_extension("a.JPG", &["jpg"]));
        assert!(!has_extension("a.webp", &["png", "jpg", "jpeg"]));
        assert!(!has_extension("noext", &["jpg"]));
    }
}
