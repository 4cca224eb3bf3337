//! URL slug generation for products, categories and brands.

use crate::error::CoreError;

/// Build a slug from a display name.
///
/// Lowercases, keeps Unicode alphanumerics (so Thai names stay readable),
/// and collapses every other run of characters into a single `-`. Leading
/// and trailing dashes are trimmed. May return an empty string.
///
/// ```
/// use backoffice_core::slug::slugify;
///
/// assert_eq!(slugify("Running Shoes 2024"), "running-shoes-2024");
/// assert_eq!(slugify("  --Hello,  World!-- "), "hello-world");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() || is_thai_mark(ch) {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Thai vowel and tone marks are combining characters, not alphanumerics,
/// but dropping them would mangle the word.
fn is_thai_mark(ch: char) -> bool {
    matches!(ch, '\u{0E31}' | '\u{0E34}'..='\u{0E3A}' | '\u{0E47}'..='\u{0E4E}')
}

/// Check a client-supplied slug: non-empty and already in canonical form.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

/// The slug to store: the client's slug when given, otherwise one derived
/// from `name`.
///
/// A client slug must already be canonical; a derived slug must not be empty.
pub fn resolve_slug(explicit: Option<&str>, name: &str) -> Result<String, CoreError> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) if is_valid_slug(slug) => Ok(slug.to_string()),
        Some(slug) => Err(CoreError::validation(format!(
            "Invalid slug '{slug}': use lowercase letters, digits and single dashes"
        ))),
        None => {
            let slug = slugify(name);
            if slug.is_empty() {
                Err(CoreError::validation(
                    "Cannot derive a slug from the name; provide one explicitly",
                ))
            } else {
                Ok(slug)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_words() {
        assert_eq!(slugify("Men's T-Shirt"), "men-s-t-shirt");
    }

    #[test]
    fn collapses_separators() {
        assert_eq!(slugify("a   b___c"), "a-b-c");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(slugify("---abc---"), "abc");
    }

    #[test]
    fn keeps_thai_with_marks() {
        assert_eq!(slugify("เสื้อ ยืด"), "เสื้อ-ยืด");
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn valid_slug_check() {
        assert!(is_valid_slug("summer-sale"));
        assert!(!is_valid_slug("Summer Sale"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-leading"));
    }

    #[test]
    fn resolve_prefers_explicit_slug() {
        assert_eq!(resolve_slug(Some("summer-sale"), "Ignored").unwrap(), "summer-sale");
        assert_eq!(resolve_slug(None, "Summer Sale").unwrap(), "summer-sale");
        assert_eq!(resolve_slug(Some("  "), "Fallback Name").unwrap(), "fallback-name");
    }

    #[test]
    fn resolve_rejects_non_canonical_or_empty() {
        assert!(resolve_slug(Some("Not A Slug"), "x").is_err());
        assert!(resolve_slug(None, "!!!").is_err());
    }
}
