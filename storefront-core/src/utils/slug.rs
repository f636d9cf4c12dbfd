//! URL slug generation for categories and products

/// Generate a URL-safe slug from a display name.
///
/// Lowercases, strips everything except alphanumerics, whitespace and
/// hyphens, then collapses whitespace/underscores into single hyphens.
pub fn generate_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.trim().chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_hyphen = !slug.is_empty();
        } else if c.is_alphanumeric() {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        }
        // 其余符号直接丢弃
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(generate_slug("Fresh Tomatoes"), "fresh-tomatoes");
        assert_eq!(generate_slug("Olive Oil 5L"), "olive-oil-5l");
    }

    #[test]
    fn strips_symbols() {
        assert_eq!(generate_slug("Premium! (Organic) Honey"), "premium-organic-honey");
    }

    #[test]
    fn collapses_separators() {
        assert_eq!(generate_slug("  a   b__c - d  "), "a-b-c-d");
    }

    #[test]
    fn no_leading_or_trailing_hyphen() {
        assert_eq!(generate_slug("--hello--"), "hello");
        assert_eq!(generate_slug("!!!"), "");
    }
}
