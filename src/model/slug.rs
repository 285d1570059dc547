/// URL-safe slug: lowercase ASCII alphanumerics separated by single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Cardiac Cycle"), "cardiac-cycle");
        assert_eq!(slugify("  Renal -- Physiology (II)  "), "renal-physiology-ii");
        assert_eq!(slugify("ECG: 12 leads"), "ecg-12-leads");
    }

    #[test]
    fn test_slugify_of_symbols_is_empty() {
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(slugify(""), "");
    }
}
