const MAX_SLUG_LEN: usize = 48;

/// Lowercase, ASCII-only, hyphen separated. Non-Latin names produce an empty
/// slug and the caller picks a fallback.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// `attempt` 0 is `base` itself, then `base-2`, `base-3`, ...
pub fn slug_candidate(base: &str, attempt: usize) -> String {
    match attempt {
        0 => base.to_string(),
        n => format!("{base}-{}", n + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Sri Ganesh   Utsav 2025! "), "sri-ganesh-utsav-2025");
        assert_eq!(slugify("Durga--Puja"), "durga-puja");
        assert_eq!(slugify("గణేష్"), "");
    }

    #[test]
    fn candidates_append_counter() {
        assert_eq!(slug_candidate("utsav", 0), "utsav");
        assert_eq!(slug_candidate("utsav", 1), "utsav-2");
        assert_eq!(slug_candidate("utsav", 2), "utsav-3");
    }
}
