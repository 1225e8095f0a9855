//! Pack identifier allocation.
//!
//! Identifiers double as directory names under `packs/`, so they are
//! restricted to `[a-z0-9._-]`, never empty, never made of dots only, and
//! at most [`MAX_IDENTIFIER_LEN`] characters long.

/// Maximum identifier length, suffix included
pub const MAX_IDENTIFIER_LEN: usize = 100;

/// Identifier used when a name slugs down to nothing
pub const FALLBACK_IDENTIFIER: &str = "pack";

/// Reduce a display name to its base slug
///
/// Lower-cases, drops everything outside `[a-z0-9._- ]`, trims, and turns
/// the remaining spaces into underscores.
pub fn slugify(name: &str) -> String {
    let filtered: String = name
        .to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '_' | '-' | ' '))
        .collect();

    let mut slug = filtered.trim().replace(' ', "_");
    slug.truncate(MAX_IDENTIFIER_LEN);

    if slug.is_empty() || slug.chars().all(|c| c == '.') {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        slug
    }
}

/// Allocate a unique identifier for `name` given the identifiers in use
///
/// Collisions get `_1`, `_2`, ... appended; the base is shortened when
/// needed so the result stays within [`MAX_IDENTIFIER_LEN`].
pub fn allocate_identifier<'a, I>(name: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let existing: Vec<&str> = existing.into_iter().collect();
    let base = slugify(name);

    if !existing.contains(&base.as_str()) {
        return base;
    }

    let mut suffix: u64 = 1;
    loop {
        let tail = format!("_{}", suffix);
        let keep = base.len().min(MAX_IDENTIFIER_LEN - tail.len());
        let candidate = format!("{}{}", &base[..keep], tail);

        if !existing.contains(&candidate.as_str()) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Check that `identifier` has the slug shape
pub fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier.len() <= MAX_IDENTIFIER_LEN
        && !identifier.chars().all(|c| c == '.')
        && identifier
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '_' | '-'))
}
