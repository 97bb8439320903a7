//! Record identity: URL-safe slug ids with numeric collision suffixes.

/// A record with a stable string id.
pub trait Record {
    /// The record's unique id.
    fn id(&self) -> &str;
}

/// Normalizes `value` into a URL-safe slug.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `-`, and strips leading and trailing dashes. May return an empty
/// string.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Returns `base` if no existing id equals it, otherwise `base-N` for the
/// lowest `N >= 2` not already taken.
#[must_use]
pub fn unique_id<'a, I>(base: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: std::collections::HashSet<&str> = existing.into_iter().collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut suffix = 2u64;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Builds a unique id for a new record named `name` among `records`.
///
/// Falls back to `fallback` when the name has no slug characters.
#[must_use]
pub fn id_for<R: Record>(name: &str, fallback: &str, records: &[R]) -> String {
    let slug = slugify(name);
    let base = if slug.is_empty() { fallback } else { &slug };
    unique_id(base, records.iter().map(Record::id))
}
