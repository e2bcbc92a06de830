use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};

/// Identifier made of the current unix time in milliseconds and a short random
/// suffix, e.g. `1718000000000-k3f9qa`.
///
/// Unique enough for human-scale record creation; not a security token.
pub fn time_based_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Lowercase URL-safe form of a course code: `CSE 4101` becomes `cse-4101`.
///
/// Runs of characters outside `[a-z0-9]` collapse into a single `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
