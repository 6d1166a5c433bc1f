//! Field-name normalization
//!
//! Diff keys are always snake_case so diffs from different entity types
//! line up when they share field names.

/// Convert a camelCase / PascalCase name to snake_case
///
/// Acronym runs stay together (`HTTPServer` -> `http_server`, `UserID` ->
/// `user_id`). Already snake_case input comes back unchanged, so the
/// conversion is idempotent.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if has_lowercase(c) && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());

            let word_start = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (has_lowercase(prev) && next_is_lower);

            if word_start && prev != '_' {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Uppercase with a distinct lowercase form
///
/// Caseless uppercase letters such as `ϒ` survive lowercasing and must not
/// open a word, or a second pass would split them again.
fn has_lowercase(c: char) -> bool {
    c.is_uppercase() && !c.to_lowercase().eq(std::iter::once(c))
}
