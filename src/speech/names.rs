/// Spellings of "null" that speech engines read letter by letter
const NULL_ALIASES: [&str; 2] = ["nu11", "null"];

/// Convert an author display name into something a TTS engine reads well
///
/// Names that are a stylized "null" (any case, surrounding whitespace, one
/// leading `@`) become the plain word `null`. Every other name is returned
/// exactly as given.
pub fn friendly_name(author: &str) -> String {
    let lowered = author.to_lowercase();
    let trimmed = lowered.trim();
    let normalized = trimmed.strip_prefix('@').unwrap_or(trimmed);
    if NULL_ALIASES.contains(&normalized) {
        return "null".to_string();
    }
    author.to_string()
}
