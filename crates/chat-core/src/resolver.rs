use crate::catalogue::{Catalogue, CultureEntry};

/// Decide which culture a request refers to.
///
/// An explicit identifier that matches wins outright; otherwise the free text
/// is scanned for culture keys and names. Matching is case-insensitive and
/// substring based, so a name buried inside a longer word still matches.
pub fn resolve<'a>(
    catalogue: &'a Catalogue,
    explicit: Option<&str>,
    free_text: &str,
) -> Option<&'a CultureEntry> {
    explicit
        .and_then(|identifier| find_by_identifier(catalogue, identifier))
        .or_else(|| detect_in_text(catalogue, free_text))
}

/// Look up a culture by key, then by exact display name, then by a display
/// name containing the identifier. Each pass walks the whole catalogue in
/// order before the next, looser pass starts.
pub fn find_by_identifier<'a>(catalogue: &'a Catalogue, identifier: &str) -> Option<&'a CultureEntry> {
    let target = identifier.trim().to_lowercase();
    if target.is_empty() {
        return None;
    }
    catalogue
        .iter()
        .find(|entry| entry.key.to_lowercase() == target)
        .or_else(|| {
            catalogue
                .iter()
                .find(|entry| entry.display_name.to_lowercase() == target)
        })
        .or_else(|| {
            catalogue
                .iter()
                .find(|entry| entry.display_name.to_lowercase().contains(&target))
        })
}

/// First culture, in catalogue order, whose key or display name occurs in `text`.
pub fn detect_in_text<'a>(catalogue: &'a Catalogue, text: &str) -> Option<&'a CultureEntry> {
    if text.trim().is_empty() {
        return None;
    }
    let message = text.to_lowercase();
    catalogue.iter().find(|entry| {
        message.contains(&entry.key.to_lowercase())
            || message.contains(&entry.display_name.to_lowercase())
    })
}
