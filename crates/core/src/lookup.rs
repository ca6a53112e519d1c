/// Resolves a free-form place name against an ordered `(name, value)` table.
///
/// Tiers: exact case-insensitive match, then the first entry (in table order)
/// where either string contains the other, then `None`. A blank query never
/// matches.
pub fn resolve_place<'a, T>(table: &'a [(&'static str, T)], query: &str) -> Option<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some((_, value)) = table.iter().find(|(name, _)| *name == needle) {
        return Some(value);
    }

    table
        .iter()
        .find(|(name, _)| needle.contains(name) || name.contains(needle.as_str()))
        .map(|(_, value)| value)
}
