//! Canonical key names and their aliases.

/// Alias → canonical key pairs accepted anywhere a key is read.
pub const ALIASES: &[(&str, &str)] = &[
    ("channel", "channels"),
    ("yes", "always_yes"),
    ("auto_activate_base", "auto_activate"),
];

/// Resolve an alias to its canonical key. Unknown keys pass through.
pub fn canonical_key(key: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(key)
}

/// Whether `key` is an alias of some canonical key.
pub fn is_alias(key: &str) -> bool {
    ALIASES.iter().any(|(alias, _)| *alias == key)
}
