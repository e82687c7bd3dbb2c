//! Hint flags

use std::collections::BTreeMap;

/// Hint name to boolean
pub type Flags = BTreeMap<String, bool>;

/// The baseline hint every control carries
pub const HIDDEN: &str = "hidden";

/// Flags of a control with no hint sources
pub fn baseline_flags() -> Flags {
    Flags::from([(HIDDEN.to_string(), false)])
}

/// Reduce `(name, value)` pairs into flags.
///
/// A name stays `true` once any pair contributes `true` for it.
pub fn merge_flags<I>(pairs: I) -> Flags
where
    I: IntoIterator<Item = (String, bool)>,
{
    let mut flags = Flags::new();
    for (name, value) in pairs {
        let entry = flags.entry(name).or_insert(false);
        *entry |= value;
    }
    flags
}

pub fn is_hidden(flags: &Flags) -> bool {
    flags.get(HIDDEN).copied().unwrap_or(false)
}
