//! Key casing conversions between Rust/serde field names and SQL columns.

/// How field names are turned into column names when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEncodingStrategy {
    /// Use serialized field names verbatim.
    UseDefaultKeys,
    /// `uniqueValue` -> `unique_value`.
    #[default]
    ConvertToSnakeCase,
}

/// How column names are matched to field names when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyDecodingStrategy {
    /// Use column names verbatim.
    UseDefaultKeys,
    /// `unique_value` -> whichever field snake-cases to `unique_value`.
    #[default]
    ConvertFromSnakeCase,
}

/// What to do with absent (`None`) values when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NilEncodingStrategy {
    /// Leave the column out of the statement.
    Omit,
    /// Emit an explicit SQL `NULL`.
    #[default]
    AsNull,
}

impl KeyEncodingStrategy {
    pub fn apply(self, key: &str) -> String {
        match self {
            KeyEncodingStrategy::UseDefaultKeys => key.to_string(),
            KeyEncodingStrategy::ConvertToSnakeCase => to_snake_case(key),
        }
    }
}

/// Convert a camelCase / PascalCase key to snake_case.
///
/// Acronyms stay together (`myURLValue` -> `my_url_value`) and leading or
/// trailing underscores are kept. Keys already in snake_case are unchanged.
pub fn to_snake_case(key: &str) -> String {
    let (prefix, core, suffix) = split_underscores(key);
    let chars: Vec<char> = core.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    out.push_str(prefix);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out.push_str(suffix);
    out
}

/// Convert a snake_case key to lowerCamelCase.
///
/// The first word is kept as-is; following words are capitalised. Keys
/// without inner underscores are returned unchanged.
pub fn from_snake_case(key: &str) -> String {
    let (prefix, core, suffix) = split_underscores(key);
    if !core.contains('_') {
        return key.to_string();
    }
    let mut words = core.split('_').filter(|w| !w.is_empty());
    let mut out = String::with_capacity(key.len());
    out.push_str(prefix);
    if let Some(first) = words.next() {
        out.push_str(first);
    }
    for word in words {
        let mut chars = word.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out.push_str(suffix);
    out
}

fn split_underscores(key: &str) -> (&str, &str, &str) {
    let start = key.len() - key.trim_start_matches('_').len();
    if start == key.len() {
        return (key, "", "");
    }
    let end = key.trim_end_matches('_').len();
    (&key[..start], &key[start..end], &key[end..])
}
