use crate::sql::dialect::Dialect;

/// Characters that are replaced with `_` in table names.
const RESERVED_CHARACTERS: &[char] = &[
    '\\', '"', '\'', '`', ';', ',', '=', '*', '%', '<', '>', '|', '?', '!', '@', '#', '$', '^', '&',
    '(', ')', '+', '[', ']', '{', '}',
];

/// Makes a name usable as an identifier in every supported dialect.
///
/// Reserved punctuation becomes `_`, a leading digit gets an `f_` prefix and
/// an empty name becomes `column`. Letters of any script are kept.
pub fn sanitize_identifier(name: &str) -> String {
    if name.is_empty() {
        return "column".to_owned();
    }
    let sanitized = name.replace(RESERVED_CHARACTERS, "_");
    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        format!("f_{sanitized}")
    } else {
        sanitized
    }
}

/// Wraps a name in the dialect's identifier quotes, without escaping.
pub fn quote_identifier(name: &str, dialect: Dialect) -> String {
    let (open, close) = dialect.profile().identifier_quote;
    format!("{open}{name}{close}")
}
