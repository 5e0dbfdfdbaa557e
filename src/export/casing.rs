//! Recursive JSON key renaming between naming conventions.

use crate::config::KeyCase;
use serde_json::{Map, Value};

/// Rewrites every mapping key in `value`, at any depth, to `case`.
/// Scalars and string values are left alone.
pub fn transform_keys(value: Value, case: KeyCase) -> Value {
    if case == KeyCase::AsIs {
        return value;
    }
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (convert_key(&key, case), transform_keys(value, case)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| transform_keys(item, case))
                .collect(),
        ),
        scalar => scalar,
    }
}

/// Converts one key, e.g. `httpOnly` to `http_only` for [`KeyCase::Snake`].
pub fn convert_key(key: &str, case: KeyCase) -> String {
    let words = split_words(key);
    match case {
        KeyCase::AsIs => key.to_string(),
        KeyCase::Snake => join_lower(&words, "_"),
        KeyCase::Kebab => join_lower(&words, "-"),
        KeyCase::Camel => words
            .iter()
            .enumerate()
            .map(|(index, word)| {
                if index == 0 {
                    word.to_lowercase()
                } else {
                    capitalize(word)
                }
            })
            .collect(),
        KeyCase::Pascal => words.iter().map(|word| capitalize(word)).collect(),
    }
}

fn join_lower(words: &[String], separator: &str) -> String {
    words
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(separator)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Splits on `_`, `-`, whitespace, lower-to-upper transitions, and the end
/// of an uppercase run (`HTTPOnly` is `HTTP` + `Only`).
fn split_words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (index, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[index - 1];
            let next_is_lower = chars.get(index + 1).map_or(false, |next| next.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::{convert_key, transform_keys};
    use crate::config::KeyCase;
    use serde_json::json;

    #[test]
    fn converts_cookie_attribute_names() {
        assert_eq!(convert_key("httpOnly", KeyCase::Snake), "http_only");
        assert_eq!(convert_key("sameSite", KeyCase::Kebab), "same-site");
        assert_eq!(convert_key("store_id", KeyCase::Camel), "storeId");
        assert_eq!(convert_key("hostOnly", KeyCase::Pascal), "HostOnly");
        assert_eq!(convert_key("HTTPOnly", KeyCase::Snake), "http_only");
        assert_eq!(convert_key("name", KeyCase::Pascal), "Name");
        assert_eq!(convert_key("expirationDate", KeyCase::AsIs), "expirationDate");
    }

    #[test]
    fn transform_recurses_and_leaves_values_alone() {
        let value = json!([
            {"name": "sid", "sameSite": "no_restriction", "partitionKey": {"topLevelSite": "https://x"}},
            [{"httpOnly": true}],
            "camelCaseString"
        ]);
        let transformed = transform_keys(value, KeyCase::Snake);
        assert_eq!(
            transformed,
            json!([
                {"name": "sid", "same_site": "no_restriction", "partition_key": {"top_level_site": "https://x"}},
                [{"http_only": true}],
                "camelCaseString"
            ])
        );
    }

    #[test]
    fn as_is_returns_input_untouched() {
        let value = json!({"sameSite": {"innerKey": 1}});
        assert_eq!(transform_keys(value.clone(), KeyCase::AsIs), value);
    }
}
