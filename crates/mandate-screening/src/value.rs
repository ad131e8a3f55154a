use serde_json::Value;

/// Normalize a raw company-field value to the canonical millions basis.
///
/// Numbers pass through unchanged: whether a bare number is "in millions" is
/// a convention of the data source, not something this function can enforce.
/// Strings are cleaned of `$`, `%`, `,` and newlines, then scaled by their
/// magnitude suffix. Anything unparseable is `None`.
pub fn parse_value(raw: &Value) -> Option<f64> {
    match raw {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_value_str(s),
        _ => None,
    }
}

/// String form of [`parse_value`].
///
/// Suffix precedence is load-bearing: B is checked before M before T, by
/// substring containment with no word-boundary anchoring. Upstream feeds rely
/// on this exact order, so a token that happens to contain more than one of
/// the letters resolves to the first match even where that looks wrong.
pub fn parse_value_str(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\n' | '%' | '$' | ','))
        .collect();
    let upper = cleaned.to_uppercase();

    if upper.contains('B') {
        return upper.replace('B', "").trim().parse::<f64>().ok().map(|v| v * 1_000.0);
    }
    if upper.contains('M') {
        return upper.replace('M', "").trim().parse::<f64>().ok();
    }
    if upper.contains('T') {
        return upper
            .replace('T', "")
            .trim()
            .parse::<f64>()
            .ok()
            .map(|v| v * 1_000_000.0);
    }

    let bare = upper.trim();
    if bare.is_empty() {
        return None;
    }
    bare.parse::<f64>().ok()
}
