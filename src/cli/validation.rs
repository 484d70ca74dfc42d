//! Parsers for CLI argument values

/// Parse `KEY=VALUE`; the value may itself contain `=`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("parameter name is empty in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
