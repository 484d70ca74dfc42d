//! Coverage percentage extraction

use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// Pattern matching the total in a Coverage.py `htmlcov/index.html`
pub const HTMLCOV_PATTERN: &str = r#"<span class="pc_cov">([0-9]+)%</span>"#;

/// First capture group of `pattern` in `text` as a percentage
///
/// Returns `Ok(None)` when nothing matches or the capture is not a number.
pub fn regex_coverage(pattern: &str, text: &str) -> Result<Option<f64>, regex::Error> {
    let regex = Regex::new(pattern)?;
    let Some(captures) = regex.captures(text) else {
        return Ok(None);
    };

    let Some(group) = captures.get(1) else {
        warn!("Coverage pattern '{}' has no capture group", pattern);
        return Ok(None);
    };

    match group.as_str().trim().parse::<f64>() {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!("Coverage value '{}' is not a number: {}", group.as_str(), err);
            Ok(None)
        }
    }
}

/// Total coverage from a Coverage.py HTML report
pub fn htmlcov_coverage(html: &str) -> Option<f64> {
    regex_coverage(HTMLCOV_PATTERN, html).ok().flatten()
}

/// Coverage from a Codecov branch API payload
///
/// Reads `commit.totals.c`, falling back to `commits[0].totals.c`. The
/// value may be a number or a numeric string.
pub fn codecov_coverage(payload: &Value) -> Option<f64> {
    let totals = payload
        .pointer("/commit/totals")
        .filter(|totals| totals.as_object().is_some_and(|t| !t.is_empty()))
        .or_else(|| payload.pointer("/commits/0/totals"))?;

    match totals.get("c")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_regex_coverage() {
        let log = "TOTAL    1200    84    93%\nCoverage: 93.0%";
        assert_eq!(
            regex_coverage(r"Coverage: ([0-9.]+)%", log).unwrap(),
            Some(93.0)
        );
        assert_eq!(regex_coverage(r"Missing: ([0-9]+)", log).unwrap(), None);
        assert_eq!(regex_coverage(r"TOTAL", log).unwrap(), None);
        assert!(regex_coverage(r"(unclosed", log).is_err());
    }

    #[test]
    fn test_htmlcov() {
        let html = r#"<h1>Coverage report: <span class="pc_cov">87%</span></h1>"#;
        assert_eq!(htmlcov_coverage(html), Some(87.0));
        assert_eq!(htmlcov_coverage("<html></html>"), None);
    }

    #[test]
    fn test_codecov_commit_totals() {
        let payload = json!({"commit": {"totals": {"c": "81.25000", "f": 120}}});
        assert_eq!(codecov_coverage(&payload), Some(81.25));

        let payload = json!({"commit": {"totals": {"c": 64.5}}});
        assert_eq!(codecov_coverage(&payload), Some(64.5));
    }

    #[test]
    fn test_codecov_falls_back_to_commits() {
        let payload = json!({
            "commit": {"totals": {}},
            "commits": [{"totals": {"c": "70.00000"}}, {"totals": {"c": "10"}}]
        });
        assert_eq!(codecov_coverage(&payload), Some(70.0));
    }

    #[test]
    fn test_codecov_missing_totals() {
        assert_eq!(codecov_coverage(&json!({})), None);
        assert_eq!(codecov_coverage(&json!({"commits": []})), None);
        assert_eq!(codecov_coverage(&json!({"commit": {"totals": {"c": null}}})), None);
    }
}
