//! Authentication cookie loading.
//!
//! Cookie files are the JSON arrays produced by browser cookie-export
//! extensions. Loading never fails hard: any problem is logged and yields an
//! empty list, which callers treat as "no authenticated session available".

use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::types::{Cookie, SameSite, ScoutError, ScoutResult};

/// One cookie as written by the export extension.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub http_only: Option<bool>,
    #[serde(default)]
    pub same_site: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub expiration_date: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(f64),
    Text(String),
}

/// Epoch seconds written either as a JSON number or as a numeric string.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Seconds>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Seconds::Number(n)) => Ok(Some(n)),
        Some(Seconds::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid expirationDate {text:?}"))),
    }
}

/// Normalize an exported cookie into the shape the browser expects.
pub fn convert_cookie(raw: RawCookie) -> Cookie {
    Cookie {
        same_site: SameSite::from_export(raw.same_site.as_deref()),
        name: raw.name,
        value: raw.value,
        domain: raw.domain,
        path: raw.path.unwrap_or_else(|| "/".to_string()),
        secure: raw.secure.unwrap_or(false),
        http_only: raw.http_only.unwrap_or(false),
        // Truncation toward zero, matching the exporter's float seconds.
        expires: raw.expiration_date.map(|e| e as i64),
    }
}

/// Parse a cookie export document.
///
/// The document must be a JSON array and every element must carry `name`,
/// `value` and `domain`; otherwise the whole document is rejected.
pub fn parse_cookies(json: &str) -> ScoutResult<Vec<Cookie>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(ScoutError::InvalidCookie(
            "cookie file must contain a JSON array".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<RawCookie>(item)
                .map(convert_cookie)
                .map_err(|e| ScoutError::InvalidCookie(format!("entry {i}: {e}")))
        })
        .collect()
}

/// Load cookies from `path`, logging and returning an empty list on any error.
pub fn load_cookies(path: &Path) -> Vec<Cookie> {
    match try_load_cookies(path) {
        Ok(cookies) => {
            tracing::info!("loaded {} cookie(s) from {}", cookies.len(), path.display());
            cookies
        }
        Err(e) => {
            tracing::warn!("{}; continuing without an authenticated session", describe_load_error(path, &e));
            Vec::new()
        }
    }
}

/// Load cookies from `path`, surfacing the failure reason.
pub fn try_load_cookies(path: &Path) -> ScoutResult<Vec<Cookie>> {
    let data = std::fs::read_to_string(path)?;
    parse_cookies(&data)
}

/// Operator-facing description of a cookie load failure.
pub fn describe_load_error(path: &Path, error: &ScoutError) -> String {
    match error {
        ScoutError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
            format!("cookie file '{}' not found", path.display())
        }
        ScoutError::Json(_) => format!("invalid JSON format in '{}'", path.display()),
        ScoutError::InvalidCookie(msg) => {
            format!("bad cookie data in '{}': {msg}", path.display())
        }
        other => format!("cannot read cookie file '{}': {other}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn maps_no_restriction_and_truncates_expiry() {
        let cookies = parse_cookies(
            r#"[{"name":"a","value":"b","domain":"d","sameSite":"no_restriction","expirationDate":1700000000.9}]"#,
        )
        .unwrap();
        assert_eq!(cookies.len(), 1);
        let c = &cookies[0];
        assert_eq!(c.same_site, SameSite::None);
        assert_eq!(c.same_site.as_str(), "None");
        assert_eq!(c.expires, Some(1_700_000_000));
        assert_eq!(c.path, "/");
        assert!(!c.secure);
        assert!(!c.http_only);
    }

    #[test]
    fn expiry_accepts_numeric_strings() {
        let cookies = parse_cookies(
            r#"[{"name":"a","value":"b","domain":"d","expirationDate":"1700000000.9"},
                {"name":"c","value":"d","domain":"d","expirationDate":1700000001}]"#,
        )
        .unwrap();
        assert_eq!(cookies[0].expires, Some(1_700_000_000));
        assert_eq!(cookies[1].expires, Some(1_700_000_001));
    }

    #[test]
    fn non_numeric_expiry_rejects_document() {
        let err = parse_cookies(
            r#"[{"name":"a","value":"b","domain":"d","expirationDate":"next week"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScoutError::InvalidCookie(ref msg) if msg.starts_with("entry 0")));
    }

    #[test]
    fn missing_same_site_maps_to_none() {
        let cookies =
            parse_cookies(r#"[{"name":"a","value":"b","domain":"d","sameSite":null}, {"name":"x","value":"y","domain":"d"}]"#)
                .unwrap();
        assert!(cookies.iter().all(|c| c.same_site == SameSite::None));
        assert!(cookies.iter().all(|c| c.expires.is_none()));
    }

    #[test]
    fn keeps_explicit_flags() {
        let cookies = parse_cookies(
            r#"[{"name":"li_at","value":"v","domain":".linkedin.com","path":"/feed","secure":true,"httpOnly":true,"sameSite":"lax"}]"#,
        )
        .unwrap();
        let c = &cookies[0];
        assert_eq!(c.path, "/feed");
        assert!(c.secure);
        assert!(c.http_only);
        assert_eq!(c.same_site, SameSite::Lax);
    }

    #[test]
    fn missing_required_key_is_rejected() {
        let err = parse_cookies(r#"[{"name":"a","domain":"d"}]"#).unwrap_err();
        assert!(matches!(err, ScoutError::InvalidCookie(_)));
        assert!(err.to_string().contains("value"));
    }

    #[test]
    fn non_array_is_rejected() {
        let err = parse_cookies(r#"{"name":"a"}"#).unwrap_err();
        assert!(matches!(err, ScoutError::InvalidCookie(_)));
    }

    #[test]
    fn load_fails_soft() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(load_cookies(&missing).is_empty());

        let broken = dir.path().join("broken.json");
        std::fs::File::create(&broken)
            .unwrap()
            .write_all(b"[{not json")
            .unwrap();
        assert!(load_cookies(&broken).is_empty());

        let incomplete = dir.path().join("incomplete.json");
        std::fs::write(&incomplete, r#"[{"value":"b","domain":"d"}]"#).unwrap();
        assert!(load_cookies(&incomplete).is_empty());
    }

    #[test]
    fn load_reads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, r#"[{"name":"a","value":"b","domain":"d"}]"#).unwrap();
        let cookies = load_cookies(&path);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "a");
    }

    #[test]
    fn describes_missing_file() {
        let path = Path::new("/nonexistent/cookies.json");
        let err = try_load_cookies(path).unwrap_err();
        assert!(describe_load_error(path, &err).contains("not found"));
    }
}
