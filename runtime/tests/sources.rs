//! Building sources from configuration with on-disk cookie files.

use scout_runtime::config::ScoutConfig;
use scout_runtime::renderer::Readiness;
use scout_runtime::sources::{self, Advance, SourceKind};
use std::io::Write;

const EXPORT: &str = r#"[
  {"name": "li_at", "value": "token", "domain": ".linkedin.com", "sameSite": "no_restriction", "secure": true, "expirationDate": 1700000000.9},
  {"name": "lang", "value": "v=2&lang=en-us", "domain": ".linkedin.com", "sameSite": "lax"}
]"#;

fn config_with_cookies(path: std::path::PathBuf) -> ScoutConfig {
    ScoutConfig {
        cookie_file: path,
        ..ScoutConfig::default()
    }
}

#[test]
fn network_source_carries_file_cookies() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(EXPORT.as_bytes()).unwrap();
    let config = config_with_cookies(file.path().to_path_buf());

    let built = sources::from_config(&config, &[SourceKind::Network]).unwrap();

    assert_eq!(built.len(), 1);
    let network = &built[0];
    assert_eq!(network.kind, SourceKind::Network);
    assert_eq!(network.readiness, Readiness::Load);
    assert_eq!(
        network.advance,
        Advance::NextControl {
            selector: config.network_next_selector.clone()
        }
    );
    assert_eq!(network.cookies.len(), 2);
    assert_eq!(network.cookies[0].name, "li_at");
    assert_eq!(network.cookies[0].expires, Some(1_700_000_000));
}

#[test]
fn unreadable_cookie_file_leaves_network_unauthenticated() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_cookies(dir.path().join("missing.json"));

    let built = sources::from_config(&config, &[SourceKind::Network]).unwrap();

    assert!(built[0].cookies.is_empty());
}

#[test]
fn directory_source_never_gets_cookies() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(EXPORT.as_bytes()).unwrap();
    let config = config_with_cookies(file.path().to_path_buf());

    let built =
        sources::from_config(&config, &[SourceKind::Directory, SourceKind::Network]).unwrap();

    assert_eq!(built[0].kind, SourceKind::Directory);
    assert_eq!(built[0].readiness, Readiness::NetworkIdle);
    assert_eq!(built[0].advance, Advance::Scroll);
    assert!(built[0].cookies.is_empty());
    assert_eq!(built[1].cookies.len(), 2);
}
