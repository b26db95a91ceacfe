use super::*;

// =============================================================================
// normalize_api_url
// =============================================================================

#[test]
fn api_url_trailing_slash_trimmed() {
    assert_eq!(normalize_api_url("http://localhost:8000/").unwrap(), "http://localhost:8000");
}

#[test]
fn api_url_whitespace_trimmed() {
    assert_eq!(normalize_api_url("  https://api.example.com  ").unwrap(), "https://api.example.com");
}

#[test]
fn api_url_empty_rejected() {
    assert_eq!(normalize_api_url("   "), Err(ConfigError::EmptyApiUrl));
    assert_eq!(normalize_api_url("/"), Err(ConfigError::EmptyApiUrl));
}

#[test]
fn api_url_without_scheme_rejected() {
    assert_eq!(
        normalize_api_url("localhost:8000"),
        Err(ConfigError::InvalidApiUrl("localhost:8000".into()))
    );
}

// =============================================================================
// env_parse_u64 — unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_parse_u64_reads_value() {
    let key = "__TEST_AG_U64_SET_4411__";
    unsafe { std::env::set_var(key, " 42 ") };
    assert_eq!(env_parse_u64(key, 7), 42);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_u64_invalid_falls_back() {
    let key = "__TEST_AG_U64_BAD_4412__";
    unsafe { std::env::set_var(key, "soon") };
    assert_eq!(env_parse_u64(key, 7), 7);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_u64_unset_falls_back() {
    assert_eq!(env_parse_u64("__TEST_AG_U64_UNSET_4413__", 9), 9);
}

// =============================================================================
// ClientConfig::new
// =============================================================================

#[test]
fn new_keeps_storage_path_and_timeouts() {
    let timeouts = HttpTimeouts { request_secs: 5, connect_secs: 2 };
    let config = ClientConfig::new("http://127.0.0.1:9000/", PathBuf::from("/tmp/s.json"), timeouts).unwrap();
    assert_eq!(config.api_url, "http://127.0.0.1:9000");
    assert_eq!(config.storage_path, PathBuf::from("/tmp/s.json"));
    assert_eq!(config.timeouts, timeouts);
}

#[test]
fn default_timeouts_match_constants() {
    let timeouts = HttpTimeouts::default();
    assert_eq!(timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(timeouts.connect_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
}

// =============================================================================
// ClientConfig::with_overrides
// =============================================================================

#[test]
fn explicit_api_url_ignores_invalid_env_value() {
    // Only test that touches AUTHGATE_API_URL.
    unsafe { std::env::set_var("AUTHGATE_API_URL", "not-a-url") };
    let config = ClientConfig::with_overrides(Some("http://127.0.0.1:9000/"), Some(PathBuf::from("/tmp/s.json")));
    let from_env = ClientConfig::with_overrides(None, Some(PathBuf::from("/tmp/s.json")));
    unsafe { std::env::remove_var("AUTHGATE_API_URL") };

    let config = config.unwrap();
    assert_eq!(config.api_url, "http://127.0.0.1:9000");
    assert_eq!(config.storage_path, PathBuf::from("/tmp/s.json"));
    assert_eq!(from_env, Err(ConfigError::InvalidApiUrl("not-a-url".into())));
}
