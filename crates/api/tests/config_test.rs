use std::collections::HashMap;

use dealerbook_api::config::ApiConfig;
use pretty_assertions::assert_eq;
use tracing::Level;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults_with_required_values() {
    let config = ApiConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://localhost/dealerbook"),
        ("JWT_SECRET", "secret"),
    ]))
    .unwrap();

    assert_eq!(config.server_addr(), "0.0.0.0:3000");
    assert_eq!(config.database_max_connections, 5);
    assert_eq!(config.log_level, Level::INFO);
    assert_eq!(config.jwt_ttl_hours, 24);
    assert_eq!(config.request_timeout, 30);
    assert_eq!(config.timezone, chrono_tz::UTC);
    assert!(config.cors_origins.is_none());
}

#[test]
fn test_overrides() {
    let config = ApiConfig::from_lookup(lookup_from(&[
        ("API_HOST", "127.0.0.1"),
        ("API_PORT", "8080"),
        ("DATABASE_URL", "postgres://db/dealerbook"),
        ("LOG_LEVEL", "DEBUG"),
        ("API_CORS_ORIGINS", "http://localhost:5173, https://booking.example.com,"),
        ("JWT_SECRET", "secret"),
        ("JWT_TTL_HOURS", "2"),
        ("APP_TIMEZONE", "Asia/Jakarta"),
    ]))
    .unwrap();

    assert_eq!(config.server_addr(), "127.0.0.1:8080");
    assert_eq!(config.log_level, Level::DEBUG);
    assert_eq!(
        config.cors_origins,
        Some(vec![
            "http://localhost:5173".to_string(),
            "https://booking.example.com".to_string()
        ])
    );
    assert_eq!(config.jwt_ttl_hours, 2);
    assert_eq!(config.timezone, chrono_tz::Asia::Jakarta);
}

#[test]
fn test_missing_or_invalid_values() {
    let missing_secret =
        ApiConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/db")]));
    assert!(missing_secret.unwrap_err().to_string().contains("JWT_SECRET"));

    let missing_db = ApiConfig::from_lookup(lookup_from(&[("JWT_SECRET", "secret")]));
    assert!(missing_db.unwrap_err().to_string().contains("DATABASE_URL"));

    let bad_zone = ApiConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://localhost/db"),
        ("JWT_SECRET", "secret"),
        ("APP_TIMEZONE", "Mars/Olympus"),
    ]));
    assert!(bad_zone.unwrap_err().to_string().contains("APP_TIMEZONE"));

    let bad_port = ApiConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://localhost/db"),
        ("JWT_SECRET", "secret"),
        ("API_PORT", "eighty"),
    ]));
    assert!(bad_port.is_err());
}
