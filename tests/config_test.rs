//! Config parsing and validation integration tests

use clap::Parser;

use amber::config::Args;

/// Args reads these from the environment as fallbacks; scrub them so
/// the assertions below see the built-in defaults regardless of the
/// shell the tests run in.
fn clean_env() {
    for key in [
        "NODE_ID",
        "LISTEN",
        "TOKEN_SECRET",
        "PUBLIC_URL",
        "DEV_MODE",
        "LOG_LEVEL",
    ] {
        std::env::remove_var(key);
    }
}

/// Verify the defaults a bare `amber` invocation gets.
#[test]
fn test_default_config_values() {
    clean_env();
    let args = Args::parse_from(["amber"]);

    assert_eq!(args.listen.port(), 8530);
    assert!(!args.dev_mode);
    assert_eq!(args.log_level, "info");
    assert!(args.token_secret.is_none());
    assert!(args.public_url.is_none());
}

#[test]
fn test_validate_requires_secret_outside_dev_mode() {
    clean_env();
    let args = Args::parse_from(["amber"]);
    assert!(args.validate().is_err());

    let args = Args::parse_from(["amber", "--dev-mode"]);
    assert!(args.validate().is_ok());

    let args = Args::parse_from(["amber", "--token-secret", "s3cret"]);
    assert!(args.validate().is_ok());
}

#[test]
fn test_validate_rejects_empty_secret_and_port_zero() {
    clean_env();
    let args = Args::parse_from(["amber", "--token-secret", ""]);
    assert!(args.validate().is_err());

    let args = Args::parse_from([
        "amber",
        "--token-secret",
        "s3cret",
        "--listen",
        "127.0.0.1:0",
    ]);
    assert!(args.validate().is_err());
}

#[test]
fn test_dev_mode_falls_back_to_builtin_secret() {
    clean_env();
    let args = Args::parse_from(["amber", "--dev-mode"]);
    assert!(args.using_default_secret());
    assert!(!args.token_secret().is_empty());

    let args = Args::parse_from(["amber", "--dev-mode", "--token-secret", "mine"]);
    assert!(!args.using_default_secret());
    assert_eq!(args.token_secret(), "mine");
}

#[test]
fn test_public_url_defaults_to_listen_address() {
    clean_env();
    let args = Args::parse_from(["amber", "--listen", "0.0.0.0:9000"]);
    assert_eq!(args.public_url(), "http://0.0.0.0:9000");

    let args = Args::parse_from(["amber", "--public-url", "https://amber.example.org"]);
    assert_eq!(args.public_url(), "https://amber.example.org");
}

#[test]
fn test_listen_parses_host_port() {
    clean_env();
    let args = Args::parse_from(["amber", "--listen", "127.0.0.1:8600"]);
    assert_eq!(args.listen.to_string(), "127.0.0.1:8600");

    assert!(Args::try_parse_from(["amber", "--listen", "not-an-addr"]).is_err());
}
