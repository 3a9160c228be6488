use moringa_kernel::config::{load_config, load_config_with_vars};
use moringa_kernel::domain::config::{ApiConfig, SmtpSecurity};
use std::fs;
use tempfile::tempdir;

fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().expect("temp dir");
    let cfg: ApiConfig =
        load_config_with_vars(Some(dir.path().join("absent")), Vec::new()).expect("defaults");

    assert_eq!(cfg.server.port, 4583);
    assert_eq!(cfg.stats.baseline, 582);
    assert!(!cfg.mail.enabled);
}

#[test]
fn file_values_are_loaded() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("server.toml");
    fs::write(
        &path,
        r#"
        [server]
        port = 9000

        [mail]
        enabled = true
        host = "smtp.example.com"
        security = "starttls"
        port = 587

        [stats]
        baseline = 100
        "#,
    )
    .expect("write config");

    let cfg: ApiConfig = load_config(Some(&path)).expect("config from file");
    assert_eq!(cfg.server.port, 9000);
    assert!(cfg.mail.enabled);
    assert_eq!(cfg.mail.host, "smtp.example.com");
    assert_eq!(cfg.mail.security, SmtpSecurity::StartTls);
    assert_eq!(cfg.stats.baseline, 100);
}

#[test]
fn environment_overrides_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("server.toml");
    fs::write(&path, "[stats]\nbaseline = 100\n").expect("write config");

    let cfg: ApiConfig = load_config_with_vars(
        Some(&path),
        vars(&[
            ("MORINGA__STATS__BASELINE", "7"),
            ("MORINGA__MAIL__PASSWORD", "s3cret"),
            ("MORINGA__SERVER__CORS_ORIGINS", "https://a.example,https://b.example"),
            ("UNRELATED__STATS__BASELINE", "1"),
        ]),
    )
    .expect("config with overrides");

    assert_eq!(cfg.stats.baseline, 7);
    assert_eq!(cfg.mail.password.as_deref(), Some("s3cret"));
    assert_eq!(
        cfg.server.cors_origins,
        vec!["https://a.example".to_owned(), "https://b.example".to_owned()]
    );
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[server\nport = ").expect("write config");

    let result: Result<ApiConfig, _> = load_config_with_vars(Some(&path), Vec::new());
    assert!(result.is_err());
}
