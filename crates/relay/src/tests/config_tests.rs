use super::{load_settings_from, Settings, DEFAULT_DOWNSTREAM_URL};

use std::{
    collections::HashMap,
    env, fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("certidao_relay_settings_{suffix}.toml"));
    fs::write(&path, contents).expect("write settings");
    path
}

fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_point_at_the_spreadsheet_script() {
    let settings = load_settings_from(&env::temp_dir().join("missing-relay.toml"), vars(&[]))
        .expect("settings");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.downstream_url, DEFAULT_DOWNSTREAM_URL);
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        "bind_addr = \"0.0.0.0:8080\"\ndownstream_url = \"http://localhost:9000/exec\"\nmax_body_bytes = 1024\n",
    );
    let settings = load_settings_from(&path, vars(&[])).expect("settings");
    assert_eq!(settings.bind_addr, "0.0.0.0:8080");
    assert_eq!(settings.downstream_url, "http://localhost:9000/exec");
    assert_eq!(settings.max_body_bytes, 1024);
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn env_overrides_file() {
    let path = temp_settings_file("downstream_url = \"http://localhost:9000/exec\"\n");
    let settings = load_settings_from(
        &path,
        vars(&[
            ("DOWNSTREAM_URL", "http://ignored:1/exec"),
            ("APP__DOWNSTREAM_URL", "https://example.org/exec"),
            ("RELAY_BIND", "127.0.0.1:4000"),
            ("APP__MAX_BODY_BYTES", "not-a-number"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.downstream_url, "https://example.org/exec");
    assert_eq!(settings.bind_addr, "127.0.0.1:4000");
    assert_eq!(settings.max_body_bytes, Settings::default().max_body_bytes);
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn rejects_non_http_downstream() {
    let err = load_settings_from(
        &env::temp_dir().join("missing-relay.toml"),
        vars(&[("DOWNSTREAM_URL", "ftp://example.org/exec")]),
    )
    .expect_err("ftp is not allowed");
    assert!(err.to_string().contains("http or https"));
}

#[test]
fn rejects_unparseable_bind_address() {
    let settings = Settings {
        bind_addr: "localhost".into(),
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn malformed_file_is_an_error() {
    let path = temp_settings_file("bind_addr = [");
    assert!(load_settings_from(&path, vars(&[])).is_err());
    fs::remove_file(path).expect("cleanup");
}
