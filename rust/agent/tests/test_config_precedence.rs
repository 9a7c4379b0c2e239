use arena_agent::config::{self, CONFIG_PATH_VAR, ConfigError, ValueSource};
use serial_test::serial;
use std::fs;

const VARS: &[&str] = &[
    CONFIG_PATH_VAR,
    "ARENA_LLM_TEMPERATURE",
    "ARENA_LLM_TIMEOUT",
    "ARENA_LLM_RETRIES",
    "ARENA_CLARIFY",
    "ARENA_PARSER_LOOKAHEAD",
    "ARENA_TOOL_ROUNDS",
    "ARENA_EQUITY_SAMPLES",
    "ARENA_TOOL_SEED",
];

fn clear_env() {
    for var in VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

#[test]
#[serial]
fn defaults_without_file_or_env() {
    clear_env();
    let resolved = config::load_with_sources().expect("load");
    assert_eq!(resolved.config.temperature, 0.7);
    assert_eq!(resolved.config.timeout_secs, 30);
    assert_eq!(resolved.config.retries, 3);
    assert!(resolved.config.clarify);
    assert_eq!(resolved.config.parser_lookahead, 32);
    assert_eq!(resolved.config.tool_rounds, 3);
    assert_eq!(resolved.config.equity_samples, 1_000);
    assert_eq!(resolved.sources.temperature, ValueSource::Default);
}

#[test]
#[serial]
fn tool_settings_from_env() {
    clear_env();
    unsafe {
        std::env::set_var("ARENA_TOOL_ROUNDS", "0");
        std::env::set_var("ARENA_TOOL_SEED", "17");
    }
    let resolved = config::load_with_sources().expect("load");
    assert_eq!(resolved.config.tool_rounds, 0);
    assert_eq!(resolved.config.tool_seed, 17);
    assert_eq!(resolved.sources.tool_rounds, ValueSource::Env);
    assert_eq!(resolved.sources.equity_samples, ValueSource::Default);

    unsafe {
        std::env::set_var("ARENA_EQUITY_SAMPLES", "20000");
    }
    assert!(matches!(config::load(), Err(ConfigError::Invalid(_))));
    clear_env();
}

#[test]
#[serial]
fn env_overrides_file_overrides_defaults() {
    clear_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("arena.toml");
    fs::write(&path, "temperature = 0.2\nretries = 1\nclarify = false\n").expect("write");
    unsafe {
        std::env::set_var(CONFIG_PATH_VAR, &path);
    }

    let from_file = config::load_with_sources().expect("load");
    assert_eq!(from_file.config.temperature, 0.2);
    assert_eq!(from_file.sources.temperature, ValueSource::File);
    assert_eq!(from_file.config.retries, 1);
    assert!(!from_file.config.clarify);
    assert_eq!(from_file.sources.timeout_secs, ValueSource::Default);

    unsafe {
        std::env::set_var("ARENA_LLM_TEMPERATURE", "1.1");
        std::env::set_var("ARENA_CLARIFY", "on");
        std::env::set_var("ARENA_PARSER_LOOKAHEAD", "64");
    }
    let from_env = config::load_with_sources().expect("load");
    assert_eq!(from_env.config.temperature, 1.1);
    assert_eq!(from_env.sources.temperature, ValueSource::Env);
    assert!(from_env.config.clarify);
    assert_eq!(from_env.sources.clarify, ValueSource::Env);
    assert_eq!(from_env.config.parser_lookahead, 64);
    assert_eq!(from_env.config.retries, 1);
    assert_eq!(from_env.sources.retries, ValueSource::File);

    clear_env();
}

#[test]
#[serial]
fn bad_env_value_is_reported() {
    clear_env();
    unsafe {
        std::env::set_var("ARENA_LLM_RETRIES", "lots");
    }
    let err = config::load().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidEnv {
            var: "ARENA_LLM_RETRIES",
            ..
        }
    ));
    clear_env();
}

#[test]
#[serial]
fn out_of_range_env_value_fails_validation() {
    clear_env();
    unsafe {
        std::env::set_var("ARENA_LLM_TEMPERATURE", "3.5");
    }
    assert!(matches!(config::load(), Err(ConfigError::Invalid(_))));
    clear_env();
}

#[test]
#[serial]
fn missing_or_malformed_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().expect("tempdir");
    unsafe {
        std::env::set_var(CONFIG_PATH_VAR, dir.path().join("absent.toml"));
    }
    assert!(matches!(config::load(), Err(ConfigError::Io { .. })));

    let path = dir.path().join("broken.toml");
    fs::write(&path, "temperature = \"warm\"\n").expect("write");
    unsafe {
        std::env::set_var(CONFIG_PATH_VAR, &path);
    }
    assert!(matches!(config::load(), Err(ConfigError::Parse(_))));
    clear_env();
}
