use moodstack::config::Config;
use moodstack::constants::{
    DEFAULT_AI_MODEL, ENV_VAR_AI_MODEL, ENV_VAR_AI_TIMEOUT_SECS, ENV_VAR_DB_PATH,
    ENV_VAR_LEXICON_PATH, ENV_VAR_OLLAMA_URL,
};
use moodstack::errors::AppError;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

const VARS: &[&str] = &[
    ENV_VAR_DB_PATH,
    ENV_VAR_LEXICON_PATH,
    ENV_VAR_OLLAMA_URL,
    ENV_VAR_AI_MODEL,
    ENV_VAR_AI_TIMEOUT_SECS,
];

/// Snapshot of the variables a test touches, restored on drop.
struct EnvGuard(Vec<(&'static str, Option<String>)>);

impl EnvGuard {
    fn clean() -> Self {
        let saved = VARS.iter().map(|&v| (v, env::var(v).ok())).collect();
        for var in VARS {
            env::remove_var(var);
        }
        EnvGuard(saved)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (var, value) in &self.0 {
            match value {
                Some(v) => env::set_var(var, v),
                None => env::remove_var(var),
            }
        }
    }
}

#[test]
#[serial]
fn test_env_overrides() {
    let _guard = EnvGuard::clean();
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("moods.db");
    let lexicon_path = dir.path().join("lexicon.json");

    env::set_var(ENV_VAR_DB_PATH, &db_path);
    env::set_var(ENV_VAR_LEXICON_PATH, &lexicon_path);
    env::set_var(ENV_VAR_OLLAMA_URL, "http://10.0.0.5:11434");
    env::set_var(ENV_VAR_AI_MODEL, "llama3:8b");
    env::set_var(ENV_VAR_AI_TIMEOUT_SECS, "15");

    let config = Config::load().unwrap();
    config.validate().unwrap();

    assert_eq!(config.db_path, db_path);
    assert_eq!(config.lexicon_path, Some(lexicon_path));
    assert_eq!(config.ollama_url, "http://10.0.0.5:11434");
    assert_eq!(config.ai_model, "llama3:8b");
    assert_eq!(config.ai_timeout(), Duration::from_secs(15));
}

#[test]
#[serial]
fn test_paths_are_shell_expanded() {
    let _guard = EnvGuard::clean();
    let dir = tempdir().unwrap();
    env::set_var("MOODSTACK_TEST_ROOT", dir.path());
    env::set_var(ENV_VAR_DB_PATH, "$MOODSTACK_TEST_ROOT/nested/moods.db");

    let config = Config::load().unwrap();
    env::remove_var("MOODSTACK_TEST_ROOT");

    assert_eq!(config.db_path, dir.path().join("nested").join("moods.db"));
}

#[test]
#[serial]
fn test_blank_values_fall_back_to_defaults() {
    let _guard = EnvGuard::clean();
    env::set_var(ENV_VAR_AI_MODEL, "   ");
    env::set_var(ENV_VAR_LEXICON_PATH, "");

    let config = Config::load().unwrap();
    assert_eq!(config.ai_model, DEFAULT_AI_MODEL);
    assert!(config.lexicon_path.is_none());
}

#[test]
#[serial]
fn test_out_of_range_timeout_fails_validation() {
    let _guard = EnvGuard::clean();
    env::set_var(ENV_VAR_AI_TIMEOUT_SECS, "601");

    let config = Config::load().unwrap();
    match config.validate() {
        Err(AppError::Config(message)) => assert!(message.contains("601")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_unexpandable_path_is_config_error() {
    let _guard = EnvGuard::clean();
    env::remove_var("MOODSTACK_SURELY_UNSET_VAR");
    env::set_var(ENV_VAR_DB_PATH, "$MOODSTACK_SURELY_UNSET_VAR/moods.db");

    assert!(matches!(Config::load(), Err(AppError::Config(_))));
}

#[test]
fn test_default_db_path_is_set() {
    let config = Config::default();
    assert_ne!(config.db_path, PathBuf::new());
    assert!(config.validate().is_ok());
}
