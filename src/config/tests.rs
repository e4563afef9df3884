//! Configuration tests

use super::*;
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};
use ugen_coverage::CoverageType;
use ugen_language::{LanguageSettings, TestLayout};

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(config, parsed);
}

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.llm.model, "codellama");
    assert_eq!(config.llm.api_base, "http://localhost:11434");
    assert_eq!(config.generation.max_tests_per_run, 4);
    assert_eq!(config.coverage.coverage_type, CoverageType::Cobertura);
}

#[test]
fn test_config_from_file() {
    let mut config = Config::default();
    config.llm.model = "deepseek-coder".to_string();
    config.languages.insert(
        "python".to_string(),
        LanguageSettings {
            framework: Some("unittest".to_string()),
            layout: TestLayout::Mirror,
            ..LanguageSettings::default()
        },
    );

    let temp_file = NamedTempFile::new().unwrap();
    config.save_to_file(temp_file.path()).unwrap();

    let loaded = Config::from_file(temp_file.path()).unwrap();
    assert_eq!(config, loaded);
}

#[test]
fn test_partial_file_uses_defaults() {
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(
        temp_file.path(),
        "version: \"1.0\"\ncoverage:\n  report_path: lcov.info\n  coverage_type: lcov\n",
    )
    .unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();
    assert_eq!(config.coverage.report_path, PathBuf::from("lcov.info"));
    assert_eq!(config.coverage.coverage_type, CoverageType::Lcov);
    assert_eq!(config.llm, LlmConfig::default());
    assert_eq!(config.generation, GenerationConfig::default());
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();
    config.version = "2.0".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.generation.desired_coverage = 120.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.llm.api_base = "localhost:11434".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.history.max_entries = Some(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_env_overrides() {
    let env: HashMap<&str, &str> = [
        ("UGEN_LLM_MODEL", "qwen2.5-coder"),
        ("UGEN_LLM_API_BASE", "http://gpu-box:11434"),
    ]
    .into_iter()
    .collect();

    let mut config = Config::default();
    config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
    assert_eq!(config.llm.model, "qwen2.5-coder");
    assert_eq!(config.llm.api_base, "http://gpu-box:11434");

    let mut config = Config::default();
    config.apply_env_overrides(|_| Some("  ".to_string()));
    assert_eq!(config.llm, LlmConfig::default());
}

#[test]
fn test_locate_prefers_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    assert_eq!(
        Config::locate(None, temp_dir.path())
            .unwrap()
            .filter(|p| p.starts_with(temp_dir.path())),
        None
    );

    std::fs::write(temp_dir.path().join("ugen.yml"), "version: \"1.0\"\n").unwrap();
    std::fs::write(temp_dir.path().join(".ugen.yaml"), "version: \"1.0\"\n").unwrap();
    assert_eq!(
        Config::locate(None, temp_dir.path()).unwrap(),
        Some(temp_dir.path().join(".ugen.yaml"))
    );
}

#[test]
fn test_locate_explicit_path_must_exist() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.yaml");
    assert!(Config::locate(Some(&missing), temp_dir.path()).is_err());
}

#[test]
fn test_history_manager_from_config() {
    let config = HistoryConfig {
        enabled: true,
        path: PathBuf::from("/tmp/ugen-history.yaml"),
        max_entries: None,
    };
    assert_eq!(config.manager().path(), &PathBuf::from("/tmp/ugen-history.yaml"));
}
