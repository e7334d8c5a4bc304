//! Stage configuration loading tests.

// Allow unwrap in tests - these are standard for test code
#![allow(clippy::unwrap_used)]

use firmprofile::config::{PipelineConfig, StageCommand, locate};
use firmprofile_core::{ProfileError, StageKind};
use std::path::{Path, PathBuf};

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn test_overrides_merge_with_defaults() {
    let config = PipelineConfig::from_toml_str(
        r#"
        working_dir = "/opt/profile-tools"

        [stages.schema_resolution]
        program = "pull-schema"
        args = ["--dir"]
        token_flag = "--token"
        "#,
    )
    .unwrap();

    assert_eq!(config.working_dir, Some(PathBuf::from("/opt/profile-tools")));
    assert_eq!(
        config.command_for(StageKind::SchemaResolution),
        StageCommand {
            program: "pull-schema".to_string(),
            args: vec!["--dir".to_string()],
            token_flag: Some("--token".to_string()),
        }
    );
    assert_eq!(
        config.command_for(StageKind::Extraction),
        StageCommand::default_for(StageKind::Extraction)
    );
}

#[test]
fn test_empty_document_is_default() {
    assert_eq!(
        PipelineConfig::from_toml_str("").unwrap(),
        PipelineConfig::default()
    );
}

#[test]
fn test_unknown_stage_rejected() {
    let result = PipelineConfig::from_toml_str(
        r#"
        [stages.decryption]
        program = "decrypt"
        "#,
    );
    assert!(matches!(result, Err(ProfileError::Config(_))));
}

#[test]
fn test_unknown_field_rejected() {
    let result = PipelineConfig::from_toml_str(
        r#"
        [stages.extraction]
        program = "extract"
        timeout = 30
        "#,
    );
    assert!(matches!(result, Err(ProfileError::Config(_))));
}

#[test]
fn test_config_error_exit_code() {
    let err = PipelineConfig::from_toml_str("stages = 3").unwrap_err();
    assert_eq!(err.exit_code(), 4);
}

// =============================================================================
// FILES
// =============================================================================

#[test]
fn test_from_file_reads_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("firmprofile.toml");
    std::fs::write(&path, "[stages.disassembly]\nprogram = \"haxomatic\"\n").unwrap();

    let config = PipelineConfig::from_file(&path).unwrap();
    assert_eq!(
        config.command_for(StageKind::Disassembly).program,
        "haxomatic"
    );
}

#[test]
fn test_from_file_missing() {
    let result = PipelineConfig::from_file(Path::new("/nonexistent/firmprofile.toml"));
    assert!(matches!(result, Err(ProfileError::Config(_))));
}

#[test]
fn test_from_file_error_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[stages.extraction\n").unwrap();

    let err = PipelineConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("broken.toml"));
}

// =============================================================================
// LOOKUP ORDER
// =============================================================================

#[test]
fn test_locate_explicit_wins() {
    let found = locate(
        Some(Path::new("cli.toml")),
        Some(PathBuf::from("env.toml")),
        Path::new("/nonexistent/fallback.toml"),
    );
    assert_eq!(found, Some(PathBuf::from("cli.toml")));
}

#[test]
fn test_locate_env_before_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("firmprofile.toml");
    std::fs::write(&fallback, "").unwrap();

    let found = locate(None, Some(PathBuf::from("env.toml")), &fallback);
    assert_eq!(found, Some(PathBuf::from("env.toml")));
}

#[test]
fn test_locate_empty_env_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("firmprofile.toml");
    std::fs::write(&fallback, "").unwrap();

    assert_eq!(locate(None, Some(PathBuf::new()), &fallback), Some(fallback));
}

#[test]
fn test_locate_missing_fallback_means_defaults() {
    assert_eq!(
        locate(None, None, Path::new("/nonexistent/firmprofile.toml")),
        None
    );
}
