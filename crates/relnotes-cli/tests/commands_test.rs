//! Integration tests for command dispatch failures that happen before any network call.

use std::fs;
use std::path::Path;

use clap::Parser;
use relnotes_cli::cli::Cli;
use relnotes_cli::commands;

fn write_credentials(dir: &Path, recipients: &str) -> String {
    let path = dir.join("credentials.json");
    let json = format!(
        r#"{{
            "AZURE_ORG": "contoso",
            "AZURE_PROJECT": "Web Portal",
            "AZURE_PAT": "abc123",
            "QUERY_ID": "0d6c2a8e-1111-2222-3333-444455556666",
            "SENDER_EMAIL": "releases@contoso.com",
            "SEND_APP_PASSWORD": "app-password",
            "RECIPIENTS": {}
        }}"#,
        recipients
    );
    fs::write(&path, json).unwrap();
    path.display().to_string()
}

#[test]
fn test_run_rejects_empty_recipient_list() {
    let temp_dir = tempfile::tempdir().unwrap();
    let credentials = write_credentials(temp_dir.path(), "[]");

    let cli = Cli::parse_from(["relnotes", "--credentials", &credentials, "--dry-run"]);
    let err = commands::execute(cli).unwrap_err();
    assert!(err.to_string().contains("RECIPIENTS"));
}

#[test]
fn test_run_reports_missing_prompt_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let credentials = write_credentials(temp_dir.path(), r#"["dev@contoso.com"]"#);
    let role = temp_dir.path().join("missingRole.txt");

    let cli = Cli::parse_from([
        "relnotes",
        "run",
        "--credentials",
        &credentials,
        "--system-role",
        &role.display().to_string(),
        "--dry-run",
    ]);
    let err = commands::execute(cli).unwrap_err();
    assert!(err.to_string().contains("missingRole.txt"));
}

#[test]
fn test_ids_rejects_malformed_credentials() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("credentials.json");
    fs::write(&path, "{ not json").unwrap();

    let cli = Cli::parse_from(["relnotes", "ids", "-c", &path.display().to_string()]);
    let err = commands::execute(cli).unwrap_err();
    assert!(err.to_string().contains("invalid credentials"));
}
