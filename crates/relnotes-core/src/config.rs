//! Configuration for a release notes run.
//!
//! Everything a run needs is loaded once at startup into immutable values
//! that are passed by reference to each component:
//!
//! - [`Credentials`]: work-tracking and mail secrets from a JSON file
//! - [`PromptTemplates`]: the two prompt files sent to the language model
//! - [`ModelSettings`]: language model key, model name and endpoint
//!
//! # Environment Variables
//!
//! - `RELNOTES_HOME`: Override the state directory (default `~/.relnotes`)
//! - `RELNOTES_CREDENTIALS`: Path to the credentials file
//! - `OPENAI_API_KEY`: Language model API key (required for completions)
//! - `OPENAI_MODEL`: Model identifier (default `gpt-4`)
//! - `OPENAI_BASE_URL`: API base URL (default `https://api.openai.com/v1`)

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ReleaseNotesError, Result};

/// Environment variable for custom state directory.
pub const HOME_ENV: &str = "RELNOTES_HOME";

/// Environment variable for the credentials file path.
pub const CREDENTIALS_ENV: &str = "RELNOTES_CREDENTIALS";

/// Environment variable for the language model API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable for the language model identifier.
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";

/// Environment variable for the language model API base URL.
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Default credentials file, relative to the working directory.
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

/// Default system-role prompt file.
pub const DEFAULT_SYSTEM_ROLE_FILE: &str = "systemRole.txt";

/// Default task-template prompt file.
pub const DEFAULT_TASK_TEMPLATE_FILE: &str = "systemInput.txt";

/// Default language model.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default language model API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".relnotes";

/// Get the state directory.
///
/// The state directory is determined by:
/// 1. `RELNOTES_HOME` environment variable if set
/// 2. `~/.relnotes` if home directory is available
/// 3. `.relnotes` in current directory as fallback
pub fn state_dir() -> PathBuf {
    std::env::var(HOME_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the `.env.local` file path inside the state directory.
pub fn env_file() -> PathBuf {
    state_dir().join(".env.local")
}

/// Load environment files for secrets.
///
/// Checks `./.env.local`, `./.env` and then the state directory's
/// `.env.local`. Variables already set are never overridden, so earlier
/// files take precedence over later ones.
pub fn load_env() {
    for candidate in [PathBuf::from(".env.local"), PathBuf::from(".env"), env_file()] {
        if candidate.exists() {
            debug!(path = %candidate.display(), "Loading environment file");
            let _ = dotenvy::from_path(&candidate);
        }
    }
}

/// Credentials and identifiers for the work-tracking service and the mailer.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Work-tracking organization.
    #[serde(rename = "AZURE_ORG")]
    pub organization: String,

    /// Work-tracking project.
    #[serde(rename = "AZURE_PROJECT")]
    pub project: String,

    /// Personal access token, not yet encoded.
    #[serde(rename = "AZURE_PAT")]
    pub personal_access_token: String,

    /// Saved query selecting the items flagged for release.
    #[serde(rename = "QUERY_ID")]
    pub query_id: String,

    /// Address the report is sent from.
    #[serde(rename = "SENDER_EMAIL")]
    pub sender_email: String,

    /// App password for the sender's mail account.
    #[serde(rename = "SEND_APP_PASSWORD")]
    pub app_password: String,

    /// Distribution list.
    #[serde(rename = "RECIPIENTS")]
    pub recipients: Vec<String>,
}

impl Credentials {
    /// Load credentials from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, lacks a
    /// required key, or leaves a required value empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ReleaseNotesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|e| match e {
            ReleaseNotesError::Config(msg) => {
                ReleaseNotesError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse credentials from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let credentials: Self = serde_json::from_str(json)
            .map_err(|e| ReleaseNotesError::Config(format!("invalid credentials: {}", e)))?;
        credentials.validate()?;
        Ok(credentials)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("AZURE_ORG", &self.organization),
            ("AZURE_PROJECT", &self.project),
            ("AZURE_PAT", &self.personal_access_token),
            ("QUERY_ID", &self.query_id),
            ("SENDER_EMAIL", &self.sender_email),
            ("SEND_APP_PASSWORD", &self.app_password),
        ];
        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ReleaseNotesError::Config(format!("{} must not be empty", key)));
        }
        if self.recipients.is_empty() {
            return Err(ReleaseNotesError::Config(
                "RECIPIENTS must list at least one address".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("personal_access_token", &"<redacted>")
            .field("query_id", &self.query_id)
            .field("sender_email", &self.sender_email)
            .field("app_password", &"<redacted>")
            .field("recipients", &self.recipients)
            .finish()
    }
}

/// The two prompt texts sent with every completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    /// Role description for the model.
    pub system_role: String,

    /// Per-item task, with `{title}` and `{description}` placeholders.
    pub task_template: String,
}

impl PromptTemplates {
    /// Create templates from in-memory text.
    pub fn new(system_role: impl Into<String>, task_template: impl Into<String>) -> Self {
        Self {
            system_role: system_role.into(),
            task_template: task_template.into(),
        }
    }

    /// Read both templates from disk.
    pub fn load(system_role: impl AsRef<Path>, task_template: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(
            read_text(system_role.as_ref())?,
            read_text(task_template.as_ref())?,
        ))
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ReleaseNotesError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Language model connection settings.
#[derive(Clone)]
pub struct ModelSettings {
    /// Model identifier (e.g., "gpt-4").
    pub model: String,

    /// API key sent as a bearer token.
    pub api_key: String,

    /// API base URL; `/chat/completions` is appended.
    pub base_url: String,
}

impl ModelSettings {
    /// Create settings for the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    /// Read settings from the process environment.
    ///
    /// # Errors
    /// Returns an error if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(OPENAI_API_KEY_ENV)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ReleaseNotesError::Config(format!(
                    "Missing {} environment variable",
                    OPENAI_API_KEY_ENV
                ))
            })?;

        let mut settings = Self::new(api_key);
        if let Some(model) = lookup(OPENAI_MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            settings = settings.with_model(model);
        }
        if let Some(url) = lookup(OPENAI_BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            settings = settings.with_base_url(url);
        }
        Ok(settings)
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSettings")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"{
        "AZURE_ORG": "contoso",
        "AZURE_PROJECT": "Web Portal",
        "AZURE_PAT": "pat-secret",
        "QUERY_ID": "5c1a7b2e-0000-4000-8000-000000000001",
        "SENDER_EMAIL": "releases@contoso.com",
        "SEND_APP_PASSWORD": "app-secret",
        "RECIPIENTS": ["dev@contoso.com", "qa@contoso.com"]
    }"#;

    #[test]
    fn test_credentials_from_json() {
        let creds = Credentials::from_json(SAMPLE).unwrap();
        assert_eq!(creds.organization, "contoso");
        assert_eq!(creds.project, "Web Portal");
        assert_eq!(creds.personal_access_token, "pat-secret");
        assert_eq!(creds.recipients.len(), 2);
    }

    #[test]
    fn test_credentials_missing_key() {
        let err = Credentials::from_json(r#"{"AZURE_ORG": "contoso"}"#).unwrap_err();
        assert!(matches!(err, ReleaseNotesError::Config(_)));
        assert!(err.to_string().contains("AZURE_PROJECT"));
    }

    #[test]
    fn test_credentials_empty_recipients() {
        let json = SAMPLE.replace(r#"["dev@contoso.com", "qa@contoso.com"]"#, "[]");
        let err = Credentials::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("RECIPIENTS"));
    }

    #[test]
    fn test_credentials_blank_value() {
        let json = SAMPLE.replace("pat-secret", "  ");
        let err = Credentials::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("AZURE_PAT"));
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials::from_json(SAMPLE).unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("pat-secret"));
        assert!(!debug.contains("app-secret"));
        assert!(debug.contains("contoso"));
    }

    #[test]
    fn test_credentials_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("credentials.json");
        fs::write(&path, SAMPLE).unwrap();

        let creds = Credentials::load(&path).unwrap();
        assert_eq!(creds.query_id, "5c1a7b2e-0000-4000-8000-000000000001");
    }

    #[test]
    fn test_credentials_load_missing_file() {
        let err = Credentials::load("/nonexistent/credentials.json").unwrap_err();
        assert!(matches!(err, ReleaseNotesError::Io { .. }));
    }

    #[test]
    fn test_credentials_load_names_file_on_bad_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("credentials.json");
        fs::write(&path, "{").unwrap();

        let err = Credentials::load(&path).unwrap_err();
        assert!(err.to_string().contains("credentials.json"));
    }

    #[test]
    fn test_prompt_templates_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let role = temp_dir.path().join("systemRole.txt");
        let task = temp_dir.path().join("systemInput.txt");
        fs::write(&role, "You write release notes.").unwrap();
        fs::write(&task, "Title: {title}\nDescription: {description}").unwrap();

        let prompts = PromptTemplates::load(&role, &task).unwrap();
        assert_eq!(prompts.system_role, "You write release notes.");
        assert!(prompts.task_template.contains("{title}"));
    }

    #[test]
    fn test_prompt_templates_missing_file() {
        let err = PromptTemplates::load("/nonexistent/a.txt", "/nonexistent/b.txt").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/a.txt"));
    }

    #[test]
    fn test_model_settings_defaults() {
        let vars: HashMap<&str, &str> = [(OPENAI_API_KEY_ENV, "sk-test")].into();
        let settings = ModelSettings::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(settings.api_key, "sk-test");
    }

    #[test]
    fn test_model_settings_overrides() {
        let vars: HashMap<&str, &str> = [
            (OPENAI_API_KEY_ENV, "sk-test"),
            (OPENAI_MODEL_ENV, "gpt-4o-mini"),
            (OPENAI_BASE_URL_ENV, "http://localhost:8080/v1"),
        ]
        .into();
        let settings = ModelSettings::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_model_settings_missing_key() {
        let err = ModelSettings::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains(OPENAI_API_KEY_ENV));
    }

    #[test]
    fn test_model_settings_debug_redacts_key() {
        let settings = ModelSettings::new("sk-very-secret");
        assert!(!format!("{:?}", settings).contains("sk-very-secret"));
    }

    #[test]
    fn test_env_file_name() {
        assert!(env_file().ends_with(".env.local"));
    }
}
