//! Release notes core - business logic for generating and sending release notes.
//!
//! This crate provides every stage of a release notes run:
//!
//! - **config**: Credentials, prompt templates and model settings
//! - **devops**: Azure DevOps client that runs the saved query and fetches items
//! - **completion**: Chat completion client for OpenAI-compatible APIs
//! - **notes**: Per-item prompt filling and note generation
//! - **formatter**: HTML document assembly
//! - **email**: Multipart HTML email delivery over SMTP
//! - **pipeline**: Sequencing of the stages above with progress reporting

pub mod completion;
pub mod config;
pub mod devops;
pub mod email;
pub mod error;
pub mod formatter;
pub mod notes;
pub mod pipeline;

// Re-export commonly used items for convenience
pub use completion::{ChatMessage, CompletionBackend, MessageRole, OpenAiClient};
pub use config::{load_env, state_dir, Credentials, ModelSettings, PromptTemplates};
pub use devops::{encode_pat, DevOpsClient, QueryResult, WorkItemSource};
pub use email::{ReportEmail, DEFAULT_SUBJECT, SMTP_HOST, SMTP_PORT};
pub use error::{ReleaseNotesError, Result};
pub use formatter::{escape_html, render_entry, render_entry_escaped, EntryRenderer, Formatter};
pub use notes::{build_messages, check_connection, fill_template, NoteGenerator};
pub use pipeline::{collect_work_items, dispatch, generate_notes, Progress, ReleaseDocument, ReleasePipeline};
