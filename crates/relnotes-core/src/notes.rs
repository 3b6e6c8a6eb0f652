//! Release note generation.
//!
//! Each work item gets one completion request. The conversation is fixed in
//! shape: the raw task template as a system message, the role description as
//! a user message, then the task template filled in with the item's title and
//! description as a second system message.

use relnotes_models::WorkItem;
use tracing::{debug, info};

use crate::completion::{ChatMessage, CompletionBackend};
use crate::config::PromptTemplates;
use crate::error::{ReleaseNotesError, Result};

/// Prompt used by [`check_connection`].
const CONNECTION_CHECK_PROMPT: &str = "Say one word";

/// Fill the `{title}` and `{description}` placeholders of a task template.
///
/// `{{` and `}}` produce literal braces. Any other placeholder, or a brace
/// without a partner, is rejected.
pub fn fill_template(template: &str, title: &str, description: &str) -> Result<String> {
    let mut out = String::with_capacity(template.len() + title.len() + description.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }
                if !closed {
                    return Err(ReleaseNotesError::Template(
                        "unmatched '{' in task template".into(),
                    ));
                }
                match name.as_str() {
                    "title" => out.push_str(title),
                    "description" => out.push_str(description),
                    other => {
                        return Err(ReleaseNotesError::Template(format!(
                            "unknown placeholder {{{}}}",
                            other
                        )))
                    }
                }
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(ReleaseNotesError::Template(
                    "single '}' in task template".into(),
                ))
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Build the conversation sent for one work item.
pub fn build_messages(prompts: &PromptTemplates, item: &WorkItem) -> Result<Vec<ChatMessage>> {
    let task = fill_template(&prompts.task_template, &item.title, &item.description)?;
    Ok(vec![
        ChatMessage::system(prompts.task_template.as_str()),
        ChatMessage::user(prompts.system_role.as_str()),
        ChatMessage::system(task),
    ])
}

/// Generates release notes with a language model.
pub struct NoteGenerator<B> {
    backend: B,
    prompts: PromptTemplates,
    model: String,
}

impl<B: CompletionBackend> NoteGenerator<B> {
    /// Create a generator using `backend` for completions.
    pub fn new(backend: B, prompts: &PromptTemplates, model: impl Into<String>) -> Self {
        Self {
            backend,
            prompts: prompts.clone(),
            model: model.into(),
        }
    }

    /// Model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate the release note for one item.
    ///
    /// The completion text is returned verbatim.
    pub fn generate_note(&self, item: &WorkItem) -> Result<String> {
        let messages = build_messages(&self.prompts, item)?;
        debug!(work_item_id = %item.id, model = %self.model, "Requesting release note");
        self.backend.complete(&self.model, &messages)
    }
}

/// Send a minimal prompt to verify the key and model are usable.
pub fn check_connection<B: CompletionBackend + ?Sized>(backend: &B, model: &str) -> Result<String> {
    let reply = backend.complete(model, &[ChatMessage::system(CONNECTION_CHECK_PROMPT)])?;
    info!(model = %model, "Language model reachable");
    Ok(reply)
}
