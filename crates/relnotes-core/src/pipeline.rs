//! End-to-end release notes run.
//!
//! Stages run strictly in sequence: query, item details, note generation,
//! formatting, delivery. The set and order of work items is fixed once the
//! details are fetched; later stages only attach notes or derive text.
//! The first error aborts the run.

use std::fmt;

use lettre::Transport;
use relnotes_models::{ReleaseHeading, WorkItem};
use tracing::info;

use crate::completion::CompletionBackend;
use crate::devops::WorkItemSource;
use crate::email::ReportEmail;
use crate::error::Result;
use crate::formatter::{render_entry, EntryRenderer, Formatter};
use crate::notes::NoteGenerator;

/// Milestones reported while a run progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Work item details were fetched.
    ItemsRetrieved {
        /// Number of items.
        count: usize,
    },
    /// Note generation is about to start.
    GenerationStarted,
    /// One item's note was generated.
    NoteGenerated {
        /// 1-based position of the item.
        index: usize,
        /// Number of items.
        total: usize,
    },
    /// All notes were generated.
    GenerationCompleted,
    /// The email is about to be submitted.
    SendingEmail,
    /// The email was submitted.
    Completed,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ItemsRetrieved { count } => {
                write!(f, "Retrieved {} work items from Azure DevOps...", count)
            }
            Self::GenerationStarted => write!(f, "Calling language model on work items..."),
            Self::NoteGenerated { index, total } => {
                write!(f, "Work item {}/{} complete...", index, total)
            }
            Self::GenerationCompleted => write!(f, "Language model calls completed..."),
            Self::SendingEmail => write!(f, "Sending email with release notes..."),
            Self::Completed => write!(f, "Complete."),
        }
    }
}

/// Work items with their notes, and the rendered document.
#[derive(Debug, Clone)]
pub struct ReleaseDocument {
    /// Items in fetch order, each with a generated note.
    pub items: Vec<WorkItem>,
    /// Rendered HTML.
    pub html: String,
}

/// Fetch identifiers for `query_id`, then the details of each.
pub fn collect_work_items<S>(source: &S, query_id: &str) -> Result<Vec<WorkItem>>
where
    S: WorkItemSource + ?Sized,
{
    let ids = source.fetch_item_identifiers(query_id)?;
    info!(count = ids.len(), "Fetching work item details");
    source.fetch_item_details(&ids)
}

/// Generate and attach a note for every item, one call at a time.
pub fn generate_notes<B: CompletionBackend>(
    generator: &NoteGenerator<B>,
    items: &mut [WorkItem],
    progress: &mut dyn FnMut(Progress),
) -> Result<()> {
    let total = items.len();
    progress(Progress::GenerationStarted);
    for (i, item) in items.iter_mut().enumerate() {
        let note = generator.generate_note(item)?;
        item.attach_note(note);
        progress(Progress::NoteGenerated {
            index: i + 1,
            total,
        });
    }
    progress(Progress::GenerationCompleted);
    Ok(())
}

/// Compose the document into `email` and send it.
pub fn dispatch<T>(
    email: &mut ReportEmail<T>,
    html: &str,
    progress: &mut dyn FnMut(Progress),
) -> Result<()>
where
    T: Transport,
    T::Error: fmt::Display,
{
    progress(Progress::SendingEmail);
    email.compose_message(html)?;
    email.send()?;
    progress(Progress::Completed);
    Ok(())
}

/// Runs the stages that produce the release document.
pub struct ReleasePipeline<S, B> {
    source: S,
    generator: NoteGenerator<B>,
    renderer: EntryRenderer,
    heading: ReleaseHeading,
}

impl<S, B> ReleasePipeline<S, B>
where
    S: WorkItemSource,
    B: CompletionBackend,
{
    /// Create a pipeline with the unescaped renderer and placeholder heading.
    pub fn new(source: S, generator: NoteGenerator<B>) -> Self {
        Self {
            source,
            generator,
            renderer: render_entry,
            heading: ReleaseHeading::placeholder(),
        }
    }

    /// Use a different entry renderer.
    pub fn with_renderer(mut self, renderer: EntryRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Use a release heading instead of placeholders.
    pub fn with_heading(mut self, heading: ReleaseHeading) -> Self {
        self.heading = heading;
        self
    }

    /// Fetch items, generate notes and render the document.
    pub fn build_document(
        &self,
        query_id: &str,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<ReleaseDocument> {
        let mut items = collect_work_items(&self.source, query_id)?;
        progress(Progress::ItemsRetrieved { count: items.len() });

        generate_notes(&self.generator, &mut items, progress)?;

        let mut formatter = Formatter::new()
            .with_renderer(self.renderer)
            .with_heading(self.heading.clone());
        for item in &items {
            formatter.append_entry(item);
        }
        let html = formatter.render_document();
        info!(entries = formatter.len(), bytes = html.len(), "Release document rendered");

        Ok(ReleaseDocument { items, html })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_lines() {
        assert_eq!(
            Progress::ItemsRetrieved { count: 3 }.to_string(),
            "Retrieved 3 work items from Azure DevOps..."
        );
        assert_eq!(
            Progress::NoteGenerated { index: 2, total: 3 }.to_string(),
            "Work item 2/3 complete..."
        );
        assert_eq!(Progress::Completed.to_string(), "Complete.");
    }
}
