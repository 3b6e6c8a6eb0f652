//! Command handlers for CLI subcommands.

use std::fs;
use std::path::Path;

use relnotes_core::{
    check_connection, dispatch, render_entry, render_entry_escaped, Credentials, DevOpsClient,
    EntryRenderer, ModelSettings, NoteGenerator, OpenAiClient, Progress, PromptTemplates,
    ReleasePipeline, ReportEmail, WorkItemSource,
};
use relnotes_models::ReleaseHeading;
use tracing::info;

use crate::cli::{Cli, Commands, RunArgs};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute the parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run(args)) => cmd_run(&cli.credentials, &args),
        Some(Commands::Ids) => cmd_ids(&cli.credentials),
        Some(Commands::CheckModel) => cmd_check_model(),
        None => cmd_run(&cli.credentials, &cli.run),
    }
}

fn print_progress(progress: Progress) {
    println!("{}", progress);
}

fn cmd_run(credentials_path: &Path, args: &RunArgs) -> Result<()> {
    let credentials = Credentials::load(credentials_path)?;
    let prompts = PromptTemplates::load(&args.system_role, &args.task_template)?;
    let settings = ModelSettings::from_env()?;

    info!(
        organization = %credentials.organization,
        project = %credentials.project,
        model = %settings.model,
        "Starting release notes run"
    );

    let source = DevOpsClient::new(&credentials)?;
    let generator = NoteGenerator::new(OpenAiClient::new(&settings)?, &prompts, settings.model.clone());
    let pipeline = ReleasePipeline::new(source, generator)
        .with_renderer(renderer(args.escape_html))
        .with_heading(heading(args));

    let mut progress = print_progress;
    let document = pipeline.build_document(&credentials.query_id, &mut progress)?;

    if let Some(path) = &args.output {
        write_output(path, &document.html)?;
        println!("Wrote release notes to {}", path.display());
    }

    if args.dry_run {
        println!("Dry run: email not sent.");
        return Ok(());
    }

    let mut email = ReportEmail::smtp(&credentials, args.subject.as_str())?;
    dispatch(&mut email, &document.html, &mut progress)?;
    Ok(())
}

fn cmd_ids(credentials_path: &Path) -> Result<()> {
    let credentials = Credentials::load(credentials_path)?;
    let client = DevOpsClient::new(&credentials)?;

    let ids = client.fetch_item_identifiers(&credentials.query_id)?;
    println!("Query {} returned {} work items", credentials.query_id, ids.len());
    for id in ids {
        println!("  {}", id);
    }
    Ok(())
}

fn cmd_check_model() -> Result<()> {
    let settings = ModelSettings::from_env()?;
    let client = OpenAiClient::new(&settings)?;

    println!("Checking {} at {}...", settings.model, client.endpoint());
    let reply = check_connection(&client, &settings.model)?;
    println!("Model replied: {}", reply.trim());
    Ok(())
}

fn renderer(escape_html: bool) -> EntryRenderer {
    if escape_html {
        render_entry_escaped
    } else {
        render_entry
    }
}

fn heading(args: &RunArgs) -> ReleaseHeading {
    ReleaseHeading {
        name: args.release_name.clone(),
        date: args.release_date,
    }
}

fn write_output(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    Ok(())
}
