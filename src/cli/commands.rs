//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::agent::{AgentLoop, LoopConfig, ModelProvider, PromptSet};
use crate::cli::output::{
    OutputFormat, format_index_list, format_search_results, format_status, format_tool_list,
    format_transcript,
};
use crate::cli::parser::{Cli, Commands};
use crate::core::Transcript;
use crate::embedding::create_embedder;
use crate::error::{CommandError, Result};
use crate::index::{EmbeddingIndex, Retriever, index_key, index_name};
use crate::io::{is_csv_path, read_csv, read_text_file};
use crate::session::Session;
use crate::splitter::TextSplitter;
use crate::storage::{BlobStore, SqliteStore};
use crate::tools::{ToolRegistry, register_builtin_tools};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Init { force } => cmd_init(&db_path, *force),
        Commands::Status => cmd_status(&db_path, format),
        Commands::Reset { yes } => cmd_reset(&db_path, *yes),
        Commands::Index {
            file,
            name,
            chunk_size,
            overlap,
        } => cmd_index(&db_path, file, name.as_deref(), *chunk_size, *overlap),
        Commands::Search {
            query,
            name,
            top_k,
        } => cmd_search(&db_path, query, name, *top_k, format),
        Commands::ListIndexes => cmd_list_indexes(&db_path, format),
        Commands::DeleteIndex { name, yes } => cmd_delete_index(&db_path, name, *yes),
        Commands::Tools => cmd_tools(format),
        Commands::Ask {
            question,
            file,
            index,
            max_iterations,
            model,
            chart_dir,
            top_k,
        } => cmd_ask(
            &db_path,
            question,
            file.as_deref(),
            index.as_deref(),
            *max_iterations,
            model.clone(),
            chart_dir,
            *top_k,
            cli.prompt_dir.as_deref(),
            format,
        ),
        Commands::Prompts { write, dir } => cmd_prompts(*write, dir.as_deref(), cli.prompt_dir.as_deref()),
    }
}

/// Opens the store without initializing it.
fn open_store(db_path: &Path) -> Result<SqliteStore> {
    SqliteStore::open(db_path)
}

/// Prompts for confirmation on destructive commands.
#[allow(clippy::print_stderr)]
fn confirm(prompt: &str, yes: bool) -> Result<()> {
    if yes {
        return Ok(());
    }

    eprint!("{prompt} [y/N] ");
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

    if answer.trim().eq_ignore_ascii_case("y") {
        Ok(())
    } else {
        Err(CommandError::Cancelled.into())
    }
}

fn cmd_init(db_path: &Path, force: bool) -> Result<String> {
    if force && db_path.exists() {
        std::fs::remove_file(db_path)
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
    }

    let mut store = open_store(db_path)?;
    store.init()?;

    Ok(format!("Initialized store at {}\n", db_path.display()))
}

fn cmd_status(db_path: &Path, format: OutputFormat) -> Result<String> {
    let store = open_store(db_path)?;
    let stats = store.stats()?;
    Ok(format_status(&stats, format))
}

fn cmd_reset(db_path: &Path, yes: bool) -> Result<String> {
    confirm("Delete all stored indexes?", yes)?;

    let mut store = open_store(db_path)?;
    store.reset()?;
    Ok("Store reset.\n".to_string())
}

fn cmd_index(
    db_path: &Path,
    file: &Path,
    name: Option<&str>,
    chunk_size: usize,
    overlap: usize,
) -> Result<String> {
    let name = name
        .map(ToString::to_string)
        .or_else(|| {
            file.file_stem()
                .and_then(|s| s.to_str())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| "default".to_string());

    // CSV and plain text both index as raw text; the dataset path is
    // `ask --file`, this one feeds retrieval
    let text = read_text_file(file)?;
    let source = file.display().to_string();

    let splitter = TextSplitter::with_size_and_overlap(chunk_size, overlap);
    let chunks = splitter.split(&source, &text)?;
    let chunk_count = chunks.len();

    let embedder = create_embedder()?;
    let index = EmbeddingIndex::build(embedder.as_ref(), chunks)?;

    let mut store = open_store(db_path)?;
    index.persist(&mut store, &name)?;

    Ok(format!(
        "Indexed {chunk_count} chunks from {source} as '{name}'\n"
    ))
}

fn cmd_search(
    db_path: &Path,
    query: &str,
    name: &str,
    top_k: usize,
    format: OutputFormat,
) -> Result<String> {
    let store = open_store(db_path)?;
    let index = EmbeddingIndex::load(&store, name)?;

    let embedder = create_embedder()?;
    let hits = index.query(embedder.as_ref(), query, top_k)?;

    Ok(format_search_results(&hits, format))
}

fn cmd_list_indexes(db_path: &Path, format: OutputFormat) -> Result<String> {
    let store = open_store(db_path)?;
    let names: Vec<String> = store
        .list_keys()?
        .iter()
        .filter_map(|key| index_name(key).map(ToString::to_string))
        .collect();

    Ok(format_index_list(&names, format))
}

fn cmd_delete_index(db_path: &Path, name: &str, yes: bool) -> Result<String> {
    let mut store = open_store(db_path)?;
    let key = index_key(name);

    if store.get(&key)?.is_none() {
        return Err(crate::error::IndexError::NotFound {
            name: name.to_string(),
        }
        .into());
    }

    confirm(&format!("Delete index '{name}'?"), yes)?;
    store.delete(&key)?;
    Ok(format!("Deleted index '{name}'\n"))
}

fn cmd_tools(format: OutputFormat) -> Result<String> {
    let mut registry = ToolRegistry::new();
    register_builtin_tools(&mut registry)?;
    Ok(format_tool_list(&registry, format))
}

/// Runs one question through the agent loop against an assembled session.
///
/// Split out of [`cmd_ask`] so the loop wiring is testable with a
/// scripted provider.
pub fn run_ask(
    provider: &dyn ModelProvider,
    session: &mut Session,
    question: &str,
    max_iterations: usize,
    prompts: PromptSet,
) -> Result<Transcript> {
    let agent = AgentLoop::new(provider)
        .with_prompts(prompts)
        .with_config(LoopConfig::new(max_iterations));

    let transcript = agent.run(session, question)?;
    session.record(transcript.clone());
    Ok(transcript)
}

/// Assembles the session for `ask` from the CLI inputs.
fn build_ask_session(
    db_path: &Path,
    file: Option<&Path>,
    index: Option<&str>,
    chart_dir: &Path,
    top_k: usize,
) -> Result<Session> {
    if file.is_none() && index.is_none() {
        return Err(CommandError::NoInput.into());
    }

    let mut session = Session::new().with_builtin_tools()?.with_chart_dir(chart_dir);

    if let Some(file) = file {
        if !is_csv_path(file) {
            return Err(CommandError::InvalidArgument(format!(
                "--file expects a CSV file, got {}",
                file.display()
            ))
            .into());
        }
        session = session.with_dataset(read_csv(file)?);
    }

    if let Some(name) = index {
        let store = open_store(db_path)?;
        let loaded = EmbeddingIndex::load(&store, name)?;
        let embedder: Arc<dyn crate::embedding::Embedder> = Arc::from(create_embedder()?);
        let retriever = Retriever::new(Arc::new(loaded), embedder, top_k);
        session = session.with_retriever(retriever);
    }

    Ok(session)
}

#[allow(clippy::too_many_arguments)]
fn cmd_ask(
    db_path: &Path,
    question: &str,
    file: Option<&Path>,
    index: Option<&str>,
    max_iterations: usize,
    model: Option<String>,
    chart_dir: &Path,
    top_k: usize,
    prompt_dir: Option<&Path>,
    format: OutputFormat,
) -> Result<String> {
    let mut session = build_ask_session(db_path, file, index, chart_dir, top_k)?;
    let prompts = PromptSet::load(prompt_dir);

    let provider = make_provider(model)?;
    let transcript = run_ask(provider.as_ref(), &mut session, question, max_iterations, prompts)?;

    Ok(format_transcript(&transcript, format))
}

#[cfg(feature = "openai")]
fn make_provider(model: Option<String>) -> Result<Box<dyn ModelProvider>> {
    Ok(Box::new(crate::agent::OpenAiProvider::new(model)?))
}

#[cfg(not(feature = "openai"))]
fn make_provider(_model: Option<String>) -> Result<Box<dyn ModelProvider>> {
    Err(CommandError::ExecutionFailed(
        "this build has no model provider; rebuild with --features openai".to_string(),
    )
    .into())
}

fn cmd_prompts(write: bool, dir: Option<&Path>, prompt_dir: Option<&Path>) -> Result<String> {
    let target: Option<PathBuf> = dir
        .or(prompt_dir)
        .map(Path::to_path_buf)
        .or_else(PromptSet::default_dir);

    let Some(target) = target else {
        return Err(CommandError::ExecutionFailed(
            "cannot resolve a prompt directory".to_string(),
        )
        .into());
    };

    if write {
        let written = PromptSet::write_defaults(&target)
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        if written.is_empty() {
            return Ok(format!(
                "All templates already present in {}\n",
                target.display()
            ));
        }
        let mut output = String::new();
        for path in written {
            let _ = writeln!(output, "Wrote {}", path.display());
        }
        return Ok(output);
    }

    let mut output = format!("Prompt directory: {}\n", target.display());
    let analyst = target.join("analyst.md");
    let _ = writeln!(
        output,
        "  analyst.md: {}",
        if analyst.exists() {
            "present (overrides default)"
        } else {
            "absent (compiled-in default)"
        }
    );
    Ok(output)
}
