//! Command line interface.
use crate::terminal::{self, ScreenEvent, SharedWriter, TerminalNavigator, TerminalView};
use anyhow::Context;
use clap::{Parser, Subcommand};
use keepnotes::viewmodel::NO_RESULT;
use keepnotes::{
    ApiResult, Lifecycle, LiveData, NoteDetailScreen, NoteDraft, NoteEditViewModel, NoteID,
    NoteListViewModel, NoteRepository,
};
use std::io::Write;
use std::sync::{Arc, PoisonError};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "keepnotes", version, about = "Keep short notes on a remote note service")]
pub struct Cli {
    /// Root URL of the note API, overriding the configuration.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all notes.
    List,
    /// Show a note.
    Show { id: String },
    /// Create a note.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Change the title or content of a note.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a note.
    Delete { id: String },
}

/// Run `command`, returning whether it succeeded.
///
/// Failures of the note service are reported on `out`; only terminal I/O errors are returned.
pub async fn run<W: Write + Send + 'static>(
    command: Commands,
    repository: Arc<NoteRepository>,
    out: SharedWriter<W>,
) -> anyhow::Result<bool> {
    match command {
        Commands::List => list(repository, out).await,
        Commands::Show { id } => show(repository, id.into(), out).await,
        Commands::Create { title, content } => {
            save(repository, None, Some(title), Some(content), out).await
        }
        Commands::Edit { id, title, content } => {
            save(repository, Some(id.into()), title, content, out).await
        }
        Commands::Delete { id } => delete(repository, id.into(), out).await,
    }
}

fn print<W: Write>(out: &SharedWriter<W>, line: &str) -> anyhow::Result<()> {
    let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
    writeln!(out, "{}", line).context("Failed to write to the terminal")
}

/// Report a call that didn't succeed.
fn print_failure<T, W: Write>(
    out: &SharedWriter<W>,
    result: &ApiResult<T>,
) -> anyhow::Result<bool> {
    print(out, &format!("error: {}", result.error().unwrap_or(NO_RESULT)))?;
    Ok(false)
}

/// Wait for the terminal value of a per-call [`LiveData`].
async fn terminal_value<T: Clone + Send + 'static>(
    live_data: &LiveData<ApiResult<T>>,
) -> ApiResult<T> {
    let lifecycle = Lifecycle::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    live_data.observe(&lifecycle, move |result: &ApiResult<T>| {
        if result.is_terminal() {
            let _ = tx.send(result.clone());
        }
    });
    rx.recv()
        .await
        .unwrap_or_else(|| ApiResult::Error("request was abandoned".to_owned()))
}

async fn list<W: Write + Send + 'static>(
    repository: Arc<NoteRepository>,
    out: SharedWriter<W>,
) -> anyhow::Result<bool> {
    let view_model = NoteListViewModel::new(repository);
    match view_model.find_all().await {
        ApiResult::Success(notes) if notes.is_empty() => print(&out, "no notes")?,
        ApiResult::Success(notes) => {
            for note in notes {
                print(&out, &format!("{}\t{}", note.id, note.title))?;
            }
        }
        failure => return print_failure(&out, &failure),
    }
    Ok(true)
}

fn detail_screen<W: Write + Send + 'static>(
    repository: Arc<NoteRepository>,
    id: NoteID,
    out: SharedWriter<W>,
) -> (
    NoteDetailScreen<TerminalView<W>, TerminalNavigator>,
    mpsc::UnboundedReceiver<ScreenEvent>,
) {
    let (tx, rx) = terminal::channel();
    let screen = NoteDetailScreen::new(
        repository,
        Some(id),
        Arc::new(TerminalView::new(out, tx.clone())),
        Arc::new(TerminalNavigator::new(tx)),
    );
    (screen, rx)
}

async fn show<W: Write + Send + 'static>(
    repository: Arc<NoteRepository>,
    id: NoteID,
    out: SharedWriter<W>,
) -> anyhow::Result<bool> {
    let (mut screen, _events) = detail_screen(repository, id, out);
    let result = screen
        .on_resume()
        .await
        .context("Loading the note panicked")?;
    screen.on_destroy_view();
    Ok(result.is_success())
}

async fn delete<W: Write + Send + 'static>(
    repository: Arc<NoteRepository>,
    id: NoteID,
    out: SharedWriter<W>,
) -> anyhow::Result<bool> {
    let (mut screen, mut events) = detail_screen(repository, id.clone(), out.clone());
    screen.on_remove_clicked();
    let mut deleted = false;
    while let Some(event) = events.recv().await {
        match event {
            ScreenEvent::NavigateUp => {
                print(&out, &format!("deleted note {}", id))?;
                deleted = true;
                break;
            }
            ScreenEvent::Error(_) => break,
            _ => {}
        }
    }
    screen.on_destroy_view();
    Ok(deleted)
}

/// Create a note when `id` is `None`, otherwise update the fields given.
async fn save<W: Write + Send + 'static>(
    repository: Arc<NoteRepository>,
    id: Option<NoteID>,
    title: Option<String>,
    content: Option<String>,
    out: SharedWriter<W>,
) -> anyhow::Result<bool> {
    let view_model = NoteEditViewModel::new(repository, id);
    let mut draft: NoteDraft = match view_model.load().await {
        ApiResult::Success(draft) => draft,
        failure => return print_failure(&out, &failure),
    };
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(content) = content {
        draft.content = content;
    }

    let editing = view_model.is_editing();
    match terminal_value(&view_model.save(draft)).await {
        ApiResult::Success(note) => {
            let verb = if editing { "updated" } else { "created" };
            print(&out, &format!("{} note {}", verb, note.id))?;
            Ok(true)
        }
        failure => print_failure(&out, &failure),
    }
}
