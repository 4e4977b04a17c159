//! Rendering screens on a terminal.
use keepnotes::{Navigator, Note, NoteDetailView, NoteID};
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Output shared between a screen and the command driving it.
pub type SharedWriter<W> = Arc<Mutex<W>>;

/// What a screen asked the front end to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    NoteShown(Note),
    Success,
    Error(String),
    NavigateUp,
    NavigateToEdit(Option<NoteID>),
}

pub fn channel() -> (UnboundedSender<ScreenEvent>, UnboundedReceiver<ScreenEvent>) {
    mpsc::unbounded_channel()
}

pub struct TerminalView<W> {
    out: SharedWriter<W>,
    events: UnboundedSender<ScreenEvent>,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: SharedWriter<W>, events: UnboundedSender<ScreenEvent>) -> Self {
        TerminalView { out, events }
    }

    fn print(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", line) {
            warn!("failed to write to the terminal: {}", e);
        }
    }

    fn emit(&self, event: ScreenEvent) {
        // Nobody may be waiting for screen events.
        let _ = self.events.send(event);
    }
}

impl<W: Write + Send> NoteDetailView for TerminalView<W> {
    fn set_title(&self, title: &str) {
        self.print(&format!("# {}", title));
    }

    fn show_note(&self, note: &Note) {
        self.print(&note.content);
        self.emit(ScreenEvent::NoteShown(note.clone()));
    }

    fn show_success_message(&self) {
        self.emit(ScreenEvent::Success);
    }

    fn show_error_message(&self, message: &str) {
        self.print(&format!("error: {}", message));
        self.emit(ScreenEvent::Error(message.to_owned()));
    }
}

pub struct TerminalNavigator {
    events: UnboundedSender<ScreenEvent>,
}

impl TerminalNavigator {
    pub fn new(events: UnboundedSender<ScreenEvent>) -> Self {
        TerminalNavigator { events }
    }
}

impl Navigator for TerminalNavigator {
    fn navigate_up(&self) {
        let _ = self.events.send(ScreenEvent::NavigateUp);
    }

    fn navigate_to_edit(&self, note_id: Option<&NoteID>) {
        let _ = self.events.send(ScreenEvent::NavigateToEdit(note_id.cloned()));
    }
}
