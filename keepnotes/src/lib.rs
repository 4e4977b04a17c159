//! KeepNotes: a client for a remote note service.
#[macro_use]
extern crate tracing;

pub mod errors;
pub mod livedata;
pub mod note;
pub mod noteapi;
pub mod repository;
pub mod result;
pub mod screen;
pub mod viewmodel;

pub use livedata::{Lifecycle, LiveData};
pub use note::{Note, NoteDraft, NoteID};
pub use noteapi::{BoxedNoteApi, InMemoryNoteApi, NoteApi, WebClient, WebClientBuilder};
pub use repository::NoteRepository;
pub use result::ApiResult;
pub use screen::{MenuAction, Navigator, NoteDetailScreen, NoteDetailView, NOTE_ID_KEY};
pub use viewmodel::{NoteDetailViewModel, NoteEditViewModel, NoteListViewModel};
