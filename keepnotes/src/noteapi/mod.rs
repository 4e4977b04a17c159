//! Backends serving notes to the repository.
use crate::note::{Note, NoteDraft, NoteID};
use crate::result::ApiResult;
use futures::future::BoxFuture;
use std::sync::Arc;

mod in_memory;
mod webclient;

pub use in_memory::InMemoryNoteApi;
pub use webclient::{WebClient, WebClientBuilder};


/// An abstraction over the note API.
///
/// Every operation resolves to a terminal [`ApiResult`], either `Success` or `Error`;
/// implementations never return `Loading`.
pub trait NoteApi {
    /// Get all notes.
    fn find_all(&self) -> BoxFuture<ApiResult<Vec<Note>>>;
    /// Get a note by its ID.
    fn find_by_id<'a>(&'a self, id: &'a NoteID) -> BoxFuture<'a, ApiResult<Note>>;
    /// Delete a note.
    ///
    /// Deleting a note that doesn't exist is an error.
    fn remove<'a>(&'a self, id: &'a NoteID) -> BoxFuture<'a, ApiResult<()>>;
    /// Create a new note.
    ///
    /// The backend assigns the [`NoteID`] of the returned note.
    fn create<'a>(&'a self, note: &'a NoteDraft) -> BoxFuture<'a, ApiResult<Note>>;
    /// Replace the title and content of an existing note.
    fn update<'a>(&'a self, id: &'a NoteID, note: &'a NoteDraft)
        -> BoxFuture<'a, ApiResult<Note>>;
}

pub type BoxedNoteApi = Box<dyn NoteApi + Sync + Send>;

/// Message used when a note can't be found.
pub(crate) fn not_found_message(id: &NoteID) -> String {
    format!("note `{}` not found", id)
}

impl<A: NoteApi + ?Sized> NoteApi for Arc<A> {
    fn find_all(&self) -> BoxFuture<ApiResult<Vec<Note>>> {
        (**self).find_all()
    }

    fn find_by_id<'a>(&'a self, id: &'a NoteID) -> BoxFuture<'a, ApiResult<Note>> {
        (**self).find_by_id(id)
    }

    fn remove<'a>(&'a self, id: &'a NoteID) -> BoxFuture<'a, ApiResult<()>> {
        (**self).remove(id)
    }

    fn create<'a>(&'a self, note: &'a NoteDraft) -> BoxFuture<'a, ApiResult<Note>> {
        (**self).create(note)
    }

    fn update<'a>(
        &'a self,
        id: &'a NoteID,
        note: &'a NoteDraft,
    ) -> BoxFuture<'a, ApiResult<Note>> {
        (**self).update(id, note)
    }
}
