//! Domain-level access to notes.
use crate::noteapi::{BoxedNoteApi, NoteApi};
use crate::{ApiResult, Note, NoteDraft, NoteID};

/// Entry point of the presentation layer into note storage.
///
/// Every operation is handed to the underlying [`NoteApi`] with the same arguments, and its
/// result is returned untouched. View models only ever see this type, never the transport.
pub struct NoteRepository {
    api: BoxedNoteApi,
}

impl NoteRepository {
    pub fn new(api: BoxedNoteApi) -> Self {
        NoteRepository { api }
    }

    pub fn from_api<A: NoteApi + Send + Sync + 'static>(api: A) -> Self {
        NoteRepository::new(Box::new(api))
    }

    pub async fn find_all(&self) -> ApiResult<Vec<Note>> {
        self.api.find_all().await
    }

    pub async fn find_by_id(&self, id: &NoteID) -> ApiResult<Note> {
        self.api.find_by_id(id).await
    }

    pub async fn remove(&self, id: &NoteID) -> ApiResult<()> {
        self.api.remove(id).await
    }

    pub async fn create(&self, note: &NoteDraft) -> ApiResult<Note> {
        self.api.create(note).await
    }

    pub async fn update(&self, id: &NoteID, note: &NoteDraft) -> ApiResult<Note> {
        self.api.update(id, note).await
    }
}
