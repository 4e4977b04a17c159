//! In-memory note backend
use super::{not_found_message, NoteApi};
use crate::note::{Note, NoteDraft, NoteID};
use crate::result::ApiResult;
use futures::future::BoxFuture;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct InMemoryNoteApiInner {
    notes: HashMap<NoteID, (u64, Note)>,
    next_seq: u64,
}

impl InMemoryNoteApiInner {
    /// Generate a new [`NoteID`].
    ///
    /// We use the UUID V4 scheme.
    fn get_new_noteid(&self) -> NoteID {
        NoteID::new(Uuid::new_v4().to_string())
    }

    fn find_all(&self) -> Vec<Note> {
        let mut notes: Vec<&(u64, Note)> = self.notes.values().collect();
        notes.sort_by_key(|(seq, _)| *seq);
        notes.into_iter().map(|(_, n)| n.clone()).collect()
    }

    fn find_by_id(&self, id: &NoteID) -> Result<Note, String> {
        self.notes
            .get(id)
            .map(|(_, n)| n.clone())
            .ok_or_else(|| not_found_message(id))
    }

    fn insert(&mut self, note: Note) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.notes.insert(note.id.clone(), (seq, note));
    }

    fn create(&mut self, draft: &NoteDraft) -> Note {
        let note = Note {
            id: self.get_new_noteid(),
            title: draft.title.clone(),
            content: draft.content.clone(),
        };
        self.insert(note.clone());
        note
    }

    fn update(&mut self, id: &NoteID, draft: &NoteDraft) -> Result<Note, String> {
        let (_, note) = self
            .notes
            .get_mut(id)
            .ok_or_else(|| not_found_message(id))?;
        note.title = draft.title.clone();
        note.content = draft.content.clone();
        Ok(note.clone())
    }

    fn remove(&mut self, id: &NoteID) -> Result<(), String> {
        self.notes
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found_message(id))
    }
}

/// In-memory note backend.
///
/// There is no persistence and no network, which makes this useful for tests and offline
/// development.
#[derive(Debug, Default)]
pub struct InMemoryNoteApi {
    inner: RwLock<InMemoryNoteApiInner>,
}

impl InMemoryNoteApi {
    pub fn new() -> Self {
        Default::default()
    }

    /// Store a note with a caller-chosen ID, replacing any note with the same ID.
    pub async fn insert(&self, note: Note) {
        self.inner.write().await.insert(note);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.notes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl NoteApi for InMemoryNoteApi {
    fn find_all(&self) -> BoxFuture<ApiResult<Vec<Note>>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            ApiResult::Success(inner.find_all())
        })
    }

    fn find_by_id<'a>(&'a self, id: &'a NoteID) -> BoxFuture<'a, ApiResult<Note>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            inner.find_by_id(id).into()
        })
    }

    fn remove<'a>(&'a self, id: &'a NoteID) -> BoxFuture<'a, ApiResult<()>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            inner.remove(id).into()
        })
    }

    fn create<'a>(&'a self, note: &'a NoteDraft) -> BoxFuture<'a, ApiResult<Note>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            ApiResult::Success(inner.create(note))
        })
    }

    fn update<'a>(
        &'a self,
        id: &'a NoteID,
        note: &'a NoteDraft,
    ) -> BoxFuture<'a, ApiResult<Note>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            inner.update(id, note).into()
        })
    }
}
