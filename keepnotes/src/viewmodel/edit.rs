use super::settle;
use crate::livedata::LiveData;
use crate::{ApiResult, Note, NoteDraft, NoteID, NoteRepository};
use std::sync::{Arc, Mutex, PoisonError};

/// Controller of the create-or-edit screen.
///
/// Without a note ID the screen creates a new note. Once created, the note's ID is kept, so saving
/// again updates it instead of creating a duplicate.
pub struct NoteEditViewModel {
    repository: Arc<NoteRepository>,
    note_id: Arc<Mutex<Option<NoteID>>>,
    draft_live_data: LiveData<ApiResult<NoteDraft>>,
}

impl NoteEditViewModel {
    pub fn new(repository: Arc<NoteRepository>, note_id: Option<NoteID>) -> Self {
        NoteEditViewModel {
            repository,
            note_id: Arc::new(Mutex::new(note_id)),
            draft_live_data: LiveData::new(),
        }
    }

    pub fn note_id(&self) -> Option<NoteID> {
        self.note_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether saving updates an existing note.
    pub fn is_editing(&self) -> bool {
        self.note_id().is_some()
    }

    /// Draft shown in the editor, as published by [`NoteEditViewModel::load`].
    pub fn draft_live_data(&self) -> &LiveData<ApiResult<NoteDraft>> {
        &self.draft_live_data
    }

    /// Fill the editor.
    ///
    /// A new note starts with an empty draft; an existing note is fetched first.
    #[instrument(skip(self))]
    pub async fn load(&self) -> ApiResult<NoteDraft> {
        let result = match self.note_id() {
            None => ApiResult::Success(NoteDraft::default()),
            Some(id) => {
                self.draft_live_data.set(ApiResult::Loading);
                settle(self.repository.find_by_id(&id).await).map(NoteDraft::from)
            }
        };
        self.draft_live_data.set(result.clone());
        result
    }

    /// Save `draft`, creating or updating the note.
    ///
    /// Like [`crate::NoteDetailViewModel::remove`], every call gets its own [`LiveData`] and the
    /// request runs in a background task. Must be called within a Tokio runtime.
    pub fn save(&self, draft: NoteDraft) -> LiveData<ApiResult<Note>> {
        let live_data = LiveData::with_value(ApiResult::Loading);
        let repository = self.repository.clone();
        let note_id = self.note_id.clone();
        let publisher = live_data.clone();
        tokio::spawn(async move {
            let current = note_id
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            let result = match current {
                Some(id) => repository.update(&id, &draft).await,
                None => {
                    let result = repository.create(&draft).await;
                    if let Some(note) = result.data() {
                        info!("created note {}", note.id);
                        *note_id.lock().unwrap_or_else(PoisonError::into_inner) =
                            Some(note.id.clone());
                    }
                    result
                }
            };
            publisher.set(settle(result));
        });
        live_data
    }
}
