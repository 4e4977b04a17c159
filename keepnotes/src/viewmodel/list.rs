use super::settle;
use crate::livedata::LiveData;
use crate::{ApiResult, Note, NoteRepository};
use std::sync::Arc;

/// Controller of the note list screen.
pub struct NoteListViewModel {
    repository: Arc<NoteRepository>,
    notes_live_data: LiveData<ApiResult<Vec<Note>>>,
}

impl NoteListViewModel {
    pub fn new(repository: Arc<NoteRepository>) -> Self {
        NoteListViewModel {
            repository,
            notes_live_data: LiveData::new(),
        }
    }

    pub fn notes_live_data(&self) -> &LiveData<ApiResult<Vec<Note>>> {
        &self.notes_live_data
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> ApiResult<Vec<Note>> {
        self.notes_live_data.set(ApiResult::Loading);
        let result = settle(self.repository.find_all().await);
        self.notes_live_data.set(result.clone());
        result
    }
}
