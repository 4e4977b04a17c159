use super::{settle, NO_NOTE_SELECTED};
use crate::livedata::LiveData;
use crate::{ApiResult, Note, NoteID, NoteRepository};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Controller of the note detail screen.
///
/// Loads a single note into [`NoteDetailViewModel::note_live_data`] and removes it on request.
///
/// Loads are numbered as they start. When a load finishes after a newer one has started, its
/// result is dropped instead of being published, so a slow response can't overwrite a fresher
/// one. The superseded HTTP call itself still runs to completion.
pub struct NoteDetailViewModel {
    repository: Arc<NoteRepository>,
    note_id: Option<NoteID>,
    note_live_data: LiveData<ApiResult<Note>>,
    note: Arc<Mutex<Option<Note>>>,
    load_seq: AtomicU64,
}

impl NoteDetailViewModel {
    pub fn new(repository: Arc<NoteRepository>, note_id: Option<NoteID>) -> Self {
        NoteDetailViewModel {
            repository,
            note_id,
            note_live_data: LiveData::new(),
            note: Arc::new(Mutex::new(None)),
            load_seq: AtomicU64::new(0),
        }
    }

    pub fn note_id(&self) -> Option<&NoteID> {
        self.note_id.as_ref()
    }

    /// Results of [`NoteDetailViewModel::find_by_id`].
    pub fn note_live_data(&self) -> &LiveData<ApiResult<Note>> {
        &self.note_live_data
    }

    /// The last note loaded successfully, cleared once it is removed.
    pub fn note(&self) -> Option<Note> {
        self.note
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load the note of this screen.
    ///
    /// Publishes `Loading`, then the result of the repository call unless a newer load started
    /// in the meantime. The result is also returned to the caller.
    #[instrument(skip(self), fields(note_id = ?self.note_id))]
    pub async fn find_by_id(&self) -> ApiResult<Note> {
        let seq = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let id = match &self.note_id {
            Some(id) => id,
            None => {
                let result = ApiResult::Error(NO_NOTE_SELECTED.to_owned());
                self.note_live_data.set(result.clone());
                return result;
            }
        };

        self.note_live_data.set(ApiResult::Loading);
        let result = settle(self.repository.find_by_id(id).await);

        if self.load_seq.load(Ordering::SeqCst) != seq {
            debug!("discarding result of superseded load {}", seq);
            return result;
        }
        if let Some(note) = result.data() {
            *self.note.lock().unwrap_or_else(PoisonError::into_inner) = Some(note.clone());
        }
        self.note_live_data.set(result.clone());
        result
    }

    /// Remove the note of this screen.
    ///
    /// Returns `None` if the screen has no note. Otherwise every call gets its own
    /// [`LiveData`], which holds `Loading` until the removal finishes in a background task.
    /// Must be called within a Tokio runtime.
    pub fn remove(&self) -> Option<LiveData<ApiResult<()>>> {
        let id = self.note_id.clone()?;
        let live_data = LiveData::with_value(ApiResult::Loading);
        let repository = self.repository.clone();
        let note = self.note.clone();
        let publisher = live_data.clone();
        tokio::spawn(async move {
            info!("removing note {}", id);
            let result = settle(repository.remove(&id).await);
            if result.is_success() {
                note.lock().unwrap_or_else(PoisonError::into_inner).take();
            }
            publisher.set(result);
        });
        Some(live_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noteapi::NoteApi;
    use crate::{InMemoryNoteApi, Lifecycle, NoteDraft};
    use futures::future::BoxFuture;
    use tokio::sync::{mpsc, Notify};

    async fn repository_with_groceries() -> Arc<NoteRepository> {
        let api = InMemoryNoteApi::new();
        api.insert(Note::new("abc123", "Groceries", "Milk, eggs"))
            .await;
        Arc::new(NoteRepository::from_api(api))
    }

    #[tokio::test]
    async fn load_publishes_loading_then_note() {
        let vm = NoteDetailViewModel::new(repository_with_groceries().await, Some("abc123".into()));
        let owner = Lifecycle::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        vm.note_live_data().observe(&owner, move |r| {
            let _ = tx.send(r.clone());
        });
        vm.find_by_id().await;
        assert_eq!(rx.recv().await.unwrap(), ApiResult::Loading);
        assert_eq!(
            rx.recv().await.unwrap(),
            ApiResult::Success(Note::new("abc123", "Groceries", "Milk, eggs"))
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(vm.note().unwrap().title, "Groceries");
    }

    #[tokio::test]
    async fn load_missing_note() {
        let vm = NoteDetailViewModel::new(repository_with_groceries().await, Some("missing".into()));
        let result = vm.find_by_id().await;
        assert!(!result.error().unwrap().is_empty());
        assert_eq!(vm.note_live_data().value(), Some(result));
        assert!(vm.note().is_none());
    }

    #[tokio::test]
    async fn load_without_note_id() {
        let vm = NoteDetailViewModel::new(repository_with_groceries().await, None);
        assert_eq!(
            vm.find_by_id().await,
            ApiResult::Error(NO_NOTE_SELECTED.into())
        );
        assert!(vm.remove().is_none());
    }

    #[tokio::test]
    async fn remove_publishes_per_call() {
        let vm = NoteDetailViewModel::new(repository_with_groceries().await, Some("abc123".into()));
        vm.find_by_id().await;
        let owner = Lifecycle::new();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let first = vm.remove().unwrap();
        first.observe(&owner, move |r| {
            let _ = tx.send(r.clone());
        });
        let mut terminal = rx.recv().await.unwrap();
        while terminal.is_loading() {
            terminal = rx.recv().await.unwrap();
        }
        assert_eq!(terminal, ApiResult::Success(()));
        assert!(vm.note().is_none());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let second = vm.remove().unwrap();
        second.observe(&owner, move |r| {
            let _ = tx.send(r.clone());
        });
        let mut terminal = rx.recv().await.unwrap();
        while terminal.is_loading() {
            terminal = rx.recv().await.unwrap();
        }
        assert!(terminal.is_error());
        assert_eq!(first.value(), Some(ApiResult::Success(())));
    }

    /// Backend whose first lookup blocks until released.
    struct SlowFirst {
        inner: InMemoryNoteApi,
        release: Arc<Notify>,
        calls: AtomicU64,
    }

    impl NoteApi for SlowFirst {
        fn find_all(&self) -> BoxFuture<ApiResult<Vec<Note>>> {
            self.inner.find_all()
        }

        fn find_by_id<'a>(&'a self, id: &'a NoteID) -> BoxFuture<'a, ApiResult<Note>> {
            Box::pin(async move {
                let stale = self.inner.find_by_id(id).await.map(|mut n| {
                    n.title = "stale".into();
                    n
                });
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    self.release.notified().await;
                    return stale;
                }
                self.inner.find_by_id(id).await
            })
        }

        fn remove<'a>(&'a self, id: &'a NoteID) -> BoxFuture<'a, ApiResult<()>> {
            self.inner.remove(id)
        }

        fn create<'a>(&'a self, note: &'a NoteDraft) -> BoxFuture<'a, ApiResult<Note>> {
            self.inner.create(note)
        }

        fn update<'a>(
            &'a self,
            id: &'a NoteID,
            note: &'a NoteDraft,
        ) -> BoxFuture<'a, ApiResult<Note>> {
            self.inner.update(id, note)
        }
    }

    #[tokio::test]
    async fn superseded_load_is_discarded() {
        let inner = InMemoryNoteApi::new();
        inner
            .insert(Note::new("abc123", "Groceries", "Milk, eggs"))
            .await;
        let release = Arc::new(Notify::new());
        let repository = Arc::new(NoteRepository::from_api(SlowFirst {
            inner,
            release: release.clone(),
            calls: AtomicU64::new(0),
        }));
        let vm = Arc::new(NoteDetailViewModel::new(repository, Some("abc123".into())));

        let slow_vm = vm.clone();
        let slow = tokio::spawn(async move { slow_vm.find_by_id().await });
        while vm.note_live_data().value().is_none() {
            tokio::task::yield_now().await;
        }

        let fresh = vm.find_by_id().await;
        assert_eq!(fresh.data().unwrap().title, "Groceries");
        release.notify_one();
        let stale = slow.await.unwrap();
        assert_eq!(stale.data().unwrap().title, "stale");

        assert_eq!(vm.note_live_data().value(), Some(fresh));
        assert_eq!(vm.note().unwrap().title, "Groceries");
    }
}
