//! The note detail screen.
//!
//! Rendering and navigation belong to the front end, which plugs in through [`NoteDetailView`]
//! and [`Navigator`]. The screen wires user actions to a [`NoteDetailViewModel`] and renders what
//! it publishes for as long as its view is alive.
use crate::livedata::Lifecycle;
use crate::viewmodel::NoteDetailViewModel;
use crate::{ApiResult, Note, NoteID, NoteRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Argument key carrying the ID of the note to show.
pub const NOTE_ID_KEY: &str = "noteId";

pub trait NoteDetailView: Send + Sync {
    fn set_title(&self, title: &str);
    fn show_note(&self, note: &Note);
    fn show_success_message(&self);
    fn show_error_message(&self, message: &str);
}

pub trait Navigator: Send + Sync {
    /// Leave the current screen.
    fn navigate_up(&self);
    /// Open the editor, for `note_id` if given.
    fn navigate_to_edit(&self, note_id: Option<&NoteID>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Edit,
    Back,
}

pub struct NoteDetailScreen<V, N> {
    view_model: Arc<NoteDetailViewModel>,
    view: Arc<V>,
    navigator: Arc<N>,
    view_lifecycle: Lifecycle,
    observing_note: bool,
}

impl<V: NoteDetailView + 'static, N: Navigator + 'static> NoteDetailScreen<V, N> {
    pub fn new(
        repository: Arc<NoteRepository>,
        note_id: Option<NoteID>,
        view: Arc<V>,
        navigator: Arc<N>,
    ) -> Self {
        NoteDetailScreen {
            view_model: Arc::new(NoteDetailViewModel::new(repository, note_id)),
            view,
            navigator,
            view_lifecycle: Lifecycle::new(),
            observing_note: false,
        }
    }

    /// Build the screen from its navigation arguments, reading [`NOTE_ID_KEY`].
    pub fn from_arguments(
        repository: Arc<NoteRepository>,
        arguments: &HashMap<String, String>,
        view: Arc<V>,
        navigator: Arc<N>,
    ) -> Self {
        let note_id = arguments.get(NOTE_ID_KEY).cloned().map(NoteID::from);
        Self::new(repository, note_id, view, navigator)
    }

    pub fn view_model(&self) -> &Arc<NoteDetailViewModel> {
        &self.view_model
    }

    /// Render the note once it loads, and start loading it.
    ///
    /// The returned handle completes when the load does.
    pub fn on_resume(&mut self) -> JoinHandle<ApiResult<Note>> {
        if !self.observing_note {
            self.observing_note = true;
            let view = self.view.clone();
            self.view_model
                .note_live_data()
                .observe(&self.view_lifecycle, move |result| {
                    if let Some(note) = result.data() {
                        view.set_title(&note.title);
                        view.show_note(note);
                    }
                    match result {
                        ApiResult::Error(message) => view.show_error_message(message),
                        ApiResult::Loading => {}
                        ApiResult::Success(_) => view.show_success_message(),
                    }
                });
        }
        let view_model = self.view_model.clone();
        tokio::spawn(async move { view_model.find_by_id().await })
    }

    /// Delete the note, leaving the screen once it's gone.
    ///
    /// Returns `false` if there is no note to delete.
    pub fn on_remove_clicked(&self) -> bool {
        let Some(live_data) = self.view_model.remove() else {
            return false;
        };
        let view = self.view.clone();
        let navigator = self.navigator.clone();
        live_data.observe(&self.view_lifecycle, move |result| match result {
            ApiResult::Error(message) => view.show_error_message(message),
            ApiResult::Loading => {}
            ApiResult::Success(()) => {
                view.show_success_message();
                navigator.navigate_up();
            }
        });
        true
    }

    pub fn on_menu_item_selected(&self, action: MenuAction) -> bool {
        match action {
            MenuAction::Edit => self.navigator.navigate_to_edit(self.view_model.note_id()),
            MenuAction::Back => self.navigator.navigate_up(),
        }
        true
    }

    /// Tear down the view. Results still in flight are no longer rendered.
    ///
    /// A later [`NoteDetailScreen::on_resume`] renders into a fresh view.
    pub fn on_destroy_view(&mut self) {
        self.view_lifecycle.destroy();
        self.view_lifecycle = Lifecycle::new();
        self.observing_note = false;
    }
}
