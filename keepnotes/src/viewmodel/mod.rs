//! Presentation controllers.
//!
//! View models own the state of one screen and expose it through [`crate::LiveData`].
//! They talk to the [`crate::NoteRepository`] only.
mod detail;
mod edit;
mod list;

pub use detail::NoteDetailViewModel;
pub use edit::NoteEditViewModel;
pub use list::NoteListViewModel;

use crate::ApiResult;

/// Message published when a screen has no note to work on.
pub const NO_NOTE_SELECTED: &str = "no note selected";

/// Message published when a backend answers with `Loading`.
pub const NO_RESULT: &str = "the note service returned no result";

/// Replace a `Loading` answer from the repository with an error, so every request settles.
fn settle<T>(result: ApiResult<T>) -> ApiResult<T> {
    match result {
        ApiResult::Loading => ApiResult::Error(NO_RESULT.to_owned()),
        result => result,
    }
}
