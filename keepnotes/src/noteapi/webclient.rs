//! HTTP backend talking to the remote note API.
use super::{not_found_message, NoteApi};
use crate::errors::{ClientError, WebClientBuildError};
use crate::note::{Note, NoteDraft, NoteID};
use crate::result::ApiResult;
use futures::future::BoxFuture;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_LEN: usize = 500;

pub struct WebClientBuilder {
    base_url: String,
    timeout: Duration,
}

impl WebClientBuilder {
    /// `base_url` is the root of the API; notes live under `{base_url}/notes`.
    pub fn new(base_url: impl Into<String>) -> Self {
        WebClientBuilder {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<WebClient, WebClientBuildError> {
        let base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(WebClientBuildError::CannotBeABase(self.base_url));
        }
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(WebClient { base_url, client })
    }
}

/// Client of the remote note API.
///
/// Every failure, whether the service is unreachable, answers with a non-2xx status, or sends
/// something that can't be decoded, ends up as an [`ApiResult::Error`] with a readable message.
#[derive(Debug, Clone)]
pub struct WebClient {
    base_url: Url,
    client: reqwest::Client,
}

impl WebClient {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the note collection, or of a single note when an ID is given.
    ///
    /// The ID is percent-encoded as one path segment. IDs that a URL would collapse into
    /// another path (empty, `.` and `..`) are rejected.
    fn notes_url(&self, id: Option<&NoteID>) -> Result<Url, ClientError> {
        if let Some(id) = id {
            if matches!(id.as_ref(), "" | "." | "..") {
                return Err(ClientError::InvalidNoteId(id.clone()));
            }
        }
        let mut url = self.base_url.clone();
        // The builder rejects cannot-be-a-base URLs, so the segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("notes");
            if let Some(id) = id {
                segments.push(id.as_ref());
            }
        }
        Ok(url)
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        id: Option<&NoteID>,
    ) -> Result<String, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Http {
                status,
                message: error_message(status, &body, id),
            });
        }
        Ok(body)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        id: Option<&NoteID>,
    ) -> Result<T, ClientError> {
        let body = self.execute(request, id).await?;
        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(skip(self))]
    async fn get_notes(&self) -> Result<Vec<Note>, ClientError> {
        let request = self.client.get(self.notes_url(None)?);
        self.execute_json(request, None).await
    }

    #[instrument(skip(self), fields(note_id = %id))]
    async fn get_note(&self, id: &NoteID) -> Result<Note, ClientError> {
        let request = self.client.get(self.notes_url(Some(id))?);
        self.execute_json(request, Some(id)).await
    }

    #[instrument(skip(self), fields(note_id = %id))]
    async fn delete_note(&self, id: &NoteID) -> Result<(), ClientError> {
        let request = self.client.delete(self.notes_url(Some(id))?);
        self.execute(request, Some(id)).await.map(|_| ())
    }

    #[instrument(skip(self, note))]
    async fn post_note(&self, note: &NoteDraft) -> Result<Note, ClientError> {
        let request = self.client.post(self.notes_url(None)?).json(note);
        self.execute_json(request, None).await
    }

    #[instrument(skip(self, note), fields(note_id = %id))]
    async fn put_note(&self, id: &NoteID, note: &NoteDraft) -> Result<Note, ClientError> {
        let request = self.client.put(self.notes_url(Some(id))?).json(note);
        self.execute_json(request, Some(id)).await
    }
}

/// Collapse a typed failure into the message-only envelope.
fn into_api_result<T>(operation: &str, result: Result<T, ClientError>) -> ApiResult<T> {
    match &result {
        Ok(_) => debug!("{} succeeded", operation),
        Err(ClientError::Http { status, message }) => {
            debug!("{} rejected with {}: {}", operation, status, message)
        }
        Err(ClientError::InvalidNoteId(id)) => {
            debug!("{} refused note id `{}`", operation, id)
        }
        Err(e) => error!("{} failed: {:?}", operation, e),
    }
    result.into()
}

/// Turn an error response into a message for the user.
///
/// A JSON body with a `message` or `error` string wins, then any non-empty body,
/// and finally a message derived from the status.
fn error_message(status: StatusCode, body: &str, id: Option<&NoteID>) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                if !message.trim().is_empty() {
                    return message.clone();
                }
            }
        }
    }
    let text = body.trim();
    if !text.is_empty() {
        return if text.chars().count() > MAX_ERROR_BODY_LEN {
            let truncated: String = text.chars().take(MAX_ERROR_BODY_LEN).collect();
            format!("{}... (truncated)", truncated)
        } else {
            text.to_owned()
        };
    }
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => not_found_message(id),
        _ => format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("error")
        ),
    }
}

impl NoteApi for WebClient {
    fn find_all(&self) -> BoxFuture<ApiResult<Vec<Note>>> {
        Box::pin(async move { into_api_result("find_all", self.get_notes().await) })
    }

    fn find_by_id<'a>(&'a self, id: &'a NoteID) -> BoxFuture<'a, ApiResult<Note>> {
        Box::pin(async move { into_api_result("find_by_id", self.get_note(id).await) })
    }

    fn remove<'a>(&'a self, id: &'a NoteID) -> BoxFuture<'a, ApiResult<()>> {
        Box::pin(async move { into_api_result("remove", self.delete_note(id).await) })
    }

    fn create<'a>(&'a self, note: &'a NoteDraft) -> BoxFuture<'a, ApiResult<Note>> {
        Box::pin(async move { into_api_result("create", self.post_note(note).await) })
    }

    fn update<'a>(
        &'a self,
        id: &'a NoteID,
        note: &'a NoteDraft,
    ) -> BoxFuture<'a, ApiResult<Note>> {
        Box::pin(async move { into_api_result("update", self.put_note(id, note).await) })
    }
}
