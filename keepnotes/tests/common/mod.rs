//! A fake note service for integration tests.
#![allow(dead_code)]
use actix_web::dev::ServerHandle;
use actix_web::web::{self, Data};
use actix_web::{delete, get, post, put, App, HttpResponse, HttpServer};
use keepnotes::{ApiResult, InMemoryNoteApi, NoteApi, NoteDraft, NoteID, WebClient, WebClientBuilder};
use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::json;
use std::net::TcpListener;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const NOT_FOUND: &str = "Note not found";

lazy_static! {
    static ref TRACING: () = {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    };
}

fn respond<T: Serialize>(result: ApiResult<T>) -> HttpResponse {
    match result {
        ApiResult::Success(data) => HttpResponse::Ok().json(data),
        ApiResult::Error(_) => HttpResponse::NotFound().json(json!({ "message": NOT_FOUND })),
        ApiResult::Loading => HttpResponse::InternalServerError().finish(),
    }
}

#[get("/notes")]
async fn find_all(api: Data<InMemoryNoteApi>) -> HttpResponse {
    respond(api.find_all().await)
}

#[get("/notes/{note_id}")]
async fn find_by_id(api: Data<InMemoryNoteApi>, params: web::Path<(String,)>) -> HttpResponse {
    let (note_id,) = params.into_inner();
    respond(api.find_by_id(&NoteID::from(note_id)).await)
}

#[delete("/notes/{note_id}")]
async fn remove(api: Data<InMemoryNoteApi>, params: web::Path<(String,)>) -> HttpResponse {
    let (note_id,) = params.into_inner();
    match api.remove(&NoteID::from(note_id)).await {
        ApiResult::Success(()) => HttpResponse::NoContent().finish(),
        other => respond(other),
    }
}

#[post("/notes")]
async fn create(api: Data<InMemoryNoteApi>, note: web::Json<NoteDraft>) -> HttpResponse {
    respond(api.create(&note.into_inner()).await)
}

#[put("/notes/{note_id}")]
async fn update(
    api: Data<InMemoryNoteApi>,
    params: web::Path<(String,)>,
    note: web::Json<NoteDraft>,
) -> HttpResponse {
    let (note_id,) = params.into_inner();
    respond(api.update(&NoteID::from(note_id), &note.into_inner()).await)
}

/// Answers lookups with something that isn't a note.
#[get("/notes/{note_id}")]
async fn broken_find_by_id() -> HttpResponse {
    HttpResponse::Ok().body("<html>maintenance</html>")
}

/// Fails deletions without any explanation.
#[delete("/notes/{note_id}")]
async fn broken_remove() -> HttpResponse {
    HttpResponse::InternalServerError().finish()
}

pub struct TestApp {
    /// Base URL of the working API.
    pub address: String,
    /// Base URL of an API that misbehaves.
    pub broken_address: String,
    pub api: Data<InMemoryNoteApi>,
    pub handle: ServerHandle,
}

impl TestApp {
    pub fn client(&self) -> WebClient {
        client_for(&self.address)
    }

    pub fn broken_client(&self) -> WebClient {
        client_for(&self.broken_address)
    }

    pub async fn stop(&self) {
        self.handle.stop(false).await;
    }
}

pub fn client_for(address: &str) -> WebClient {
    WebClientBuilder::new(address)
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build web client")
}

pub async fn spawn_app() -> TestApp {
    lazy_static::initialize(&TRACING);
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    // We retrieve the port assigned to us by the OS
    let port = listener.local_addr().unwrap().port();
    let api = Data::new(InMemoryNoteApi::new());
    let app_api = api.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_api.clone())
            .service(
                web::scope("/api/v1")
                    .service(find_all)
                    .service(find_by_id)
                    .service(remove)
                    .service(create)
                    .service(update),
            )
            .service(
                web::scope("/broken")
                    .service(broken_find_by_id)
                    .service(broken_remove),
            )
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    let _ = tokio::spawn(server);
    TestApp {
        address: format!("http://127.0.0.1:{}/api/v1", port),
        broken_address: format!("http://127.0.0.1:{}/broken", port),
        api,
        handle,
    }
}

/// Base URL of a port nothing listens on.
pub fn unreachable_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
