use std::collections::BTreeMap;

use anyhow::Context;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Multipart, RawQuery};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::{any, get, post};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

/// A server echoing what it receives as JSON.
#[derive(Debug)]
pub struct EchoServer {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl EchoServer {
    pub async fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("binding listener")?;
        let addr = listener.local_addr()?;
        info!(%addr, "launching echo server");

        let app = Router::new()
            .route("/echo", any(echo))
            .route("/echo/{id}", any(echo))
            .route("/upload", post(upload))
            .route("/missing", get(missing));

        let handle = tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, app.into_make_service()).await {
                tracing::error!(?error, "echo server stopped");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            handle,
        })
    }
}

impl Drop for EchoServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn echo(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect::<BTreeMap<_, _>>();

    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn upload(mut multipart: Multipart) -> Result<Json<Value>, (StatusCode, String)> {
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| (StatusCode::BAD_REQUEST, error.to_string()))?
    {
        let name = field.name().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let content = field
            .bytes()
            .await
            .map_err(|error| (StatusCode::BAD_REQUEST, error.to_string()))?;
        parts.push(json!({
            "name": name,
            "filename": filename,
            "content": String::from_utf8_lossy(&content),
        }));
    }
    Ok(Json(json!({ "parts": parts })))
}

async fn missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing here")
}
