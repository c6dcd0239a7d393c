use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

pub const DEFAULT_PORT: u16 = 3000;

const CONTENT_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
];

/// Content type for a file name, by exact (case-sensitive) extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, ct)| *ct)
        .unwrap_or("application/octet-stream")
}

/// Result of resolving one request path against the served root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticFile {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl StaticFile {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            content_type: "text/plain",
            body: b"File not found".to_vec(),
        }
    }

    fn server_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            content_type: "text/plain",
            body: b"Server error".to_vec(),
        }
    }
}

impl IntoResponse for StaticFile {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// Map a request path to a file under `root`. `/` names `index.html`.
///
/// Returns `None` for paths that would leave `root`.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let rel = match request_path {
        "" | "/" => "index.html",
        p => p.trim_start_matches('/'),
    };
    let rel = Path::new(rel);
    if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(root.join(rel))
}

/// Read the file behind `request_path`. Missing files are 404; any other I/O failure is 500.
pub async fn load_static(root: &Path, request_path: &str) -> StaticFile {
    let Some(path) = resolve(root, request_path) else {
        return StaticFile::not_found();
    };
    match tokio::fs::read(&path).await {
        Ok(body) => StaticFile {
            status: StatusCode::OK,
            content_type: content_type_for(&path),
            body,
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StaticFile::not_found(),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "static read failed");
            StaticFile::server_error()
        }
    }
}

async fn serve_file(State(root): State<Arc<PathBuf>>, uri: Uri) -> StaticFile {
    let file = load_static(&root, uri.path()).await;
    tracing::debug!(path = uri.path(), status = file.status.as_u16(), "static request");
    file
}

/// Router that answers every request from files under `root`.
pub fn router(root: PathBuf) -> Router {
    Router::new()
        .fallback(serve_file)
        .with_state(Arc::new(root))
}

pub async fn run(root: PathBuf, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        addr = %listener.local_addr().unwrap_or(addr),
        root = %root.display(),
        "serving static files"
    );
    axum::serve(listener, router(root))
        .await
        .context("static server stopped")?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/serve/mod.rs"]
mod tests;
