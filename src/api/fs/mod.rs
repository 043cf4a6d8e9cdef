//! File tree API endpoints
//!
//! GET  /api/fs/list?path=   - Directory listing (dirs first)
//! GET  /api/fs/tree?path=   - All files below a path
//! GET  /api/fs/read?path=   - Text file content
//! POST /api/fs/write        - Write a text file
//! POST /api/fs/create       - Create a new text file
//! POST /api/fs/mkdir        - Create a directory
//! POST /api/fs/delete       - Delete a file or empty directory
//! POST /api/fs/move         - Move or rename

use super::error::ApiError;
use axum::{
    extract::{Extension, Query},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studio_tools::{FsItem, Workspace};

/// `?path=` query, empty meaning the workspace root
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteBody {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathBody {
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveBody {
    pub src: String,
    pub dst: String,
}

#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

const OK: OkResponse = OkResponse { ok: true };

async fn list_dir(
    Extension(workspace): Extension<Arc<Workspace>>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<FsItem>>, ApiError> {
    Ok(Json(workspace.list(&query.path).await?))
}

async fn tree(
    Extension(workspace): Extension<Arc<Workspace>>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(workspace.tree(&query.path).await?))
}

async fn read_file(
    Extension(workspace): Extension<Arc<Workspace>>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ReadResponse>, ApiError> {
    let content = workspace.read(&query.path).await?;
    Ok(Json(ReadResponse {
        path: query.path,
        content,
    }))
}

async fn write_file(
    Extension(workspace): Extension<Arc<Workspace>>,
    Json(body): Json<WriteBody>,
) -> Result<Json<OkResponse>, ApiError> {
    workspace.write(&body.path, &body.content).await?;
    Ok(Json(OK))
}

async fn create_file(
    Extension(workspace): Extension<Arc<Workspace>>,
    Json(body): Json<WriteBody>,
) -> Result<Json<OkResponse>, ApiError> {
    workspace.create(&body.path, &body.content).await?;
    Ok(Json(OK))
}

async fn make_dir(
    Extension(workspace): Extension<Arc<Workspace>>,
    Json(body): Json<PathBody>,
) -> Result<Json<OkResponse>, ApiError> {
    workspace.mkdir(&body.path).await?;
    Ok(Json(OK))
}

async fn delete_path(
    Extension(workspace): Extension<Arc<Workspace>>,
    Json(body): Json<PathBody>,
) -> Result<Json<OkResponse>, ApiError> {
    workspace.delete(&body.path).await?;
    Ok(Json(OK))
}

async fn move_path(
    Extension(workspace): Extension<Arc<Workspace>>,
    Json(body): Json<MoveBody>,
) -> Result<Json<OkResponse>, ApiError> {
    workspace.rename(&body.src, &body.dst).await?;
    Ok(Json(OK))
}

/// Create file tree routes
pub fn fs_routes() -> Router {
    Router::new()
        .route("/api/fs/list", get(list_dir))
        .route("/api/fs/tree", get(tree))
        .route("/api/fs/read", get(read_file))
        .route("/api/fs/write", post(write_file))
        .route("/api/fs/create", post(create_file))
        .route("/api/fs/mkdir", post(make_dir))
        .route("/api/fs/delete", post(delete_path))
        .route("/api/fs/move", post(move_path))
}
