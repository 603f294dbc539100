//! In-memory document-database server for tests and local experiments.
//!
//! Speaks the subset of the CouchDB HTTP API the client consumes, with
//! CouchDB-shaped bodies: `{"ok":true}` on success and
//! `{"error":..,"reason":..}` on failure. `_temp_view` does not run scripts;
//! it evaluates an identity map (`emit(doc._id, null)`) over the database.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// Documents of one database, keyed by id. Stored documents always carry
/// `_id` and `_rev`.
pub type Database = BTreeMap<String, Map<String, Value>>;

pub type Store = Arc<RwLock<BTreeMap<String, Database>>>;

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let store: Store = Arc::default();
    Router::new()
        .route("/_all_dbs", get(all_dbs))
        .route("/{db}", put(create_db).delete(delete_db).post(create_doc))
        .route("/{db}/_all_docs", get(all_docs))
        .route("/{db}/_temp_view", post(temp_view))
        .route("/{db}/{doc_id}", get(get_doc).delete(delete_doc))
        .with_state(store)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn ok(status: StatusCode) -> Reply {
    (status, Json(json!({ "ok": true })))
}

fn error(status: StatusCode, error: &str, reason: &str) -> Reply {
    (status, Json(json!({ "error": error, "reason": reason })))
}

fn no_db() -> Reply {
    error(StatusCode::NOT_FOUND, "not_found", "Database does not exist.")
}

fn missing() -> Reply {
    error(StatusCode::NOT_FOUND, "not_found", "missing")
}

/// Fresh first-generation revision token.
pub fn new_rev() -> String {
    format!("1-{}", Uuid::new_v4().simple())
}

async fn all_dbs(State(store): State<Store>) -> Json<Vec<String>> {
    Json(store.read().await.keys().cloned().collect())
}

async fn create_db(State(store): State<Store>, Path(db): Path<String>) -> Reply {
    let mut dbs = store.write().await;
    if dbs.contains_key(&db) {
        return error(
            StatusCode::PRECONDITION_FAILED,
            "file_exists",
            "The database could not be created, the file already exists.",
        );
    }
    debug!(%db, "database created");
    dbs.insert(db, Database::new());
    ok(StatusCode::CREATED)
}

async fn delete_db(State(store): State<Store>, Path(db): Path<String>) -> Reply {
    match store.write().await.remove(&db) {
        Some(_) => ok(StatusCode::OK),
        None => missing(),
    }
}

async fn all_docs(State(store): State<Store>, Path(db): Path<String>) -> Result<Json<Value>, Reply> {
    let dbs = store.read().await;
    let docs = dbs.get(&db).ok_or_else(no_db)?;
    let rows: Vec<Value> = docs
        .iter()
        .map(|(id, doc)| {
            let rev = doc.get("_rev").cloned().unwrap_or(Value::Null);
            json!({ "_id": id, "_rev": rev, "id": id, "key": id, "value": { "rev": rev } })
        })
        .collect();
    Ok(Json(json!({ "total_rows": rows.len(), "offset": 0, "rows": rows })))
}

async fn create_doc(
    State(store): State<Store>,
    Path(db): Path<String>,
    Json(doc): Json<Value>,
) -> Reply {
    let Value::Object(mut doc) = doc else {
        return error(StatusCode::BAD_REQUEST, "bad_request", "Document must be a JSON object");
    };
    let mut dbs = store.write().await;
    let Some(docs) = dbs.get_mut(&db) else {
        return no_db();
    };

    let id = match doc.get("_id") {
        Some(Value::String(id)) => id.clone(),
        Some(_) => return error(StatusCode::BAD_REQUEST, "illegal_docid", "Document id must be a string"),
        None => Uuid::new_v4().simple().to_string(),
    };
    if docs.contains_key(&id) {
        return error(StatusCode::CONFLICT, "conflict", "Document update conflict.");
    }

    let rev = new_rev();
    doc.insert("_id".to_string(), Value::String(id.clone()));
    doc.insert("_rev".to_string(), Value::String(rev.clone()));
    docs.insert(id.clone(), doc);
    debug!(%db, %id, "document created");
    (StatusCode::CREATED, Json(json!({ "ok": true, "id": id, "rev": rev })))
}

async fn get_doc(
    State(store): State<Store>,
    Path((db, doc_id)): Path<(String, String)>,
) -> Result<Json<Map<String, Value>>, Reply> {
    let dbs = store.read().await;
    let docs = dbs.get(&db).ok_or_else(no_db)?;
    docs.get(&doc_id).cloned().map(Json).ok_or_else(missing)
}

#[derive(Deserialize)]
struct DeleteParams {
    rev: Option<String>,
}

/// `rev` is checked when given; without it the current revision is removed.
async fn delete_doc(
    State(store): State<Store>,
    Path((db, doc_id)): Path<(String, String)>,
    Query(params): Query<DeleteParams>,
) -> Reply {
    let mut dbs = store.write().await;
    let Some(docs) = dbs.get_mut(&db) else {
        return no_db();
    };
    let Some(current) = docs.get(&doc_id).and_then(|doc| doc.get("_rev")?.as_str()).map(str::to_string)
    else {
        return missing();
    };
    if params.rev.is_some_and(|rev| rev != current) {
        return error(StatusCode::CONFLICT, "conflict", "Document update conflict.");
    }
    docs.remove(&doc_id);
    (StatusCode::OK, Json(json!({ "ok": true, "id": doc_id, "rev": current })))
}

async fn temp_view(
    State(store): State<Store>,
    Path(db): Path<String>,
    headers: HeaderMap,
    _script: String,
) -> Reply {
    let is_javascript = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/javascript"));
    if !is_javascript {
        return error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "bad_content_type",
            "Content-Type must be application/javascript",
        );
    }

    let dbs = store.read().await;
    let Some(docs) = dbs.get(&db) else {
        return no_db();
    };
    let rows: Vec<Value> = docs
        .keys()
        .map(|id| json!({ "id": id, "key": id, "value": null }))
        .collect();
    (
        StatusCode::OK,
        Json(json!({ "total_rows": rows.len(), "offset": 0, "rows": rows })),
    )
}
