use lambda_http::http::{Method, StatusCode};
use lambda_http::{tracing, Body, Error, Request, RequestExt, Response};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::cursor;
use crate::error::HandlerError;
use crate::id;
use crate::query::{self, QueryRequest};
use crate::store::{Item, Store};

const ALLOWED_HEADERS: &str = "Content-Type,X-Api-Key";
const ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";

#[derive(Serialize)]
struct ListResponse {
    items: Vec<Item>,
    count: usize,
    #[serde(rename = "scannedCount")]
    scanned_count: i32,
    #[serde(rename = "lastKey", skip_serializing_if = "Option::is_none")]
    last_key: Option<String>,
}

pub(crate) async fn function_handler<S: Store>(
    store: &S,
    config: &AppConfig,
    event: Request,
) -> Result<Response<Body>, Error> {
    // CORS preflight short-circuits before any routing.
    if event.method() == Method::OPTIONS {
        return respond(config, StatusCode::OK, Body::Empty);
    }

    match route(store, &event).await {
        Ok((status, body)) => json_response(config, status, &body),
        Err(HandlerError::Validation(message)) => {
            json_response(config, StatusCode::BAD_REQUEST, &json!({ "error": message }))
        }
        Err(err) => {
            tracing::error!(error = %err, "request failed");
            json_response(
                config,
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "error": "Internal server error" }),
            )
        }
    }
}

async fn route<S: Store>(
    store: &S,
    event: &Request,
) -> Result<(StatusCode, Value), HandlerError> {
    match (event.method().as_str(), event.uri().path()) {
        ("GET", "/data") => handle_list(store, event).await,
        ("POST", "/data") => handle_create(store, event).await,
        ("POST", "/query") => handle_query(store, event).await,
        ("DELETE", path) => match path.strip_prefix("/data/").filter(|id| !id.is_empty()) {
            Some(record_id) => handle_delete(store, record_id).await,
            None => Ok(not_found()),
        },
        _ => Ok(not_found()),
    }
}

fn not_found() -> (StatusCode, Value) {
    (StatusCode::NOT_FOUND, json!({ "error": "Not found" }))
}

async fn handle_list<S: Store>(
    store: &S,
    event: &Request,
) -> Result<(StatusCode, Value), HandlerError> {
    let params = event.query_string_parameters();
    let limit = params
        .first("limit")
        .and_then(|raw| raw.parse::<i32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(query::DEFAULT_LIMIT);
    let start_key = match params.first("lastKey") {
        Some(raw) => Some(cursor::decode(raw)?),
        None => None,
    };

    let page = store.scan(limit, start_key).await?;
    let last_key = match &page.last_key {
        Some(key) => Some(cursor::encode(key)?),
        None => None,
    };

    let body = ListResponse {
        count: page.items.len(),
        scanned_count: page.scanned_count,
        items: page.items,
        last_key,
    };
    Ok((StatusCode::OK, serde_json::to_value(body)?))
}

async fn handle_create<S: Store>(
    store: &S,
    event: &Request,
) -> Result<(StatusCode, Value), HandlerError> {
    let mut record: Item = serde_json::from_slice(event.body().as_ref())?;

    let record_id = match record.get("id").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        Some(existing) => existing.to_string(),
        None => {
            let generated = id::generate_id();
            record.insert("id".to_string(), Value::String(generated.clone()));
            generated
        }
    };
    if record.get("timestamp").map_or(true, Value::is_null) {
        record.insert("timestamp".to_string(), Value::Number(id::epoch_millis().into()));
    }

    // Unconditional put: an existing record with the same id is overwritten,
    // last writer wins.
    store.put(record).await?;

    Ok((
        StatusCode::CREATED,
        json!({ "message": "Data created successfully", "id": record_id }),
    ))
}

async fn handle_query<S: Store>(
    store: &S,
    event: &Request,
) -> Result<(StatusCode, Value), HandlerError> {
    let request: QueryRequest = serde_json::from_slice(event.body().as_ref())?;
    let body = query::dispatch(store, request).await?;
    Ok((StatusCode::OK, body))
}

async fn handle_delete<S: Store>(
    store: &S,
    record_id: &str,
) -> Result<(StatusCode, Value), HandlerError> {
    store.delete(record_id).await?;
    Ok((
        StatusCode::OK,
        json!({ "message": "Data deleted successfully", "id": record_id }),
    ))
}

fn json_response(
    config: &AppConfig,
    status: StatusCode,
    body: &impl Serialize,
) -> Result<Response<Body>, Error> {
    respond(config, status, Body::Text(serde_json::to_string(body)?))
}

fn respond(config: &AppConfig, status: StatusCode, body: Body) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", config.cors_origin.as_str())
        .header("Access-Control-Allow-Headers", ALLOWED_HEADERS)
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .body(body)?)
}
