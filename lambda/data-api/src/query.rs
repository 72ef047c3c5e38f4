use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::HandlerError;
use crate::store::Store;

pub(crate) const DEFAULT_LIMIT: i32 = 50;

#[derive(Deserialize)]
pub(crate) struct QueryRequest {
    #[serde(rename = "queryType", default)]
    query_type: String,
    #[serde(default)]
    parameters: QueryParameters,
}

#[derive(Deserialize, Default)]
struct QueryParameters {
    id: Option<String>,
    category: Option<String>,
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
    limit: Option<i32>,
}

impl QueryParameters {
    fn limit(&self) -> i32 {
        self.limit.filter(|n| *n > 0).unwrap_or(DEFAULT_LIMIT)
    }
}

/// Translates one structured query into a single storage call and normalizes
/// the result. A missing `category` or `searchTerm` is a validation failure;
/// an unknown record on `byId` is a `null` item, not an error.
pub(crate) async fn dispatch<S: Store>(
    store: &S,
    request: QueryRequest,
) -> Result<Value, HandlerError> {
    let params = &request.parameters;
    match request.query_type.as_str() {
        "byId" => {
            let id = params
                .id
                .as_deref()
                .filter(|id| !id.is_empty())
                .ok_or(HandlerError::Internal("byId query without an id"))?;
            let item = store.get(id).await?;
            Ok(json!({ "item": item }))
        }
        "byCategory" => {
            let category = params
                .category
                .as_deref()
                .filter(|c| !c.is_empty())
                .ok_or(HandlerError::Validation("Category is required"))?;
            let items = store.query_by_category(category, params.limit()).await?;
            let count = items.len();
            Ok(json!({ "items": items, "count": count }))
        }
        "search" => {
            let term = params
                .search_term
                .as_deref()
                .filter(|t| !t.is_empty())
                .ok_or(HandlerError::Validation("Search term is required"))?;
            let items = store.search(term, params.limit()).await?;
            let count = items.len();
            Ok(json!({ "items": items, "count": count }))
        }
        _ => Err(HandlerError::Validation("Invalid query type")),
    }
}
