//! Model catalog listing

use serde::Deserialize;

use crate::error::{ParleyError, Result};
use crate::transport::Transport;

/// `GET {base_url}/models` response
///
/// Entries stay raw so one malformed entry cannot hide the rest.
#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// Fetch model identifiers in response order
pub(crate) async fn fetch_model_ids(transport: &Transport, url: &str) -> Result<Vec<String>> {
    let reply = transport.get_json(url).await?;
    parse_model_ids(&reply.body)
}

fn parse_model_ids(body: &serde_json::Value) -> Result<Vec<String>> {
    let list = ModelList::deserialize(body).map_err(|e| ParleyError::Decode(format!("unexpected model list: {e}")))?;
    let ids = list
        .data
        .iter()
        .filter_map(|entry| entry.get("id").and_then(serde_json::Value::as_str))
        .map(str::to_owned)
        .collect();
    Ok(ids)
}
