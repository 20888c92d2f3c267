use std::collections::HashMap;

use serde::Deserialize;

use crate::models::{AssetId, Quote};

/// Body of a successful `/quotes` response
#[derive(Debug, Deserialize)]
pub(super) struct QuotesBody {
    #[serde(default)]
    pub quotes: HashMap<AssetId, Quote>,
}

/// Error body returned alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(alias = "error")]
    pub message: Option<String>,
}
