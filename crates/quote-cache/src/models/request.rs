use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::quote::{Field, Quote};
use super::types::{AssetId, ReferenceCurrencyId};

/// A request for quotes of several assets in one reference currency.
///
/// Asset ids are kept in caller order; that order is the order in which
/// missing ids are sent upstream. Repeated ids are requested once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub reference_currency_id: ReferenceCurrencyId,
    pub asset_ids: Vec<AssetId>,
    pub fields: Vec<Field>,
}

impl FetchRequest {
    pub fn new<A, F>(
        reference_currency_id: impl Into<ReferenceCurrencyId>,
        asset_ids: A,
        fields: F,
    ) -> Self
    where
        A: IntoIterator,
        A::Item: Into<AssetId>,
        F: IntoIterator<Item = Field>,
    {
        Self {
            reference_currency_id: reference_currency_id.into(),
            asset_ids: asset_ids.into_iter().map(Into::into).collect(),
            fields: fields.into_iter().collect(),
        }
    }
}

/// Quotes resolved for a request, keyed by asset id.
///
/// Contains every requested asset that could be resolved, whether it came
/// from the cache or from the upstream call. Also the body shape returned by
/// the HTTP quotes endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub quotes: HashMap<AssetId, Quote>,
}

impl FetchResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl From<HashMap<AssetId, Quote>> for FetchResponse {
    fn from(quotes: HashMap<AssetId, Quote>) -> Self {
        Self { quotes }
    }
}
