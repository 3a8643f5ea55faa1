use serde::Deserialize;

/// A listing id as clients send it: the feed's numeric `AnnonsId`, or the
/// same number as a string. Anything else lands in `Malformed` so the body
/// still parses and the id can be reported as invalid.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListingIdInput {
    Number(i64),
    Text(String),
    Malformed(serde_json::Value),
}

/// Request body for `POST /saveData`.
#[derive(Debug, Default, Deserialize)]
pub struct SaveRequest {
    #[serde(default, rename = "annonsId")]
    pub annons_id: Option<ListingIdInput>,
}
