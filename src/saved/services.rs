use tracing::info;
use uuid::Uuid;

use super::dto::ListingIdInput;
use super::repo_types::SavedItem;
use crate::db::Datastore;
use crate::error::{AppError, AppResult, FieldError};

/// Turns client input into a listing id; only positive integers are valid.
pub fn parse_listing_id(input: Option<ListingIdInput>) -> AppResult<i64> {
    let invalid = |msg: &str| {
        AppError::validation(
            "invalid listing id",
            vec![FieldError::new("annonsId", msg)],
        )
    };
    let id = match input {
        None => return Err(invalid("annonsId is required")),
        Some(ListingIdInput::Number(n)) => n,
        Some(ListingIdInput::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid("annonsId must be a number"))?,
        Some(ListingIdInput::Malformed(_)) => return Err(invalid("annonsId must be a number")),
    };
    if id <= 0 {
        return Err(invalid("annonsId must be positive"));
    }
    Ok(id)
}

/// Records that `user_id` saved `listing_id`. A repeated save is a
/// duplicate, decided by the store.
pub async fn save(store: &dyn Datastore, user_id: Uuid, listing_id: i64) -> AppResult<SavedItem> {
    let item = store.insert_saved_item(user_id, listing_id).await?;
    info!(%user_id, listing_id, "listing saved");
    Ok(item)
}

/// Everything `user_id` saved, newest first.
pub async fn list(store: &dyn Datastore, user_id: Uuid) -> AppResult<Vec<SavedItem>> {
    Ok(store.list_saved_items(user_id).await?)
}
