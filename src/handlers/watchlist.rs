// region:    --- Imports
use crate::app::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::views;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use tracing::info;

// endregion: --- Imports

/// Watch a listing
pub async fn add_watchlist(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!(
        "{:<12} --> {} watches listing {}",
        "Command", user.username, listing_id
    );
    state.store.add_to_watchlist(user.id, listing_id).await?;
    Ok(Redirect::to("/watchlist"))
}

/// Watched listings with their current prices
pub async fn watchlist(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Html<String>, AppError> {
    let entries = state.store.watchlist(user.id).await?;
    let mut priced = Vec::with_capacity(entries.len());
    for entry in entries {
        let highest_bid = state.store.highest_bid(entry.listing.id).await?;
        let current_price = entry.listing.current_price(highest_bid.as_ref());
        priced.push((entry, current_price));
    }
    Ok(Html(views::watchlist_page(&user, &priced)))
}

/// Drop a watchlist entry; entries of other users are left alone
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(entry_id): Path<i64>,
) -> Result<Redirect, AppError> {
    let removed = state.store.remove_from_watchlist(user.id, entry_id).await?;
    info!(
        "{:<12} --> watch {} removed for {}: {}",
        "Command", entry_id, user.username, removed
    );
    Ok(Redirect::to("/watchlist"))
}
