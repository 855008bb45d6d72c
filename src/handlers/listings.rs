// region:    --- Imports
use crate::app::AppState;
use crate::auction::listing::{load_detail, load_feed, ListingForm};
use crate::auth::CurrentUser;
use crate::bidding::commands::{
    handle_close_listing, handle_place_bid, CloseListingCommand, PlaceBidCommand,
};
use crate::error::AppError;
use crate::money::parse_money_to_cents;
use crate::store::StoreError;
use crate::views;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

#[derive(Debug, Deserialize)]
pub struct BidForm {
    #[serde(default)]
    pub bid_amount: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

/// Re-render the listing page with a form error
async fn listing_with_message(
    state: &AppState,
    user: &CurrentUser,
    listing_id: i64,
    message: &str,
) -> Result<Response, AppError> {
    let detail = load_detail(state.store.as_ref(), listing_id, Some(user.id)).await?;
    Ok((
        StatusCode::BAD_REQUEST,
        Html(views::listing_page(Some(user), &detail, Some(message))),
    )
        .into_response())
}

// region:    --- Query Handlers

/// Active listings
pub async fn index(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> Result<Html<String>, AppError> {
    let summaries = load_feed(state.store.as_ref(), None).await?;
    Ok(Html(views::index_page(
        user.as_ref(),
        "Active Listings",
        &summaries,
    )))
}

/// Category index
pub async fn categories(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> Result<Html<String>, AppError> {
    let categories = state.store.categories().await?;
    Ok(Html(views::categories_page(user.as_ref(), &categories)))
}

/// Active listings in one category
pub async fn category_listings(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(name): Path<String>,
) -> Result<Html<String>, AppError> {
    let category = name.trim().to_lowercase();
    let summaries = load_feed(state.store.as_ref(), Some(&category)).await?;
    Ok(Html(views::index_page(
        user.as_ref(),
        &format!("Category: {category}"),
        &summaries,
    )))
}

/// Listing page
pub async fn listing(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(listing_id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let viewer_id = user.as_ref().map(|u| u.id);
    let detail = load_detail(state.store.as_ref(), listing_id, viewer_id).await?;
    Ok(Html(views::listing_page(user.as_ref(), &detail, None)))
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// New listing page
pub async fn create_listing_form(user: CurrentUser) -> Html<String> {
    Html(views::create_listing_page(&user, None, &ListingForm::default()))
}

/// Create listing
pub async fn create_listing(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<ListingForm>,
) -> Result<Response, AppError> {
    let new_listing = match form.validate() {
        Ok(listing) => listing,
        Err(message) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Html(views::create_listing_page(&user, Some(&message), &form)),
            )
                .into_response())
        }
    };

    let listing = state.store.create_listing(user.id, new_listing).await?;
    info!(
        "{:<12} --> listing {} created by {}",
        "Command", listing.id, user.username
    );
    Ok(Redirect::to("/").into_response())
}

/// Place bid
pub async fn place_bid(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
    Form(form): Form<BidForm>,
) -> Result<Response, AppError> {
    let amount = match parse_money_to_cents(&form.bid_amount) {
        Ok(amount) => amount,
        Err(e) => return listing_with_message(&state, &user, listing_id, &e.to_string()).await,
    };

    let cmd = PlaceBidCommand {
        listing_id,
        bidder_id: user.id,
        amount,
    };
    match handle_place_bid(cmd, state.store.as_ref()).await {
        Ok(_) => Ok(Redirect::to(&format!("/listing/{listing_id}")).into_response()),
        Err(StoreError::Bid(e)) => {
            listing_with_message(&state, &user, listing_id, &e.to_string()).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Add comment
pub async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    let text = form.text.trim();
    if text.is_empty() {
        return listing_with_message(&state, &user, listing_id, "Comment cannot be empty.").await;
    }

    let comment = state.store.add_comment(listing_id, user.id, text).await?;
    info!(
        "{:<12} --> comment {} on listing {}",
        "Command", comment.id, listing_id
    );
    Ok(Redirect::to(&format!("/listing/{listing_id}")).into_response())
}

/// Close listing; the listing page then shows the winner
pub async fn close_listing(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
) -> Result<Redirect, AppError> {
    let cmd = CloseListingCommand {
        listing_id,
        user_id: user.id,
    };
    handle_close_listing(cmd, state.store.as_ref()).await?;
    Ok(Redirect::to(&format!("/listing/{listing_id}")))
}

// endregion: --- Command Handlers
