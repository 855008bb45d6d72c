// region:    --- Imports
use crate::auth::SessionKeys;
use crate::error::AppError;
use crate::handlers::{auth, listings, watchlist};
use crate::store::AuctionStore;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// endregion: --- Imports

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn AuctionStore>,
    pub sessions: SessionKeys,
}

impl AppStateInner {
    pub fn new(store: Arc<dyn AuctionStore>, sessions: SessionKeys) -> AppState {
        Arc::new(Self { store, sessions })
    }
}

/// All site routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(listings::index))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/register", get(auth::register_form).post(auth::register))
        .route(
            "/create_listing",
            get(listings::create_listing_form).post(listings::create_listing),
        )
        .route(
            "/listing/:id",
            get(listings::listing).post(listings::place_bid),
        )
        .route("/listing/:id/place_bid", post(listings::place_bid))
        .route("/listing/:id/comment", post(listings::add_comment))
        // state changes are POST only; the session cookie is SameSite=Lax
        .route("/listing/:id/add_watchlist", post(watchlist::add_watchlist))
        .route("/listing/:id/close_listing", post(listings::close_listing))
        .route("/watchlist", get(watchlist::watchlist))
        .route(
            "/watchlist/remove/:id",
            post(watchlist::remove_from_watchlist),
        )
        .route("/categories", get(listings::categories))
        .route("/categories/:name", get(listings::category_listings))
        .fallback(|| async { AppError::NotFound })
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024)) // form posts only
        .with_state(state)
}
