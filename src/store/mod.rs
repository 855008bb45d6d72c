//! Persistence seam between the request handlers and the database.
//!
//! Every implementation must apply the bid rule (`bidding::commands::validate_bid`)
//! atomically with the insert of the accepted bid.

// region:    --- Imports
use crate::auction::model::{Comment, Listing, NewListing, User, UserCredentials, WatchlistEntry};
use crate::bidding::commands::BidError;
use crate::bidding::model::Bid;
use async_trait::async_trait;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Modules
pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
// endregion: --- Modules

// region:    --- Store Error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already taken.")]
    UsernameTaken,
    #[error("user {0} not found")]
    UserNotFound(i64),
    #[error("listing {0} not found")]
    ListingNotFound(i64),
    #[error("user {user_id} does not own listing {listing_id}")]
    NotOwner { listing_id: i64, user_id: i64 },
    #[error(transparent)]
    Bid(#[from] BidError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
// endregion: --- Store Error

// region:    --- Auction Store Trait
/// Storage operations used by the site.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// Insert a user. Fails with `UsernameTaken` on a duplicate username.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    async fn find_credentials(&self, username: &str)
        -> Result<Option<UserCredentials>, StoreError>;

    async fn create_listing(&self, owner_id: i64, listing: NewListing)
        -> Result<Listing, StoreError>;

    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>, StoreError>;

    /// Active listings, newest first, optionally restricted to one category.
    async fn active_listings(&self, category: Option<&str>) -> Result<Vec<Listing>, StoreError>;

    /// Distinct non-empty categories of active listings, sorted.
    async fn categories(&self) -> Result<Vec<String>, StoreError>;

    async fn highest_bid(&self, listing_id: i64) -> Result<Option<Bid>, StoreError>;

    /// All bids on a listing ordered by amount, highest first.
    async fn listing_bids(&self, listing_id: i64) -> Result<Vec<Bid>, StoreError>;

    /// Validate and append a bid as one atomic step.
    async fn place_bid(
        &self,
        listing_id: i64,
        bidder_id: i64,
        amount: i64,
    ) -> Result<Bid, StoreError>;

    /// Mark a listing inactive. Only its owner may close it.
    async fn close_listing(&self, listing_id: i64, user_id: i64) -> Result<Listing, StoreError>;

    /// Comments on a listing, oldest first.
    async fn listing_comments(&self, listing_id: i64) -> Result<Vec<Comment>, StoreError>;

    async fn add_comment(
        &self,
        listing_id: i64,
        author_id: i64,
        body: &str,
    ) -> Result<Comment, StoreError>;

    /// Watch a listing. Watching it twice is a no-op.
    async fn add_to_watchlist(&self, user_id: i64, listing_id: i64) -> Result<(), StoreError>;

    async fn watchlist(&self, user_id: i64) -> Result<Vec<WatchlistEntry>, StoreError>;

    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool, StoreError>;

    /// Delete a watchlist entry if it belongs to `user_id`. Returns whether a row was removed.
    async fn remove_from_watchlist(&self, user_id: i64, entry_id: i64)
        -> Result<bool, StoreError>;
}
// endregion: --- Auction Store Trait
