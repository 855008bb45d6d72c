// region:    --- Imports
use super::{AuctionStore, StoreError};
use crate::auction::model::{Comment, Listing, NewListing, User, UserCredentials, WatchlistEntry};
use crate::bidding::commands::validate_bid;
use crate::bidding::model::Bid;
use crate::database::{queries, DatabaseManager};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

// endregion: --- Imports

// region:    --- Postgres Store
/// `AuctionStore` backed by Postgres
pub struct PostgresStore {
    db: Arc<DatabaseManager>,
}

impl PostgresStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    async fn require_listing(&self, listing_id: i64) -> Result<Listing, StoreError> {
        self.get_listing(listing_id)
            .await?
            .ok_or(StoreError::ListingNotFound(listing_id))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl AuctionStore for PostgresStore {
    #[instrument(skip(self, password_hash))]
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(queries::INSERT_USER)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::UsernameTaken
                } else {
                    StoreError::Database(e)
                }
            })
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(queries::GET_USER)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(queries::GET_CREDENTIALS)
            .bind(username)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(credentials)
    }

    #[instrument(skip(self))]
    async fn create_listing(
        &self,
        owner_id: i64,
        listing: NewListing,
    ) -> Result<Listing, StoreError> {
        let listing = sqlx::query_as::<_, Listing>(queries::INSERT_LISTING)
            .bind(owner_id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(&listing.category)
            .bind(listing.starting_price)
            .bind(&listing.image_url)
            .fetch_one(self.db.pool())
            .await?;
        Ok(listing)
    }

    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>, StoreError> {
        let listing = sqlx::query_as::<_, Listing>(queries::GET_LISTING)
            .bind(listing_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(listing)
    }

    async fn active_listings(&self, category: Option<&str>) -> Result<Vec<Listing>, StoreError> {
        let listings = sqlx::query_as::<_, Listing>(queries::GET_ACTIVE_LISTINGS)
            .bind(category)
            .fetch_all(self.db.pool())
            .await?;
        Ok(listings)
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let categories = sqlx::query_scalar::<_, String>(queries::GET_CATEGORIES)
            .fetch_all(self.db.pool())
            .await?;
        Ok(categories)
    }

    async fn highest_bid(&self, listing_id: i64) -> Result<Option<Bid>, StoreError> {
        let bid = sqlx::query_as::<_, Bid>(queries::GET_HIGHEST_BID)
            .bind(listing_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(bid)
    }

    async fn listing_bids(&self, listing_id: i64) -> Result<Vec<Bid>, StoreError> {
        let bids = sqlx::query_as::<_, Bid>(queries::GET_LISTING_BIDS)
            .bind(listing_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(bids)
    }

    #[instrument(skip(self))]
    async fn place_bid(
        &self,
        listing_id: i64,
        bidder_id: i64,
        amount: i64,
    ) -> Result<Bid, StoreError> {
        // The listing row lock serialises concurrent bids on the same listing.
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let listing = sqlx::query_as::<_, Listing>(queries::LOCK_LISTING)
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or(StoreError::ListingNotFound(listing_id))?;

                    let highest = sqlx::query_scalar::<_, Option<i64>>(queries::GET_HIGHEST_AMOUNT)
                        .bind(listing_id)
                        .fetch_one(&mut **tx)
                        .await?;

                    validate_bid(&listing, highest, amount)?;

                    let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
                        .bind(listing_id)
                        .bind(bidder_id)
                        .bind(amount)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(bid)
                })
            })
            .await
    }

    #[instrument(skip(self))]
    async fn close_listing(&self, listing_id: i64, user_id: i64) -> Result<Listing, StoreError> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let mut listing = sqlx::query_as::<_, Listing>(queries::LOCK_LISTING)
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or(StoreError::ListingNotFound(listing_id))?;

                    if listing.owner_id != user_id {
                        return Err(StoreError::NotOwner {
                            listing_id,
                            user_id,
                        });
                    }

                    if listing.active {
                        sqlx::query(queries::CLOSE_LISTING)
                            .bind(listing_id)
                            .execute(&mut **tx)
                            .await?;
                        listing.active = false;
                        info!("{:<12} --> listing {} closed", "Store", listing_id);
                    }
                    Ok(listing)
                })
            })
            .await
    }

    async fn listing_comments(&self, listing_id: i64) -> Result<Vec<Comment>, StoreError> {
        let comments = sqlx::query_as::<_, Comment>(queries::GET_LISTING_COMMENTS)
            .bind(listing_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(comments)
    }

    #[instrument(skip(self, body))]
    async fn add_comment(
        &self,
        listing_id: i64,
        author_id: i64,
        body: &str,
    ) -> Result<Comment, StoreError> {
        self.require_listing(listing_id).await?;
        let comment = sqlx::query_as::<_, Comment>(queries::INSERT_COMMENT)
            .bind(listing_id)
            .bind(author_id)
            .bind(body)
            .fetch_one(self.db.pool())
            .await?;
        Ok(comment)
    }

    #[instrument(skip(self))]
    async fn add_to_watchlist(&self, user_id: i64, listing_id: i64) -> Result<(), StoreError> {
        self.require_listing(listing_id).await?;
        sqlx::query(queries::INSERT_WATCH)
            .bind(user_id)
            .bind(listing_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn watchlist(&self, user_id: i64) -> Result<Vec<WatchlistEntry>, StoreError> {
        let entries = sqlx::query_as::<_, WatchlistEntry>(queries::GET_WATCHLIST)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(entries)
    }

    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool, StoreError> {
        let watching = sqlx::query_scalar::<_, bool>(queries::IS_WATCHING)
            .bind(user_id)
            .bind(listing_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(watching)
    }

    #[instrument(skip(self))]
    async fn remove_from_watchlist(
        &self,
        user_id: i64,
        entry_id: i64,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(queries::DELETE_WATCH)
            .bind(entry_id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
// endregion: --- Postgres Store
