// region:    --- Imports
use super::{AuctionStore, StoreError};
use crate::auction::model::{Comment, Listing, NewListing, User, UserCredentials, WatchlistEntry};
use crate::bidding::commands::validate_bid;
use crate::bidding::model::Bid;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

// endregion: --- Imports

// region:    --- Memory Store
/// `AuctionStore` kept in process memory. Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<(User, String)>,
    listings: Vec<Listing>,
    bids: Vec<Bid>,
    comments: Vec<Comment>,
    watchlist: Vec<(i64, i64, i64)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username(&self, user_id: i64) -> Result<String, StoreError> {
        self.users
            .iter()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| user.username.clone())
            .ok_or(StoreError::UserNotFound(user_id))
    }

    fn listing(&self, listing_id: i64) -> Result<&Listing, StoreError> {
        self.listings
            .iter()
            .find(|listing| listing.id == listing_id)
            .ok_or(StoreError::ListingNotFound(listing_id))
    }

    fn bids_by_amount(&self, listing_id: i64) -> Vec<Bid> {
        let mut bids: Vec<Bid> = self
            .bids
            .iter()
            .filter(|bid| bid.listing_id == listing_id)
            .cloned()
            .collect();
        // highest first, earliest wins ties
        bids.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.id.cmp(&b.id)));
        bids
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuctionStore for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut tables = self.inner.lock().await;
        if tables.users.iter().any(|(user, _)| user.username == username) {
            return Err(StoreError::UsernameTaken);
        }
        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push((user.clone(), password_hash.to_string()));
        Ok(user)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|(user, _)| user.username == username)
            .map(|(user, hash)| UserCredentials {
                id: user.id,
                username: user.username.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn create_listing(
        &self,
        owner_id: i64,
        listing: NewListing,
    ) -> Result<Listing, StoreError> {
        let mut tables = self.inner.lock().await;
        let owner = tables.username(owner_id)?;
        let listing = Listing {
            id: tables.next_id(),
            owner_id,
            owner,
            title: listing.title,
            description: listing.description,
            category: listing.category,
            starting_price: listing.starting_price,
            image_url: listing.image_url,
            active: true,
            created_at: Utc::now(),
        };
        tables.listings.push(listing.clone());
        Ok(listing)
    }

    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.listing(listing_id).ok().cloned())
    }

    async fn active_listings(&self, category: Option<&str>) -> Result<Vec<Listing>, StoreError> {
        let tables = self.inner.lock().await;
        // newest first; ids grow monotonically
        Ok(tables
            .listings
            .iter()
            .rev()
            .filter(|listing| listing.active)
            .filter(|listing| category.map_or(true, |c| listing.category == c))
            .cloned()
            .collect())
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.inner.lock().await;
        let mut categories: Vec<String> = tables
            .listings
            .iter()
            .filter(|listing| listing.active && !listing.category.is_empty())
            .map(|listing| listing.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn highest_bid(&self, listing_id: i64) -> Result<Option<Bid>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.bids_by_amount(listing_id).into_iter().next())
    }

    async fn listing_bids(&self, listing_id: i64) -> Result<Vec<Bid>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.bids_by_amount(listing_id))
    }

    async fn place_bid(
        &self,
        listing_id: i64,
        bidder_id: i64,
        amount: i64,
    ) -> Result<Bid, StoreError> {
        // check and insert under one lock
        let mut tables = self.inner.lock().await;
        let listing = tables.listing(listing_id)?;
        let highest = tables
            .bids_by_amount(listing_id)
            .first()
            .map(|bid| bid.amount);
        validate_bid(listing, highest, amount)?;

        let bid = Bid {
            id: tables.next_id(),
            listing_id,
            bidder_id,
            bidder: tables.username(bidder_id)?,
            amount,
            created_at: Utc::now(),
        };
        tables.bids.push(bid.clone());
        Ok(bid)
    }

    async fn close_listing(&self, listing_id: i64, user_id: i64) -> Result<Listing, StoreError> {
        let mut tables = self.inner.lock().await;
        let listing = tables
            .listings
            .iter_mut()
            .find(|listing| listing.id == listing_id)
            .ok_or(StoreError::ListingNotFound(listing_id))?;
        if listing.owner_id != user_id {
            return Err(StoreError::NotOwner {
                listing_id,
                user_id,
            });
        }
        listing.active = false;
        Ok(listing.clone())
    }

    async fn listing_comments(&self, listing_id: i64) -> Result<Vec<Comment>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .comments
            .iter()
            .filter(|comment| comment.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn add_comment(
        &self,
        listing_id: i64,
        author_id: i64,
        body: &str,
    ) -> Result<Comment, StoreError> {
        let mut tables = self.inner.lock().await;
        tables.listing(listing_id)?;
        let comment = Comment {
            id: tables.next_id(),
            listing_id,
            author_id,
            author: tables.username(author_id)?,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn add_to_watchlist(&self, user_id: i64, listing_id: i64) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        tables.listing(listing_id)?;
        let watching = tables
            .watchlist
            .iter()
            .any(|&(_, user, listing)| user == user_id && listing == listing_id);
        if !watching {
            let id = tables.next_id();
            tables.watchlist.push((id, user_id, listing_id));
        }
        Ok(())
    }

    async fn watchlist(&self, user_id: i64) -> Result<Vec<WatchlistEntry>, StoreError> {
        let tables = self.inner.lock().await;
        tables
            .watchlist
            .iter()
            .filter(|&&(_, user, _)| user == user_id)
            .map(|&(id, user_id, listing_id)| {
                Ok(WatchlistEntry {
                    id,
                    user_id,
                    listing: tables.listing(listing_id)?.clone(),
                })
            })
            .collect()
    }

    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .watchlist
            .iter()
            .any(|&(_, user, listing)| user == user_id && listing == listing_id))
    }

    async fn remove_from_watchlist(
        &self,
        user_id: i64,
        entry_id: i64,
    ) -> Result<bool, StoreError> {
        let mut tables = self.inner.lock().await;
        let before = tables.watchlist.len();
        tables
            .watchlist
            .retain(|&(id, user, _)| !(id == entry_id && user == user_id));
        Ok(tables.watchlist.len() < before)
    }
}
// endregion: --- Memory Store
