use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bidding::model::Bid;

// User model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Login lookup row. Never rendered.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

// Listing model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub owner_id: i64,
    pub owner: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub starting_price: i64,
    pub image_url: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Price a new bid has to beat.
    pub fn current_price(&self, highest_bid: Option<&Bid>) -> i64 {
        highest_bid.map_or(self.starting_price, |bid| bid.amount)
    }
}

/// Validated input for a new listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub category: String,
    pub starting_price: i64,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub listing_id: i64,
    pub author_id: i64,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchlistEntry {
    #[sqlx(rename = "watch_id")]
    pub id: i64,
    pub user_id: i64,
    #[sqlx(flatten)]
    pub listing: Listing,
}
