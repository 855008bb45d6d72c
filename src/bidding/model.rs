use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Bid model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub listing_id: i64,
    pub bidder_id: i64,
    pub bidder: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}
