//! Listing queries and listing form handling
// region:    --- Imports
use crate::auction::model::{Comment, Listing, NewListing};
use crate::bidding::model::Bid;
use crate::money::parse_money_to_cents;
use crate::store::{AuctionStore, StoreError};
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

// region:    --- Listing Form
const MAX_TITLE_LEN: usize = 64;
const MAX_CATEGORY_LEN: usize = 64;

/// Raw `create_listing` form submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub starting_bid: String,
    #[serde(default)]
    pub image_url: String,
}

impl ListingForm {
    /// Check the submission and normalise it into a `NewListing`.
    pub fn validate(&self) -> Result<NewListing, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required.".to_string());
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(format!("Title must be at most {MAX_TITLE_LEN} characters."));
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err("Description is required.".to_string());
        }

        let category = self.category.trim().to_lowercase();
        if category.chars().count() > MAX_CATEGORY_LEN {
            return Err(format!(
                "Category must be at most {MAX_CATEGORY_LEN} characters."
            ));
        }

        let starting_price =
            parse_money_to_cents(&self.starting_bid).map_err(|e| format!("Starting bid: {e}"))?;
        if starting_price == 0 {
            return Err("Starting bid must be greater than zero.".to_string());
        }

        let image_url = self.image_url.trim();
        if !image_url.is_empty()
            && !(image_url.starts_with("http://") || image_url.starts_with("https://"))
        {
            return Err("Image URL must start with http:// or https://.".to_string());
        }

        Ok(NewListing {
            title: title.to_string(),
            description: description.to_string(),
            category,
            starting_price,
            image_url: image_url.to_string(),
        })
    }
}
// endregion: --- Listing Form

// region:    --- Listing Queries
/// A feed row: the listing and its highest bid, if any
#[derive(Debug, Clone)]
pub struct ListingSummary {
    pub listing: Listing,
    pub highest_bid: Option<Bid>,
}

impl ListingSummary {
    pub fn current_price(&self) -> i64 {
        self.listing.current_price(self.highest_bid.as_ref())
    }
}

/// Everything the listing page shows
#[derive(Debug, Clone)]
pub struct ListingDetail {
    pub listing: Listing,
    pub comments: Vec<Comment>,
    /// Highest first
    pub bids: Vec<Bid>,
    pub watching: bool,
}

impl ListingDetail {
    pub fn highest_bid(&self) -> Option<&Bid> {
        self.bids.first()
    }

    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    pub fn current_price(&self) -> i64 {
        self.listing.current_price(self.highest_bid())
    }

    /// The winning bid of a closed listing.
    pub fn winning_bid(&self) -> Option<&Bid> {
        if self.listing.active {
            None
        } else {
            self.highest_bid()
        }
    }
}

/// Active listings with their highest bids
pub async fn load_feed(
    store: &dyn AuctionStore,
    category: Option<&str>,
) -> Result<Vec<ListingSummary>, StoreError> {
    info!("{:<12} --> listing feed category: {:?}", "Query", category);
    let listings = store.active_listings(category).await?;
    let mut summaries = Vec::with_capacity(listings.len());
    for listing in listings {
        let highest_bid = store.highest_bid(listing.id).await?;
        summaries.push(ListingSummary {
            listing,
            highest_bid,
        });
    }
    Ok(summaries)
}

/// Listing page data; `viewer_id` decides the watchlist state
pub async fn load_detail(
    store: &dyn AuctionStore,
    listing_id: i64,
    viewer_id: Option<i64>,
) -> Result<ListingDetail, StoreError> {
    info!("{:<12} --> listing detail id: {}", "Query", listing_id);
    let listing = store
        .get_listing(listing_id)
        .await?
        .ok_or(StoreError::ListingNotFound(listing_id))?;
    let comments = store.listing_comments(listing_id).await?;
    let bids = store.listing_bids(listing_id).await?;
    let watching = match viewer_id {
        Some(user_id) => store.is_watching(user_id, listing_id).await?,
        None => false,
    };
    Ok(ListingDetail {
        listing,
        comments,
        bids,
        watching,
    })
}
// endregion: --- Listing Queries
