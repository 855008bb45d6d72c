//! Bidding related commands
//! 1. Place bid
//! 2. Close listing
// region:    --- Imports
use crate::auction::model::Listing;
use crate::bidding::model::Bid;
use crate::money::format_cents;
use crate::store::{AuctionStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Bid Rule
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BidError {
    #[error("This listing is closed.")]
    ListingClosed,
    #[error("Bid must be higher than starting bid.")]
    NotAboveStartingPrice { starting_price: i64 },
    #[error("Bid must be higher than current bid.")]
    NotAboveHighestBid { highest_bid: i64 },
}

/// A bid is valid when the listing is active and the amount is strictly above
/// both the starting price and the current highest bid.
pub fn validate_bid(listing: &Listing, highest_bid: Option<i64>, amount: i64) -> Result<(), BidError> {
    if !listing.active {
        return Err(BidError::ListingClosed);
    }
    match highest_bid {
        Some(highest) if amount <= highest => Err(BidError::NotAboveHighestBid {
            highest_bid: highest,
        }),
        _ if amount <= listing.starting_price => Err(BidError::NotAboveStartingPrice {
            starting_price: listing.starting_price,
        }),
        _ => Ok(()),
    }
}
// endregion: --- Bid Rule

// region:    --- Commands
/// Place bid command
#[derive(Debug, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
}

/// Close listing command
#[derive(Debug, Clone)]
pub struct CloseListingCommand {
    pub listing_id: i64,
    pub user_id: i64,
}

/// Result of closing a listing
#[derive(Debug, Clone)]
pub struct ClosedListing {
    pub listing: Listing,
    pub winning_bid: Option<Bid>,
}

/// 1. Place bid
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    store: &dyn AuctionStore,
) -> Result<Bid, StoreError> {
    info!("{:<12} --> place bid: {:?}", "Command", cmd);

    match store.place_bid(cmd.listing_id, cmd.bidder_id, cmd.amount).await {
        Ok(bid) => {
            info!(
                "{:<12} --> bid {} accepted at {}",
                "Command",
                bid.id,
                format_cents(bid.amount)
            );
            Ok(bid)
        }
        Err(StoreError::Bid(e)) => {
            warn!("{:<12} --> bid rejected: {}", "Command", e);
            Err(StoreError::Bid(e))
        }
        Err(e) => Err(e),
    }
}

/// 2. Close listing and determine the winner
pub async fn handle_close_listing(
    cmd: CloseListingCommand,
    store: &dyn AuctionStore,
) -> Result<ClosedListing, StoreError> {
    info!("{:<12} --> close listing: {:?}", "Command", cmd);

    let listing = store.close_listing(cmd.listing_id, cmd.user_id).await?;
    let winning_bid = store.highest_bid(cmd.listing_id).await?;

    match &winning_bid {
        Some(bid) => info!(
            "{:<12} --> listing {} won by {} at {}",
            "Command",
            listing.id,
            bid.bidder,
            format_cents(bid.amount)
        ),
        None => info!("{:<12} --> listing {} closed without bids", "Command", listing.id),
    }

    Ok(ClosedListing {
        listing,
        winning_bid,
    })
}

// endregion: --- Commands
