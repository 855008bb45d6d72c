// region:    --- Users

/// Create user
pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, email, password_hash)
    VALUES ($1, $2, $3)
    RETURNING id, username, email, created_at
"#;

/// Get user
pub const GET_USER: &str = "SELECT id, username, email, created_at FROM users WHERE id = $1";

/// Get login credentials
pub const GET_CREDENTIALS: &str =
    "SELECT id, username, password_hash FROM users WHERE username = $1";

// endregion: --- Users

// region:    --- Listings

/// Create listing
pub const INSERT_LISTING: &str = r#"
    WITH inserted AS (
        INSERT INTO listings (owner_id, title, description, category, starting_price, image_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
    )
    SELECT l.id, l.owner_id, u.username AS owner, l.title, l.description, l.category,
           l.starting_price, l.image_url, l.active, l.created_at
    FROM inserted l
    JOIN users u ON u.id = l.owner_id
"#;

/// Get listing
pub const GET_LISTING: &str = r#"
    SELECT l.id, l.owner_id, u.username AS owner, l.title, l.description, l.category,
           l.starting_price, l.image_url, l.active, l.created_at
    FROM listings l
    JOIN users u ON u.id = l.owner_id
    WHERE l.id = $1
"#;

/// Get listing and lock its row until the transaction ends
pub const LOCK_LISTING: &str = r#"
    SELECT l.id, l.owner_id, u.username AS owner, l.title, l.description, l.category,
           l.starting_price, l.image_url, l.active, l.created_at
    FROM listings l
    JOIN users u ON u.id = l.owner_id
    WHERE l.id = $1
    FOR UPDATE OF l
"#;

/// Active listings, optionally by category
pub const GET_ACTIVE_LISTINGS: &str = r#"
    SELECT l.id, l.owner_id, u.username AS owner, l.title, l.description, l.category,
           l.starting_price, l.image_url, l.active, l.created_at
    FROM listings l
    JOIN users u ON u.id = l.owner_id
    WHERE l.active AND ($1::TEXT IS NULL OR l.category = $1)
    ORDER BY l.created_at DESC, l.id DESC
"#;

/// Categories of active listings
pub const GET_CATEGORIES: &str = r#"
    SELECT DISTINCT category
    FROM listings
    WHERE active AND category <> ''
    ORDER BY category
"#;

/// Close listing
pub const CLOSE_LISTING: &str = "UPDATE listings SET active = FALSE WHERE id = $1";

// endregion: --- Listings

// region:    --- Bids

/// Highest bid amount
pub const GET_HIGHEST_AMOUNT: &str = "SELECT MAX(amount) FROM bids WHERE listing_id = $1";

/// Highest bid
pub const GET_HIGHEST_BID: &str = r#"
    SELECT b.id, b.listing_id, b.bidder_id, u.username AS bidder, b.amount, b.created_at
    FROM bids b
    JOIN users u ON u.id = b.bidder_id
    WHERE b.listing_id = $1
    ORDER BY b.amount DESC, b.id ASC
    LIMIT 1
"#;

/// Bid history by amount
pub const GET_LISTING_BIDS: &str = r#"
    SELECT b.id, b.listing_id, b.bidder_id, u.username AS bidder, b.amount, b.created_at
    FROM bids b
    JOIN users u ON u.id = b.bidder_id
    WHERE b.listing_id = $1
    ORDER BY b.amount DESC, b.id ASC
"#;

/// Place bid
pub const INSERT_BID: &str = r#"
    WITH inserted AS (
        INSERT INTO bids (listing_id, bidder_id, amount)
        VALUES ($1, $2, $3)
        RETURNING *
    )
    SELECT b.id, b.listing_id, b.bidder_id, u.username AS bidder, b.amount, b.created_at
    FROM inserted b
    JOIN users u ON u.id = b.bidder_id
"#;

// endregion: --- Bids

// region:    --- Comments

/// Comments, oldest first
pub const GET_LISTING_COMMENTS: &str = r#"
    SELECT c.id, c.listing_id, c.author_id, u.username AS author, c.body, c.created_at
    FROM comments c
    JOIN users u ON u.id = c.author_id
    WHERE c.listing_id = $1
    ORDER BY c.created_at ASC, c.id ASC
"#;

/// Add comment
pub const INSERT_COMMENT: &str = r#"
    WITH inserted AS (
        INSERT INTO comments (listing_id, author_id, body)
        VALUES ($1, $2, $3)
        RETURNING *
    )
    SELECT c.id, c.listing_id, c.author_id, u.username AS author, c.body, c.created_at
    FROM inserted c
    JOIN users u ON u.id = c.author_id
"#;

// endregion: --- Comments

// region:    --- Watchlist

/// Watch listing
pub const INSERT_WATCH: &str = r#"
    INSERT INTO watchlist (user_id, listing_id)
    VALUES ($1, $2)
    ON CONFLICT (user_id, listing_id) DO NOTHING
"#;

/// Watchlist with listings
pub const GET_WATCHLIST: &str = r#"
    SELECT w.id AS watch_id, w.user_id,
           l.id, l.owner_id, u.username AS owner, l.title, l.description, l.category,
           l.starting_price, l.image_url, l.active, l.created_at
    FROM watchlist w
    JOIN listings l ON l.id = w.listing_id
    JOIN users u ON u.id = l.owner_id
    WHERE w.user_id = $1
    ORDER BY w.id ASC
"#;

/// Is watching
pub const IS_WATCHING: &str =
    "SELECT EXISTS (SELECT 1 FROM watchlist WHERE user_id = $1 AND listing_id = $2)";

/// Remove watch, scoped to its owner
pub const DELETE_WATCH: &str = "DELETE FROM watchlist WHERE id = $1 AND user_id = $2";

// endregion: --- Watchlist
