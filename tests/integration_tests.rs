use auction_listings::app::{build_router, AppStateInner};
use auction_listings::auction::model::{Listing, NewListing};
use auction_listings::auth::SessionKeys;
use auction_listings::store::{AuctionStore, MemoryStore};
use axum::http::StatusCode;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Tracing initialisation
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// Serve the site on an ephemeral port backed by a fresh in-memory store
async fn setup() -> (String, Arc<MemoryStore>) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let sessions = SessionKeys::new("test-secret", chrono::Duration::hours(1));
    let router = build_router(AppStateInner::new(store.clone(), sessions));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), store)
}

/// Browser-like client that keeps cookies and does not follow redirects
fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

fn location(response: &reqwest::Response) -> String {
    response.headers()["location"].to_str().unwrap().to_string()
}

/// Register a user and keep the session in the client
async fn register(client: &Client, base: &str, username: &str) -> reqwest::Response {
    client
        .post(format!("{base}/register"))
        .form(&[
            ("username", username),
            ("email", "user@example.com"),
            ("password", "hunter22"),
            ("confirmation", "hunter22"),
        ])
        .send()
        .await
        .expect("Failed to send request")
}

/// Signed-in client plus the user's id
async fn signed_in(base: &str, store: &MemoryStore, username: &str) -> (Client, i64) {
    let client = browser();
    let response = register(&client, base, username).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let user_id = store.find_credentials(username).await.unwrap().unwrap().id;
    (client, user_id)
}

/// Test listing owned by `owner_id`
async fn create_test_listing(store: &MemoryStore, owner_id: i64, title: &str, price: i64) -> Listing {
    store
        .create_listing(
            owner_id,
            NewListing {
                title: title.to_string(),
                description: format!("{title} for the integration tests"),
                category: "testing".to_string(),
                starting_price: price,
                image_url: String::new(),
            },
        )
        .await
        .unwrap()
}

async fn bid(client: &Client, base: &str, listing_id: i64, amount: &str) -> reqwest::Response {
    client
        .post(format!("{base}/listing/{listing_id}/place_bid"))
        .form(&[("bid_amount", amount)])
        .send()
        .await
        .expect("Failed to send request")
}

/// Bid above starting price and current bid becomes the new highest
#[tokio::test]
async fn test_place_bid() {
    let (base, store) = setup().await;
    let (_, seller_id) = signed_in(&base, &store, "seller").await;
    let (buyer, _) = signed_in(&base, &store, "buyer").await;
    let listing = create_test_listing(&store, seller_id, "Guitar", 10_000).await;

    let response = bid(&buyer, &base, listing.id, "100.01").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/listing/{}", listing.id));

    let response = bid(&buyer, &base, listing.id, "150").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let highest = store.highest_bid(listing.id).await.unwrap().unwrap();
    assert_eq!(highest.amount, 15_000);
    assert_eq!(highest.bidder, "buyer");

    // the legacy detail route accepts bids too
    let response = buyer
        .post(format!("{base}/listing/{}", listing.id))
        .form(&[("bid_amount", "151")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = buyer
        .get(format!("{base}/listing/{}", listing.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("$151.00"));
    assert!(page.contains("3 bid(s) so far. Your bid is the current bid."));
}

/// Bids at or below either threshold are rejected without creating a row
#[tokio::test]
async fn test_low_bids_are_rejected() {
    let (base, store) = setup().await;
    let (_, seller_id) = signed_in(&base, &store, "seller").await;
    let (buyer, _) = signed_in(&base, &store, "buyer").await;
    let listing = create_test_listing(&store, seller_id, "Piano", 10_000).await;

    let response = bid(&buyer, &base, listing.id, "100").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Bid must be higher than starting bid."));
    assert!(store.listing_bids(listing.id).await.unwrap().is_empty());

    bid(&buyer, &base, listing.id, "120").await;
    let response = bid(&buyer, &base, listing.id, "120.00").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Bid must be higher than current bid."));

    let response = bid(&buyer, &base, listing.id, "lots").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.listing_bids(listing.id).await.unwrap().len(), 1);
}

/// Closing declares the highest bidder the winner and stops further bids
#[tokio::test]
async fn test_close_listing_with_winner() {
    let (base, store) = setup().await;
    let (seller, seller_id) = signed_in(&base, &store, "seller").await;
    let (buyer, _) = signed_in(&base, &store, "buyer").await;
    let (rival, _) = signed_in(&base, &store, "rival").await;
    let listing = create_test_listing(&store, seller_id, "Clock", 1_000).await;

    bid(&buyer, &base, listing.id, "20").await;
    bid(&rival, &base, listing.id, "25").await;

    // only the owner may close
    let response = buyer
        .post(format!("{base}/listing/{}/close_listing", listing.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = seller
        .post(format!("{base}/listing/{}/close_listing", listing.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/listing/{}", listing.id));

    let closed = store.get_listing(listing.id).await.unwrap().unwrap();
    assert!(!closed.active);

    let page = rival
        .get(format!("{base}/listing/{}", listing.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Winner: rival with $25.00. You won this auction!"));

    let response = buyer
        .post(format!("{base}/listing/{}/place_bid", listing.id))
        .form(&[("bid_amount", "1000")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("This listing is closed."));
    assert_eq!(store.listing_bids(listing.id).await.unwrap().len(), 2);
}

/// Closing a listing nobody bid on declares no winner
#[tokio::test]
async fn test_close_listing_without_bids() {
    let (base, store) = setup().await;
    let (seller, seller_id) = signed_in(&base, &store, "seller").await;
    let listing = create_test_listing(&store, seller_id, "Vase", 1_000).await;

    let response = seller
        .post(format!("{base}/listing/{}/close_listing", listing.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = seller
        .get(format!("{base}/listing/{}", listing.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("There is no winner."));
}

/// Registration rules
#[tokio::test]
async fn test_register_rejects_duplicates_and_mismatches() {
    let (base, _store) = setup().await;
    let response = register(&browser(), &base, "alice").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = register(&browser(), &base, "alice").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Username already taken."));

    let response = browser()
        .post(format!("{base}/register"))
        .form(&[
            ("username", "bob"),
            ("email", ""),
            ("password", "one"),
            ("confirmation", "two"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Passwords must match."));
}

/// Login, logout and the login redirect for protected pages
#[tokio::test]
async fn test_login_flow() {
    let (base, _store) = setup().await;
    register(&browser(), &base, "carol").await;

    let client = browser();
    let response = client.get(format!("{base}/watchlist")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fwatchlist");

    let response = client
        .post(format!("{base}/login"))
        .form(&[("username", "carol"), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Invalid username and/or password."));

    let response = client
        .post(format!("{base}/login"))
        .form(&[
            ("username", "carol"),
            ("password", "hunter22"),
            ("next", "/watchlist"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/watchlist");

    let response = client.get(format!("{base}/watchlist")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    client.get(format!("{base}/logout")).send().await.unwrap();
    let response = client.get(format!("{base}/watchlist")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

/// `next` values that are not plain local paths fall back to the feed
#[tokio::test]
async fn test_login_ignores_unsafe_next() {
    let (base, _store) = setup().await;
    register(&browser(), &base, "erin").await;

    for next in ["/a\nb", "/\\evil.example", "//evil.example", "https://evil.example"] {
        let response = browser()
            .post(format!("{base}/login"))
            .form(&[("username", "erin"), ("password", "hunter22"), ("next", next)])
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "next = {next:?}");
        assert_eq!(location(&response), "/", "next = {next:?}");
    }
}

/// Overlong emails get a form message instead of reaching the database
#[tokio::test]
async fn test_register_rejects_long_email() {
    let (base, store) = setup().await;
    let email = format!("{}@example.com", "a".repeat(250));

    let response = browser()
        .post(format!("{base}/register"))
        .form(&[
            ("username", "frank"),
            ("email", email.as_str()),
            ("password", "hunter22"),
            ("confirmation", "hunter22"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Email must be at most 254 characters."));
    assert!(store.find_credentials("frank").await.unwrap().is_none());
}

/// Closing and watchlist changes cannot be triggered by a plain link
#[tokio::test]
async fn test_state_changes_require_post() {
    let (base, store) = setup().await;
    let (seller, seller_id) = signed_in(&base, &store, "grace").await;
    let listing = create_test_listing(&store, seller_id, "Clock", 1_000).await;

    for path in [
        format!("/listing/{}/close_listing", listing.id),
        format!("/listing/{}/add_watchlist", listing.id),
        "/watchlist/remove/1".to_string(),
    ] {
        let response = seller.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{path}");
    }

    let listing = store.get_listing(listing.id).await.unwrap().unwrap();
    assert!(listing.active);
    assert!(!store.is_watching(seller_id, listing.id).await.unwrap());
}

/// Watchlist entries can only be removed by their owner
#[tokio::test]
async fn test_watchlist_remove_is_owner_scoped() {
    let (base, store) = setup().await;
    let (seller, seller_id) = signed_in(&base, &store, "seller").await;
    let (buyer, buyer_id) = signed_in(&base, &store, "buyer").await;
    let listing = create_test_listing(&store, seller_id, "Lamp", 2_000).await;

    for _ in 0..2 {
        let response = buyer
            .post(format!("{base}/listing/{}/add_watchlist", listing.id))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/watchlist");
    }
    let entries = store.watchlist(buyer_id).await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry_id = entries[0].id;

    bid(&seller, &base, listing.id, "30").await;
    let page = buyer
        .get(format!("{base}/watchlist"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Lamp"));
    assert!(page.contains("Current price: $30.00"));

    seller
        .post(format!("{base}/watchlist/remove/{entry_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(store.watchlist(buyer_id).await.unwrap().len(), 1);

    buyer
        .post(format!("{base}/watchlist/remove/{entry_id}"))
        .send()
        .await
        .unwrap();
    assert!(store.watchlist(buyer_id).await.unwrap().is_empty());
}

/// The feed and category pages only list active listings
#[tokio::test]
async fn test_feed_shows_only_active_listings() {
    let (base, store) = setup().await;
    let (seller, seller_id) = signed_in(&base, &store, "seller").await;
    create_test_listing(&store, seller_id, "Open Teapot", 1_500).await;
    let closed = create_test_listing(&store, seller_id, "Closed Kettle", 1_500).await;
    seller
        .post(format!("{base}/listing/{}/close_listing", closed.id))
        .send()
        .await
        .unwrap();

    let page = browser().get(&base).send().await.unwrap().text().await.unwrap();
    assert!(page.contains("Open Teapot"));
    assert!(page.contains("Starting bid: $15.00"));
    assert!(!page.contains("Closed Kettle"));

    let page = browser()
        .get(format!("{base}/categories/Testing"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Open Teapot"));
    assert!(!page.contains("Closed Kettle"));

    let page = browser()
        .get(format!("{base}/categories"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("href=\"/categories/testing\""));
}

/// Listings are created through the form and validated
#[tokio::test]
async fn test_create_listing() {
    let (base, store) = setup().await;
    let (client, _) = signed_in(&base, &store, "maker").await;

    let response = client
        .post(format!("{base}/create_listing"))
        .form(&[
            ("title", ""),
            ("description", "no title"),
            ("category", ""),
            ("starting_bid", "5"),
            ("image_url", ""),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Title is required."));

    let response = client
        .post(format!("{base}/create_listing"))
        .form(&[
            ("title", "Chair"),
            ("description", "Oak chair"),
            ("category", "Furniture"),
            ("starting_bid", "45.50"),
            ("image_url", "https://img.example/chair.png"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let listings = store.active_listings(Some("furniture")).await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].starting_price, 4_550);
    assert_eq!(listings[0].owner, "maker");
}

/// Comments show up on the listing page, escaped
#[tokio::test]
async fn test_comments() {
    let (base, store) = setup().await;
    let (client, user_id) = signed_in(&base, &store, "critic").await;
    let listing = create_test_listing(&store, user_id, "Painting", 50_000).await;

    let response = client
        .post(format!("{base}/listing/{}/comment", listing.id))
        .form(&[("text", "<b>Lovely</b> colours")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = client
        .post(format!("{base}/listing/{}/comment", listing.id))
        .form(&[("text", "   ")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let page = client
        .get(format!("{base}/listing/{}", listing.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("&lt;b&gt;Lovely&lt;/b&gt; colours"));
    assert_eq!(store.listing_comments(listing.id).await.unwrap().len(), 1);
}

/// Unknown listings are a 404
#[tokio::test]
async fn test_missing_listing_is_not_found() {
    let (base, store) = setup().await;
    let (client, _) = signed_in(&base, &store, "dave").await;

    let response = client.get(format!("{base}/listing/999")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{base}/listing/999/add_watchlist"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get(format!("{base}/no/such/page")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Concurrent equal bids: exactly one is accepted
#[tokio::test]
async fn test_concurrent_equal_bids() {
    let (base, store) = setup().await;
    let (_, seller_id) = signed_in(&base, &store, "seller").await;
    let listing_id = create_test_listing(&store, seller_id, "Stamp", 100).await.id;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let (client, _) = signed_in(&base, &store, &format!("bidder{i}")).await;
        let base = base.clone();
        tasks.push(tokio::spawn(async move {
            bid(&client, &base, listing_id, "5").await.status()
        }));
    }

    let mut accepted = 0;
    for task in tasks {
        if task.await.unwrap() == StatusCode::SEE_OTHER {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(store.listing_bids(listing_id).await.unwrap().len(), 1);
}
