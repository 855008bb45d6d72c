//! Server-rendered HTML pages.
//!
//! Every user supplied string goes through `escape` before it reaches markup.

// region:    --- Imports
use crate::auction::listing::{ListingDetail, ListingForm, ListingSummary};
use crate::auction::model::WatchlistEntry;
use crate::auth::CurrentUser;
use crate::money::format_cents;
use axum::http::StatusCode;
use std::fmt::Write;

// endregion: --- Imports

// region:    --- Helpers
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn message_block(message: Option<&str>) -> String {
    message
        .map(|m| format!("<div class=\"alert\">{}</div>\n", escape(m)))
        .unwrap_or_default()
}

fn layout(title: &str, user: Option<&CurrentUser>, body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            "<span>Signed in as <strong>{}</strong>.</span>\n\
             <a href=\"/\">Active Listings</a>\n\
             <a href=\"/categories\">Categories</a>\n\
             <a href=\"/watchlist\">Watchlist</a>\n\
             <a href=\"/create_listing\">Create Listing</a>\n\
             <a href=\"/logout\">Log Out</a>",
            escape(&user.username)
        ),
        None => "<span>Not signed in.</span>\n\
                 <a href=\"/\">Active Listings</a>\n\
                 <a href=\"/categories\">Categories</a>\n\
                 <a href=\"/login\">Log In</a>\n\
                 <a href=\"/register\">Register</a>"
            .to_string(),
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - Auctions</title>\n</head>\n<body>\n<h1>Auctions</h1>\n\
         <nav>\n{nav}\n</nav>\n<hr>\n<main>\n{body}</main>\n</body>\n</html>\n",
        title = escape(title),
    )
}
// endregion: --- Helpers

// region:    --- Pages
pub fn index_page(user: Option<&CurrentUser>, heading: &str, summaries: &[ListingSummary]) -> String {
    let mut body = format!("<h2>{}</h2>\n", escape(heading));
    if summaries.is_empty() {
        body.push_str("<p>No active listings.</p>\n");
    }
    for summary in summaries {
        let listing = &summary.listing;
        let _ = write!(
            body,
            "<article class=\"listing\">\n<h3><a href=\"/listing/{id}\">{title}</a></h3>\n",
            id = listing.id,
            title = escape(&listing.title),
        );
        if !listing.image_url.is_empty() {
            let _ = writeln!(
                body,
                "<img src=\"{}\" alt=\"{}\" width=\"200\">",
                escape(&listing.image_url),
                escape(&listing.title)
            );
        }
        let price_label = if summary.highest_bid.is_some() {
            "Current bid"
        } else {
            "Starting bid"
        };
        let _ = write!(
            body,
            "<p>{}</p>\n<p>{price_label}: {}</p>\n<p class=\"meta\">Created {}</p>\n</article>\n",
            escape(&listing.description),
            format_cents(summary.current_price()),
            listing.created_at.format("%b %-d, %Y, %H:%M"),
        );
    }
    layout(heading, user, &body)
}

pub fn login_page(message: Option<&str>, next: Option<&str>) -> String {
    let next_field = next
        .map(|n| format!("<input type=\"hidden\" name=\"next\" value=\"{}\">\n", escape(n)))
        .unwrap_or_default();
    let body = format!(
        "<h2>Login</h2>\n{}<form action=\"/login\" method=\"post\">\n{next_field}\
         <input autofocus type=\"text\" name=\"username\" placeholder=\"Username\">\n\
         <input type=\"password\" name=\"password\" placeholder=\"Password\">\n\
         <input type=\"submit\" value=\"Login\">\n</form>\n\
         <p>Don't have an account? <a href=\"/register\">Register here.</a></p>\n",
        message_block(message),
    );
    layout("Login", None, &body)
}

pub fn register_page(message: Option<&str>) -> String {
    let body = format!(
        "<h2>Register</h2>\n{}<form action=\"/register\" method=\"post\">\n\
         <input autofocus type=\"text\" name=\"username\" placeholder=\"Username\">\n\
         <input type=\"email\" name=\"email\" placeholder=\"Email Address\">\n\
         <input type=\"password\" name=\"password\" placeholder=\"Password\">\n\
         <input type=\"password\" name=\"confirmation\" placeholder=\"Confirm Password\">\n\
         <input type=\"submit\" value=\"Register\">\n</form>\n\
         <p>Already have an account? <a href=\"/login\">Log In here.</a></p>\n",
        message_block(message),
    );
    layout("Register", None, &body)
}

pub fn create_listing_page(user: &CurrentUser, message: Option<&str>, form: &ListingForm) -> String {
    let body = format!(
        "<h2>Create Listing</h2>\n{}<form action=\"/create_listing\" method=\"post\">\n\
         <input type=\"text\" name=\"title\" placeholder=\"Title\" maxlength=\"64\" value=\"{}\">\n\
         <textarea name=\"description\" placeholder=\"Description\">{}</textarea>\n\
         <input type=\"text\" name=\"category\" placeholder=\"Category\" maxlength=\"64\" value=\"{}\">\n\
         <input type=\"text\" name=\"starting_bid\" placeholder=\"Starting bid\" value=\"{}\">\n\
         <input type=\"url\" name=\"image_url\" placeholder=\"Image URL\" value=\"{}\">\n\
         <input type=\"submit\" value=\"Create\">\n</form>\n",
        message_block(message),
        escape(&form.title),
        escape(&form.description),
        escape(&form.category),
        escape(&form.starting_bid),
        escape(&form.image_url),
    );
    layout("Create Listing", Some(user), &body)
}

pub fn listing_page(user: Option<&CurrentUser>, detail: &ListingDetail, message: Option<&str>) -> String {
    let listing = &detail.listing;
    let mut body = format!(
        "<h2>Listing: {}</h2>\n{}",
        escape(&listing.title),
        message_block(message)
    );

    if let Some(user) = user {
        if detail.watching {
            let _ = writeln!(
                body,
                "<p class=\"badge\">Watchlist</p>\n<p><a href=\"/watchlist\">On your watchlist</a></p>"
            );
        } else {
            let _ = writeln!(
                body,
                "<form action=\"/listing/{}/add_watchlist\" method=\"post\">\
                 <input type=\"submit\" value=\"Add to watchlist\"></form>",
                listing.id
            );
        }
        if listing.active && user.id == listing.owner_id {
            let _ = writeln!(
                body,
                "<form action=\"/listing/{}/close_listing\" method=\"post\">\
                 <input type=\"submit\" value=\"Close listing\"></form>",
                listing.id
            );
        }
    }

    if !listing.image_url.is_empty() {
        let _ = writeln!(
            body,
            "<img src=\"{}\" alt=\"{}\" width=\"400\">",
            escape(&listing.image_url),
            escape(&listing.title)
        );
    }
    let _ = write!(
        body,
        "<p>{}</p>\n<h3>{}</h3>\n",
        escape(&listing.description),
        format_cents(detail.current_price())
    );

    if listing.active {
        let standing = match (detail.highest_bid(), user) {
            (Some(bid), Some(user)) if bid.bidder_id == user.id => " Your bid is the current bid.",
            _ => "",
        };
        let _ = writeln!(body, "<p>{} bid(s) so far.{standing}</p>", detail.bid_count());
        if user.is_some() {
            let _ = writeln!(
                body,
                "<form action=\"/listing/{}/place_bid\" method=\"post\">\n\
                 <input type=\"text\" name=\"bid_amount\" placeholder=\"Bid\">\n\
                 <input type=\"submit\" value=\"Place Bid\">\n</form>",
                listing.id
            );
        }
    } else {
        body.push_str("<p><strong>This listing is closed.</strong></p>\n");
        match detail.winning_bid() {
            Some(bid) => {
                let you = match user {
                    Some(user) if user.id == bid.bidder_id => " You won this auction!",
                    _ => "",
                };
                let _ = writeln!(
                    body,
                    "<p>Winner: {} with {}.{you}</p>",
                    escape(&bid.bidder),
                    format_cents(bid.amount)
                );
            }
            None => body.push_str("<p>No bids were placed. There is no winner.</p>\n"),
        }
    }

    let _ = write!(
        body,
        "<h3>Details</h3>\n<ul>\n<li>Listed by: {}</li>\n<li>Category: {}</li>\n<li>Created {}</li>\n</ul>\n",
        escape(&listing.owner),
        if listing.category.is_empty() {
            "No Category Listed".to_string()
        } else {
            escape(&listing.category)
        },
        listing.created_at.format("%b %-d, %Y, %H:%M"),
    );

    if !detail.bids.is_empty() {
        body.push_str("<h3>Bids</h3>\n<ol>\n");
        for bid in &detail.bids {
            let _ = writeln!(
                body,
                "<li>{} by {}</li>",
                format_cents(bid.amount),
                escape(&bid.bidder)
            );
        }
        body.push_str("</ol>\n");
    }

    body.push_str("<h3>Comments</h3>\n");
    if detail.comments.is_empty() {
        body.push_str("<p>No comments yet.</p>\n");
    }
    for comment in &detail.comments {
        let _ = writeln!(
            body,
            "<div class=\"comment\"><strong>{}</strong>: {}</div>",
            escape(&comment.author),
            escape(&comment.body)
        );
    }
    if user.is_some() {
        let _ = writeln!(
            body,
            "<form action=\"/listing/{}/comment\" method=\"post\">\n\
             <textarea name=\"text\" placeholder=\"Add a comment\"></textarea>\n\
             <input type=\"submit\" value=\"Comment\">\n</form>",
            listing.id
        );
    }

    layout(&listing.title, user, &body)
}

/// `entries` pairs each watched listing with its current price
pub fn watchlist_page(user: &CurrentUser, entries: &[(WatchlistEntry, i64)]) -> String {
    let mut body = String::from("<h2>Watchlist</h2>\n");
    if entries.is_empty() {
        body.push_str("<p>Your watchlist is empty.</p>\n");
    }
    for (entry, current_price) in entries {
        let listing = &entry.listing;
        let status = if listing.active { "" } else { " (closed)" };
        let _ = writeln!(
            body,
            "<article class=\"listing\">\n<h3><a href=\"/listing/{id}\">{title}</a>{status}</h3>\n\
             <p>Current price: {price}</p>\n\
             <form action=\"/watchlist/remove/{entry_id}\" method=\"post\">\
             <input type=\"submit\" value=\"Remove\"></form>\n</article>",
            id = listing.id,
            title = escape(&listing.title),
            price = format_cents(*current_price),
            entry_id = entry.id,
        );
    }
    layout("Watchlist", Some(user), &body)
}

pub fn categories_page(user: Option<&CurrentUser>, categories: &[String]) -> String {
    let mut body = String::from("<h2>Categories</h2>\n");
    if categories.is_empty() {
        body.push_str("<p>No categories yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for category in categories {
            // path segments take %20, not the form encoding's `+`
            let path = url::form_urlencoded::byte_serialize(category.as_bytes())
                .collect::<String>()
                .replace('+', "%20");
            let _ = writeln!(
                body,
                "<li><a href=\"/categories/{path}\">{}</a></li>",
                escape(category)
            );
        }
        body.push_str("</ul>\n");
    }
    layout("Categories", user, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h2>{}</h2>\n<p>{}</p>\n<p><a href=\"/\">Back to active listings</a></p>\n",
        status.as_u16(),
        escape(message)
    );
    layout(status.canonical_reason().unwrap_or("Error"), None, &body)
}
// endregion: --- Pages
