//! # Wishlist Commands
//!
//! Heart icon on the catalog and book pages.

use serde::Serialize;
use shelf_core::{KeyValueStore, Wishlist};
use tracing::debug;

use crate::error::ApiError;
use crate::state::CartState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    pub book_ids: Vec<String>,
    /// Whether the book just toggled is now saved (toggle only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wishlisted: Option<bool>,
}

impl<S: KeyValueStore> From<&Wishlist<S>> for WishlistResponse {
    fn from(wishlist: &Wishlist<S>) -> Self {
        WishlistResponse {
            book_ids: wishlist.book_ids().to_vec(),
            wishlisted: None,
        }
    }
}

pub fn get_wishlist<S: KeyValueStore>(cart: &CartState<S>) -> WishlistResponse {
    debug!("get_wishlist command");
    cart.with_wishlist(wishlist_response)
}

fn wishlist_response<S: KeyValueStore>(wishlist: &Wishlist<S>) -> WishlistResponse {
    WishlistResponse::from(wishlist)
}

/// Saves or unsaves a book.
pub fn toggle_wishlist<S: KeyValueStore>(
    cart: &CartState<S>,
    book_id: &str,
) -> Result<WishlistResponse, ApiError> {
    debug!(book_id, "toggle_wishlist command");

    if book_id.trim().is_empty() {
        return Err(shelf_core::ValidationError::Required {
            field: "bookId".to_string(),
        }
        .into());
    }

    cart.with_wishlist_mut(|wishlist| -> Result<WishlistResponse, ApiError> {
        let saved = wishlist.toggle(book_id)?;
        Ok(WishlistResponse {
            wishlisted: Some(saved),
            ..WishlistResponse::from(&*wishlist)
        })
    })
}
