//! # Wishlist
//!
//! Ordered, duplicate-free list of saved book ids, mirrored under the
//! `wishlist` key so the heart icons render before the account API answers.

use crate::cart::{load_json, save_json, KeyValueStore};
use crate::error::CoreResult;

/// Mirror key for the wishlist.
pub const WISHLIST_KEY: &str = "wishlist";

#[derive(Debug)]
pub struct Wishlist<S: KeyValueStore> {
    book_ids: Vec<String>,
    store: S,
}

impl<S: KeyValueStore> Wishlist<S> {
    pub fn new(store: S) -> Self {
        Wishlist {
            book_ids: Vec::new(),
            store,
        }
    }

    /// Loads the mirrored list, dropping duplicates an older client may
    /// have written.
    pub fn restore(&mut self) -> CoreResult<()> {
        let saved: Vec<String> = load_json(&self.store, WISHLIST_KEY)?.unwrap_or_default();
        self.book_ids.clear();
        for id in saved {
            if !self.book_ids.contains(&id) {
                self.book_ids.push(id);
            }
        }
        Ok(())
    }

    /// Adds a book. Returns `false` if it was already saved.
    pub fn add(&mut self, book_id: &str) -> CoreResult<bool> {
        if self.contains(book_id) {
            return Ok(false);
        }
        self.book_ids.push(book_id.to_string());
        self.mirror()?;
        Ok(true)
    }

    /// Removes a book. Returns `false` if it was not saved.
    pub fn remove(&mut self, book_id: &str) -> CoreResult<bool> {
        let before = self.book_ids.len();
        self.book_ids.retain(|id| id != book_id);
        if self.book_ids.len() == before {
            return Ok(false);
        }
        self.mirror()?;
        Ok(true)
    }

    /// Flips a book in or out; returns whether it is now saved.
    pub fn toggle(&mut self, book_id: &str) -> CoreResult<bool> {
        if self.contains(book_id) {
            self.remove(book_id)?;
            Ok(false)
        } else {
            self.add(book_id)?;
            Ok(true)
        }
    }

    pub fn clear(&mut self) -> CoreResult<()> {
        self.book_ids.clear();
        self.mirror()
    }

    pub fn contains(&self, book_id: &str) -> bool {
        self.book_ids.iter().any(|id| id == book_id)
    }

    pub fn book_ids(&self) -> &[String] {
        &self.book_ids
    }

    pub fn len(&self) -> usize {
        self.book_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book_ids.is_empty()
    }

    fn mirror(&mut self) -> CoreResult<()> {
        save_json(&mut self.store, WISHLIST_KEY, &self.book_ids)?;
        Ok(())
    }
}
