pub mod cache;
pub mod check;
pub mod select;

pub use cache::{CachedLookup, OfferCache};
pub use check::{RunError, RunOptions, WatchlistChecker};
pub use select::{filter_offers, select_candidate};
