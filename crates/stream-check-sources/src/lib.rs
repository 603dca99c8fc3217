pub mod error;
pub mod justwatch;
pub mod letterboxd;
pub mod traits;

pub use error::SourceError;
pub use justwatch::JustWatchClient;
pub use letterboxd::{parse_watchlist_page, LetterboxdFetcher, ParsedPage};
pub use traits::{AvailabilityClient, WatchlistFetcher};
