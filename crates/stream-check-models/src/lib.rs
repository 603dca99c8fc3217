pub mod matched;
pub mod offer;
pub mod title;
pub mod watchlist;

pub use matched::{MatchedResult, RunOutcome, RunReport};
pub use offer::{canonical_service_id, AvailabilityOffer, MonetizationType, TitleCandidate};
pub use title::NormalizedTitle;
pub use watchlist::WatchlistEntry;
