pub mod client;
pub mod flatten;
pub mod traits;
pub mod types;

pub use client::AvailabilityClient;
pub use flatten::flatten_response;
pub use traits::AvailabilitySource;
pub use types::{DateRange, DayQuery, SearchParameters, SessionCredential};
