use crate::availability::types::{DayQuery, SearchParameters, SessionCredential};
use crate::error::DateError;
use crate::models::RawAvailabilityResponse;
use async_trait::async_trait;

/// Anything that can answer "what is bookable on this night".
/// The orchestrator only talks to this, so runs can be driven without a network.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Fetch the availability for a single one-night stay
    async fn fetch_day(
        &self,
        query: &DayQuery,
        credential: &SessionCredential,
        params: &SearchParameters,
    ) -> Result<RawAvailabilityResponse, DateError>;

    /// Name of the upstream, for logging
    fn source_name(&self) -> &'static str;
}
