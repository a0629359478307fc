use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property queried on every run
pub const HOTEL_ID: u32 = 514;

/// Number of consecutive stay dates checked per run
pub const HORIZON_DAYS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCounts {
    pub adults: u32,
    pub children: u32,
}

/// Search parameters shared by every request of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameters {
    /// Hotel code sent to the booking API
    pub hotel_id: u32,
    /// How many stay dates to check, starting at the run's start date
    pub horizon_days: u32,
    pub guests: GuestCounts,
    /// `primaryLanguageId` sent with each request
    pub language: String,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            hotel_id: HOTEL_ID,
            horizon_days: HORIZON_DAYS,
            guests: GuestCounts {
                adults: 2,
                children: 0,
            },
            language: "en".to_string(),
        }
    }
}

/// Opaque session cookie copied from the user's browser.
///
/// Sent verbatim as the `Cookie` header and never parsed.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionCredential(<{} bytes>)", self.0.len())
    }
}

/// A single one-night stay to check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayQuery {
    pub stay_start: NaiveDate,
    pub stay_end: NaiveDate,
}

impl DayQuery {
    /// One-night stay starting at `date`; `None` only at the end of the calendar
    pub fn for_date(date: NaiveDate) -> Option<Self> {
        let stay_end = date.succ_opt()?;
        Some(Self {
            stay_start: date,
            stay_end,
        })
    }
}

/// `days` consecutive calendar dates beginning at `start`.
///
/// Cheap to copy; every call to [`DateRange::iter`] starts over from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    days: u32,
}

impl DateRange {
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self { start, days }
    }

    pub fn iter(&self) -> DateRangeIter {
        DateRangeIter {
            start: self.start,
            next: 0,
            days: self.days,
        }
    }
}

impl IntoIterator for DateRange {
    type Item = NaiveDate;
    type IntoIter = DateRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct DateRangeIter {
    start: NaiveDate,
    next: u32,
    days: u32,
}

impl Iterator for DateRangeIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.next >= self.days {
            return None;
        }

        match self.start.checked_add_days(Days::new(u64::from(self.next))) {
            Some(date) => {
                self.next += 1;
                Some(date)
            }
            None => {
                // ran off the end of the calendar
                self.next = self.days;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.days - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateRangeIter {}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case(0; "empty range")]
    #[test_case(1; "single day")]
    #[test_case(60; "default horizon")]
    #[test_case(400; "crosses a leap year")]
    fn test_date_range_is_consecutive(days: u32) {
        let start = date(2027, 12, 15);
        let dates: Vec<NaiveDate> = DateRange::new(start, days).iter().collect();

        assert_eq!(dates.len(), days as usize);
        if let Some(first) = dates.first() {
            assert_eq!(*first, start);
        }
        for pair in dates.windows(2) {
            assert_eq!(pair[0].succ_opt(), Some(pair[1]));
        }
    }

    #[test]
    fn test_date_range_restarts() {
        let range = DateRange::new(date(2025, 2, 27), 3);
        let first: Vec<_> = range.iter().collect();
        let second: Vec<_> = range.into_iter().collect();

        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![date(2025, 2, 27), date(2025, 2, 28), date(2025, 3, 1)]
        );
    }

    #[test]
    fn test_date_range_exact_size() {
        let mut iter = DateRange::new(date(2025, 1, 1), 5).iter();
        assert_eq!(iter.len(), 5);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 3);
    }

    #[test]
    fn test_date_range_stops_at_calendar_end() {
        let dates: Vec<_> = DateRange::new(NaiveDate::MAX, 3).iter().collect();
        assert_eq!(dates, vec![NaiveDate::MAX]);
    }

    #[test]
    fn test_day_query_spans_one_night() {
        let query = DayQuery::for_date(date(2024, 12, 31)).unwrap();
        assert_eq!(query.stay_start, date(2024, 12, 31));
        assert_eq!(query.stay_end, date(2025, 1, 1));
        assert_eq!(DayQuery::for_date(NaiveDate::MAX), None);
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = SessionCredential::new("session=abc123");
        assert!(!format!("{:?}", credential).contains("abc123"));
        assert_eq!(credential.as_str(), "session=abc123");
    }

    #[test]
    fn test_default_search_parameters() {
        let params = SearchParameters::default();
        assert_eq!(params.hotel_id, 514);
        assert_eq!(params.horizon_days, 60);
        assert_eq!(params.guests, GuestCounts { adults: 2, children: 0 });
        assert_eq!(params.language, "en");
    }
}
