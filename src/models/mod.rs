pub mod response;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use response::RawAvailabilityResponse;

/// A scalar value copied out of the availability API.
///
/// Fields missing from the API are `None` on the row, never a zero or an empty string,
/// so "no fee" and "unknown fee" stay distinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Convert a JSON value, mapping null, arrays and objects to absent
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(FieldValue::Bool(b)),
            serde_json::Value::Number(n) => Some(FieldValue::Number(n)),
            serde_json::Value::String(s) => Some(FieldValue::Text(s)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.into())
    }
}

/// One (room, rate) offer for one stay date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRow {
    pub hotel_id: u32,
    pub date: NaiveDate,
    pub room_type: Option<FieldValue>,
    pub room_code: Option<FieldValue>,
    pub rate_title: Option<FieldValue>,
    pub total: Option<FieldValue>,
    pub taxes: Option<FieldValue>,
    pub fees: Option<FieldValue>,
    pub max_guests: Option<FieldValue>,
    pub guarantee_code: Option<FieldValue>,
    pub short_description: Option<FieldValue>,
    pub long_description: Option<FieldValue>,
    pub image: Option<FieldValue>,
}

impl AvailabilityRow {
    /// Spreadsheet column labels, in export order
    pub const HEADERS: [&'static str; 13] = [
        "HotelID",
        "Date",
        "RoomType",
        "RoomCode",
        "RateTitle",
        "Total",
        "Taxes",
        "Fees",
        "MaxGuests",
        "GuaranteeCode",
        "ShortDescription",
        "LongDescription",
        "Image",
    ];

    /// The optional API-sourced fields, in the same order as the last 11 headers
    pub fn optional_fields(&self) -> [Option<&FieldValue>; 11] {
        [
            self.room_type.as_ref(),
            self.room_code.as_ref(),
            self.rate_title.as_ref(),
            self.total.as_ref(),
            self.taxes.as_ref(),
            self.fees.as_ref(),
            self.max_guests.as_ref(),
            self.guarantee_code.as_ref(),
            self.short_description.as_ref(),
            self.long_description.as_ref(),
            self.image.as_ref(),
        ]
    }
}

/// Rows produced by one successful day query
#[derive(Debug, Clone, PartialEq)]
pub struct RowBatch {
    pub date: NaiveDate,
    pub rows: Vec<AvailabilityRow>,
}

/// Ordered accumulation of every row found during a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    rows: Vec<AvailabilityRow>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, batch: RowBatch) {
        self.rows.extend(batch.rows);
    }

    pub fn rows(&self) -> &[AvailabilityRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
