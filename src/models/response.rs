use crate::models::FieldValue;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parsed body of a `check-room-availability` response.
///
/// Only the fields that end up in the report are kept. Anything with an unexpected
/// shape becomes absent instead of failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAvailabilityResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub room_stays: Option<Vec<RoomStay>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStay {
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub title: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub room_type_code: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub max_guests: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub rates: Option<Vec<RateOffer>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateOffer {
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub title: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub total: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub taxes: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub fees: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub guarantee_code: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub short_description: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub long_description: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub image: Option<FieldValue>,
}

impl RawAvailabilityResponse {
    /// Parse a response body. Fails only when the body is not a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom(
                "response body is not a JSON object",
            ));
        }
        serde_json::from_value(value)
    }
}

fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<FieldValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(FieldValue::from_json))
}

/// Non-array values become `None`; entries that are not objects become empty records
/// so they still count towards the row total.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(None),
    };

    Ok(Some(
        items
            .into_iter()
            .map(|item| {
                if item.is_object() {
                    serde_json::from_value(item).unwrap_or_default()
                } else {
                    T::default()
                }
            })
            .collect(),
    ))
}
