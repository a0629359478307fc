use crate::models::{AvailabilityRow, RawAvailabilityResponse};
use chrono::NaiveDate;

/// Expand a response into one row per (room, rate) pair, in response order.
///
/// Rooms without a usable `rates` list contribute nothing.
pub fn flatten_response(
    response: &RawAvailabilityResponse,
    date: NaiveDate,
    hotel_id: u32,
) -> Vec<AvailabilityRow> {
    let Some(rooms) = response.room_stays.as_deref() else {
        return Vec::new();
    };

    rooms
        .iter()
        .flat_map(|room| {
            room.rates
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(move |rate| AvailabilityRow {
                    hotel_id,
                    date,
                    room_type: room.title.clone(),
                    room_code: room.room_type_code.clone(),
                    rate_title: rate.title.clone(),
                    total: rate.total.clone(),
                    taxes: rate.taxes.clone(),
                    fees: rate.fees.clone(),
                    max_guests: room.max_guests.clone(),
                    guarantee_code: rate.guarantee_code.clone(),
                    short_description: rate.short_description.clone(),
                    long_description: rate.long_description.clone(),
                    image: rate.image.clone(),
                })
        })
        .collect()
}
