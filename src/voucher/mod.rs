//! # Voucher Data
//!
//! The booking data a voucher is rendered from. Every field is an opaque
//! display string: dates, phone numbers and pax counts are printed exactly
//! as supplied.

mod content;
mod form;

pub use content::{Helpline, StaticContent};
pub use form::FormFields;

use serde::{Deserialize, Serialize};

use crate::error::VoucherError;

/// One hotel booked for the trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotelStay {
    pub name: String,
    pub check_in: String,
    pub check_out: String,
    pub room_type: String,
}

/// One scheduled service in the itinerary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityEntry {
    pub day: String,
    pub time: String,
    pub service_description: String,
    pub pax_or_vehicle: String,
    pub remarks: String,
}

/// Everything the caller supplies for one voucher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoucherRequest {
    pub trip_id: String,
    pub arrival_date: String,
    pub departure: String,
    pub duration: String,
    pub guest_name: String,
    pub guest_phone: String,
    pub pax: String,
    pub reference_id: String,
    pub hotels: Vec<HotelStay>,
    pub activities: Vec<ActivityEntry>,
}

/// How parallel form arrays of unequal length are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListPolicy {
    /// Reject the request.
    #[default]
    Strict,
    /// Keep only as many entries as the shortest array has.
    Truncate,
    /// Keep as many entries as the longest array has; missing values are blank.
    Pad,
}

impl ListPolicy {
    /// Number of entries to build from arrays with the given lengths.
    fn entry_count(&self, section: &'static str, lengths: &[usize]) -> Result<usize, VoucherError> {
        let min = lengths.iter().copied().min().unwrap_or(0);
        let max = lengths.iter().copied().max().unwrap_or(0);
        if min == max {
            return Ok(max);
        }
        match self {
            ListPolicy::Strict => Err(VoucherError::MismatchedLists {
                section,
                lengths: lengths.to_vec(),
            }),
            ListPolicy::Truncate => {
                log::warn!(
                    "Truncating {} entries to {} (array lengths {:?})",
                    section,
                    min,
                    lengths
                );
                Ok(min)
            }
            ListPolicy::Pad => Ok(max),
        }
    }
}

const HOTEL_KEYS: [&str; 4] = ["hotel_name", "check_in", "check_out", "accommodation"];
const ACTIVITY_KEYS: [&str; 5] = ["day", "start_time", "service", "pax_or_vehicle", "remarks"];

impl VoucherRequest {
    /// Build a request from form fields. Missing scalars become empty strings;
    /// parallel arrays are zipped according to `policy`.
    pub fn from_form(form: &FormFields, policy: ListPolicy) -> Result<Self, VoucherError> {
        let hotel_cols: Vec<&[String]> = HOTEL_KEYS.iter().map(|k| form.get_list(k)).collect();
        let hotel_count = policy.entry_count("hotel", &lengths(&hotel_cols))?;
        let hotels = (0..hotel_count)
            .map(|i| HotelStay {
                name: value_at(hotel_cols[0], i),
                check_in: value_at(hotel_cols[1], i),
                check_out: value_at(hotel_cols[2], i),
                room_type: value_at(hotel_cols[3], i),
            })
            .collect();

        let activity_cols: Vec<&[String]> =
            ACTIVITY_KEYS.iter().map(|k| form.get_list(k)).collect();
        let activity_count = policy.entry_count("activity", &lengths(&activity_cols))?;
        let activities = (0..activity_count)
            .map(|i| ActivityEntry {
                day: value_at(activity_cols[0], i),
                time: value_at(activity_cols[1], i),
                service_description: value_at(activity_cols[2], i),
                pax_or_vehicle: value_at(activity_cols[3], i),
                remarks: value_at(activity_cols[4], i),
            })
            .collect();

        Ok(Self {
            trip_id: form.get("trip_id").to_string(),
            arrival_date: form.get("arrival_date").to_string(),
            departure: form.get("departure").to_string(),
            duration: form.get("duration").to_string(),
            guest_name: form.get("guest_name").to_string(),
            guest_phone: form.get("guest_phone").to_string(),
            pax: form.get("pax").to_string(),
            reference_id: form.get("reference_id").to_string(),
            hotels,
            activities,
        })
    }

    /// Label/value pairs of the trip summary table, in display order.
    pub fn trip_summary_rows(&self) -> [(&'static str, &str); 8] {
        [
            ("1. Trip ID", self.trip_id.as_str()),
            ("2. Arrival Date", self.arrival_date.as_str()),
            ("3. Departure", self.departure.as_str()),
            ("4. Duration", self.duration.as_str()),
            ("5. Guest Name", self.guest_name.as_str()),
            ("6. Phone", self.guest_phone.as_str()),
            ("7. Pax", self.pax.as_str()),
            ("8. Reference ID", self.reference_id.as_str()),
        ]
    }

    pub fn hotels(&self) -> &[HotelStay] {
        &self.hotels
    }

    pub fn activities(&self) -> &[ActivityEntry] {
        &self.activities
    }
}

fn lengths(cols: &[&[String]]) -> Vec<usize> {
    cols.iter().map(|c| c.len()).collect()
}

fn value_at(col: &[String], i: usize) -> String {
    col.get(i).cloned().unwrap_or_default()
}
