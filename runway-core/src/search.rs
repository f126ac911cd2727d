use chrono::NaiveDate;
use serde::Deserialize;

use crate::flight::Flight;

#[derive(Debug, Clone, Deserialize)]
pub struct FlightSearchRequest {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub date: Option<NaiveDate>, // Departure day in UTC, any time of day matches
}

impl FlightSearchRequest {
    pub fn matches(&self, flight: &Flight) -> bool {
        flight.origin.eq_ignore_ascii_case(self.origin.trim())
            && flight.destination.eq_ignore_ascii_case(self.destination.trim())
            && self
                .date
                .map_or(true, |date| flight.schedule.date_naive() == date)
    }
}
