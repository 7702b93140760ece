// Identity of a booked flight as the re-shoppers see it

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedFlight {
    pub confirmation_number: String,
    // Airline-local clock time ("7:35"), compared verbatim against shopping cards
    pub local_departure_time: String,
    pub departure_airport: String,
    pub destination_airport: String,
    pub departure_time: DateTime<FixedOffset>,
}

impl BookedFlight {
    // Date of departure in the airport's own offset, as the shopping API expects it
    pub fn departure_date(&self) -> String {
        self.departure_time.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for BookedFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} -> {} at {}",
            self.confirmation_number,
            self.departure_airport,
            self.destination_airport,
            self.local_departure_time
        )
    }
}

// Name on the reservation, needed to open it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traveler {
    pub first_name: String,
    pub last_name: String,
}

impl Traveler {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}
