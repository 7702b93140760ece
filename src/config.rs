// Static configuration for the re-shopping workflow.
// Every value here is injected at construction; nothing is read from globals.

use serde::Deserialize;

// Relative endpoint paths, appended to `ClientConfig::base_url` by the transport
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub view_reservation: String,
    pub booking: String,
    pub shopping: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            view_reservation: "mobile-air-booking/v1/mobile-air-booking/page/view-reservation/"
                .to_string(),
            booking: "mobile-air-booking/".to_string(),
            shopping: "mobile-air-shopping/v1/mobile-air-shopping/page/flights/products"
                .to_string(),
        }
    }
}

impl Endpoints {
    pub fn reservation_path(&self, confirmation_number: &str) -> String {
        format!("{}{}", self.view_reservation, confirmation_number)
    }

    // Links handed out by the booking service are relative to the booking root
    pub fn booking_path(&self, href: &str) -> String {
        format!("{}{}", self.booking, href)
    }
}

// Party size and currency used to probe remaining seats on a flight.
// A null starting price for this party size means fewer seats remain.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AvailabilityProbe {
    pub adult_passengers: u32,
    pub currency: String,
}

impl Default for AvailabilityProbe {
    fn default() -> Self {
        Self {
            adult_passengers: 8,
            currency: "USD".to_string(),
        }
    }
}

// Which re-shoppers the monitor runs for each flight
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    pub check_fares: bool,
    pub check_availability: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_fares: true,
            check_availability: true,
        }
    }
}
