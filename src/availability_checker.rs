// Seat availability re-check for a booked flight.
// Shops the same flight for a full companion party; a null starting price on the
// matching card means that party no longer fits.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use crate::airports::AirportCodes;
use crate::config::{AvailabilityProbe, Endpoints};
use crate::error::CheckError;
use crate::flight::BookedFlight;
use crate::models::{find_matching_card, AvailabilityCard, FlightShoppingResponse};
use crate::notify::Notifier;
use crate::transport::{ApiClient, ApiRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatCheck {
    Available,
    Unavailable,
}

pub struct AvailabilityChecker {
    client: Arc<dyn ApiClient>,
    notifier: Arc<dyn Notifier>,
    airports: Arc<dyn AirportCodes>,
    endpoints: Endpoints,
    probe: AvailabilityProbe,
}

impl AvailabilityChecker {
    pub fn new(
        client: Arc<dyn ApiClient>,
        notifier: Arc<dyn Notifier>,
        airports: Arc<dyn AirportCodes>,
        endpoints: Endpoints,
        probe: AvailabilityProbe,
    ) -> Self {
        Self {
            client,
            notifier,
            airports,
            endpoints,
            probe,
        }
    }

    /// Check that the probe's party still fits on the flight, and send a
    /// flight-unavailable notification when it does not.
    pub async fn check_passenger_availability(
        &self,
        flight: &BookedFlight,
    ) -> Result<SeatCheck, CheckError> {
        debug!(
            "Checking for flight availability for {} passengers",
            self.probe.adult_passengers
        );
        let flights_available = self.search_for_new_booking_on_same_flight(flight).await?;

        let matching_flight = find_matching_card(&flights_available, &flight.local_departure_time)
            .ok_or_else(|| CheckError::NoMatchingFlight {
                departure_time: flight.local_departure_time.clone(),
            })?;

        if matching_flight.has_seats() {
            debug!(
                "At least {} seats were found for this flight",
                self.probe.adult_passengers
            );
            return Ok(SeatCheck::Available);
        }

        info!(
            "Fewer than {} seats left on {}, sending notification",
            self.probe.adult_passengers, flight.confirmation_number
        );
        self.notifier.flight_unavailable(flight).await;
        Ok(SeatCheck::Unavailable)
    }

    pub async fn search_for_new_booking_on_same_flight(
        &self,
        flight: &BookedFlight,
    ) -> Result<Vec<AvailabilityCard>, CheckError> {
        // Unknown stations go out as missing parameters; the API decides what that means
        let origin = self.airports.code_for(&flight.departure_airport);
        let destination = self.airports.code_for(&flight.destination_airport);
        if origin.is_none() || destination.is_none() {
            debug!(
                "No airport code for {} or {}",
                flight.departure_airport, flight.destination_airport
            );
        }

        let info = json!({
            "origination-airport": origin,
            "destination-airport": destination,
            "departure-date": flight.departure_date(),
            "number-adult-passengers": self.probe.adult_passengers.to_string(),
            "currency": self.probe.currency,
        });

        let response = self
            .client
            .request(ApiRequest::get(self.endpoints.shopping.clone(), info))
            .await?;
        let response: FlightShoppingResponse = serde_json::from_value(response)
            .map_err(CheckError::unexpected("flight shopping"))?;

        Ok(response.flight_shopping_page.outbound_page.cards)
    }
}
