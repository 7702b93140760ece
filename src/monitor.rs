// Runs the enabled re-checks over a list of booked flights.
// A failed check is logged and recorded against its flight; the remaining flights still run.

use futures::future::join_all;
use tracing::{debug, error};

use crate::availability_checker::{AvailabilityChecker, SeatCheck};
use crate::config::MonitorConfig;
use crate::error::CheckError;
use crate::fare_checker::{FareChecker, PriceCheck};
use crate::flight::BookedFlight;

#[derive(Debug)]
pub struct FlightReport {
    pub confirmation_number: String,
    // None when the check is disabled
    pub price: Option<Result<PriceCheck, CheckError>>,
    pub seats: Option<Result<SeatCheck, CheckError>>,
}

impl FlightReport {
    pub fn has_failures(&self) -> bool {
        matches!(self.price, Some(Err(_))) || matches!(self.seats, Some(Err(_)))
    }
}

pub struct FlightMonitor {
    fare_checker: FareChecker,
    availability_checker: AvailabilityChecker,
    config: MonitorConfig,
}

impl FlightMonitor {
    pub fn new(
        fare_checker: FareChecker,
        availability_checker: AvailabilityChecker,
        config: MonitorConfig,
    ) -> Self {
        Self {
            fare_checker,
            availability_checker,
            config,
        }
    }

    // The two checks for one flight run one after the other
    pub async fn check_flight(&self, flight: &BookedFlight) -> FlightReport {
        let price = if self.config.check_fares {
            let result = self.fare_checker.check_flight_price(flight).await;
            if let Err(e) = &result {
                error!("Fare check failed for {}: {}", flight, e);
            }
            Some(result)
        } else {
            None
        };

        let seats = if self.config.check_availability {
            let result = self
                .availability_checker
                .check_passenger_availability(flight)
                .await;
            if let Err(e) = &result {
                error!("Availability check failed for {}: {}", flight, e);
            }
            Some(result)
        } else {
            None
        };

        FlightReport {
            confirmation_number: flight.confirmation_number.clone(),
            price,
            seats,
        }
    }

    pub async fn check_flights(&self, flights: &[BookedFlight]) -> Vec<FlightReport> {
        debug!("Checking {} flights", flights.len());
        join_all(flights.iter().map(|flight| self.check_flight(flight))).await
    }
}
