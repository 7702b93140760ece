// Fare and seat availability re-checks for booked flights

pub mod airports;
pub mod availability_checker;
pub mod config;
pub mod error;
pub mod fare_checker;
pub mod flight;
pub mod mock_server;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod transport;

// Re-export key types for convenience
pub use airports::{AirportCodes, StationDirectory};
pub use availability_checker::{AvailabilityChecker, SeatCheck};
pub use config::{AvailabilityProbe, Endpoints, MonitorConfig};
pub use error::CheckError;
pub use fare_checker::{FareChecker, PriceCheck};
pub use flight::{BookedFlight, Traveler};
pub use models::{BoundRole, FareDelta, SearchQuery};
pub use monitor::{FlightMonitor, FlightReport};
pub use notify::Notifier;
pub use transport::{
    ApiClient, ApiError, ApiRequest, ClientConfig, ReservationApiClient, RetryConfig,
};
