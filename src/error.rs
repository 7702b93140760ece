use thiserror::Error;

use crate::models::BoundRole;
use crate::transport::ApiError;

/// Failure of a single fare or availability check.
///
/// A failed check only concerns one flight; callers iterating over several
/// flights are expected to record the error and move on.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The request still failed after every retry.
    #[error("Request failed: {0}")]
    Api(#[from] ApiError),

    /// A field the check relies on is missing or has the wrong shape.
    #[error("Unexpected {step} response: {source}")]
    UnexpectedResponse {
        step: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The matched flight does not offer the fare product that was booked.
    #[error("No fare type found matching {fare_product_id}")]
    FareNotFound { fare_product_id: String },

    /// No bound on the change page leaves at the booked time.
    #[error("No bound on the reservation departs at {departure_time}")]
    NoChangeBound { departure_time: String },

    #[error("Shopping response has no {role} page")]
    MissingBoundPage { role: BoundRole },

    #[error("Reservation has no fare product for the {role} bound")]
    MissingFareProduct { role: BoundRole },

    #[error("Malformed change flight page: {0}")]
    MalformedChangePage(String),

    /// Shopping results contain no flight at the booked departure time.
    #[error("No flight departing at {departure_time} in shopping results")]
    NoMatchingFlight { departure_time: String },
}

impl CheckError {
    pub(crate) fn unexpected(step: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::UnexpectedResponse { step, source }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// Returns `true` when the upstream data disagrees with itself rather
    /// than the request failing.
    pub fn is_data_inconsistency(&self) -> bool {
        matches!(
            self,
            Self::FareNotFound { .. }
                | Self::NoChangeBound { .. }
                | Self::MissingBoundPage { .. }
                | Self::MissingFareProduct { .. }
                | Self::MalformedChangePage(_)
        )
    }
}
