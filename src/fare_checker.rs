// Fare re-check for a booked flight.
// Replays the airline's "change flight" shopping flow for the reservation and compares
// today's price of the booked fare product against what was paid.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Endpoints;
use crate::error::CheckError;
use crate::flight::{BookedFlight, Traveler};
use crate::models::{
    find_matching_card, BoundRole, ChangeFlightPage, ChangeFlightResponse,
    ChangeShoppingResponse, Fare, FareCard, FareDelta, ReservationBounds, ReservationResponse,
    SearchBound, SearchQuery,
};
use crate::notify::Notifier;
use crate::transport::{ApiClient, ApiRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceCheck {
    // The booked departure was not among the shopping results
    NotListed,
    Quoted(FareDelta),
}

// Cards for the re-priced bound and the fare product booked on that bound
#[derive(Debug, Clone)]
pub struct MatchingFlights {
    pub cards: Vec<FareCard>,
    pub fare_product_id: String,
}

pub struct FareChecker {
    client: Arc<dyn ApiClient>,
    notifier: Arc<dyn Notifier>,
    traveler: Traveler,
    endpoints: Endpoints,
}

impl FareChecker {
    pub fn new(
        client: Arc<dyn ApiClient>,
        notifier: Arc<dyn Notifier>,
        traveler: Traveler,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            client,
            notifier,
            traveler,
            endpoints,
        }
    }

    /// Re-shop the flight and send a lower-fare notification when the booked
    /// fare product is now cheaper.
    pub async fn check_flight_price(
        &self,
        flight: &BookedFlight,
    ) -> Result<PriceCheck, CheckError> {
        debug!("Checking current price for flight {}", flight.confirmation_number);

        let Some(flight_price) = self.get_flight_price(flight).await? else {
            // A scheduled flight should always have a same-time counterpart
            warn!(
                "No flight departing at {} found when re-shopping {}",
                flight.local_departure_time, flight.confirmation_number
            );
            return Ok(PriceCheck::NotListed);
        };

        let price_info = flight_price.to_string();
        debug!("Flight price change found for {}", price_info);

        if flight_price.is_lower() {
            info!(
                "Lower fare of {} found for {}",
                price_info, flight.confirmation_number
            );
            self.notifier.lower_fare(flight, &price_info).await;
        }

        Ok(PriceCheck::Quoted(flight_price))
    }

    // Price difference of the booked fare, or None when the flight is not listed
    pub async fn get_flight_price(
        &self,
        flight: &BookedFlight,
    ) -> Result<Option<FareDelta>, CheckError> {
        let matching = self.get_matching_flights(flight).await?;
        debug!("Found {} matching flights", matching.cards.len());

        price_for_departure(&matching, &flight.local_departure_time)
    }

    pub async fn get_matching_flights(
        &self,
        flight: &BookedFlight,
    ) -> Result<MatchingFlights, CheckError> {
        let (change_flight_page, fare_products) = self.get_change_flight_page(flight).await?;
        let query = build_search_query(&change_flight_page, flight)?;

        // Both legs of a round trip are re-priced together, but the server only fills
        // in the page of the bound flagged for change
        let role = query
            .change_bound()
            .ok_or_else(|| CheckError::NoChangeBound {
                departure_time: flight.local_departure_time.clone(),
            })?;
        let fare_product_id = fare_products
            .fare_product_for(role)
            .ok_or(CheckError::MissingFareProduct { role })?
            .to_string();

        let site = self
            .endpoints
            .booking_path(&change_flight_page.links.change_shopping.href);

        debug!("Retrieving matching flights for the {} bound", role);
        let response = self
            .client
            .request(ApiRequest::post(site, query.to_json()))
            .await?;
        let response: ChangeShoppingResponse = serde_json::from_value(response)
            .map_err(CheckError::unexpected("change shopping"))?;

        let page = response
            .change_shopping_page
            .flights
            .into_page(role)
            .ok_or(CheckError::MissingBoundPage { role })?;

        Ok(MatchingFlights {
            cards: page.cards,
            fare_product_id,
        })
    }

    pub async fn get_change_flight_page(
        &self,
        flight: &BookedFlight,
    ) -> Result<(ChangeFlightPage, ReservationBounds), CheckError> {
        debug!("Fetching reservation information");
        let info = json!({
            "first-name": self.traveler.first_name,
            "last-name": self.traveler.last_name,
        });
        let site = self.endpoints.reservation_path(&flight.confirmation_number);
        let response = self.client.request(ApiRequest::get(site, info)).await?;
        let reservation: ReservationResponse = serde_json::from_value(response)
            .map_err(CheckError::unexpected("view reservation"))?;

        let page = reservation.view_reservation_view_page;
        let fare_products = page.fare_products();

        debug!("Retrieving search information for the current flight");
        let change = &page.links.change;
        let site = self.endpoints.booking_path(change_link_href(&change.href));
        let response = self
            .client
            .request(ApiRequest::get(site, change.query.clone()))
            .await?;
        let response: ChangeFlightResponse = serde_json::from_value(response)
            .map_err(CheckError::unexpected("change flight"))?;

        Ok((response.change_flight_page, fare_products))
    }
}

// The change link sometimes comes back as "/v1/..." which doubles the separator
// after the booking root and 404s.
pub fn change_link_href(href: &str) -> &str {
    match href.strip_prefix('/') {
        Some(stripped) if href.contains("/v1/") => stripped,
        _ => href,
    }
}

/// Build the re-shopping query from the change flight page.
///
/// One bound selection yields an outbound-only query, two yield outbound and
/// inbound. The bound whose scheduled departure equals the booked local
/// departure time is flagged as the change bound.
pub fn build_search_query(
    flight_page: &ChangeFlightPage,
    flight: &BookedFlight,
) -> Result<SearchQuery, CheckError> {
    let selections = &flight_page.bound_selections;
    let references = &flight_page.links.change_shopping.body;

    if selections.is_empty() || selections.len() > BoundRole::ALL.len() {
        return Err(CheckError::MalformedChangePage(format!(
            "expected 1 or 2 bound selections, found {}",
            selections.len()
        )));
    }
    if references.len() < selections.len() {
        return Err(CheckError::MalformedChangePage(format!(
            "{} bound selections but only {} bound references",
            selections.len(),
            references.len()
        )));
    }

    let mut bounds = selections
        .iter()
        .zip(references)
        .map(|(bound, reference)| SearchBound {
            bound_reference: reference.bound_reference.clone(),
            date: bound.original_date.clone(),
            destination_airport: bound.to_airport_code.clone(),
            origin_airport: bound.from_airport_code.clone(),
            is_change_bound: bound.time_departs == flight.local_departure_time,
        });

    let outbound = bounds
        .next()
        .ok_or_else(|| CheckError::MalformedChangePage("no bound selections".to_string()))?;

    Ok(SearchQuery {
        outbound,
        inbound: bounds.next(),
    })
}

pub fn price_for_departure(
    matching: &MatchingFlights,
    local_departure_time: &str,
) -> Result<Option<FareDelta>, CheckError> {
    match find_matching_card(&matching.cards, local_departure_time) {
        Some(card) => matching_fare(card.fares(), &matching.fare_product_id).map(Some),
        None => Ok(None),
    }
}

pub fn matching_fare(fares: &[Fare], fare_product_id: &str) -> Result<FareDelta, CheckError> {
    fares
        .iter()
        .filter(|fare| fare.meta.fare_product_id == fare_product_id)
        .find_map(|fare| fare.price_difference.clone())
        .ok_or_else(|| CheckError::FareNotFound {
            fare_product_id: fare_product_id.to_string(),
        })
}
