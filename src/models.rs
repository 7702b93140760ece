// Typed views of the reservation and shopping responses.
// Only the fields the re-shoppers read are modelled; everything else is ignored.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// One directional leg of an itinerary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundRole {
    Outbound,
    Inbound,
}

impl BoundRole {
    pub const ALL: [BoundRole; 2] = [BoundRole::Outbound, BoundRole::Inbound];

    // Bounds are listed outbound first by the reservation and change pages
    pub fn position(self) -> usize {
        match self {
            BoundRole::Outbound => 0,
            BoundRole::Inbound => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoundRole::Outbound => "outbound",
            BoundRole::Inbound => "inbound",
        }
    }
}

impl std::fmt::Display for BoundRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Reservation lookup

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub view_reservation_view_page: ViewReservationPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewReservationPage {
    pub bounds: Vec<ReservationBound>,
    #[serde(rename = "_links")]
    pub links: ReservationLinks,
}

impl ViewReservationPage {
    pub fn fare_products(&self) -> ReservationBounds {
        ReservationBounds::new(
            self.bounds
                .iter()
                .map(|bound| bound.fare_product_details.fare_product_id.clone())
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationBound {
    pub fare_product_details: FareProductDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareProductDetails {
    pub fare_product_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationLinks {
    pub change: Link,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default)]
    pub query: Value,
}

/// Fare product held on each leg of the reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationBounds {
    fare_products: Vec<String>,
}

impl ReservationBounds {
    pub fn new(fare_products: Vec<String>) -> Self {
        Self { fare_products }
    }

    pub fn fare_product_for(&self, role: BoundRole) -> Option<&str> {
        self.fare_products.get(role.position()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fare_products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fare_products.is_empty()
    }
}

// Change flight page

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFlightResponse {
    pub change_flight_page: ChangeFlightPage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFlightPage {
    #[serde(rename = "_links")]
    pub links: ChangeFlightLinks,
    pub bound_selections: Vec<BoundSelection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFlightLinks {
    pub change_shopping: ChangeShoppingLink,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeShoppingLink {
    pub href: String,
    #[serde(default)]
    pub body: Vec<BoundReference>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundReference {
    pub bound_reference: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundSelection {
    pub original_date: String,
    pub from_airport_code: String,
    pub to_airport_code: String,
    pub time_departs: String,
}

// Re-shopping query

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBound {
    pub bound_reference: String,
    pub date: String,
    pub destination_airport: String,
    pub origin_airport: String,
    // The leg being re-priced
    pub is_change_bound: bool,
}

impl SearchBound {
    pub fn to_json(&self) -> Value {
        json!({
            "boundReference": self.bound_reference,
            "date": self.date,
            "destination-airport": self.destination_airport,
            "origin-airport": self.origin_airport,
            "isChangeBound": self.is_change_bound,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub outbound: SearchBound,
    pub inbound: Option<SearchBound>,
}

impl SearchQuery {
    // {"outbound": {...}} for one-way, {"outbound": {...}, "inbound": {...}} for round trips
    pub fn to_json(&self) -> Value {
        let mut query = Map::new();
        for role in BoundRole::ALL {
            if let Some(bound) = self.bound(role) {
                query.insert(role.as_str().to_string(), bound.to_json());
            }
        }
        Value::Object(query)
    }

    pub fn bound(&self, role: BoundRole) -> Option<&SearchBound> {
        match role {
            BoundRole::Outbound => Some(&self.outbound),
            BoundRole::Inbound => self.inbound.as_ref(),
        }
    }

    pub fn len(&self) -> usize {
        1 + usize::from(self.inbound.is_some())
    }

    pub fn is_round_trip(&self) -> bool {
        self.inbound.is_some()
    }

    // Outbound wins if both legs leave at the same local time
    pub fn change_bound(&self) -> Option<BoundRole> {
        BoundRole::ALL.into_iter().find(|role| {
            self.bound(*role)
                .map(|bound| bound.is_change_bound)
                .unwrap_or(false)
        })
    }
}

// Shopping results

pub trait DepartureCard {
    fn departure_time(&self) -> &str;
}

// Scheduled flights keep their departure time, so it identifies the card
pub fn find_matching_card<'a, C: DepartureCard>(
    cards: &'a [C],
    local_departure_time: &str,
) -> Option<&'a C> {
    cards
        .iter()
        .find(|card| card.departure_time() == local_departure_time)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardPage<C> {
    pub cards: Vec<C>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeShoppingResponse {
    pub change_shopping_page: ChangeShoppingPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeShoppingPage {
    pub flights: ShoppingFlights,
}

// The server only fills the page of the bound flagged as the change bound
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingFlights {
    #[serde(default)]
    pub outbound_page: Option<CardPage<FareCard>>,
    #[serde(default)]
    pub inbound_page: Option<CardPage<FareCard>>,
}

impl ShoppingFlights {
    pub fn into_page(self, role: BoundRole) -> Option<CardPage<FareCard>> {
        match role {
            BoundRole::Outbound => self.outbound_page,
            BoundRole::Inbound => self.inbound_page,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareCard {
    pub departure_time: String,
    #[serde(default)]
    pub fares: Option<Vec<Fare>>,
}

impl FareCard {
    pub fn fares(&self) -> &[Fare] {
        self.fares.as_deref().unwrap_or(&[])
    }
}

impl DepartureCard for FareCard {
    fn departure_time(&self) -> &str {
        &self.departure_time
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fare {
    #[serde(rename = "_meta")]
    pub meta: FareMeta,
    // Missing on fare products that are no longer sold
    #[serde(default)]
    pub price_difference: Option<FareDelta>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareMeta {
    pub fare_product_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSign {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl std::fmt::Display for PriceSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSign::Plus => f.write_str("+"),
            PriceSign::Minus => f.write_str("-"),
        }
    }
}

/// Price difference between the booked fare and the same fare today.
///
/// The airline leaves `sign` out entirely when the price has not moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<PriceSign>,
    pub amount: String,
    pub currency_code: String,
}

impl FareDelta {
    pub fn is_lower(&self) -> bool {
        self.sign == Some(PriceSign::Minus)
    }
}

// Formats as "-10 USD", "+10 USD" or "0 USD"
impl std::fmt::Display for FareDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(sign) = self.sign {
            write!(f, "{sign}")?;
        }
        write!(f, "{} {}", self.amount, self.currency_code)
    }
}

// Availability shopping

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightShoppingResponse {
    pub flight_shopping_page: FlightShoppingPage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightShoppingPage {
    pub outbound_page: CardPage<AvailabilityCard>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCard {
    pub departure_time: String,
    #[serde(default)]
    pub starting_from_price: Option<Value>,
}

impl AvailabilityCard {
    // A null starting price means the requested party no longer fits on the flight
    pub fn has_seats(&self) -> bool {
        matches!(&self.starting_from_price, Some(price) if !price.is_null())
    }
}

impl DepartureCard for AvailabilityCard {
    fn departure_time(&self) -> &str {
        &self.departure_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_bound(reference: &str, is_change_bound: bool) -> SearchBound {
        SearchBound {
            bound_reference: reference.to_string(),
            date: "1/1".to_string(),
            destination_airport: "LAX".to_string(),
            origin_airport: "MIA".to_string(),
            is_change_bound,
        }
    }

    #[test]
    fn test_fare_delta_formatting() {
        let lower: FareDelta =
            serde_json::from_value(json!({"sign": "-", "amount": "10", "currencyCode": "USD"}))
                .unwrap();
        let unchanged: FareDelta =
            serde_json::from_value(json!({"amount": "0", "currencyCode": "PTS"})).unwrap();

        assert!(lower.is_lower());
        assert_eq!(lower.to_string(), "-10 USD");
        assert!(!unchanged.is_lower());
        assert_eq!(unchanged.to_string(), "0 PTS");
    }

    #[test]
    fn test_one_way_query_serializes_only_outbound() {
        let query = SearchQuery {
            outbound: search_bound("bound_1", true),
            inbound: None,
        };

        assert_eq!(
            query.to_json(),
            json!({
                "outbound": {
                    "boundReference": "bound_1",
                    "date": "1/1",
                    "destination-airport": "LAX",
                    "origin-airport": "MIA",
                    "isChangeBound": true,
                }
            })
        );
        assert_eq!(query.len(), 1);
        assert!(!query.is_round_trip());
    }

    #[test]
    fn test_change_bound_lookup_by_role() {
        let query = SearchQuery {
            outbound: search_bound("bound_1", false),
            inbound: Some(search_bound("bound_2", true)),
        };
        assert_eq!(query.change_bound(), Some(BoundRole::Inbound));

        let neither = SearchQuery {
            outbound: search_bound("bound_1", false),
            inbound: None,
        };
        assert_eq!(neither.change_bound(), None);

        let both = SearchQuery {
            outbound: search_bound("bound_1", true),
            inbound: Some(search_bound("bound_2", true)),
        };
        assert_eq!(both.change_bound(), Some(BoundRole::Outbound));
    }

    #[test]
    fn test_reservation_bounds_are_looked_up_by_role() {
        let bounds = ReservationBounds::new(vec!["WGA".to_string(), "PLU".to_string()]);

        assert_eq!(bounds.fare_product_for(BoundRole::Outbound), Some("WGA"));
        assert_eq!(bounds.fare_product_for(BoundRole::Inbound), Some("PLU"));
        assert_eq!(
            ReservationBounds::new(vec!["WGA".to_string()]).fare_product_for(BoundRole::Inbound),
            None
        );
    }

    #[test]
    fn test_matching_card_by_departure_time() {
        let cards: Vec<AvailabilityCard> = serde_json::from_value(json!([
            {"departureTime": "10:30", "startingFromPrice": {"amount": "99"}},
            {"departureTime": "11:30", "startingFromPrice": null},
        ]))
        .unwrap();

        let matched = find_matching_card(&cards, "11:30").unwrap();
        assert!(!matched.has_seats());
        assert!(find_matching_card(&cards, "10:30").unwrap().has_seats());
        assert!(find_matching_card(&cards, "12:00").is_none());
    }

    #[test]
    fn test_card_without_fares_has_empty_fare_list() {
        let card: FareCard =
            serde_json::from_value(json!({"departureTime": "10:30", "fares": null})).unwrap();
        assert!(card.fares().is_empty());
    }
}
