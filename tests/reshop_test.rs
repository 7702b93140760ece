// End-to-end re-shopping against a wiremock airline API.

use std::sync::Arc;

use chrono::DateTime;
use fare_watch::mock_server::{Notification, RecordingNotifier};
use fare_watch::{
    AvailabilityChecker, AvailabilityProbe, BookedFlight, CheckError, ClientConfig, Endpoints,
    FareChecker, PriceCheck, ReservationApiClient, RetryConfig, SeatCheck, StationDirectory,
    Traveler,
};
use reqwest::header::HeaderMap;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn flight() -> BookedFlight {
    BookedFlight {
        confirmation_number: "ABC123".to_string(),
        local_departure_time: "18:05".to_string(),
        departure_airport: "Los Angeles, CA".to_string(),
        destination_airport: "Miami, FL".to_string(),
        departure_time: DateTime::parse_from_rfc3339("2025-01-02T18:05:00-08:00").unwrap(),
    }
}

async fn client(server: &MockServer) -> Arc<ReservationApiClient> {
    let config = ClientConfig {
        base_url: format!("{}/api/", server.uri()),
        timeout_ms: 5_000,
        retry: RetryConfig {
            max_attempts: 2,
            delay_ms: 5,
        },
    };
    Arc::new(ReservationApiClient::new(config, HeaderMap::new()).unwrap())
}

async fn mount_reservation(server: &MockServer) {
    // The change link carries the stray separator the booking service sometimes adds
    Mock::given(method("GET"))
        .and(path(
            "/api/mobile-air-booking/v1/mobile-air-booking/page/view-reservation/ABC123",
        ))
        .and(query_param("first-name", "Jane"))
        .and(query_param("last-name", "Doe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "viewReservationViewPage": {
                "bounds": [
                    {"fareProductDetails": {"fareProductId": "WGA"}},
                    {"fareProductDetails": {"fareProductId": "PLU"}},
                ],
                "_links": {"change": {
                    "href": "/v1/mobile-air-booking/page/flights/change/current/ABC123",
                    "query": {"first-name": "Jane", "last-name": "Doe"},
                }},
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(
            "/api/mobile-air-booking/v1/mobile-air-booking/page/flights/change/current/ABC123",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "changeFlightPage": {
                "_links": {"changeShopping": {
                    "href": "v1/mobile-air-booking/page/flights/change/shop",
                    "body": [{"boundReference": "out-ref"}, {"boundReference": "in-ref"}],
                }},
                "boundSelections": [
                    {"originalDate": "2025-01-01", "fromAirportCode": "MIA", "toAirportCode": "LAX", "timeDeparts": "9:10"},
                    {"originalDate": "2025-01-02", "fromAirportCode": "LAX", "toAirportCode": "MIA", "timeDeparts": "18:05"},
                ],
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_round_trip_inbound_leg_lower_fare() {
    let server = MockServer::start().await;
    mount_reservation(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/mobile-air-booking/v1/mobile-air-booking/page/flights/change/shop"))
        .and(body_partial_json(json!({
            "outbound": {"boundReference": "out-ref", "isChangeBound": false},
            "inbound": {"boundReference": "in-ref", "isChangeBound": true, "origin-airport": "LAX"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "changeShoppingPage": {"flights": {"inboundPage": {"cards": [
                {"departureTime": "18:05", "fares": [
                    {"_meta": {"fareProductId": "WGA"}, "priceDifference": {"sign": "-", "amount": "80", "currencyCode": "USD"}},
                    {"_meta": {"fareProductId": "PLU"}, "priceDifference": {"sign": "-", "amount": "31", "currencyCode": "USD"}},
                ]},
            ]}}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let checker = FareChecker::new(
        client(&server).await,
        notifier.clone(),
        Traveler::new("Jane", "Doe"),
        Endpoints::default(),
    );

    let result = checker.check_flight_price(&flight()).await.unwrap();

    assert!(matches!(result, PriceCheck::Quoted(ref delta) if delta.to_string() == "-31 USD"));
    assert_eq!(
        notifier.notifications(),
        vec![Notification::LowerFare {
            confirmation_number: "ABC123".to_string(),
            price_info: "-31 USD".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_shopping_outage_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    mount_reservation(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/mobile-air-booking/v1/mobile-air-booking/page/flights/change/shop"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let checker = FareChecker::new(
        client(&server).await,
        notifier.clone(),
        Traveler::new("Jane", "Doe"),
        Endpoints::default(),
    );

    let error = checker.check_flight_price(&flight()).await.unwrap_err();

    assert!(error.is_transport());
    assert_eq!(
        error.to_string(),
        "Request failed: Service Unavailable 503"
    );
    assert!(notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_availability_for_companion_party() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/api/mobile-air-shopping/v1/mobile-air-shopping/page/flights/products",
        ))
        .and(query_param("origination-airport", "LAX"))
        .and(query_param("destination-airport", "MIA"))
        .and(query_param("departure-date", "2025-01-02"))
        .and(query_param("number-adult-passengers", "8"))
        .and(query_param("currency", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "flightShoppingPage": {"outboundPage": {"cards": [
                {"departureTime": "6:00", "startingFromPrice": {"amount": "99"}},
                {"departureTime": "18:05", "startingFromPrice": null},
            ]}}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let stations = StationDirectory::from_json(
        r#"{"airStations": [
            {"id": "LAX", "stationName": "Los Angeles, CA"},
            {"id": "MIA", "stationName": "Miami, FL"}
        ]}"#
        .as_bytes(),
    )
    .unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let checker = AvailabilityChecker::new(
        client(&server).await,
        notifier.clone(),
        Arc::new(stations),
        Endpoints::default(),
        AvailabilityProbe::default(),
    );

    let result = checker.check_passenger_availability(&flight()).await.unwrap();
    assert_eq!(result, SeatCheck::Unavailable);
    assert_eq!(notifier.notifications().len(), 1);

    let mut rebooked = flight();
    rebooked.local_departure_time = "7:00".to_string();
    let error = checker
        .check_passenger_availability(&rebooked)
        .await
        .unwrap_err();
    assert!(matches!(error, CheckError::NoMatchingFlight { .. }));
}
