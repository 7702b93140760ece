// Outbound notifications for actionable check results.
// Delivery (email, push, chat) lives behind this trait and is not handled here.

use async_trait::async_trait;

use crate::flight::BookedFlight;

#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    // `price_info` is the formatted difference, e.g. "-31.00 USD"
    async fn lower_fare(&self, flight: &BookedFlight, price_info: &str);

    // Fewer seats remain than the availability probe asked for
    async fn flight_unavailable(&self, flight: &BookedFlight);
}
