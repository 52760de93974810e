//! Integration tests for `OrderScraper` against a mocked portal.
//!
//! Uses `wiremock` to stand up a local HTTP server per test. The login POST
//! answers with the listing page; order detail pages live at
//! `/order.php?id=<id>`.

use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mealclub_scraper::{
    Credentials, DeliveryRecord, DeliveryStatus, OrderId, OrderScraper, PortalClient, ScraperError,
};

/// Builds an `OrderScraper` pointed at `server` with a short timeout.
fn test_scraper(server: &MockServer) -> OrderScraper {
    let client =
        PortalClient::with_base_url(Credentials::new("driver42", "hunter2"), 5, &server.uri())
            .expect("failed to build test PortalClient")
            .user_agent("mealclub-test/0.1");
    OrderScraper::new(client)
}

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

const LISTING_TWO_ORDERS: &str = r#"<html><body>
<table>
  <tr class="order"><td><strong>ORD123 - Pickup</strong></td></tr>
  <tr class="order"><td><strong>ORD122 - Delivery</strong></td></tr>
</table>
<form action="update.php" method="post"><table>
  <tr><th>OrderId:</th><td>ORD123</td></tr>
  <tr><th>Status:&nbsp;</th><td>Unconfirmed&nbsp;</td></tr>
  <tr><th>Time Delivered:</th><td><select name="t"><option>6:00</option></select></td></tr>
</table></form>
<form action="update.php" method="post"><table>
  <tr><th>OrderId:</th><td>ORD122</td></tr>
  <tr><th>Status:</th><td>Picked Up</td></tr>
</table></form>
<form action="update.php" method="post"><table>
  <tr><th>OrderId:</th><td>ORD121</td></tr>
  <tr><th>Status:</th><td>Deliverd</td></tr>
</table></form>
<form action="update.php" method="post"><table>
  <tr><th>OrderId:</th><td>ORD120</td></tr>
  <tr><th>Status:</th><td>Delivered</td></tr>
</table></form>
</body></html>"#;

const LISTING_EMPTY: &str = "<html><body><p>No orders yet.</p></body></html>";

fn detail_page(order_id: &str, restaurant: &str) -> String {
    format!(
        r#"<html><body><div id="content">
<p>Order #{order_id} - {restaurant} - Placed 2pm</p>
<table>
  <tr><th>OrderId:</th><td>{order_id}</td></tr>
  <tr><th>Restaurant:</th><td>Portal Listing Name</td></tr>
  <tr><th>Pickup Time:</th><td>6:15 PM</td></tr>
  <tr><th>Status:</th><td>Confirmed</td></tr>
</table>
<table>
  <tr><td>1</td><td>Pepperoni Pizza</td><td>$12.00</td></tr>
  <tr><td>2</td><td>Garlic
  Knots</td><td>$4.00</td></tr>
  <tr><td>Tax:</td><td>$1.20</td></tr>
  <tr><td>Delivery Fee:</td><td>$3.00</td></tr>
</table>
</div></body></html>"#
    )
}

async fn mount_login(server: &MockServer, listing: &str) {
    Mock::given(method("POST"))
        .and(path("/login.php"))
        .and(body_string_contains("username=driver42"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(html_response(listing))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, order_id: &str, restaurant: &str) {
    Mock::given(method("GET"))
        .and(path("/order.php"))
        .and(query_param("id", order_id))
        .respond_with(html_response(&detail_page(order_id, restaurant)))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_order_ids_reads_listing_from_login_response() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_TWO_ORDERS).await;

    let ids = test_scraper(&server)
        .list_order_ids()
        .await
        .expect("should list ids");

    assert_eq!(ids, vec![OrderId::from("ORD123"), OrderId::from("ORD122")]);
}

#[tokio::test]
async fn list_order_ids_returns_empty_vec_when_no_rows() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_EMPTY).await;

    let ids = test_scraper(&server)
        .list_order_ids()
        .await
        .expect("should list ids");

    assert!(ids.is_empty(), "expected no ids, got: {ids:?}");
}

// ---------------------------------------------------------------------------
// Order details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_order_parses_detail_page() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_TWO_ORDERS).await;
    mount_detail(&server, "ORD123", "Tony's Pizza").await;

    let order = test_scraper(&server)
        .fetch_order(&OrderId::from("ORD123"))
        .await
        .expect("should parse order");

    assert_eq!(order.restaurant(), "Tony's Pizza");
    assert_eq!(order.order_id(), Some(OrderId::from("ORD123")));
    assert_eq!(order.pickup_time(), Some("6:15 PM"));
    assert_eq!(order.get("Tax"), Some("$1.20"));
    assert_eq!(order.get("Delivery Fee"), Some("$3.00"));

    let dishes: Vec<(&str, &str)> = order
        .dishes()
        .iter()
        .map(|d| (d.name.as_str(), d.price.as_str()))
        .collect();
    assert_eq!(
        dishes,
        vec![("PepperoniPizza", "$12.00"), ("GarlicKnots", "$4.00")]
    );
}

#[tokio::test]
async fn fetch_order_renders_flat_json() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_TWO_ORDERS).await;
    mount_detail(&server, "ORD123", "Tony's Pizza").await;

    let order = test_scraper(&server)
        .fetch_order(&OrderId::from("ORD123"))
        .await
        .expect("should parse order");
    let json = serde_json::to_value(&order).expect("order should serialize");

    assert_eq!(json["Restaurant"], "Tony's Pizza");
    assert_eq!(json["Status"], "Confirmed");
    assert_eq!(json["dishes"][0]["PepperoniPizza"], "$12.00");
}

#[tokio::test]
async fn fetch_order_sends_session_cookie_from_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login.php"))
        .respond_with(
            html_response(LISTING_EMPTY).insert_header("Set-Cookie", "PHPSESSID=s3ss10n; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/order.php"))
        .and(header("cookie", "PHPSESSID=s3ss10n"))
        .respond_with(html_response(&detail_page("ORD123", "Tony's Pizza")))
        .expect(1)
        .mount(&server)
        .await;

    let order = test_scraper(&server)
        .fetch_order(&OrderId::from("ORD123"))
        .await
        .expect("authenticated fetch should succeed");
    assert_eq!(order.restaurant(), "Tony's Pizza");
}

#[tokio::test]
async fn detail_pages_are_decoded_as_utf8() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_EMPTY).await;

    Mock::given(method("GET"))
        .and(path("/order.php"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            detail_page("ORD9", "Café Olé").into_bytes(),
            "text/html; charset=iso-8859-1",
        ))
        .mount(&server)
        .await;

    let order = test_scraper(&server)
        .fetch_order(&OrderId::from("ORD9"))
        .await
        .expect("should parse order");
    assert_eq!(order.restaurant(), "Café Olé");
}

#[tokio::test]
async fn fetch_order_with_single_table_is_structure_error() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_EMPTY).await;

    Mock::given(method("GET"))
        .and(path("/order.php"))
        .respond_with(html_response(
            r#"<div id="content"><p>Order #1 - Tony's Pizza</p><table><tr><td>x</td></tr></table></div>"#,
        ))
        .mount(&server)
        .await;

    let err = test_scraper(&server)
        .fetch_order(&OrderId::from("ORD1"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::TooFewTables { found: 1, .. }),
        "expected TooFewTables, got: {err:?}"
    );
    assert!(err.is_structure());
}

#[tokio::test]
async fn fetch_order_propagates_unexpected_status() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_EMPTY).await;

    Mock::given(method("GET"))
        .and(path("/order.php"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_scraper(&server)
        .fetch_order(&OrderId::from("ORD404"))
        .await
        .unwrap_err();
    match err {
        ScraperError::UnexpectedStatus { status, ref url } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/order.php?id=ORD404"), "url was {url}");
        }
        ref other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
    assert!(err.is_transport());
}

// ---------------------------------------------------------------------------
// Login failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_failure_aborts_before_any_get() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login.php"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html_response(&detail_page("ORD123", "Tony's Pizza")))
        .expect(0)
        .mount(&server)
        .await;

    let scraper = test_scraper(&server);

    let err = scraper.list_order_ids().await.unwrap_err();
    assert!(
        matches!(err, ScraperError::LoginFailed { status: 500, .. }),
        "expected LoginFailed(500), got: {err:?}"
    );

    let err = scraper
        .fetch_order(&OrderId::from("ORD123"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::LoginFailed { status: 500, .. }),
        "expected LoginFailed(500), got: {err:?}"
    );
    assert!(err.is_transport());
}

// ---------------------------------------------------------------------------
// Orders and latest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_orders_logs_in_for_every_request() {
    let server = MockServer::start().await;

    // One login for discovery plus one per detail page.
    Mock::given(method("POST"))
        .and(path("/login.php"))
        .respond_with(html_response(LISTING_TWO_ORDERS))
        .expect(3)
        .mount(&server)
        .await;
    mount_detail(&server, "ORD123", "Tony's Pizza").await;
    mount_detail(&server, "ORD122", "Noodle Bar").await;

    let orders = test_scraper(&server)
        .list_orders()
        .await
        .expect("should list orders");

    let restaurants: Vec<&str> = orders.iter().map(|o| o.restaurant()).collect();
    assert_eq!(restaurants, vec!["Tony's Pizza", "Noodle Bar"]);
}

#[tokio::test]
async fn latest_order_is_first_listed_order() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_TWO_ORDERS).await;
    mount_detail(&server, "ORD123", "Tony's Pizza").await;
    mount_detail(&server, "ORD122", "Noodle Bar").await;

    let scraper = test_scraper(&server);
    let latest = scraper
        .latest_order()
        .await
        .expect("should fetch latest")
        .expect("expected an order");
    let first = scraper
        .fetch_order(&OrderId::from("ORD123"))
        .await
        .expect("should fetch first order");

    assert_eq!(latest, first);
}

#[tokio::test]
async fn latest_order_is_none_without_orders() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_EMPTY).await;

    let latest = test_scraper(&server)
        .latest_order()
        .await
        .expect("empty listing is not an error");
    assert!(latest.is_none());
}

// ---------------------------------------------------------------------------
// Deliveries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_deliveries_parses_every_form() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_TWO_ORDERS).await;

    let deliveries = test_scraper(&server)
        .list_deliveries()
        .await
        .expect("should list deliveries");

    assert_eq!(deliveries.len(), 4);
    assert_eq!(deliveries[0].get("Status"), Some("Unconfirmed"));
    assert_eq!(deliveries[0].get("Time Delivered"), None);
}

#[tokio::test]
async fn status_buckets_use_exact_labels() {
    let server = MockServer::start().await;
    mount_login(&server, LISTING_TWO_ORDERS).await;
    let scraper = test_scraper(&server);

    let ids = |records: Vec<DeliveryRecord>| -> Vec<String> {
        records
            .iter()
            .filter_map(|d| d.get("OrderId").map(str::to_owned))
            .collect()
    };

    assert_eq!(ids(scraper.unconfirmed_deliveries().await.unwrap()), vec!["ORD123"]);
    assert!(scraper.confirmed_deliveries().await.unwrap().is_empty());
    assert_eq!(ids(scraper.picked_up_deliveries().await.unwrap()), vec!["ORD122"]);
    // "Deliverd" (ORD121) is misspelled and lands in no bucket.
    assert_eq!(ids(scraper.delivered_deliveries().await.unwrap()), vec!["ORD120"]);

    let mut bucketed = 0;
    for status in DeliveryStatus::ALL {
        bucketed += scraper.deliveries_with_status(status).await.unwrap().len();
    }
    assert_eq!(bucketed, 3);
}
