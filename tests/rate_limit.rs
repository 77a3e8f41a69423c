mod common;

use axum::Router;
use axum::http::StatusCode;
use axum_test::TestServer;
use tracking_service::api::middleware::rate_limit;
use tracking_service::api::routes::tracking_routes;

fn limited_server() -> TestServer {
    let app = Router::new()
        .nest("/v1/api", tracking_routes().layer(rate_limit::layer()))
        .layer(common::MockConnectInfoLayer)
        .with_state(common::create_test_state());

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_requests_within_burst_pass() {
    let server = limited_server();

    let response = server
        .get("/v1/api/next-tracking-number")
        .add_query_params(common::valid_params())
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_burst_exhaustion_is_throttled() {
    let server = limited_server();
    let mut throttled = false;

    for _ in 0..(rate_limit::BURST_SIZE + 20) {
        let response = server.get("/v1/api/tracking-details").await;

        if response.status_code() == StatusCode::TOO_MANY_REQUESTS {
            throttled = true;
            break;
        }
        response.assert_status_bad_request();
    }

    assert!(throttled);
}
