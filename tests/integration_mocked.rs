/// Integration tests with mocked external gateways
/// Tests the lookup provider and payment gateway clients without hitting
/// real external services
use osint_credits_api::errors::AppError;
use osint_credits_api::lookup_client::LookupClient;
use osint_credits_api::razorpay_client::RazorpayClient;
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Reserve a local port with no listener behind it, for unreachable-host tests.
fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_lookup_successful_response() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "List": {
            "Some Breach": {
                "Data": [
                    { "FirstName": "Asha", "Phone": "9876543210" }
                ]
            }
        }
    });

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(serde_json::json!({
            "token": "test_token",
            "request": "+919876543210",
            "limit": 1000,
            "lang": "en",
            "type": "json",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = LookupClient::new(mock_server.uri(), "test_token".to_string()).unwrap();
    let result = client.search("+919876543210").await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap(), mock_response);
}

#[tokio::test]
async fn test_lookup_non_success_status_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("token rejected"))
        .mount(&mock_server)
        .await;

    let client = LookupClient::new(mock_server.uri(), "bad_token".to_string()).unwrap();
    let result = client.search("query").await;

    assert!(matches!(result, Err(AppError::UpstreamError(_))));
}

#[tokio::test]
async fn test_lookup_unreachable_provider_is_upstream_unavailable() {
    let client = LookupClient::new(unreachable_base_url(), "test_token".to_string()).unwrap();
    let result = client.search("query").await;

    assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
}

#[tokio::test]
async fn test_lookup_malformed_body_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&mock_server)
        .await;

    let client = LookupClient::new(mock_server.uri(), "test_token".to_string()).unwrap();
    let result = client.search("query").await;

    assert!(matches!(result, Err(AppError::UpstreamError(_))));
}

#[tokio::test]
async fn test_razorpay_order_creation_success() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "id": "order_Nxy123",
        "entity": "order",
        "amount": 69900,
        "currency": "INR",
        "receipt": "receipt_1",
        "status": "created"
    });

    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(header_exists("authorization"))
        .and(body_partial_json(serde_json::json!({
            "amount": 69900,
            "currency": "INR",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = RazorpayClient::new(
        mock_server.uri(),
        "rzp_test_key".to_string(),
        "rzp_test_secret".to_string(),
    )
    .unwrap();

    let order = client
        .create_order(69900, "INR", "receipt_1", serde_json::json!({"credits": 750}))
        .await
        .unwrap();

    assert_eq!(order.id, "order_Nxy123");
    assert_eq!(order.amount, 69900);
    assert_eq!(order.currency, "INR");
}

#[tokio::test]
async fn test_razorpay_order_creation_gateway_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"error": {"description": "bad key"}})),
        )
        .mount(&mock_server)
        .await;

    let client = RazorpayClient::new(
        mock_server.uri(),
        "rzp_bad_key".to_string(),
        "rzp_bad_secret".to_string(),
    )
    .unwrap();

    let result = client
        .create_order(69900, "INR", "receipt_1", serde_json::json!({}))
        .await;

    assert!(matches!(result, Err(AppError::UpstreamError(_))));
}

#[tokio::test]
async fn test_razorpay_unreachable_gateway() {
    let client = RazorpayClient::new(
        unreachable_base_url(),
        "rzp_test_key".to_string(),
        "rzp_test_secret".to_string(),
    )
    .unwrap();

    let result = client
        .create_order(100, "INR", "receipt_1", serde_json::json!({}))
        .await;

    assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
}

#[tokio::test]
async fn test_concurrent_lookup_requests() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({"List": {}});

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .expect(10)
        .mount(&mock_server)
        .await;

    // Fire 10 concurrent requests
    let mut handles = vec![];
    for i in 0..10 {
        let uri = mock_server.uri();
        let handle = tokio::spawn(async move {
            let client = LookupClient::new(uri, "test_token".to_string()).unwrap();
            client.search(&format!("query-{}", i)).await
        });
        handles.push(handle);
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }
}
