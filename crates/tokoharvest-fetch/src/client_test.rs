use super::*;

#[test]
fn review_payload_is_single_element_array() {
    let payload = review_payload("2149599", 1, 10);
    let entries = payload.as_array().expect("payload must be an array");
    assert_eq!(entries.len(), 1);
}

#[test]
fn review_payload_carries_operation_and_variables() {
    let payload = review_payload("2149599", 3, 25);
    let entry = &payload[0];

    assert_eq!(entry["operationName"], "productReviewList");
    assert_eq!(entry["variables"]["productID"], "2149599");
    assert_eq!(entry["variables"]["page"], 3);
    assert_eq!(entry["variables"]["limit"], 25);
    assert_eq!(entry["variables"]["sortBy"], "create_time desc");
    assert_eq!(entry["variables"]["filterBy"], "");
}

#[test]
fn review_payload_product_id_stays_a_string() {
    // The endpoint declares $productID: String!; numeric ids must be quoted.
    let payload = review_payload("123", 1, 10);
    assert!(payload[0]["variables"]["productID"].is_string());
}

#[test]
fn review_payload_query_requests_aliased_fields() {
    let payload = review_payload("123", 1, 10);
    let query = payload[0]["query"].as_str().expect("query must be a string");

    assert!(query.contains("productrevGetProductReviewList"));
    assert!(query.contains("id: feedbackID"));
    assert!(query.contains("hasNext"));
    assert!(query.contains("totalReviews"));
}

#[test]
fn client_builds_from_default_config() {
    let config = tokoharvest_core::fetch_config::FetchConfig::default();
    let client = ReviewClient::new(REVIEW_ENDPOINT, &config).expect("client should build");
    assert_eq!(client.endpoint, REVIEW_ENDPOINT);
    assert_eq!(client.page_size, config.page_size);
    assert_eq!(client.max_retries, config.retry_total);
    assert_eq!(client.backoff_base, config.backoff_base());
}
