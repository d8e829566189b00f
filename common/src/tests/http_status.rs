// Unit tests for HttpStatusCode categorization

use crate::HttpStatusCode;

/// **VALUE**: Verifies the 4xx/5xx boundaries used to classify failures.
///
/// **WHY THIS MATTERS**: The session client logs state-fetch failures
/// differently depending on whether the server looked broken (5xx) or the
/// request did (4xx). Off-by-one boundaries would misclassify 400 and 500.
///
/// **BUG THIS CATCHES**: Would catch inclusive/exclusive range mistakes in
/// the category predicates.
#[test]
fn given_status_codes_when_categorized_then_ranges_are_exact() {
    assert!(HttpStatusCode(400).is_client_error());
    assert!(HttpStatusCode(499).is_client_error());
    assert!(!HttpStatusCode(500).is_client_error());

    assert!(HttpStatusCode(500).is_server_error());
    assert!(HttpStatusCode(599).is_server_error());
    assert!(!HttpStatusCode(399).is_server_error());
}

/// **VALUE**: Verifies the transient-failure list.
///
/// **BUG THIS CATCHES**: Would catch a retryable set that drifts to include
/// permanent failures like 404.
#[test]
fn given_transient_codes_when_is_retryable_then_true() {
    for code in [429u16, 502, 503, 504] {
        assert!(HttpStatusCode(code).is_retryable(), "{code} is transient");
    }
    assert!(!HttpStatusCode(404).is_retryable());
    assert!(!HttpStatusCode(500).is_retryable());
}
