// Unit tests for SessionToken redaction guarantees

use crate::SessionToken;

/// **VALUE**: Verifies the token value never leaks through Debug or Display.
///
/// **WHY THIS MATTERS**: The session token authorizes the state fetch and the
/// live connection. Error paths format values with `{:?}` and `{}` freely; if
/// either formatter exposed the credential it would end up in log files.
///
/// **BUG THIS CATCHES**: Would catch if someone replaced the manual Debug/Display
/// impls with derives, which would print the inner string.
#[test]
fn given_token_when_formatted_then_value_is_redacted() {
    // GIVEN: A token with a known value
    let token = SessionToken::new(String::from("super-secret"));

    // WHEN: Formatting via Debug and Display
    let debug = format!("{:?}", token);
    let display = format!("{}", token);

    // THEN: Neither output contains the raw value
    assert!(!debug.contains("super-secret"), "Debug must redact the token");
    assert!(
        !display.contains("super-secret"),
        "Display must redact the token"
    );
    assert!(debug.contains("REDACTED"));
    assert!(display.contains("REDACTED"));
}

/// **VALUE**: Verifies as_str() still exposes the raw value for transmission.
///
/// **WHY THIS MATTERS**: The query string of the state fetch and the socket URL
/// need the literal token. If as_str() redacted too, every request would carry
/// a garbage credential.
///
/// **BUG THIS CATCHES**: Would catch an over-eager redaction that breaks the
/// only sanctioned access path.
#[test]
fn given_token_when_as_str_called_then_returns_raw_value() {
    let token = SessionToken::new(String::from("t1"));

    assert_eq!(token.as_str(), "t1");
    assert_eq!(token.len(), 2);
    assert!(!token.is_empty());
}

/// **VALUE**: Verifies the empty-token predicate used by the connect() guard.
///
/// **WHY THIS MATTERS**: The connection manager refuses to open a transport
/// without a credential. That check is `is_empty()`; it must be truthful.
///
/// **BUG THIS CATCHES**: Would catch an is_empty() that checks the wrong field
/// after a refactor.
#[test]
fn given_empty_token_when_is_empty_called_then_returns_true() {
    let token = SessionToken::new(String::new());

    assert!(token.is_empty());
    assert_eq!(token.len(), 0);
}

/// **VALUE**: Verifies serialization is refused outright.
///
/// **WHY THIS MATTERS**: Config files and diagnostic dumps are serialized with
/// serde. A token that silently serialized would persist the credential to disk.
///
/// **BUG THIS CATCHES**: Would catch a derived Serialize impl sneaking in.
#[test]
fn given_token_when_serialized_then_returns_error() {
    let token = SessionToken::new(String::from("t1"));

    let result = serde_json::to_string(&token);

    assert!(result.is_err(), "SessionToken must refuse serialization");
}
