// Unit tests for the connection state enum

use crate::connection::ConnectionState;

/// **VALUE**: Verifies `is_open()` is true for exactly one state.
///
/// **WHY THIS MATTERS**: The connected indicator is driven off this
/// predicate's meaning; `Connecting` or `Closed` reading as open would
/// violate the indicator invariant.
#[test]
fn given_each_state_when_is_open_queried_then_only_open_is_true() {
    assert!(!ConnectionState::Idle.is_open());
    assert!(!ConnectionState::Connecting.is_open());
    assert!(ConnectionState::Open.is_open());
    assert!(!ConnectionState::Closed { will_retry: true }.is_open());
    assert!(!ConnectionState::Closed { will_retry: false }.is_open());
}
