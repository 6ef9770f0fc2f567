//! Order status state machine.
//!
//! Orders start in `DRAFT` and move forward only:
//!
//! ```text
//! DRAFT -> SCHEDULED -> IN_PROGRESS -> COMPLETED
//!   |          |
//!   +----------+-----> CANCELED
//! ```
//!
//! `COMPLETED` and `CANCELED` are terminal. Assigning or unassigning a
//! transport is independent of the status and never triggers a transition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, UnknownStatus};

/// Lifecycle status of a collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    Scheduled,
    InProgress,
    Completed,
    Canceled,
}

/// Statuses in which an order still counts as an active dependent of the
/// client object and transport it references.
pub const ACTIVE_STATUSES: &[OrderStatus] = &[
    OrderStatus::Draft,
    OrderStatus::Scheduled,
    OrderStatus::InProgress,
];

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Draft,
        OrderStatus::Scheduled,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Canceled,
    ];

    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::Scheduled => "SCHEDULED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Canceled => "CANCELED",
        }
    }

    /// Returns the set of statuses this status may transition to.
    ///
    /// Terminal states return an empty slice.
    pub fn valid_transitions(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Draft => &[OrderStatus::Scheduled, OrderStatus::Canceled],
            OrderStatus::Scheduled => &[OrderStatus::InProgress, OrderStatus::Canceled],
            OrderStatus::InProgress => &[OrderStatus::Completed],
            OrderStatus::Completed | OrderStatus::Canceled => &[],
        }
    }

    /// `true` for `COMPLETED` and `CANCELED`.
    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// `true` while the order still blocks deletion of what it references.
    pub fn is_active(self) -> bool {
        ACTIVE_STATUSES.contains(&self)
    }

    /// Validate a transition from `self` to `requested`.
    pub fn can_transition_to(self, requested: OrderStatus) -> Result<(), CoreError> {
        let allowed = self.valid_transitions();
        if allowed.contains(&requested) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: requested,
                allowed,
            })
        }
    }

    /// Only `DRAFT` and `CANCELED` orders may be deleted.
    pub fn can_be_deleted(self) -> Result<(), CoreError> {
        match self {
            OrderStatus::Draft | OrderStatus::Canceled => Ok(()),
            status => Err(CoreError::OrderNotDeletable { status }),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus::new("order", s))
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Render a status list for messages, e.g. `SCHEDULED, CANCELED`.
pub fn format_statuses(statuses: &[OrderStatus]) -> String {
    if statuses.is_empty() {
        return "none (terminal status)".to_string();
    }
    statuses
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const TABLE: &[(OrderStatus, OrderStatus)] = &[
        (OrderStatus::Draft, OrderStatus::Scheduled),
        (OrderStatus::Draft, OrderStatus::Canceled),
        (OrderStatus::Scheduled, OrderStatus::InProgress),
        (OrderStatus::Scheduled, OrderStatus::Canceled),
        (OrderStatus::InProgress, OrderStatus::Completed),
    ];

    #[test]
    fn transition_closure_matches_table() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = TABLE.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to).is_ok(),
                    expected,
                    "{from} -> {to} should be {}",
                    if expected { "allowed" } else { "rejected" }
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(!OrderStatus::Draft.is_terminal());
        for to in OrderStatus::ALL {
            assert!(OrderStatus::Completed.can_transition_to(to).is_err());
            assert!(OrderStatus::Canceled.can_transition_to(to).is_err());
        }
    }

    #[test]
    fn invalid_transition_names_allowed_states() {
        let err = OrderStatus::Scheduled
            .can_transition_to(OrderStatus::Draft)
            .unwrap_err();
        assert_matches!(
            err,
            CoreError::InvalidTransition {
                from: OrderStatus::Scheduled,
                to: OrderStatus::Draft,
                ..
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("IN_PROGRESS, CANCELED"), "got: {msg}");
    }

    #[test]
    fn terminal_transition_message_mentions_terminal() {
        let err = OrderStatus::Completed
            .can_transition_to(OrderStatus::Canceled)
            .unwrap_err();
        assert!(err.to_string().contains("terminal"));
    }

    #[test]
    fn only_draft_and_canceled_are_deletable() {
        assert!(OrderStatus::Draft.can_be_deleted().is_ok());
        assert!(OrderStatus::Canceled.can_be_deleted().is_ok());
        for status in [
            OrderStatus::Scheduled,
            OrderStatus::InProgress,
            OrderStatus::Completed,
        ] {
            let err = status.can_be_deleted().unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("order in {status} status cannot be deleted")
            );
        }
    }

    #[test]
    fn active_statuses_are_in_flight_ones() {
        assert!(OrderStatus::Draft.is_active());
        assert!(OrderStatus::Scheduled.is_active());
        assert!(OrderStatus::InProgress.is_active());
        assert!(!OrderStatus::Completed.is_active());
        assert!(!OrderStatus::Canceled.is_active());
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("IN_PROGRESS".parse::<OrderStatus>().unwrap(), OrderStatus::InProgress);
        assert!("in_progress".parse::<OrderStatus>().is_err());
        assert_eq!(
            OrderStatus::try_from("CANCELED".to_string()).unwrap(),
            OrderStatus::Canceled
        );
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }
}
