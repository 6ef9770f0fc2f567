//! Transport (vehicle) operational status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownStatus;

/// Whether a vehicle is on the road or in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportStatus {
    #[default]
    InWork,
    Repair,
}

impl TransportStatus {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportStatus::InWork => "IN_WORK",
            TransportStatus::Repair => "REPAIR",
        }
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_WORK" => Ok(TransportStatus::InWork),
            "REPAIR" => Ok(TransportStatus::Repair),
            other => Err(UnknownStatus::new("transport", other)),
        }
    }
}

impl TryFrom<String> for TransportStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_in_work() {
        assert_eq!(TransportStatus::default(), TransportStatus::InWork);
    }

    #[test]
    fn rejects_unknown_status() {
        let err = "PARKED".parse::<TransportStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown transport status 'PARKED'");
    }
}
