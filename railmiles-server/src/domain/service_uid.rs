//! RTT service UID type.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid service UID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid service UID: {reason}")]
pub struct InvalidServiceUid {
    reason: &'static str,
}

/// An RTT (Realtime Trains) service unique identifier, such as `P12345`.
///
/// UIDs end up in URL paths when scraping the service detail page, so
/// only ASCII letters and digits are accepted.
///
/// # Examples
///
/// ```
/// use railmiles_server::domain::ServiceUid;
///
/// let uid = ServiceUid::parse(" P12345 ").unwrap();
/// assert_eq!(uid.as_str(), "P12345");
///
/// assert!(ServiceUid::parse("").is_err());
/// assert!(ServiceUid::parse("P1/../x").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ServiceUid(String);

impl ServiceUid {
    /// Parse a service UID, ignoring surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidServiceUid> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidServiceUid {
                reason: "service UID cannot be empty",
            });
        }
        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidServiceUid {
                reason: "must contain only ASCII letters and digits",
            });
        }
        Ok(ServiceUid(s.to_string()))
    }

    /// Parse an optional UID from a request field, where an empty or blank
    /// string means "not supplied".
    pub fn parse_optional(s: &str) -> Result<Option<Self>, InvalidServiceUid> {
        if s.trim().is_empty() {
            Ok(None)
        } else {
            Self::parse(s).map(Some)
        }
    }

    /// Returns the service UID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ServiceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceUid({})", self.0)
    }
}

impl fmt::Display for ServiceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ServiceUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ServiceUid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ServiceUid::parse(&s).map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any alphanumeric string round-trips
        #[test]
        fn alphanumeric_roundtrip(s in "[A-Za-z0-9]{1,12}") {
            let uid = ServiceUid::parse(&s).unwrap();
            prop_assert_eq!(uid.as_str(), s.as_str());
        }

        /// Strings containing a slash are always rejected
        #[test]
        fn slash_rejected(a in "[A-Z0-9]{0,5}", b in "[A-Z0-9]{0,5}") {
            let s = format!("{a}/{b}");
            prop_assert!(ServiceUid::parse(&s).is_err());
        }
    }
}
