//! Check status tag set

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Closed tag set for validation and approval outcomes.
///
/// The numeric codes exist for compatibility with stored records; policy
/// decisions compare by equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    None,
    Pass,
    Fail,
    Warn,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::None, Status::Pass, Status::Fail, Status::Warn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::None => "NONE",
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::Warn => "WARN",
        }
    }

    /// Stored numeric code
    pub fn code(&self) -> u8 {
        match self {
            Status::None => 0,
            Status::Pass => 1,
            Status::Fail => 2,
            Status::Warn => 3,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Status::None),
            1 => Some(Status::Pass),
            2 => Some(Status::Fail),
            3 => Some(Status::Warn),
            _ => None,
        }
    }

    pub fn from_bool(passed: bool) -> Self {
        if passed {
            Status::Pass
        } else {
            Status::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        *self == Status::Pass
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u64>() {
            return Status::from_code(code).ok_or_else(|| format!("Invalid status code: {}", code));
        }
        match trimmed.to_ascii_uppercase().as_str() {
            "NONE" => Ok(Status::None),
            "PASS" => Ok(Status::Pass),
            "FAIL" => Ok(Status::Fail),
            "WARN" => Ok(Status::Warn),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StatusVisitor)
    }
}

/// Accepts names, stored numeric codes, or null
struct StatusVisitor;

impl<'de> Visitor<'de> for StatusVisitor {
    type Value = Status;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a status name (NONE/PASS/FAIL/WARN) or code 0-3")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Status, E> {
        Status::from_code(v).ok_or_else(|| E::custom(format!("invalid status code {}", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Status, E> {
        u64::try_from(v)
            .ok()
            .and_then(Status::from_code)
            .ok_or_else(|| E::custom(format!("invalid status code {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Status, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Status, E> {
        Ok(Status::None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Status, E> {
        Ok(Status::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        for status in Status::ALL {
            assert_eq!(Status::from_code(status.code() as u64), Some(status));
        }
        assert_eq!(Status::from_code(4), None);
        assert_eq!(Status::default(), Status::None);
    }

    #[test]
    fn test_deserialize_names_and_codes() {
        let statuses: Vec<Status> =
            serde_json::from_value(json!(["PASS", "fail", 3, 0, null])).unwrap();
        assert_eq!(
            statuses,
            vec![Status::Pass, Status::Fail, Status::Warn, Status::None, Status::None]
        );
        assert!(serde_json::from_value::<Status>(json!(7)).is_err());
        assert!(serde_json::from_value::<Status>(json!("MAYBE")).is_err());
    }

    #[test]
    fn test_serialize_as_name() {
        assert_eq!(serde_json::to_value(Status::Warn).unwrap(), json!("WARN"));
        assert_eq!("2".parse::<Status>().unwrap(), Status::Fail);
    }
}
