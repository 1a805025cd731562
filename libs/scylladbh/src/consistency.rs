use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Replication acknowledgment level passed through to the driver
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Consistency {
    Any,
    One,
    Two,
    Three,
    #[default]
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    LocalOne,
}

impl Consistency {
    pub const ALL_LEVELS: [Consistency; 9] = [
        Consistency::Any,
        Consistency::One,
        Consistency::Two,
        Consistency::Three,
        Consistency::Quorum,
        Consistency::All,
        Consistency::LocalQuorum,
        Consistency::EachQuorum,
        Consistency::LocalOne,
    ];

    /// Name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Consistency::Any => "any",
            Consistency::One => "one",
            Consistency::Two => "two",
            Consistency::Three => "three",
            Consistency::Quorum => "quorum",
            Consistency::All => "all",
            Consistency::LocalQuorum => "localQuorum",
            Consistency::EachQuorum => "eachQuorum",
            Consistency::LocalOne => "localOne",
        }
    }

    /// Parse a level name, falling back to `Quorum` for anything unrecognized
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(consistency = name, "Unknown consistency level, using quorum");
            Consistency::Quorum
        })
    }

    /// Level named by a configuration value; a blank value leaves the level unset
    pub fn from_config(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(Consistency::parse_lenient(name))
        }
    }
}

/// Error returned by the strict [`FromStr`] implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown consistency level '{0}'")]
pub struct UnknownConsistency(pub String);

impl FromStr for Consistency {
    type Err = UnknownConsistency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // localQuorum, local_quorum and LOCAL_QUORUM all normalize to "localquorum"
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Consistency::ALL_LEVELS
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownConsistency(s.to_string()))
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Consistency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Consistency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Consistency::parse_lenient(&raw))
    }
}

/// `deserialize_with` adapter for optional configuration fields
pub(crate) fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Consistency>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Consistency::from_config))
}

impl From<Consistency> for scylla::statement::Consistency {
    fn from(value: Consistency) -> Self {
        use scylla::statement::Consistency as Driver;

        match value {
            Consistency::Any => Driver::Any,
            Consistency::One => Driver::One,
            Consistency::Two => Driver::Two,
            Consistency::Three => Driver::Three,
            Consistency::Quorum => Driver::Quorum,
            Consistency::All => Driver::All,
            Consistency::LocalQuorum => Driver::LocalQuorum,
            Consistency::EachQuorum => Driver::EachQuorum,
            Consistency::LocalOne => Driver::LocalOne,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scylla::statement::Consistency as Driver;

    #[test]
    fn test_parse_config_names() {
        for level in Consistency::ALL_LEVELS {
            assert_eq!(level.as_str().parse::<Consistency>(), Ok(level));
        }
    }

    #[test]
    fn test_parse_alternative_spellings() {
        assert_eq!("local_quorum".parse(), Ok(Consistency::LocalQuorum));
        assert_eq!("LOCAL_ONE".parse(), Ok(Consistency::LocalOne));
        assert_eq!(" EachQuorum ".parse(), Ok(Consistency::EachQuorum));
        assert_eq!("ALL".parse(), Ok(Consistency::All));
    }

    #[test]
    fn test_parse_unknown_is_error() {
        let err = "serial".parse::<Consistency>().unwrap_err();
        assert_eq!(err, UnknownConsistency("serial".to_string()));
    }

    #[test]
    fn test_parse_lenient_falls_back_to_quorum() {
        assert_eq!(Consistency::parse_lenient("bogus"), Consistency::Quorum);
        assert_eq!(Consistency::parse_lenient("one"), Consistency::One);
    }

    #[test]
    fn test_from_config_blank_is_unset() {
        assert_eq!(Consistency::from_config(""), None);
        assert_eq!(Consistency::from_config("   "), None);
        assert_eq!(Consistency::from_config("bogus"), Some(Consistency::Quorum));
        assert_eq!(Consistency::from_config(" localOne "), Some(Consistency::LocalOne));
    }

    #[test]
    fn test_driver_mapping() {
        assert_eq!(Driver::from(Consistency::Any), Driver::Any);
        assert_eq!(Driver::from(Consistency::LocalQuorum), Driver::LocalQuorum);
        assert_eq!(Driver::from(Consistency::EachQuorum), Driver::EachQuorum);
        assert_eq!(Driver::from(Consistency::LocalOne), Driver::LocalOne);
    }

    #[test]
    fn test_serde_uses_config_names() {
        let json = serde_json::to_string(&Consistency::LocalQuorum).unwrap();
        assert_eq!(json, "\"localQuorum\"");

        let parsed: Consistency = serde_json::from_str("\"eachQuorum\"").unwrap();
        assert_eq!(parsed, Consistency::EachQuorum);

        let unknown: Consistency = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(unknown, Consistency::Quorum);
    }
}
