//! Transport mode tags.

use std::fmt;
use std::str::FromStr;

/// Error returned when a mode tag from the routing service is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transport mode: {tag:?}")]
pub struct InvalidMode {
    tag: String,
}

impl InvalidMode {
    /// The rejected tag, as received.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// A transport mode on the historical network.
///
/// This is a closed set: the routing service tags every edge with one of
/// these, and anything else is rejected at the service boundary by
/// [`Mode::parse`].
///
/// # Examples
///
/// ```
/// use route_server::domain::Mode;
///
/// assert_eq!(Mode::parse("electric-tram").unwrap(), Mode::ElectricTram);
/// assert_eq!(Mode::Chaussee.as_str(), "chaussee");
///
/// // Tags are case-sensitive, as emitted by the service
/// assert!(Mode::parse("Rail").is_err());
/// assert!(Mode::parse("horse").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    Ferry,
    Ship,
    Rail,
    Chaussee,
    Road,
    Metro,
    Tram,
    ElectricTram,
}

impl Mode {
    /// Every mode, in declaration order.
    pub const ALL: [Mode; 8] = [
        Mode::Ferry,
        Mode::Ship,
        Mode::Rail,
        Mode::Chaussee,
        Mode::Road,
        Mode::Metro,
        Mode::Tram,
        Mode::ElectricTram,
    ];

    /// Modes that are always requested from the routing service.
    pub const BASELINE: [Mode; 5] = [
        Mode::Ferry,
        Mode::Ship,
        Mode::Rail,
        Mode::Chaussee,
        Mode::Road,
    ];

    /// Parse a mode tag as emitted by the routing service.
    pub fn parse(s: &str) -> Result<Self, InvalidMode> {
        match s {
            "ferry" => Ok(Mode::Ferry),
            "ship" => Ok(Mode::Ship),
            "rail" => Ok(Mode::Rail),
            "chaussee" => Ok(Mode::Chaussee),
            "road" => Ok(Mode::Road),
            "metro" => Ok(Mode::Metro),
            "tram" => Ok(Mode::Tram),
            "electric-tram" => Ok(Mode::ElectricTram),
            other => Err(InvalidMode {
                tag: other.to_string(),
            }),
        }
    }

    /// The wire tag for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Ferry => "ferry",
            Mode::Ship => "ship",
            Mode::Rail => "rail",
            Mode::Chaussee => "chaussee",
            Mode::Road => "road",
            Mode::Metro => "metro",
            Mode::Tram => "tram",
            Mode::ElectricTram => "electric-tram",
        }
    }

    /// Whether this mode is only requested when explicitly enabled.
    pub fn is_optional(&self) -> bool {
        !Self::BASELINE.contains(self)
    }

    /// The mode shown to the user.
    ///
    /// Paved roads display as plain roads and electric trams as trams.
    /// The mapping is idempotent, so applying it before comparing modes
    /// never splits a run of edges that would otherwise be merged.
    pub fn display_alias(self) -> Mode {
        match self {
            Mode::Chaussee => Mode::Road,
            Mode::ElectricTram => Mode::Tram,
            other => other,
        }
    }
}

impl FromStr for Mode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::parse(s)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Mode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Mode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Mode::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_every_tag() {
        for mode in Mode::ALL {
            assert_eq!(Mode::parse(mode.as_str()), Ok(mode));
        }
    }

    #[test]
    fn reject_unknown_tags() {
        assert!(Mode::parse("").is_err());
        assert!(Mode::parse("bus").is_err());
        assert!(Mode::parse("electric_tram").is_err());
        assert!(Mode::parse(" rail").is_err());

        let err = Mode::parse("zeppelin").unwrap_err();
        assert_eq!(err.tag(), "zeppelin");
        assert_eq!(err.to_string(), "invalid transport mode: \"zeppelin\"");
    }

    #[test]
    fn optional_modes() {
        assert!(!Mode::Rail.is_optional());
        assert!(!Mode::Chaussee.is_optional());
        assert!(Mode::Metro.is_optional());
        assert!(Mode::Tram.is_optional());
        assert!(Mode::ElectricTram.is_optional());
    }

    #[test]
    fn display_alias_is_idempotent() {
        for mode in Mode::ALL {
            assert_eq!(mode.display_alias().display_alias(), mode.display_alias());
        }
        assert_eq!(Mode::Chaussee.display_alias(), Mode::Road);
        assert_eq!(Mode::ElectricTram.display_alias(), Mode::Tram);
        assert_eq!(Mode::Ferry.display_alias(), Mode::Ferry);
    }

    #[test]
    fn serde_uses_wire_tags() {
        let json = serde_json::to_string(&Mode::ElectricTram).unwrap();
        assert_eq!(json, "\"electric-tram\"");

        let mode: Mode = serde_json::from_str("\"ship\"").unwrap();
        assert_eq!(mode, Mode::Ship);

        assert!(serde_json::from_str::<Mode>("\"hovercraft\"").is_err());
    }
}
