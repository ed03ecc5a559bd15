use std::str::FromStr;

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::error::Error;

/// Shape of the statistics a device reports.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phases {
    Single,
    Three,
}

/// Supported device types, as spelled in the configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum DeviceKind {
    /// Single-phase energy meter.
    #[display("em-1p")]
    SinglePhaseMeter,

    /// Three-phase energy meter.
    #[display("em-3p")]
    ThreePhaseMeter,
}

impl DeviceKind {
    /// Statistics path suffix on the cloud API.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SinglePhaseMeter => "em-1p",
            Self::ThreePhaseMeter => "em-3p",
        }
    }

    #[must_use]
    pub const fn phases(self) -> Phases {
        match self {
            Self::SinglePhaseMeter => Phases::Single,
            Self::ThreePhaseMeter => Phases::Three,
        }
    }
}

impl FromStr for DeviceKind {
    type Err = Error;

    fn from_str(type_: &str) -> Result<Self, Self::Err> {
        match type_.to_lowercase().as_str() {
            "em-1p" => Ok(Self::SinglePhaseMeter),
            "em-3p" => Ok(Self::ThreePhaseMeter),
            _ => Err(Error::configuration(format!(
                "device type `{type_}` is not supported, expected `em-1p` or `em-3p`"
            ))),
        }
    }
}

/// Which device to ask the upstream about.
#[must_use]
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct Device {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde_as(as = "DisplayFromStr")]
    #[serde(rename = "type")]
    pub kind: DeviceKind,
}

impl Device {
    /// Human-readable name, falling back to the ID.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|name| !name.is_empty()).unwrap_or(&self.id)
    }
}
