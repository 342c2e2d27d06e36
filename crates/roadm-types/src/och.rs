//! Optical channel (OCh) signal types.

use crate::frequency::Frequency;
use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference center frequency of the ITU-T G.694.1 grid (193.1 THz).
pub const CENTER_FREQUENCY: Frequency = Frequency::from_ghz(193_100);

/// Spectrum grid type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    /// Dense WDM fixed grid.
    Dwdm,
    /// Coarse WDM fixed grid.
    Cwdm,
    /// Flexible grid.
    Flex,
}

/// Fixed channel spacing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChannelSpacing {
    #[serde(rename = "100")]
    Chl100Ghz,
    #[serde(rename = "50")]
    Chl50Ghz,
    #[serde(rename = "25")]
    Chl25Ghz,
    #[serde(rename = "12.5")]
    Chl12p5Ghz,
    #[serde(rename = "6.25")]
    Chl6p25Ghz,
}

impl ChannelSpacing {
    /// Returns the spacing as a frequency.
    pub const fn frequency(&self) -> Frequency {
        match self {
            ChannelSpacing::Chl100Ghz => Frequency::from_ghz(100),
            ChannelSpacing::Chl50Ghz => Frequency::from_ghz(50),
            ChannelSpacing::Chl25Ghz => Frequency::from_ghz(25),
            ChannelSpacing::Chl12p5Ghz => Frequency::from_mhz(12_500),
            ChannelSpacing::Chl6p25Ghz => Frequency::from_mhz(6_250),
        }
    }

    /// Looks up the spacing matching an exact frequency.
    pub fn from_frequency(freq: Frequency) -> Option<Self> {
        [
            ChannelSpacing::Chl100Ghz,
            ChannelSpacing::Chl50Ghz,
            ChannelSpacing::Chl25Ghz,
            ChannelSpacing::Chl12p5Ghz,
            ChannelSpacing::Chl6p25Ghz,
        ]
        .into_iter()
        .find(|s| s.frequency() == freq)
    }
}

impl fmt::Display for ChannelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} GHz", self.frequency().as_ghz_string())
    }
}

impl FromStr for ChannelSpacing {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ghz = s.trim().trim_end_matches("GHz").trim();
        Frequency::parse_ghz(ghz)
            .ok()
            .and_then(ChannelSpacing::from_frequency)
            .ok_or_else(|| ParseError::InvalidChannelSpacing(s.to_string()))
    }
}

/// Optical signal type carried by a flow rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OchSignalType {
    /// Fixed-grid channel (default).
    #[default]
    FixedGrid,
    /// Flex-grid channel.
    FlexGrid,
}

/// A fixed-grid optical channel.
///
/// The center frequency is `CENTER_FREQUENCY + spacing_multiplier * spacing`
/// and the occupied width is `slot_granularity * 12.5 GHz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OchSignal {
    pub grid_type: GridType,
    pub channel_spacing: ChannelSpacing,
    pub spacing_multiplier: i32,
    pub slot_granularity: u32,
}

impl OchSignal {
    /// Creates a new OCh signal.
    pub const fn new(
        grid_type: GridType,
        channel_spacing: ChannelSpacing,
        spacing_multiplier: i32,
        slot_granularity: u32,
    ) -> Self {
        Self {
            grid_type,
            channel_spacing,
            spacing_multiplier,
            slot_granularity,
        }
    }

    /// Creates a DWDM signal whose slot covers exactly one channel spacing.
    pub fn new_dwdm_slot(channel_spacing: ChannelSpacing, spacing_multiplier: i32) -> Self {
        let slot = ChannelSpacing::Chl12p5Ghz.frequency().as_hz();
        let granularity = (channel_spacing.frequency().as_hz() / slot).max(1) as u32;
        Self::new(GridType::Dwdm, channel_spacing, spacing_multiplier, granularity)
    }

    /// Returns the center frequency of the channel.
    pub fn center_frequency(&self) -> Frequency {
        let offset =
            i128::from(self.spacing_multiplier) * i128::from(self.channel_spacing.frequency().as_hz());
        let hz = i128::from(CENTER_FREQUENCY.as_hz()) + offset;
        Frequency::from_hz(u64::try_from(hz).unwrap_or(0))
    }

    /// Returns the channel width used for media channel windows.
    ///
    /// Fixed-grid channels occupy one full spacing.
    pub fn channel_width(&self) -> Frequency {
        self.channel_spacing.frequency()
    }

    /// Returns the spectral width occupied by the slots.
    pub fn slot_width(&self) -> Frequency {
        Frequency::from_hz(
            u64::from(self.slot_granularity) * ChannelSpacing::Chl12p5Ghz.frequency().as_hz(),
        )
    }
}

impl fmt::Display for OchSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{}/{}x{}",
            self.grid_type,
            self.center_frequency(),
            self.channel_spacing,
            self.slot_granularity
        )
    }
}
