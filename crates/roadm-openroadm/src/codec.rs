//! Frequency/slot codec.
//!
//! Converts between a channel expressed as (center, width), as a spectral
//! window (min, max) and as a fixed-grid [`OchSignal`]. Only 50 GHz and
//! 100 GHz windows map to a grid; slots are 12.5 GHz.

use roadm_driver_common::{DriverError, DriverResult};
use roadm_types::{ChannelSpacing, Frequency, GridType, OchSignal, CENTER_FREQUENCY};

/// Width of one spectrum slot.
pub const SLOT_WIDTH: Frequency = ChannelSpacing::Chl12p5Ghz.frequency();

/// Returns the window `[center - width/2, center + width/2]`.
pub fn center_width_to_window(center: Frequency, width: Frequency) -> (Frequency, Frequency) {
    let radius = width.half();
    let min = center.checked_sub(radius).unwrap_or(Frequency::ZERO);
    (min, center + radius)
}

/// Encodes a window as a fixed-grid signal.
///
/// The grid follows the window width (50 GHz or 100 GHz spacing) and the
/// multiplier is `(center - 193.1 THz) / spacing`, truncated toward zero.
pub fn min_max_to_slot(min: Frequency, max: Frequency) -> DriverResult<OchSignal> {
    let width = max
        .checked_sub(min)
        .ok_or_else(|| DriverError::unsupported_width(Frequency::ZERO))?;

    let spacing = match ChannelSpacing::from_frequency(width) {
        Some(s @ (ChannelSpacing::Chl50Ghz | ChannelSpacing::Chl100Ghz)) => s,
        _ => return Err(DriverError::unsupported_width(width)),
    };

    let slots = (width.as_hz() / SLOT_WIDTH.as_hz()) as u32;
    let center = i128::from(min.as_hz()) + i128::from(width.half().as_hz());
    let offset = center - i128::from(CENTER_FREQUENCY.as_hz());
    let multiplier = offset / i128::from(spacing.frequency().as_hz());

    Ok(OchSignal::new(
        GridType::Dwdm,
        spacing,
        multiplier as i32,
        slots,
    ))
}

/// Encodes a (center, width) channel as a fixed-grid signal.
pub fn to_och_signal_center_width(center: Frequency, width: Frequency) -> DriverResult<OchSignal> {
    let (min, max) = center_width_to_window(center, width);
    min_max_to_slot(min, max)
}
