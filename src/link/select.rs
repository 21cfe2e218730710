//! Link configuration selector
//!
//! Picks the cheapest rate/lane pair able to carry a pixel clock: fewest
//! lanes first, then the highest rate at that lane count. A failed training
//! attempt passes its rate back as `previous_rate` so the next pick is
//! strictly slower.

use crate::driver::error::{LinkError, LinkResult};
use crate::link::{LaneCount, LinkCapability, LinkConfig, LinkRate, bandwidth};

/// Select a link configuration for `pixel_clock_khz`
///
/// Candidate rates are those at or below `capability.max_rate` and strictly
/// below `previous_rate` when one is given.
pub fn select(
    pixel_clock_khz: u32,
    capability: &LinkCapability,
    bits_per_pixel: u8,
    previous_rate: Option<LinkRate>,
) -> LinkResult<LinkConfig> {
    for lane_count in LaneCount::ASCENDING {
        if lane_count > capability.max_lanes {
            break;
        }
        for rate in LinkRate::DESCENDING {
            if rate > capability.max_rate {
                continue;
            }
            if previous_rate.is_some_and(|previous| rate >= previous) {
                continue;
            }
            if bandwidth(rate, lane_count, bits_per_pixel) >= pixel_clock_khz {
                return Ok(LinkConfig {
                    rate,
                    lane_count,
                    bits_per_pixel,
                });
            }
        }
    }

    Err(LinkError::LinkExhausted)
}

/// Whether a mode fits both the source pixel clock ceiling and the link
pub fn mode_valid(
    pixel_clock_khz: u32,
    capability: &LinkCapability,
    bits_per_pixel: u8,
    max_pixel_clock_khz: u32,
) -> bool {
    if pixel_clock_khz > max_pixel_clock_khz {
        #[cfg(feature = "defmt")]
        defmt::debug!("mode rejected: {} kHz above source limit", pixel_clock_khz);
        return false;
    }

    let available = bandwidth(capability.max_rate, capability.max_lanes, bits_per_pixel);
    if pixel_clock_khz > available {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "mode rejected: {} kHz above link bandwidth {} kHz",
            pixel_clock_khz,
            available
        );
        return false;
    }

    true
}
