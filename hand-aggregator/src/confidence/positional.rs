//! Positional confidence - where the palm sits inside the sensing volume
//!
//! The palm is moved into the source's local frame (+Z forward/depth,
//! +X lateral, +Y vertical). Confidence is a 2D anisotropic Gaussian over the
//! lateral and vertical offsets, widened in proportion to how much of the
//! field of view is available at that depth, scaled by a depth amplitude that
//! is flat across the ideal band and eases to zero at the depth limits.
//! Nothing here has a hard edge inside the volume.

use nalgebra::Vector3;

use crate::device::DeviceProfile;
use crate::source::SourceContext;

/// Steepness of the arctangent ease between depth limit and ideal band
const EASE_STEEPNESS: f32 = 6.0;

/// Gaussian sigma as a fraction of the half-extent of the view at depth
const SPREAD_FRACTION: f32 = 0.5;

/// Arctangent ease mapping [0, 1] onto [0, 1] with flat-ish ends
pub fn atan_ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let half = (0.5 * EASE_STEEPNESS).atan();
    0.5 + ((t - 0.5) * EASE_STEEPNESS).atan() / (2.0 * half)
}

/// Depth-only amplitude: 1 inside the ideal band, eased to 0 at min/max
pub fn depth_amplitude(depth: f32, profile: &DeviceProfile) -> f32 {
    if depth <= profile.min_depth || depth >= profile.max_depth {
        0.0
    } else if depth < profile.ideal_depth_lo {
        atan_ease((depth - profile.min_depth) / (profile.ideal_depth_lo - profile.min_depth))
    } else if depth > profile.ideal_depth_hi {
        atan_ease((profile.max_depth - depth) / (profile.max_depth - profile.ideal_depth_hi))
    } else {
        1.0
    }
}

/// Confidence for a point already in the source's local frame
pub fn local_positional_confidence(local: &Vector3<f32>, profile: &DeviceProfile) -> f32 {
    let depth = local.z;
    let amplitude = depth_amplitude(depth, profile);
    if amplitude <= 0.0 {
        return 0.0;
    }

    // Half-extent of the view at this depth, per axis
    let sigma_x = depth * profile.half_horizontal_fov_rad().tan() * SPREAD_FRACTION;
    let sigma_y = depth * profile.half_vertical_fov_rad().tan() * SPREAD_FRACTION;

    let exponent = local.x * local.x / (2.0 * sigma_x * sigma_x)
        + local.y * local.y / (2.0 * sigma_y * sigma_y);
    amplitude * (-exponent).exp()
}

/// Confidence for a world-space palm position seen by `context`
pub fn positional_confidence(palm_position: &Vector3<f32>, context: &SourceContext) -> f32 {
    let local = context.origin.inverse_transform_point(palm_position);
    local_positional_confidence(&local, &context.profile)
}
