//! Angular layout shared by the wheel drawing and the spin resolution.
//!
//! Angles are in radians, measured in screen space: zero points right and
//! positive angles turn clockwise. Wedge `i` of `n` starts at
//! `rotation + i * seg - PI/2 - seg/2`, so at zero rotation the centre of wedge
//! 0 sits under the pointer at the top.

use std::f64::consts::{FRAC_PI_2, TAU};

pub fn segment_angle(count: usize) -> f64 {
    TAU / count as f64
}

pub fn wedge_start(rotation: f64, index: usize, count: usize) -> f64 {
    let seg = segment_angle(count);
    rotation + index as f64 * seg - FRAC_PI_2 - seg / 2.0
}

pub fn wedge_centre(rotation: f64, index: usize, count: usize) -> f64 {
    wedge_start(rotation, index, count) + segment_angle(count) / 2.0
}

pub fn ease_out_quad(t: f64) -> f64 {
    t * (2.0 - t)
}

/// Index of the wedge under the top pointer after the wheel turned by `rotation`.
///
/// Inverts the clockwise turn and the half-wedge offset used by [`wedge_start`].
pub fn selected_index(rotation: f64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let seg = segment_angle(count);
    let normalized = rotation.rem_euclid(TAU);
    let effective = (TAU - normalized + seg / 2.0).rem_euclid(TAU);
    Some((effective / seg).floor() as usize % count)
}
