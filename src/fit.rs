//! Fit algorithm for scaling a set of renderers into a rectangle.
//!
//! Provides the world-space bounding box used on both sides of the ratio, the per-axis
//! ratio calculation, fit mode selection and the numeric guards applied to the result.

use bevy::camera::primitives::Aabb;
use bevy::prelude::*;

// ============================================================================
// Constants
// ============================================================================

/// Factor returned when the source bounds are degenerate (ratio is NaN or infinite)
pub const NEUTRAL_FACTOR: f32 = 1.0;
/// Floor applied to factors that are approximately zero
pub const MIN_FACTOR: f32 = 0.01;
/// Absolute tolerance for `approximately_zero`
pub const APPROXIMATELY_ZERO_TOLERANCE: f32 = 1e-6;

/// Returns true when `value` is numerically indistinguishable from zero
pub fn approximately_zero(value: f32) -> bool { value.abs() < APPROXIMATELY_ZERO_TOLERANCE }

// ============================================================================
// Types
// ============================================================================

/// Which rectangle axis governs the uniform scale factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum FitMode {
    /// Match the rectangle height
    Height,
    /// Match the rectangle width
    Width,
    /// Fit inside the rectangle (smaller of both ratios)
    #[default]
    Best,
}

impl FitMode {
    /// Picks the raw factor for this mode from `(width_ratio, height_ratio)`.
    pub fn select(self, ratios: Vec2) -> f32 {
        match self {
            Self::Height => ratios.y,
            Self::Width => ratios.x,
            Self::Best => ratios.x.min(ratios.y),
        }
    }
}

/// Axis-aligned box in world space, stored as center and size.
///
/// Grows with `encapsulate_point` / `encapsulate`; a fresh box has zero size at its anchor,
/// so the anchor is always part of the final volume.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct WorldBounds {
    pub center: Vec3,
    pub size:   Vec3,
}

impl WorldBounds {
    pub const fn new(center: Vec3, size: Vec3) -> Self { Self { center, size } }

    /// Zero-size box at `anchor`
    pub const fn at(anchor: Vec3) -> Self { Self::new(anchor, Vec3::ZERO) }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self { Self::new((min + max) * 0.5, max - min) }

    /// World-space bounds of a local `Aabb` placed by `global_transform`
    pub fn from_aabb(aabb: &Aabb, global_transform: &GlobalTransform) -> Self {
        let corners = aabb_to_world_corners(aabb, global_transform);
        let mut bounds = Self::at(corners[0]);
        for corner in &corners[1..] {
            bounds.encapsulate_point(*corner);
        }
        bounds
    }

    pub fn min(&self) -> Vec3 { self.center - self.size * 0.5 }

    pub fn max(&self) -> Vec3 { self.center + self.size * 0.5 }

    pub fn encapsulate_point(&mut self, point: Vec3) {
        *self = Self::from_min_max(self.min().min(point), self.max().max(point));
    }

    pub fn encapsulate(&mut self, other: &Self) {
        *self = Self::from_min_max(self.min().min(other.min()), self.max().max(other.max()));
    }
}

// ============================================================================
// Calculations
// ============================================================================

/// Converts an `Aabb` to 8 corners in world space
pub fn aabb_to_world_corners(aabb: &Aabb, global_transform: &GlobalTransform) -> [Vec3; 8] {
    let center = Vec3::from(aabb.center);
    let half_extents = Vec3::from(aabb.half_extents);

    let corners = [
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
    ]
    .map(|sign| center + sign * half_extents);

    corners.map(|corner| global_transform.transform_point(corner))
}

/// Per-axis ratio of region size to source size: `(width_ratio, height_ratio)`.
/// Depth is ignored. Zero source extents yield infinite or NaN ratios, which
/// `normalize_factor` neutralizes.
pub fn axis_ratios(source_size: Vec3, region_size: Vec3) -> Vec2 {
    Vec2::new(
        region_size.x / source_size.x,
        region_size.y / source_size.y,
    )
}

/// Applies the degenerate-geometry guards, NaN/infinity first, then the zero floor.
pub fn normalize_factor(factor: f32) -> f32 {
    if !factor.is_finite() {
        NEUTRAL_FACTOR
    } else if approximately_zero(factor) {
        MIN_FACTOR
    } else {
        factor
    }
}

/// Uniform scale factor for `ratios` under `mode`
pub fn fitting_factor(ratios: Vec2, mode: FitMode) -> f32 { normalize_factor(mode.select(ratios)) }
