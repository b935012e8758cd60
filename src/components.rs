//! Components used by the canvas element scaler.

use bevy::prelude::*;

use crate::fit::FitMode;

/// Scales a set of 3D renderers so their combined bounds fit this entity's `FitRect`.
///
/// The scale is written uniformly onto `scale_target`, which must be a different entity
/// from the one carrying this component (usually a child holding the meshes).
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(FitRect, Transform)]
pub struct CanvasElement3d {
    /// Entity whose `Transform::scale` is multiplied by the fitting factor
    pub scale_target:   Entity,
    /// Fit the rectangle height, width or both
    pub fit:            FitMode,
    /// Entities with an `Aabb` whose combined world bounds are measured
    pub renderers:      Vec<Entity>,
    /// Rescale once the renderers have bounds after insertion
    pub scale_on_start: bool,
    /// Rescale whenever the `FitRect` changes
    pub auto_update:    bool,
}

impl CanvasElement3d {
    pub const fn new(scale_target: Entity) -> Self {
        Self {
            scale_target,
            fit: FitMode::Best,
            renderers: Vec::new(),
            scale_on_start: true,
            auto_update: true,
        }
    }

    pub const fn with_fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_renderers(mut self, renderers: impl IntoIterator<Item = Entity>) -> Self {
        self.renderers = renderers.into_iter().collect();
        self
    }

    pub const fn with_scale_on_start(mut self, scale_on_start: bool) -> Self {
        self.scale_on_start = scale_on_start;
        self
    }

    pub const fn with_auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }
}

/// Rectangle in the entity's local XY plane that renderers are fitted into.
///
/// `pivot` is the normalized point of the rectangle sitting at the entity origin,
/// `(0.5, 0.5)` centers it.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct FitRect {
    pub size:  Vec2,
    pub pivot: Vec2,
}

impl Default for FitRect {
    fn default() -> Self {
        Self {
            size:  Vec2::ONE,
            pivot: Vec2::splat(0.5),
        }
    }
}

impl FitRect {
    pub const fn new(size: Vec2) -> Self {
        Self {
            size,
            pivot: Vec2::splat(0.5),
        }
    }

    pub const fn with_pivot(mut self, pivot: Vec2) -> Self {
        self.pivot = pivot;
        self
    }

    /// Local-space corners: bottom-left, top-left, top-right, bottom-right
    pub fn local_corners(&self) -> [Vec3; 4] {
        let min = -self.pivot * self.size;
        let max = (Vec2::ONE - self.pivot) * self.size;
        [
            Vec3::new(min.x, min.y, 0.0),
            Vec3::new(min.x, max.y, 0.0),
            Vec3::new(max.x, max.y, 0.0),
            Vec3::new(max.x, min.y, 0.0),
        ]
    }

    /// World-space corners in the same order as `local_corners`
    pub fn world_corners(&self, global_transform: &GlobalTransform) -> [Vec3; 4] {
        self.local_corners()
            .map(|corner| global_transform.transform_point(corner))
    }
}

/// Marks an element that still has to perform its initial rescale.
/// Removed once every enabled renderer has bounds and the rescale ran.
#[derive(Component, Debug, Default)]
pub struct AwaitingStartScale {
    /// Frames spent waiting for renderer bounds so far
    pub frames_waited: u32,
}
