//! World access for the fit algorithm.
//!
//! `CanvasFit` gathers renderer bounds and rectangle corners from the ECS, derives the
//! fitting factor and applies it to the scale target.
//!
//! World transforms are rebuilt from local `Transform`s up the `ChildOf` chain on every
//! call, so a scale written earlier in the frame is already reflected in the renderer
//! bounds even though `GlobalTransform` is only propagated in `PostUpdate`.

use bevy::camera::primitives::Aabb;
use bevy::camera::visibility::NoFrustumCulling;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use thiserror::Error;

use crate::components::CanvasElement3d;
use crate::components::FitRect;
use crate::fit;
use crate::fit::WorldBounds;

/// Global settings for canvas element scaling
#[derive(Resource, Reflect, Debug, Clone)]
#[reflect(Resource)]
pub struct CanvasFitConfig {
    /// Refuse to rescale when the scale target is the element itself, logging a warning.
    /// Defaults to on in debug builds.
    pub strict: bool,
}

impl Default for CanvasFitConfig {
    fn default() -> Self {
        Self {
            strict: cfg!(debug_assertions),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    #[error("entity {0:?} has no CanvasElement3d with a FitRect and transform")]
    MissingElement(Entity),
    #[error("scale target {0:?} has no Transform")]
    MissingScaleTarget(Entity),
    #[error(
        "the scale target of {0:?} can't be the entity that defines the rectangle, \
         use a separate child entity"
    )]
    ScaleTargetIsRegion(Entity),
}

/// Result of a successful rescale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedScale {
    pub scale_target: Entity,
    pub factor:       f32,
    pub scale:        Vec3,
}

/// System param exposing the scaler operations for `CanvasElement3d` entities.
#[derive(SystemParam)]
pub struct CanvasFit<'w, 's> {
    config:     Res<'w, CanvasFitConfig>,
    elements:   Query<'w, 's, (&'static CanvasElement3d, &'static FitRect)>,
    renderers:  Query<
        'w,
        's,
        (
            Option<&'static Aabb>,
            Option<&'static Visibility>,
            Has<Mesh3d>,
            Has<NoFrustumCulling>,
        ),
    >,
    transforms: Query<'w, 's, &'static mut Transform>,
    globals:    Query<'w, 's, &'static GlobalTransform>,
    parents:    Query<'w, 's, &'static ChildOf>,
}

const fn is_enabled(visibility: Option<&Visibility>) -> bool {
    !matches!(visibility, Some(Visibility::Hidden))
}

impl CanvasFit<'_, '_> {
    fn element(&self, element: Entity) -> Result<(&CanvasElement3d, &FitRect), FitError> {
        self.elements
            .get(element)
            .map_err(|_| FitError::MissingElement(element))
    }

    /// Current world transform of `entity`, composed from local transforms up the hierarchy.
    /// Entities without a `Transform` fall back to their propagated `GlobalTransform`.
    pub fn world_transform(&self, entity: Entity) -> Option<GlobalTransform> {
        let Ok(transform) = self.transforms.get(entity) else {
            return self.globals.get(entity).ok().copied();
        };
        let parent_global = self
            .parents
            .get(entity)
            .ok()
            .and_then(|child_of| self.world_transform(child_of.parent()))
            .unwrap_or(GlobalTransform::IDENTITY);
        Some(parent_global * *transform)
    }

    /// Union of the world bounds of every enabled renderer, anchored at the scale target.
    /// Empty or fully hidden renderer lists give a zero-size box.
    pub fn unified_bounds(&self, element: Entity) -> Result<WorldBounds, FitError> {
        let (canvas, _) = self.element(element)?;
        let anchor = self
            .world_transform(canvas.scale_target)
            .ok_or(FitError::MissingScaleTarget(canvas.scale_target))?;

        let mut bounds = WorldBounds::at(anchor.translation());
        for renderer in &canvas.renderers {
            let Ok((Some(aabb), visibility, _, _)) = self.renderers.get(*renderer) else {
                continue;
            };
            if !is_enabled(visibility) {
                continue;
            }
            if let Some(global_transform) = self.world_transform(*renderer) {
                bounds.encapsulate(&WorldBounds::from_aabb(aabb, &global_transform));
            }
        }
        Ok(bounds)
    }

    /// True once no enabled renderer is still waiting for the engine to compute its `Aabb`.
    ///
    /// Only meshes that take part in frustum culling ever receive one, so grouping entities,
    /// `NoFrustumCulling` meshes and despawned renderers don't hold the element back.
    pub fn renderers_ready(&self, element: Entity) -> bool {
        let Ok((canvas, _)) = self.element(element) else {
            return false;
        };
        canvas
            .renderers
            .iter()
            .all(|renderer| !self.awaits_bounds(*renderer))
    }

    /// Enabled renderers that will get an `Aabb` but don't have one yet
    pub fn pending_renderers(&self, element: Entity) -> Vec<Entity> {
        self.element(element).map_or_else(
            |_| Vec::new(),
            |(canvas, _)| {
                canvas
                    .renderers
                    .iter()
                    .copied()
                    .filter(|renderer| self.awaits_bounds(*renderer))
                    .collect()
            },
        )
    }

    fn awaits_bounds(&self, renderer: Entity) -> bool {
        self.renderers
            .get(renderer)
            .is_ok_and(|(aabb, visibility, has_mesh, no_culling)| {
                aabb.is_none() && is_enabled(visibility) && has_mesh && !no_culling
            })
    }

    /// World-space corners of the element's rectangle
    pub fn region_corners(&self, element: Entity) -> Result<[Vec3; 4], FitError> {
        let (_, rect) = self.element(element)?;
        let global_transform = self
            .world_transform(element)
            .ok_or(FitError::MissingElement(element))?;
        Ok(rect.world_corners(&global_transform))
    }

    /// Axis-aligned box around the rectangle corners, anchored at the element position
    pub fn region_bounds(&self, element: Entity) -> Result<WorldBounds, FitError> {
        let global_transform = self
            .world_transform(element)
            .ok_or(FitError::MissingElement(element))?;
        let mut bounds = WorldBounds::at(global_transform.translation());
        for corner in self.region_corners(element)? {
            bounds.encapsulate_point(corner);
        }
        Ok(bounds)
    }

    /// Raw `(width_ratio, height_ratio)` of region size to renderer bounds size
    pub fn axis_ratios(&self, element: Entity) -> Result<Vec2, FitError> {
        let source = self.unified_bounds(element)?;
        let region = self.region_bounds(element)?;
        Ok(fit::axis_ratios(source.size, region.size))
    }

    /// Uniform factor for the element's fit mode, with degenerate results normalized
    pub fn fitting_factor(&self, element: Entity) -> Result<f32, FitError> {
        let (canvas, _) = self.element(element)?;
        let ratios = self.axis_ratios(element)?;
        Ok(fit::fitting_factor(ratios, canvas.fit))
    }

    /// Current scale of the element's scale target multiplied by `factor * multiplier`
    fn scaled_by(&self, element: Entity, factor: f32, multiplier: f32) -> Result<Vec3, FitError> {
        let (canvas, _) = self.element(element)?;
        let transform = self
            .transforms
            .get(canvas.scale_target)
            .map_err(|_| FitError::MissingScaleTarget(canvas.scale_target))?;
        Ok(transform.scale * factor * multiplier)
    }

    /// Scale the target would receive from `rescale`, without writing it
    pub fn target_scale(&self, element: Entity, multiplier: f32) -> Result<Vec3, FitError> {
        let factor = self.fitting_factor(element)?;
        self.scaled_by(element, factor, multiplier)
    }

    /// Multiplies the scale target's scale by the fitting factor and `multiplier`.
    pub fn rescale(&mut self, element: Entity, multiplier: f32) -> Result<AppliedScale, FitError> {
        let scale_target = self.element(element)?.0.scale_target;
        if self.config.strict && scale_target == element {
            return Err(FitError::ScaleTargetIsRegion(element));
        }

        let factor = self.fitting_factor(element)?;
        let scale = self.scaled_by(element, factor, multiplier)?;

        let mut transform = self
            .transforms
            .get_mut(scale_target)
            .map_err(|_| FitError::MissingScaleTarget(scale_target))?;
        transform.scale = scale;

        debug!("Rescale {element:?}: factor={factor:.4} multiplier={multiplier:.3} scale={scale:.3?}");

        Ok(AppliedScale {
            scale_target,
            factor,
            scale,
        })
    }
}
