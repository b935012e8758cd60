//! Events for requesting and observing rescales.

use bevy::prelude::*;

/// Requests a rescale of a `CanvasElement3d`.
///
/// The element's scale target is multiplied by the fitting factor and `multiplier`.
/// Misconfiguration is logged and the request skipped, nothing is reported back.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct Rescale {
    #[event_target]
    pub element:    Entity,
    pub multiplier: f32,
}

impl Rescale {
    pub const fn new(element: Entity) -> Self {
        Self {
            element,
            multiplier: 1.0,
        }
    }

    pub const fn with_multiplier(element: Entity, multiplier: f32) -> Self {
        Self {
            element,
            multiplier,
        }
    }
}

/// Fired after a `Rescale` wrote a new scale onto the scale target.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct Rescaled {
    #[event_target]
    pub element:      Entity,
    pub scale_target: Entity,
    pub factor:       f32,
    pub scale:        Vec3,
}
