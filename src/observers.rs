//! Observers that wire events to the scaler.

use bevy::prelude::*;

use crate::components::AwaitingStartScale;
use crate::components::CanvasElement3d;
use crate::events::Rescale;
use crate::events::Rescaled;
use crate::scaler::CanvasFit;

/// Observer for `Rescale` event - fits the element's renderers into its rectangle.
/// Failures are logged as warnings and leave the scale untouched.
pub fn on_rescale(rescale: On<Rescale>, mut commands: Commands, mut canvas_fit: CanvasFit) {
    let element = rescale.element;

    match canvas_fit.rescale(element, rescale.multiplier) {
        Ok(applied) => {
            commands.trigger(Rescaled {
                element,
                scale_target: applied.scale_target,
                factor: applied.factor,
                scale: applied.scale,
            });
        },
        Err(error) => warn!("Rescale: {error}"),
    }
}

/// Observer for newly inserted `CanvasElement3d` - queues the initial rescale
pub fn on_canvas_element_added(
    add: On<Add, CanvasElement3d>,
    mut commands: Commands,
    elements: Query<&CanvasElement3d>,
) {
    let entity = add.entity;

    let Ok(canvas) = elements.get(entity) else {
        return;
    };

    if canvas.scale_on_start {
        commands.entity(entity).insert(AwaitingStartScale::default());
    }
}
