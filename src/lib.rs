// bevy_canvas_element_3d
// Scales 3D renderers uniformly so their combined bounds fit a rectangle:
// - Fit by height, width or best fit
// - Rescale on insertion and when the rectangle changes
// - `Rescale` event and `CanvasFit` system param for explicit control

use bevy::prelude::*;

mod components;
mod events;
mod fit;
mod lifecycle;
mod observers;
pub mod prelude;
mod scaler;
mod support;
#[cfg(feature = "visualization")]
mod visualization;

// Public API - Components
pub use components::AwaitingStartScale;
pub use components::CanvasElement3d;
pub use components::FitRect;

// Public API - Events
pub use events::Rescale;
pub use events::Rescaled;

// Public API - Fit math
pub use fit::APPROXIMATELY_ZERO_TOLERANCE;
pub use fit::FitMode;
pub use fit::MIN_FACTOR;
pub use fit::NEUTRAL_FACTOR;
pub use fit::WorldBounds;
pub use fit::aabb_to_world_corners;
pub use fit::approximately_zero;
pub use fit::axis_ratios;
pub use fit::fitting_factor;
pub use fit::normalize_factor;

// Public API - Lifecycle
pub use lifecycle::START_SCALE_WARN_FRAMES;

// Public API - World access
pub use scaler::AppliedScale;
pub use scaler::CanvasFit;
pub use scaler::CanvasFitConfig;
pub use scaler::FitError;

// Public API - Utility functions
pub use support::collect_renderers;

// Public API - Visualization
#[cfg(feature = "visualization")]
pub use visualization::CanvasFitGizmo;
#[cfg(feature = "visualization")]
pub use visualization::CanvasFitVisualizationConfig;
#[cfg(feature = "visualization")]
pub use visualization::CanvasFitVisualizationPlugin;

// Internal - used by plugin, not for external use
use lifecycle::rescale_on_rect_change_system;
use lifecycle::scale_on_start_system;
use observers::on_canvas_element_added;
use observers::on_rescale;

/// Plugin that adds canvas element scaling
pub struct CanvasElement3dPlugin;

impl Plugin for CanvasElement3dPlugin {
    fn build(&self, app: &mut App) {
        app
            // Register observers for component lifecycle events
            .add_observer(on_canvas_element_added)
            // Register observers for custom events
            .add_observer(on_rescale)
            // Add systems
            .add_systems(
                Update,
                (scale_on_start_system, rescale_on_rect_change_system),
            )
            // Initialize resources
            .init_resource::<CanvasFitConfig>();
    }
}
