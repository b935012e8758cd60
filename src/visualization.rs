//! Visualization system for canvas element debugging
//!
//! Draws each element's fit rectangle and the combined bounds of its renderers.
//! Uses Bevy's GizmoConfigGroup pattern, disabled by default.

use bevy::prelude::*;

use crate::components::CanvasElement3d;
use crate::fit::WorldBounds;
use crate::scaler::CanvasFit;

/// Gizmo config group for canvas element visualization.
/// Toggle via `GizmoConfigStore::config_mut::<CanvasFitGizmo>().enabled`
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct CanvasFitGizmo {}

/// Configuration for canvas element visualization colors and appearance
#[derive(Resource, Reflect, Debug, Clone)]
#[reflect(Resource)]
pub struct CanvasFitVisualizationConfig {
    pub rect_color:   Color,
    pub bounds_color: Color,
    pub line_width:   f32,
}

impl Default for CanvasFitVisualizationConfig {
    fn default() -> Self {
        Self {
            rect_color:   Color::srgb(1.0, 1.0, 0.0), // Yellow
            bounds_color: Color::srgb(0.0, 1.0, 1.0), // Cyan
            line_width:   2.0,
        }
    }
}

/// Plugin that adds canvas element visualization functionality
pub struct CanvasFitVisualizationPlugin;

impl Plugin for CanvasFitVisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.init_gizmo_group::<CanvasFitGizmo>()
            .init_resource::<CanvasFitVisualizationConfig>()
            .add_systems(Startup, init_canvas_fit_gizmo)
            .add_systems(Update, (sync_gizmo_line_width, draw_canvas_fit_bounds).chain());
    }
}

/// Initialize the canvas fit gizmo config (disabled by default)
fn init_canvas_fit_gizmo(
    mut config_store: ResMut<GizmoConfigStore>,
    viz_config: Res<CanvasFitVisualizationConfig>,
) {
    let (config, _) = config_store.config_mut::<CanvasFitGizmo>();
    config.enabled = false;
    config.line.width = viz_config.line_width;
    config.depth_bias = -1.0;
}

fn sync_gizmo_line_width(
    mut config_store: ResMut<GizmoConfigStore>,
    viz_config: Res<CanvasFitVisualizationConfig>,
) {
    if !viz_config.is_changed() {
        return;
    }
    let (config, _) = config_store.config_mut::<CanvasFitGizmo>();
    config.line.width = viz_config.line_width;
}

/// Draws the closed outline through `corners`
fn draw_rect(gizmos: &mut Gizmos<CanvasFitGizmo>, corners: &[Vec3; 4], color: Color) {
    for i in 0..4 {
        let next = (i + 1) % 4;
        gizmos.line(corners[i], corners[next], color);
    }
}

/// Draws the 12 edges of an axis-aligned box
fn draw_bounds(gizmos: &mut Gizmos<CanvasFitGizmo>, bounds: &WorldBounds, color: Color) {
    let (min, max) = (bounds.min(), bounds.max());
    let near = [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(max.x, min.y, min.z),
    ];
    let far = near.map(|corner| corner.with_z(max.z));

    draw_rect(gizmos, &near, color);
    draw_rect(gizmos, &far, color);
    for (a, b) in near.iter().zip(far.iter()) {
        gizmos.line(*a, *b, color);
    }
}

fn draw_canvas_fit_bounds(
    mut gizmos: Gizmos<CanvasFitGizmo>,
    config: Res<CanvasFitVisualizationConfig>,
    config_store: Res<GizmoConfigStore>,
    canvas_fit: CanvasFit,
    element_query: Query<Entity, With<CanvasElement3d>>,
) {
    let (gizmo_config, _) = config_store.config::<CanvasFitGizmo>();
    if !gizmo_config.enabled {
        return;
    }

    for element in &element_query {
        if let Ok(corners) = canvas_fit.region_corners(element) {
            draw_rect(&mut gizmos, &corners, config.rect_color);
        }
        if let Ok(bounds) = canvas_fit.unified_bounds(element) {
            draw_bounds(&mut gizmos, &bounds, config.bounds_color);
        }
    }
}
