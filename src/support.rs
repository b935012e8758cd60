//! Support utilities for hierarchy operations.

use bevy::camera::primitives::Aabb;
use bevy::prelude::*;

/// Collects `root` and every descendant that carries an `Aabb`, in depth-first order.
/// Useful for filling `CanvasElement3d::renderers` from a spawned model.
pub fn collect_renderers(
    root: Entity,
    children_query: &Query<&Children>,
    aabb_query: &Query<(), With<Aabb>>,
) -> Vec<Entity> {
    std::iter::once(root)
        .chain(children_query.iter_descendants_depth_first(root))
        .filter(|entity| aabb_query.contains(*entity))
        .collect()
}
