//! Systems that trigger rescales from element lifecycle changes.

use bevy::prelude::*;

use crate::components::AwaitingStartScale;
use crate::components::CanvasElement3d;
use crate::components::FitRect;
use crate::events::Rescale;
use crate::scaler::CanvasFit;

/// Frames an element may wait for renderer bounds before a warning is logged
pub const START_SCALE_WARN_FRAMES: u32 = 120;

/// Runs the initial rescale of newly added elements.
///
/// Renderer bounds are computed by the engine after spawn, so an element waits here until
/// every enabled mesh renderer has an `Aabb`. Fitting earlier would see zero-size bounds.
pub fn scale_on_start_system(
    mut commands: Commands,
    canvas_fit: CanvasFit,
    mut pending_query: Query<(Entity, &mut AwaitingStartScale)>,
) {
    for (entity, mut awaiting) in &mut pending_query {
        if !canvas_fit.renderers_ready(entity) {
            awaiting.frames_waited = awaiting.frames_waited.saturating_add(1);
            if awaiting.frames_waited == START_SCALE_WARN_FRAMES {
                warn!(
                    "CanvasElement3d {entity:?} still waits for bounds of {:?} after {START_SCALE_WARN_FRAMES} frames",
                    canvas_fit.pending_renderers(entity)
                );
            }
            continue;
        }

        commands.entity(entity).remove::<AwaitingStartScale>();
        commands.trigger(Rescale::new(entity));
    }
}

/// Rescales `auto_update` elements whose rectangle changed after insertion
pub fn rescale_on_rect_change_system(
    mut commands: Commands,
    element_query: Query<(Entity, &CanvasElement3d, Ref<FitRect>), Without<AwaitingStartScale>>,
) {
    for (entity, canvas, rect) in &element_query {
        if canvas.auto_update && rect.is_changed() && !rect.is_added() {
            debug!("FitRect of {entity:?} changed to {:?}, rescaling", rect.size);
            commands.trigger(Rescale::new(entity));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::Arc;
    use std::sync::Mutex;

    use approx::assert_relative_eq;
    use bevy::camera::primitives::Aabb;
    use bevy::ecs::system::RunSystemOnce;
    use tracing::Event;
    use tracing::Level;
    use tracing::Subscriber;
    use tracing::field::Field;
    use tracing::field::Visit;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::CanvasElement3dPlugin;
    use crate::events::Rescaled;
    use crate::fit::FitMode;
    use crate::scaler::CanvasFitConfig;

    #[derive(Resource, Default)]
    struct RescaledCount(usize);

    /// Collects the messages of `WARN` events
    #[derive(Clone, Default)]
    struct WarningLog(Arc<Mutex<Vec<String>>>);

    struct MessageVisitor<'a>(&'a mut String);

    impl Visit for MessageVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                *self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for WarningLog {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() != Level::WARN {
                return;
            }
            let mut message = String::new();
            event.record(&mut MessageVisitor(&mut message));
            self.0.lock().unwrap().push(message);
        }
    }

    impl WarningLog {
        fn capture(&self, f: impl FnOnce()) {
            let subscriber = tracing_subscriber::registry().with(self.clone());
            tracing::subscriber::with_default(subscriber, f);
        }

        fn messages(&self) -> Vec<String> { self.0.lock().unwrap().clone() }
    }

    struct Scene {
        app:      App,
        element:  Entity,
        target:   Entity,
        renderer: Entity,
    }

    /// Scale target holding one child renderer with a 2x2x2 box, fitted into a 4x4 rect.
    fn scene(configure: impl FnOnce(CanvasElement3d) -> CanvasElement3d) -> Scene {
        let mut app = App::new();
        app.add_plugins((TransformPlugin, CanvasElement3dPlugin))
            .init_resource::<RescaledCount>()
            .add_observer(|_: On<Rescaled>, mut count: ResMut<RescaledCount>| count.0 += 1);

        let world = app.world_mut();
        let target = world.spawn(Transform::default()).id();
        let renderer = world
            .spawn((
                Transform::default(),
                Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0)),
                ChildOf(target),
            ))
            .id();
        let element = world
            .spawn((
                configure(CanvasElement3d::new(target).with_renderers([renderer])),
                FitRect::new(Vec2::splat(4.0)),
            ))
            .id();

        Scene {
            app,
            element,
            target,
            renderer,
        }
    }

    fn scale(scene: &Scene) -> Vec3 { scene.app.world().get::<Transform>(scene.target).unwrap().scale }

    fn rescaled_count(scene: &Scene) -> usize { scene.app.world().resource::<RescaledCount>().0 }

    #[test]
    fn scales_on_start() {
        let mut s = scene(|canvas| canvas);
        s.app.update();
        assert_eq!(scale(&s), Vec3::splat(2.0));
        assert!(s.app.world().get::<AwaitingStartScale>(s.element).is_none());

        // settled: further frames don't touch the scale
        s.app.update();
        s.app.update();
        assert_eq!(scale(&s), Vec3::splat(2.0));
        assert_eq!(rescaled_count(&s), 1);
    }

    #[test]
    fn start_waits_for_renderer_bounds() {
        let mut s = scene(|canvas| canvas);
        s.app
            .world_mut()
            .entity_mut(s.renderer)
            .remove::<Aabb>()
            .insert(Mesh3d(Handle::default()));
        s.app.update();
        assert_eq!(scale(&s), Vec3::ONE);
        assert!(s.app.world().get::<AwaitingStartScale>(s.element).is_some());

        s.app
            .world_mut()
            .entity_mut(s.renderer)
            .insert(Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0)));
        s.app.update();
        assert_eq!(scale(&s), Vec3::splat(2.0));
    }

    #[test]
    fn start_ignores_renderers_that_never_get_bounds() {
        let mut s = scene(|canvas| canvas);
        let world = s.app.world_mut();
        let group = world
            .spawn((Transform::default(), Visibility::Visible, ChildOf(s.target)))
            .id();
        world
            .get_mut::<CanvasElement3d>(s.element)
            .unwrap()
            .renderers
            .push(group);

        s.app.update();
        assert_eq!(scale(&s), Vec3::splat(2.0));
        assert!(s.app.world().get::<AwaitingStartScale>(s.element).is_none());
        assert_eq!(rescaled_count(&s), 1);
    }

    #[test]
    fn long_start_wait_is_reported_once() {
        let mut s = scene(|canvas| canvas);
        s.app
            .world_mut()
            .entity_mut(s.renderer)
            .remove::<Aabb>()
            .insert(Mesh3d(Handle::default()));

        // run on this thread so the scoped subscriber sees the warning
        let log = WarningLog::default();
        log.capture(|| {
            for _ in 0..START_SCALE_WARN_FRAMES + 5 {
                s.app
                    .world_mut()
                    .run_system_once(scale_on_start_system)
                    .unwrap();
            }
        });

        let waiting: Vec<_> = log
            .messages()
            .into_iter()
            .filter(|message| message.contains("still waits for bounds"))
            .collect();
        assert_eq!(waiting.len(), 1);
        let awaiting = s.app.world().get::<AwaitingStartScale>(s.element).unwrap();
        assert!(awaiting.frames_waited > START_SCALE_WARN_FRAMES);
        assert_eq!(scale(&s), Vec3::ONE);
    }

    #[test]
    fn start_can_be_disabled() {
        let mut s = scene(|canvas| canvas.with_scale_on_start(false));
        s.app.update();
        assert_eq!(scale(&s), Vec3::ONE);
        assert_eq!(rescaled_count(&s), 0);
    }

    #[test]
    fn rect_change_rescales_when_auto_update() {
        let mut s = scene(|canvas| canvas.with_fit(FitMode::Height));
        s.app.update();
        assert_eq!(scale(&s), Vec3::splat(2.0));

        s.app
            .world_mut()
            .get_mut::<FitRect>(s.element)
            .unwrap()
            .size = Vec2::new(4.0, 8.0);
        s.app.update();
        assert_relative_eq!(scale(&s).y, 4.0, epsilon = 1e-5);
        assert_eq!(rescaled_count(&s), 2);
    }

    #[test]
    fn rect_change_ignored_without_auto_update() {
        let mut s = scene(|canvas| canvas.with_auto_update(false));
        s.app.update();
        s.app
            .world_mut()
            .get_mut::<FitRect>(s.element)
            .unwrap()
            .size = Vec2::splat(8.0);
        s.app.update();
        assert_eq!(scale(&s), Vec3::splat(2.0));
    }

    #[test]
    fn repeated_rescale_is_idempotent_across_frames() {
        let mut s = scene(|canvas| canvas.with_scale_on_start(false));
        s.app.update();

        s.app.world_mut().trigger(Rescale::new(s.element));
        s.app.update();
        let once = scale(&s);
        assert_eq!(once, Vec3::splat(2.0));

        s.app.world_mut().trigger(Rescale::new(s.element));
        s.app.update();
        assert_relative_eq!(scale(&s).x, once.x, epsilon = 1e-5);
        assert_relative_eq!(scale(&s).y, once.y, epsilon = 1e-5);
    }

    #[test]
    fn repeated_rescale_within_one_frame_does_not_compound() {
        let mut s = scene(|canvas| canvas.with_scale_on_start(false));
        s.app.update();

        s.app.world_mut().trigger(Rescale::new(s.element));
        assert_eq!(scale(&s), Vec3::splat(2.0));

        s.app.world_mut().trigger(Rescale::new(s.element));
        assert_relative_eq!(scale(&s).x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(scale(&s).y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(scale(&s).z, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn multiplier_scales_result() {
        let mut s = scene(|canvas| canvas.with_scale_on_start(false));
        s.app.update();
        s.app
            .world_mut()
            .trigger(Rescale::with_multiplier(s.element, 1.5));
        assert_eq!(scale(&s), Vec3::splat(3.0));
    }

    #[test]
    fn self_target_is_skipped_in_strict_mode() {
        let mut s = scene(|canvas| canvas.with_scale_on_start(false));
        s.app.world_mut().resource_mut::<CanvasFitConfig>().strict = true;
        let element = s.element;
        s.app
            .world_mut()
            .get_mut::<CanvasElement3d>(element)
            .unwrap()
            .scale_target = element;
        s.app.update();

        let log = WarningLog::default();
        log.capture(|| {
            s.app.world_mut().trigger(Rescale::new(element));
            s.app.update();
        });
        assert_eq!(
            s.app.world().get::<Transform>(element).unwrap().scale,
            Vec3::ONE
        );
        assert_eq!(rescaled_count(&s), 0);
        assert!(
            log.messages()
                .iter()
                .any(|message| message.contains("can't be the entity that defines the rectangle"))
        );
    }

    #[test]
    fn unknown_entity_is_ignored() {
        let mut s = scene(|canvas| canvas.with_scale_on_start(false));
        let renderer = s.renderer;
        s.app.world_mut().trigger(Rescale::new(renderer));
        s.app.update();
        assert_eq!(rescaled_count(&s), 0);
    }
}
