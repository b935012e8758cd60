//! Demonstrates fitting a group of meshes into a tilted panel using `bevy_canvas_element_3d`.
//!
//! - Arrow keys resize the panel, the meshes rescale to follow
//! - Press 'F' to cycle between height, width and best fit
//! - Press 'H' to hide or show the torus (hidden renderers don't count)
//! - Press 'D' to toggle debug visualization of the panel and renderer bounds

use std::f32::consts::PI;

use bevy::prelude::*;
use bevy_canvas_element_3d::CanvasFitGizmo;
use bevy_canvas_element_3d::CanvasFitVisualizationPlugin;
use bevy_canvas_element_3d::prelude::*;

const PANEL_SIZE: Vec2 = Vec2::new(4.0, 3.0);
const RESIZE_SPEED: f32 = 2.0;
const MIN_PANEL_EXTENT: f32 = 0.25;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            CanvasElement3dPlugin,
            CanvasFitVisualizationPlugin,
        ))
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                resize_panel,
                cycle_fit_mode,
                toggle_torus,
                toggle_debug_visualization,
            ),
        )
        .add_observer(log_rescaled)
        .run();
}

#[derive(Component)]
struct Toggleable;

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 2.0, 9.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 1500.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::ZYX, 0.0, PI / 4.0, -PI / 4.0)),
    ));

    // Scale target: the meshes hang off this entity so scaling it scales them all
    let model = commands.spawn((Transform::default(), Visibility::default())).id();

    let cuboid = commands
        .spawn((
            Mesh3d(meshes.add(Cuboid::new(1.0, 1.0, 1.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.5, 0.5, 0.9))),
            Transform::from_xyz(-1.5, 0.0, 0.0),
            ChildOf(model),
        ))
        .id();

    let sphere = commands
        .spawn((
            Mesh3d(meshes.add(Sphere::new(0.5))),
            MeshMaterial3d(materials.add(Color::srgb(0.9, 0.3, 0.2))),
            Transform::from_xyz(0.0, 0.75, 0.0),
            ChildOf(model),
        ))
        .id();

    let torus = commands
        .spawn((
            Mesh3d(meshes.add(Torus::new(0.25, 0.75))),
            MeshMaterial3d(materials.add(Color::srgb(0.3, 0.8, 0.4))),
            Transform::from_xyz(2.0, -0.5, 0.0),
            ChildOf(model),
            Toggleable,
        ))
        .id();

    // Tilted panel that the model is fitted into
    commands.spawn((
        CanvasElement3d::new(model).with_renderers([cuboid, sphere, torus]),
        FitRect::new(PANEL_SIZE),
        Transform::from_rotation(Quat::from_rotation_z(PI / 12.0)),
    ));
}

fn resize_panel(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut panel_query: Query<&mut FitRect>,
) {
    let mut delta = Vec2::ZERO;
    if keyboard.pressed(KeyCode::ArrowRight) {
        delta.x += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowLeft) {
        delta.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        delta.y += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        delta.y -= 1.0;
    }
    if delta == Vec2::ZERO {
        return;
    }

    for mut rect in &mut panel_query {
        rect.size = (rect.size + delta * RESIZE_SPEED * time.delta_secs())
            .max(Vec2::splat(MIN_PANEL_EXTENT));
    }
}

fn cycle_fit_mode(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut element_query: Query<(Entity, &mut CanvasElement3d)>,
) {
    if !keyboard.just_pressed(KeyCode::KeyF) {
        return;
    }

    for (entity, mut canvas) in &mut element_query {
        canvas.fit = match canvas.fit {
            FitMode::Height => FitMode::Width,
            FitMode::Width => FitMode::Best,
            FitMode::Best => FitMode::Height,
        };
        info!("Fit mode: {:?}", canvas.fit);
        commands.trigger(Rescale::new(entity));
    }
}

fn toggle_torus(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut torus_query: Query<&mut Visibility, With<Toggleable>>,
    element_query: Query<Entity, With<CanvasElement3d>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyH) {
        return;
    }

    for mut visibility in &mut torus_query {
        *visibility = if *visibility == Visibility::Hidden {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    // Visibility isn't watched by the element, rescale explicitly
    for entity in &element_query {
        commands.trigger(Rescale::new(entity));
    }
}

fn toggle_debug_visualization(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut config_store: ResMut<GizmoConfigStore>,
) {
    if keyboard.just_pressed(KeyCode::KeyD) {
        let (config, _) = config_store.config_mut::<CanvasFitGizmo>();
        config.enabled = !config.enabled;
    }
}

fn log_rescaled(rescaled: On<Rescaled>) {
    info!(
        "Rescaled {:?}: factor={:.3} scale={:.3?}",
        rescaled.scale_target, rescaled.factor, rescaled.scale
    );
}
