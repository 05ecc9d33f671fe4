#![allow(clippy::type_complexity, clippy::too_many_arguments)]
use bevy::asset::RenderAssetUsages;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::math::primitives::{Cone, Sphere};
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::ui::FocusPolicy;
use clap::{Parser, ValueEnum};
use crossbeam_channel::Receiver;
use std::fs::File;

use gridify::camera::{CameraController, FlyKey, FLY_ENABLED};
use gridify::geometry::{Axis, Point3};
use gridify::parse::validate_fields;
use gridify::scene::{self, ScenePrimitive};
use gridify::store::{CameraMode, PointStore, RenderMode, StoreEvent};

#[derive(Copy, Clone, ValueEnum)]
enum Theme {
    Dark,
    Light,
}

#[derive(Parser)]
struct Args {
    /// Initial coordinates as [x,y,z],[x,y,z],...
    #[arg(long, default_value = "")]
    points: String,
    /// Extra points as "x,y,z"; invalid entries are reported and skipped
    #[arg(long = "add")]
    add: Vec<String>,
    /// X axis label
    #[arg(long, default_value = "X")]
    x_label: String,
    /// Y axis label
    #[arg(long, default_value = "Y")]
    y_label: String,
    /// Z axis label
    #[arg(long, default_value = "Z")]
    z_label: String,
    /// UI theme (dark or light)
    #[arg(long, value_enum, default_value_t = Theme::Dark)]
    theme: Theme,
}

#[derive(Resource)]
struct VizStore(PointStore);

#[derive(Resource)]
struct StoreEvents(Receiver<StoreEvent>);

#[derive(Resource)]
struct CameraRig(CameraController);

#[derive(Resource, Default)]
struct PointEntities(Vec<Entity>);

#[derive(Resource, Default)]
struct BackdropEntities(Vec<Entity>);

#[derive(Resource)]
struct ThemeColors {
    toolbar_bg: Color,
    button_bg: Color,
    button_active: Color,
    text: Color,
}

impl ThemeColors {
    fn new(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                toolbar_bg: Color::srgb(0.2, 0.2, 0.2),
                button_bg: Color::srgb(0.3, 0.3, 0.3),
                button_active: Color::srgb(0.39, 0.4, 0.95),
                text: Color::WHITE,
            },
            Theme::Light => Self {
                toolbar_bg: Color::srgb(0.9, 0.9, 0.9),
                button_bg: Color::srgb(0.8, 0.8, 0.8),
                button_active: Color::srgb(0.39, 0.4, 0.95),
                text: Color::BLACK,
            },
        }
    }
}

#[derive(Component)]
struct MainCamera;

#[derive(Component)]
struct ModeButton(RenderMode);

#[derive(Component)]
struct ClearButton;

#[derive(Component)]
struct OpenButton;

/// UI text pinned to a world-space position every frame.
#[derive(Component)]
struct WorldLabel(Vec3);

fn main() {
    if let Ok(path) = std::env::var("GRIDIFY_LOG") {
        match File::create(&path) {
            Ok(file) => {
                env_logger::Builder::from_default_env()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Failed to create log file {}: {}", path, e);
                env_logger::Builder::from_default_env().init();
            }
        }
    } else {
        env_logger::Builder::from_default_env().init();
    }

    let args = Args::parse();
    let mut store = PointStore::new();
    store.set_axis_label(Axis::X, args.x_label);
    store.set_axis_label(Axis::Y, args.y_label);
    store.set_axis_label(Axis::Z, args.z_label);
    if !args.points.is_empty() {
        store.replace_all_from_text(&args.points);
    }
    for entry in &args.add {
        let fields: Vec<&str> = entry.split(',').collect();
        if fields.len() != 3 {
            log::warn!("--add expects \"x,y,z\", got {entry:?}");
            continue;
        }
        match validate_fields(fields[0], fields[1], fields[2]) {
            Ok(p) => {
                store.add_point(p.x, p.y, p.z);
            }
            Err(err) => log::warn!("invalid --add point {entry:?}: {err}"),
        }
    }
    let events = store.subscribe();

    App::new()
        .insert_resource(VizStore(store))
        .insert_resource(StoreEvents(events))
        .insert_resource(CameraRig(CameraController::default()))
        .insert_resource(PointEntities::default())
        .insert_resource(BackdropEntities::default())
        .insert_resource(ThemeColors::new(args.theme))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Gridify".into(),
                resolution: (1024.0, 640.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                apply_store_events,
                handle_mode_buttons,
                handle_clear_button,
                handle_open_button,
                handle_camera_keys,
                orbit_camera_input,
                fly_camera_input,
                drive_camera,
                update_world_labels,
                highlight_mode_buttons,
            ),
        )
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    store: Res<VizStore>,
    rig: Res<CameraRig>,
    theme: Res<ThemeColors>,
    mut point_entities: ResMut<PointEntities>,
    mut backdrop_entities: ResMut<BackdropEntities>,
) {
    let eye = rig.0.eye_position();
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(eye.x as f32, eye.y as f32, eye.z as f32)
            .looking_at(Vec3::ZERO, Vec3::Z),
        MainCamera,
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            ..default()
        },
        Transform::from_xyz(10.0, 10.0, 10.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));

    spawn_toolbar(&mut commands, &theme);
    respawn_scene(
        &mut commands,
        &mut meshes,
        &mut materials,
        &store.0,
        &mut point_entities,
    );
    respawn_backdrop(
        &mut commands,
        &mut meshes,
        &mut materials,
        &store.0,
        &mut backdrop_entities,
    );
}

fn spawn_toolbar(commands: &mut Commands, theme: &ThemeColors) {
    let buttons: [(&str, Option<RenderMode>); 3] = [
        ("Points", Some(RenderMode::Points)),
        ("Lines", Some(RenderMode::Lines)),
        ("Vectors", Some(RenderMode::Vectors)),
    ];
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Px(30.0),
                justify_content: JustifyContent::FlexStart,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(theme.toolbar_bg),
        ))
        .insert(FocusPolicy::Block)
        .with_children(|parent| {
            for (label, mode) in buttons {
                let mut button = parent.spawn((
                    Button,
                    Node {
                        margin: UiRect::all(Val::Px(5.0)),
                        padding: UiRect::new(Val::Px(10.0), Val::Px(10.0), Val::Px(5.0), Val::Px(5.0)),
                        ..default()
                    },
                    BackgroundColor(theme.button_bg),
                ));
                button.with_children(|b| {
                    b.spawn((
                        Text::new(label),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(theme.text),
                    ));
                });
                if let Some(mode) = mode {
                    button.insert(ModeButton(mode));
                }
            }
            parent
                .spawn((
                    Button,
                    Node {
                        margin: UiRect::all(Val::Px(5.0)),
                        padding: UiRect::new(Val::Px(10.0), Val::Px(10.0), Val::Px(5.0), Val::Px(5.0)),
                        ..default()
                    },
                    BackgroundColor(theme.button_bg),
                ))
                .with_children(|b| {
                    b.spawn((
                        Text::new("Clear"),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(theme.text),
                    ));
                })
                .insert(ClearButton);
            parent
                .spawn((
                    Button,
                    Node {
                        margin: UiRect::all(Val::Px(5.0)),
                        padding: UiRect::new(Val::Px(10.0), Val::Px(10.0), Val::Px(5.0), Val::Px(5.0)),
                        ..default()
                    },
                    BackgroundColor(theme.button_bg),
                ))
                .with_children(|b| {
                    b.spawn((
                        Text::new("Open..."),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(theme.text),
                    ));
                })
                .insert(OpenButton);
        });
}

fn vec3(p: Point3) -> Vec3 {
    Vec3::new(p.x as f32, p.y as f32, p.z as f32)
}

fn line_mesh(topology: PrimitiveTopology, positions: Vec<[f32; 3]>) -> Mesh {
    Mesh::new(topology, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}

fn unlit(materials: &mut Assets<StandardMaterial>, color: Color) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: color,
        unlit: true,
        ..default()
    })
}

/// Marker and line colors per render mode, taken from the web UI palette.
fn mode_colors(mode: RenderMode) -> (Color, Color) {
    match mode {
        RenderMode::Points => (Color::srgb_u8(0x00, 0x2f, 0xff), Color::srgb_u8(0x00, 0x2f, 0xff)),
        RenderMode::Lines => (Color::srgb_u8(0xf9, 0x73, 0x16), Color::srgb_u8(0x63, 0x66, 0xf1)),
        RenderMode::Vectors => (Color::srgb_u8(0x14, 0xb8, 0xa6), Color::srgb_u8(0x14, 0xb8, 0xa6)),
    }
}

/// Tears down and rebuilds every point-derived entity from the composer
/// output.
fn respawn_scene(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    store: &PointStore,
    point_entities: &mut PointEntities,
) {
    for e in point_entities.0.drain(..) {
        commands.entity(e).despawn_recursive();
    }
    let (marker_color, line_color) = mode_colors(store.render_mode());
    let marker_mesh = meshes.add(Sphere::new(scene::MARKER_RADIUS as f32));
    let marker_material = unlit(materials, marker_color);
    let line_material = unlit(materials, line_color);

    for prim in scene::compose(store.points(), store.render_mode()) {
        let entity = match prim {
            ScenePrimitive::Marker { position } => commands
                .spawn((
                    Mesh3d(marker_mesh.clone()),
                    MeshMaterial3d(marker_material.clone()),
                    Transform::from_translation(vec3(position)),
                ))
                .id(),
            ScenePrimitive::Polyline { vertices } => {
                let positions: Vec<[f32; 3]> = vertices
                    .iter()
                    .map(|p| [p.x as f32, p.y as f32, p.z as f32])
                    .collect();
                commands
                    .spawn((
                        Mesh3d(meshes.add(line_mesh(PrimitiveTopology::LineStrip, positions))),
                        MeshMaterial3d(line_material.clone()),
                        Transform::default(),
                    ))
                    .id()
            }
            ScenePrimitive::Segment { line } => {
                let positions = vec![
                    [line.start.x as f32, line.start.y as f32, line.start.z as f32],
                    [line.end.x as f32, line.end.y as f32, line.end.z as f32],
                ];
                commands
                    .spawn((
                        Mesh3d(meshes.add(line_mesh(PrimitiveTopology::LineList, positions))),
                        MeshMaterial3d(line_material.clone()),
                        Transform::default(),
                    ))
                    .id()
            }
            ScenePrimitive::Arrowhead { position, yaw, pitch } => {
                let dir = Vec3::new(
                    (pitch.cos() * yaw.cos()) as f32,
                    (pitch.cos() * yaw.sin()) as f32,
                    pitch.sin() as f32,
                );
                commands
                    .spawn((
                        Mesh3d(meshes.add(Cone {
                            radius: scene::ARROWHEAD_RADIUS as f32,
                            height: scene::ARROWHEAD_LENGTH as f32,
                        })),
                        MeshMaterial3d(line_material.clone()),
                        Transform::from_translation(vec3(position))
                            .with_rotation(Quat::from_rotation_arc(Vec3::Y, dir)),
                    ))
                    .id()
            }
            // Backdrop primitives never come out of `compose`.
            other => {
                log::warn!("unexpected primitive from compose: {other:?}");
                continue;
            }
        };
        point_entities.0.push(entity);
    }
}

/// Rebuilds the grid planes, axis lines, axis labels and tick numerals.
/// Runs once at startup and again whenever an axis label changes.
fn respawn_backdrop(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    store: &PointStore,
    backdrop_entities: &mut BackdropEntities,
) {
    for e in backdrop_entities.0.drain(..) {
        commands.entity(e).despawn_recursive();
    }
    let grid_material = unlit(materials, Color::srgb(0.27, 0.27, 0.27));
    for prim in scene::backdrop(store.axis_labels()) {
        let entity = match prim {
            ScenePrimitive::GridPlane { normal } => {
                let positions = grid_plane_lines(normal);
                commands
                    .spawn((
                        Mesh3d(meshes.add(line_mesh(PrimitiveTopology::LineList, positions))),
                        MeshMaterial3d(grid_material.clone()),
                        Transform::default(),
                    ))
                    .id()
            }
            ScenePrimitive::AxisLine { axis, end } => {
                let positions = vec![[0.0, 0.0, 0.0], [end.x as f32, end.y as f32, end.z as f32]];
                commands
                    .spawn((
                        Mesh3d(meshes.add(line_mesh(PrimitiveTopology::LineList, positions))),
                        MeshMaterial3d(unlit(materials, axis_color(axis))),
                        Transform::default(),
                    ))
                    .id()
            }
            ScenePrimitive::AxisLabel { axis, text, position } => commands
                .spawn((
                    Text::new(text),
                    TextFont {
                        font_size: 16.0,
                        ..default()
                    },
                    TextColor(axis_color(axis)),
                    Node {
                        position_type: PositionType::Absolute,
                        ..default()
                    },
                    WorldLabel(vec3(position)),
                ))
                .id(),
            ScenePrimitive::Tick { value, position, .. } => commands
                .spawn((
                    Text::new(format!("{value:.0}")),
                    TextFont {
                        font_size: 10.0,
                        ..default()
                    },
                    TextColor(Color::srgb(0.6, 0.6, 0.6)),
                    Node {
                        position_type: PositionType::Absolute,
                        ..default()
                    },
                    WorldLabel(vec3(position)),
                ))
                .id(),
            other => {
                log::warn!("unexpected primitive from backdrop: {other:?}");
                continue;
            }
        };
        backdrop_entities.0.push(entity);
    }
}

fn axis_color(axis: Axis) -> Color {
    match axis {
        Axis::X => Color::srgb(0.9, 0.2, 0.2),
        Axis::Y => Color::srgb(0.2, 0.8, 0.2),
        Axis::Z => Color::srgb(0.25, 0.35, 0.95),
    }
}

/// Line-list vertices for one reference plane through the origin.
fn grid_plane_lines(normal: Axis) -> Vec<[f32; 3]> {
    let half = scene::GRID_EXTENT as f32 / 2.0;
    let step = scene::GRID_EXTENT as f32 / scene::GRID_DIVISIONS as f32;
    let mut positions = Vec::new();
    let mut push = |a: Vec3, b: Vec3| {
        positions.push([a.x, a.y, a.z]);
        positions.push([b.x, b.y, b.z]);
    };
    // The two in-plane axes for the given normal.
    let (u, v) = match normal {
        Axis::X => (Vec3::Y, Vec3::Z),
        Axis::Y => (Vec3::X, Vec3::Z),
        Axis::Z => (Vec3::X, Vec3::Y),
    };
    let mut offset = -half;
    while offset <= half + 1e-3 {
        push(u * offset - v * half, u * offset + v * half);
        push(v * offset - u * half, v * offset + u * half);
        offset += step;
    }
    positions
}

fn apply_store_events(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    events: Res<StoreEvents>,
    store: Res<VizStore>,
    mut rig: ResMut<CameraRig>,
    mut point_entities: ResMut<PointEntities>,
    mut backdrop_entities: ResMut<BackdropEntities>,
) {
    let mut points_dirty = false;
    let mut backdrop_dirty = false;
    for event in events.0.try_iter() {
        match event {
            StoreEvent::PointsChanged | StoreEvent::RenderModeChanged(_) => points_dirty = true,
            StoreEvent::AxisLabelsChanged => backdrop_dirty = true,
            StoreEvent::CameraModeChanged(mode) => rig.0.set_mode(mode),
        }
    }
    if points_dirty {
        respawn_scene(
            &mut commands,
            &mut meshes,
            &mut materials,
            &store.0,
            &mut point_entities,
        );
    }
    if backdrop_dirty {
        respawn_backdrop(
            &mut commands,
            &mut meshes,
            &mut materials,
            &store.0,
            &mut backdrop_entities,
        );
    }
}

fn handle_mode_buttons(
    interactions: Query<(&Interaction, &ModeButton), Changed<Interaction>>,
    mut store: ResMut<VizStore>,
) {
    for (interaction, button) in &interactions {
        if *interaction == Interaction::Pressed {
            store.0.set_render_mode(button.0);
        }
    }
}

fn handle_clear_button(
    interactions: Query<&Interaction, (Changed<Interaction>, With<ClearButton>)>,
    mut store: ResMut<VizStore>,
) {
    for interaction in &interactions {
        if *interaction == Interaction::Pressed {
            store.0.clear_all();
        }
    }
}

fn handle_open_button(
    interactions: Query<&Interaction, (Changed<Interaction>, With<OpenButton>)>,
    mut store: ResMut<VizStore>,
) {
    for interaction in &interactions {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("coordinate text", &["txt", "csv", "tsv"])
            .pick_file()
        else {
            continue;
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                // Tab-separated content is table rows; anything else goes
                // through the bracketed parser.
                if text.contains('\t') {
                    store.0.append_from_table(&text);
                } else {
                    store.0.replace_all_from_text(&text);
                }
            }
            Err(e) => log::warn!("failed to read {}: {}", path.display(), e),
        }
    }
}

fn handle_camera_keys(keys: Res<ButtonInput<KeyCode>>, mut store: ResMut<VizStore>) {
    if keys.just_pressed(KeyCode::KeyG) {
        let enable = store.0.camera_mode() != CameraMode::Orbit;
        store.0.set_grab_mode(enable);
    }
    if FLY_ENABLED && keys.just_pressed(KeyCode::KeyM) {
        let enable = store.0.camera_mode() != CameraMode::Fly;
        store.0.set_move_mode(enable);
    }
    if keys.just_pressed(KeyCode::Escape) {
        store.0.set_grab_mode(false);
        store.0.set_move_mode(false);
    }
}

fn orbit_camera_input(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion_evr: EventReader<MouseMotion>,
    mut wheel_evr: EventReader<MouseWheel>,
    mut rig: ResMut<CameraRig>,
) {
    if buttons.pressed(MouseButton::Left) {
        for ev in motion_evr.read() {
            rig.0.orbit_drag(ev.delta.x as f64, ev.delta.y as f64);
        }
    } else {
        motion_evr.clear();
    }
    for ev in wheel_evr.read() {
        rig.0.zoom_scroll(ev.y as f64);
    }
}

// Fly mode is feature-gated off; the bindings stay defined for when the
// control surface exposes it again.
fn fly_camera_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut motion_evr: EventReader<MouseMotion>,
    mut rig: ResMut<CameraRig>,
) {
    if !FLY_ENABLED {
        return;
    }
    let bindings = [
        (KeyCode::KeyW, FlyKey::Forward),
        (KeyCode::KeyS, FlyKey::Back),
        (KeyCode::KeyA, FlyKey::Left),
        (KeyCode::KeyD, FlyKey::Right),
        (KeyCode::Space, FlyKey::Up),
        (KeyCode::ShiftLeft, FlyKey::Down),
    ];
    for (code, key) in bindings {
        if keys.just_pressed(code) {
            rig.0.fly_key(key, true);
        }
        if keys.just_released(code) {
            rig.0.fly_key(key, false);
        }
    }
    for ev in motion_evr.read() {
        rig.0.look_drag(ev.delta.x as f64, ev.delta.y as f64);
    }
}

fn drive_camera(
    time: Res<Time>,
    mut rig: ResMut<CameraRig>,
    mut camera_q: Query<&mut Transform, With<MainCamera>>,
) {
    rig.0.tick(time.delta_secs() as f64);
    let mut transform = camera_q.single_mut();
    transform.translation = vec3(rig.0.eye_position());
    transform.look_at(vec3(rig.0.look_target()), Vec3::Z);
}

fn update_world_labels(
    camera_q: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut labels: Query<(&WorldLabel, &mut Node, &mut Visibility)>,
) {
    let Ok((camera, cam_tf)) = camera_q.get_single() else {
        return;
    };
    for (label, mut node, mut visibility) in &mut labels {
        match camera.world_to_viewport(cam_tf, label.0) {
            Ok(pos) => {
                node.left = Val::Px(pos.x);
                node.top = Val::Px(pos.y);
                *visibility = Visibility::Visible;
            }
            Err(_) => {
                *visibility = Visibility::Hidden;
            }
        }
    }
}

fn highlight_mode_buttons(
    store: Res<VizStore>,
    theme: Res<ThemeColors>,
    mut buttons: Query<(&ModeButton, &mut BackgroundColor)>,
) {
    for (button, mut color) in &mut buttons {
        *color = if button.0 == store.0.render_mode() {
            BackgroundColor(theme.button_active)
        } else {
            BackgroundColor(theme.button_bg)
        };
    }
}
