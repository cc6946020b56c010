use bevy::prelude::*;
use rand::Rng;

use bevy_squad_control::constants::*;
use bevy_squad_control::movement::UnitMover;
use bevy_squad_control::pathing::NavGrid;
use bevy_squad_control::types::{Selected, Unit};
use bevy_squad_control::SquadControlPlugin;

const UNIT_COLOR: Color = Color::srgb(0.25, 0.55, 0.95);
const UNIT_SELECTED_COLOR: Color = Color::srgb(0.3, 1.0, 0.45);
const OBSTACLE_COLOR: Color = Color::srgb(0.35, 0.3, 0.28);
const UNIT_SIZE: f32 = 22.0;
const OBSTACLE_COUNT: usize = 60;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(SquadControlPlugin)
        .add_systems(Startup, setup_scene)
        .add_systems(Update, tint_selection)
        .run();
}

/// Camera, a four-unit squad along the bottom, and random obstacle tiles
/// mirrored into the navigation grid.
fn setup_scene(mut commands: Commands, mut grid: ResMut<NavGrid>) {
    commands.spawn(Camera2d);

    for i in 0..4 {
        commands.spawn((
            Unit,
            UnitMover::new(DEFAULT_MOVE_SPEED),
            Sprite::from_color(UNIT_COLOR, Vec2::splat(UNIT_SIZE)),
            Transform::from_xyz(-96.0 + i as f32 * 64.0, -300.0, 1.0),
        ));
    }

    let mut rng = rand::thread_rng();
    let mut placed = 0;
    while placed < OBSTACLE_COUNT {
        let cell = IVec2::new(
            rng.gen_range(0..grid.size().x),
            // Keep the spawn rows at the bottom of the map clear.
            rng.gen_range(4..grid.size().y),
        );
        if grid.is_blocked(cell) {
            continue;
        }
        grid.set_blocked(cell, true);
        commands.spawn((
            Sprite::from_color(OBSTACLE_COLOR, Vec2::splat(NAV_CELL_SIZE)),
            Transform::from_translation(grid.cell_center(cell).extend(0.0)),
        ));
        placed += 1;
    }

    info!("sandbox ready: left-click/drag to select, right-click to move");
}

fn tint_selection(mut units: Query<(&mut Sprite, Option<&Selected>), With<Unit>>) {
    for (mut sprite, selected) in units.iter_mut() {
        sprite.color = if selected.is_some() {
            UNIT_SELECTED_COLOR
        } else {
            UNIT_COLOR
        };
    }
}
