// Selection and command handling. The set mutations are pure functions over
// already-projected points; the systems at the bottom only do the
// screen/world projection and input plumbing.
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::formation::plan_formation;
use crate::movement::UnitMover;
use crate::pathing::RouteRequest;
use crate::types::{ClickSelectMode, ControlConfig, MoveOrder, SelectionState, Unit};

/// Axis-aligned (min, max) corners of the drag rectangle, independent of
/// which corner the drag started from.
pub fn rect_from_corners(a: Vec2, b: Vec2) -> (Vec2, Vec2) {
    (a.min(b), a.max(b))
}

/// Strict interior test; points on the border do not count.
pub fn strictly_inside(point: Vec2, min: Vec2, max: Vec2) -> bool {
    point.x > min.x && point.x < max.x && point.y > min.y && point.y < max.y
}

/// Nearest unit within `radius` of a world point, if any.
pub fn pick_unit(
    world: Vec2,
    candidates: impl IntoIterator<Item = (Entity, Vec2)>,
    radius: f32,
) -> Option<Entity> {
    let mut closest = None;
    let mut closest_distance = radius;
    for (entity, position) in candidates {
        let distance = position.distance(world);
        if distance < closest_distance {
            closest_distance = distance;
            closest = Some(entity);
        }
    }
    closest
}

/// Apply a click to the selection: replace or toggle on a hit, and on empty
/// ground do what the configured policy says.
pub fn apply_click_selection(
    state: &mut SelectionState,
    hit: Option<Entity>,
    config: &ControlConfig,
) {
    match hit {
        Some(unit) => match config.click_mode {
            ClickSelectMode::Replace => state.replace_with(unit),
            ClickSelectMode::Toggle => state.toggle(unit, config.selection_capacity),
        },
        None => {
            if config.clear_on_empty_click {
                state.selected.clear();
            }
        }
    }
}

/// Replace the selection with every candidate strictly inside the rectangle,
/// truncated to capacity in candidate order. An empty match leaves the
/// previous selection untouched. Returns the number of units that matched.
pub fn apply_rect_selection(
    state: &mut SelectionState,
    corner_a: Vec2,
    corner_b: Vec2,
    candidates: impl IntoIterator<Item = (Entity, Vec2)>,
    capacity: usize,
) -> usize {
    let (min, max) = rect_from_corners(corner_a, corner_b);
    let matched: Vec<Entity> = candidates
        .into_iter()
        .filter(|(_, position)| strictly_inside(*position, min, max))
        .map(|(entity, _)| entity)
        .collect();
    if matched.is_empty() {
        return 0;
    }
    let count = matched.len();
    state.replace_all(matched, capacity);
    count
}

/// Drop despawned units from the selection before anything uses it.
pub fn prune_selection(mut state: ResMut<SelectionState>, units: Query<(), With<Unit>>) {
    state.prune(|entity| units.contains(entity));
}

/// Left-button handling: a short, near-stationary press is a click select, a
/// longer or travelled press is a box select over the screen projections.
pub fn selection_input_system(
    mouse: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    config: Res<ControlConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    units: Query<(Entity, &Transform), With<Unit>>,
    mut state: ResMut<SelectionState>,
) {
    let Ok(window) = windows.single() else { return };
    let Ok((camera, camera_transform)) = cameras.single() else { return };
    let Some(cursor) = window.cursor_position() else { return };

    if mouse.just_pressed(MouseButton::Left) {
        state.press_screen = Some(cursor);
        state.pressed_at = time.elapsed_secs();
    }

    if mouse.just_released(MouseButton::Left) {
        let Some(press) = state.press_screen.take() else { return };
        let duration = time.elapsed_secs() - state.pressed_at;
        let travel = cursor.distance(press);

        if duration <= config.click_max_duration && travel <= config.click_max_drag {
            let Ok(world) = camera.viewport_to_world_2d(camera_transform, cursor) else {
                return;
            };
            let hit = pick_unit(
                world,
                units
                    .iter()
                    .map(|(entity, transform)| (entity, transform.translation.truncate())),
                config.unit_pick_radius,
            );
            apply_click_selection(&mut state, hit, &config);
            if let Some(unit) = hit {
                info!("clicked {:?}, {} selected", unit, state.selected.len());
            }
        } else {
            let candidates = units.iter().filter_map(|(entity, transform)| {
                camera
                    .world_to_viewport(camera_transform, transform.translation)
                    .ok()
                    .map(|screen| (entity, screen))
            });
            let matched =
                apply_rect_selection(&mut state, press, cursor, candidates, config.selection_capacity);
            if matched > 0 {
                info!("box selected {} units", state.selected.len());
            }
        }
    }
}

/// Right-click issues a move order at the cursor's world point.
pub fn move_command_input_system(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    state: Res<SelectionState>,
    mut orders: EventWriter<MoveOrder>,
) {
    if !mouse.just_pressed(MouseButton::Right) || state.selected.is_empty() {
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Ok((camera, camera_transform)) = cameras.single() else { return };
    let Some(cursor) = window.cursor_position() else { return };
    let Ok(target) = camera.viewport_to_world_2d(camera_transform, cursor) else {
        return;
    };
    orders.write(MoveOrder { target });
}

/// Turn each move order into per-unit formation targets and route requests.
/// The leader gets the commanded point exactly; followers get the wedge
/// offsets along the leader's approach direction.
pub fn issue_move_orders(
    mut orders: EventReader<MoveOrder>,
    config: Res<ControlConfig>,
    mut state: ResMut<SelectionState>,
    mut units: Query<(&Transform, &mut UnitMover), With<Unit>>,
    mut requests: EventWriter<RouteRequest>,
) {
    for order in orders.read() {
        state.prune(|entity| units.contains(entity));
        let Some(leader) = state.leader() else {
            continue;
        };
        let Ok((leader_transform, leader_mover)) = units.get(leader) else {
            continue;
        };
        let targets = plan_formation(
            order.target,
            leader_transform.translation.truncate(),
            leader_mover.last_direction(),
            config.formation_spacing,
            state.selected.len(),
        );

        info!(
            "move order to ({:.1}, {:.1}) for {} units",
            order.target.x,
            order.target.y,
            state.selected.len()
        );

        for (&unit, &target) in state.selected.iter().zip(targets.iter()) {
            let Ok((transform, mut mover)) = units.get_mut(unit) else {
                continue;
            };
            let generation = mover.set_target(target);
            requests.write(RouteRequest {
                unit,
                from: transform.translation.truncate(),
                to: target,
                generation,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: u32) -> Vec<Entity> {
        (0..n).map(Entity::from_raw).collect()
    }

    fn config() -> ControlConfig {
        ControlConfig::default()
    }

    #[test]
    fn rect_normalization_is_corner_order_independent() {
        let e = entities(1);
        let candidates = [(e[0], Vec2::new(5.0, 5.0))];
        let mut forward = SelectionState::default();
        let mut backward = SelectionState::default();
        apply_rect_selection(&mut forward, Vec2::ZERO, Vec2::splat(10.0), candidates, 4);
        apply_rect_selection(&mut backward, Vec2::splat(10.0), Vec2::ZERO, candidates, 4);
        assert_eq!(forward.selected, backward.selected);
        assert_eq!(forward.selected, e);
    }

    #[test]
    fn border_points_are_outside() {
        let e = entities(3);
        let candidates = [
            (e[0], Vec2::new(0.0, 5.0)),  // on the left edge
            (e[1], Vec2::new(5.0, 10.0)), // on the top edge
            (e[2], Vec2::new(5.0, 5.0)),  // interior
        ];
        let mut state = SelectionState::default();
        apply_rect_selection(&mut state, Vec2::ZERO, Vec2::splat(10.0), candidates, 4);
        assert_eq!(state.selected, vec![e[2]]);
    }

    #[test]
    fn empty_rect_preserves_previous_selection() {
        let e = entities(2);
        let mut state = SelectionState::default();
        state.replace_all([e[0]], 4);
        let matched = apply_rect_selection(
            &mut state,
            Vec2::ZERO,
            Vec2::splat(1.0),
            [(e[1], Vec2::new(50.0, 50.0))],
            4,
        );
        assert_eq!(matched, 0);
        assert_eq!(state.selected, vec![e[0]], "empty drags must not clear");
    }

    #[test]
    fn rect_selection_caps_at_capacity_in_candidate_order() {
        let e = entities(6);
        let candidates: Vec<_> = e
            .iter()
            .enumerate()
            .map(|(i, &entity)| (entity, Vec2::new(1.0 + i as f32, 1.0)))
            .collect();
        let mut state = SelectionState::default();
        let matched =
            apply_rect_selection(&mut state, Vec2::ZERO, Vec2::new(100.0, 2.0), candidates, 4);
        assert_eq!(matched, 6);
        assert_eq!(state.selected, &e[..4]);
    }

    #[test]
    fn replace_click_selects_exactly_one() {
        let e = entities(3);
        let mut state = SelectionState::default();
        state.replace_all(e.iter().copied(), 4);
        apply_click_selection(&mut state, Some(e[2]), &config());
        assert_eq!(state.selected, vec![e[2]]);
    }

    #[test]
    fn toggle_click_on_selected_unit_deselects_it() {
        let e = entities(2);
        let mut cfg = config();
        cfg.click_mode = ClickSelectMode::Toggle;
        let mut state = SelectionState::default();
        state.replace_all(e.iter().copied(), 4);

        apply_click_selection(&mut state, Some(e[0]), &cfg);
        assert_eq!(state.selected, vec![e[1]]);
        // A second toggle reselects: two clicks net the original membership.
        apply_click_selection(&mut state, Some(e[0]), &cfg);
        assert!(state.contains(e[0]) && state.contains(e[1]));
    }

    #[test]
    fn empty_click_policy_is_explicit() {
        let e = entities(1);

        let mut keep = SelectionState::default();
        keep.replace_all([e[0]], 4);
        apply_click_selection(&mut keep, None, &config());
        assert_eq!(keep.selected, vec![e[0]], "default keeps the selection");

        let mut cfg = config();
        cfg.clear_on_empty_click = true;
        let mut clear = SelectionState::default();
        clear.replace_all([e[0]], 4);
        apply_click_selection(&mut clear, None, &cfg);
        assert!(clear.selected.is_empty());
    }

    #[test]
    fn pick_unit_takes_the_nearest_within_radius() {
        let e = entities(3);
        let candidates = [
            (e[0], Vec2::new(3.0, 0.0)),
            (e[1], Vec2::new(1.0, 0.0)),
            (e[2], Vec2::new(100.0, 0.0)),
        ];
        assert_eq!(pick_unit(Vec2::ZERO, candidates, 5.0), Some(e[1]));
        assert_eq!(pick_unit(Vec2::new(200.0, 0.0), candidates, 5.0), None);
    }
}
