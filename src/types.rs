use bevy::prelude::*;

use crate::constants::*;

/// Marker for controllable squad units. Selection and move orders only ever
/// touch entities carrying this component.
#[derive(Component)]
pub struct Unit;

/// Selection highlight output flag, reconciled from [`SelectionState`] every
/// tick. Rendering reads it; the core never does.
#[derive(Component)]
pub struct Selected;

/// What a click on a unit does to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickSelectMode {
    /// Clear the selection and select the clicked unit alone.
    #[default]
    Replace,
    /// Add the clicked unit, or remove it if already selected, up to capacity.
    Toggle,
}

/// Tuning knobs for the squad controller.
#[derive(Resource, Clone)]
pub struct ControlConfig {
    pub click_mode: ClickSelectMode,
    /// Whether clicking empty ground drops the current selection. The source
    /// material disagreed with itself here, so it is an explicit flag.
    pub clear_on_empty_click: bool,
    pub selection_capacity: usize,
    pub formation_spacing: f32,
    pub unit_pick_radius: f32,
    /// A press longer than this is a drag, not a click.
    pub click_max_duration: f32,
    /// A press that travels further than this (pixels) is a drag, not a click.
    pub click_max_drag: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            click_mode: ClickSelectMode::default(),
            clear_on_empty_click: false,
            selection_capacity: SELECTION_CAPACITY,
            formation_spacing: FORMATION_SPACING,
            unit_pick_radius: UNIT_PICK_RADIUS,
            click_max_duration: CLICK_MAX_DURATION,
            click_max_drag: CLICK_MAX_DRAG,
        }
    }
}

/// Ordered selection set plus pointer-drag bookkeeping. The first entity is
/// the leader; insertion order decides follower slots.
#[derive(Resource, Default)]
pub struct SelectionState {
    pub selected: Vec<Entity>,
    pub press_screen: Option<Vec2>,
    pub pressed_at: f32,
}

impl SelectionState {
    pub fn leader(&self) -> Option<Entity> {
        self.selected.first().copied()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.selected.contains(&entity)
    }

    /// Drop entities that no longer pass the liveness check.
    pub fn prune(&mut self, mut alive: impl FnMut(Entity) -> bool) {
        self.selected.retain(|&e| alive(e));
    }

    /// Clear and select a single unit.
    pub fn replace_with(&mut self, entity: Entity) {
        self.selected.clear();
        self.selected.push(entity);
    }

    /// Add the unit, or remove it if present. Additions past `capacity` are
    /// silently ignored.
    pub fn toggle(&mut self, entity: Entity, capacity: usize) {
        if let Some(pos) = self.selected.iter().position(|&e| e == entity) {
            self.selected.remove(pos);
        } else if self.selected.len() < capacity {
            self.selected.push(entity);
        }
    }

    /// Replace the whole selection, truncated to `capacity`, keeping `units`
    /// order. Duplicates are dropped.
    pub fn replace_all(&mut self, units: impl IntoIterator<Item = Entity>, capacity: usize) {
        self.selected.clear();
        for entity in units {
            if self.selected.len() >= capacity {
                break;
            }
            if !self.selected.contains(&entity) {
                self.selected.push(entity);
            }
        }
    }
}

/// A commanded destination for the current selection, in world space.
#[derive(Event, Debug, Clone, Copy)]
pub struct MoveOrder {
    pub target: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: u32) -> Vec<Entity> {
        (0..n).map(Entity::from_raw).collect()
    }

    #[test]
    fn toggle_respects_capacity() {
        let e = entities(6);
        let mut state = SelectionState::default();
        for &unit in &e[..5] {
            state.toggle(unit, 4);
        }
        assert_eq!(state.selected, &e[..4], "fifth unit must be ignored");
    }

    #[test]
    fn toggle_twice_is_a_net_noop() {
        let e = entities(3);
        let mut state = SelectionState::default();
        state.replace_all(e.iter().copied(), 4);

        state.toggle(e[1], 4);
        state.toggle(e[1], 4);
        // Same membership; the re-added unit moves to the back of the order.
        assert_eq!(state.selected.len(), 3);
        for unit in &e {
            assert!(state.contains(*unit));
        }
    }

    #[test]
    fn replace_all_dedupes_and_truncates() {
        let e = entities(5);
        let mut state = SelectionState::default();
        state.replace_all([e[0], e[0], e[1], e[2], e[3], e[4]], 4);
        assert_eq!(state.selected, vec![e[0], e[1], e[2], e[3]]);
    }

    #[test]
    fn prune_keeps_order() {
        let e = entities(4);
        let mut state = SelectionState::default();
        state.replace_all(e.iter().copied(), 4);
        state.prune(|unit| unit != e[1]);
        assert_eq!(state.selected, vec![e[0], e[2], e[3]]);
        assert_eq!(state.leader(), Some(e[0]));
    }
}
