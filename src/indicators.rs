// Observable outputs for the rendering side: selection markers and one
// destination indicator per moving unit. Both are reconciled against the
// authoritative state every tick instead of being created and destroyed from
// scattered call sites.
use bevy::prelude::*;
use std::collections::HashSet;

use crate::constants::*;
use crate::movement::UnitMover;
use crate::types::{Selected, SelectionState, Unit};

/// Marker on a destination indicator entity, pointing back at the unit that
/// owns it.
#[derive(Component)]
pub struct TargetIndicator {
    pub unit: Entity,
}

/// Mirror the selection set into `Selected` markers on the units.
pub fn sync_selection_markers(
    mut commands: Commands,
    state: Res<SelectionState>,
    marked: Query<Entity, With<Selected>>,
    units: Query<Entity, With<Unit>>,
) {
    for entity in marked.iter() {
        if !state.contains(entity) {
            commands.entity(entity).remove::<Selected>();
        }
    }
    for entity in units.iter() {
        if state.contains(entity) && !marked.contains(entity) {
            commands.entity(entity).insert(Selected);
        }
    }
}

/// Keep exactly one indicator per unit with an active target: spawned when a
/// target appears, moved when it is superseded, despawned when the route
/// completes or fails.
pub fn sync_target_indicators(
    mut commands: Commands,
    movers: Query<(Entity, &UnitMover)>,
    mut indicators: Query<(Entity, &TargetIndicator, &mut Transform)>,
) {
    let mut covered = HashSet::new();
    for (entity, indicator, mut transform) in indicators.iter_mut() {
        match movers.get(indicator.unit).ok().and_then(|(_, m)| m.current_target()) {
            Some(target) => {
                transform.translation.x = target.x;
                transform.translation.y = target.y;
                covered.insert(indicator.unit);
            }
            None => {
                commands.entity(entity).despawn();
            }
        }
    }

    for (unit, mover) in movers.iter() {
        if covered.contains(&unit) {
            continue;
        }
        if let Some(target) = mover.current_target() {
            commands.spawn((
                Sprite::from_color(TARGET_INDICATOR_COLOR, Vec2::splat(TARGET_INDICATOR_SIZE)),
                Transform::from_translation(target.extend(0.0)),
                TargetIndicator { unit },
            ));
        }
    }
}
