//! Point-and-click squad control for top-down 2D games.
//!
//! [`SquadControlPlugin`] wires together three pieces:
//! - an ordered, capacity-bounded selection set driven by click and
//!   drag-rectangle input ([`selection`]),
//! - formation move orders that give the leader the commanded point and
//!   followers a wedge behind it ([`formation`]),
//! - a per-unit waypoint-following state machine fed by an asynchronous route
//!   oracle ([`movement`], [`pathing`]).
//!
//! The per-tick pipeline runs in a fixed chain (input, order issuance, route
//! resolution, movement) so the whole flow from a click to the first movement
//! step lands inside one `Update`. Pathfinding is reached only through the
//! [`pathing::RouteRequest`] / [`pathing::RouteResolved`] events; the built-in
//! producer searches a [`pathing::NavGrid`], and anything else that answers
//! the events works just as well.

use bevy::prelude::*;

pub mod constants;
pub mod formation;
pub mod indicators;
pub mod movement;
pub mod pathing;
pub mod selection;
pub mod types;

pub use types::{ClickSelectMode, ControlConfig, MoveOrder, SelectionState};

pub struct SquadControlPlugin;

impl Plugin for SquadControlPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlConfig>()
            .init_resource::<SelectionState>()
            .init_resource::<pathing::NavGrid>()
            .add_event::<MoveOrder>()
            .add_event::<pathing::RouteRequest>()
            .add_event::<pathing::RouteResolved>()
            .add_systems(
                Update,
                (
                    selection::prune_selection,
                    selection::selection_input_system
                        .run_if(resource_exists::<ButtonInput<MouseButton>>),
                    selection::move_command_input_system
                        .run_if(resource_exists::<ButtonInput<MouseButton>>),
                    selection::issue_move_orders,
                    pathing::route_request_system,
                    movement::apply_route_results,
                    movement::advance_movers,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    indicators::sync_selection_markers,
                    indicators::sync_target_indicators,
                )
                    .after(movement::advance_movers),
            );
    }
}
