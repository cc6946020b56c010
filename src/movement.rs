// Per-unit waypoint following. The state machine itself is plain data with
// pure methods; Bevy systems only feed it events and frame time.
use bevy::prelude::*;

use crate::pathing::{RouteError, RouteResolved};

/// Discretized 8-way facing reported for animation. Variant order matches the
/// sprite-sheet row indices the original art used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingBucket {
    #[default]
    South,
    SouthWest,
    West,
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
}

impl FacingBucket {
    /// Bucket a movement direction into one of eight compass headings.
    /// A zero direction keeps the caller's previous facing, so this returns
    /// South only as the final fallback.
    pub fn from_direction(direction: Vec2) -> Self {
        let angle = direction.y.atan2(direction.x).to_degrees();
        match angle {
            a if (-22.5..22.5).contains(&a) => Self::East,
            a if (22.5..67.5).contains(&a) => Self::NorthEast,
            a if (67.5..112.5).contains(&a) => Self::North,
            a if (112.5..157.5).contains(&a) => Self::NorthWest,
            a if !(-157.5..157.5).contains(&a) => Self::West,
            a if (-157.5..-112.5).contains(&a) => Self::SouthWest,
            a if (-112.5..-67.5).contains(&a) => Self::South,
            _ => Self::SouthEast,
        }
    }

    /// Animation row index (South = 0, counter-clockwise from there).
    pub fn animation_index(self) -> u8 {
        match self {
            Self::South => 0,
            Self::SouthWest => 1,
            Self::West => 2,
            Self::NorthWest => 3,
            Self::North => 4,
            Self::NorthEast => 5,
            Self::East => 6,
            Self::SouthEast => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum MoverState {
    #[default]
    Idle,
    /// A route request is in flight; the unit stands still until it resolves.
    AwaitingRoute,
    Following {
        route: Vec<Vec2>,
        waypoint: usize,
    },
}

/// Outcome of feeding a route result to a mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteResolution {
    Accepted,
    /// The result belonged to a request superseded by a newer target.
    Stale,
    Failed(RouteError),
}

/// Movement state machine for one unit. Targets come in through
/// [`UnitMover::set_target`], routes through [`UnitMover::resolve`], and
/// [`UnitMover::advance`] walks the unit along the waypoints once per tick.
#[derive(Component)]
pub struct UnitMover {
    pub speed: f32,
    state: MoverState,
    generation: u32,
    current_target: Option<Vec2>,
    last_direction: Vec2,
    facing: FacingBucket,
}

impl UnitMover {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            state: MoverState::Idle,
            generation: 0,
            current_target: None,
            last_direction: Vec2::NEG_Y,
            facing: FacingBucket::default(),
        }
    }

    /// Accept a new destination. Any route in flight or being followed is
    /// superseded; the returned generation must accompany the route request so
    /// late results for older targets can be told apart.
    pub fn set_target(&mut self, target: Vec2) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.state = MoverState::AwaitingRoute;
        self.current_target = Some(target);
        self.generation
    }

    /// Feed back a route result from the pathfinding oracle.
    pub fn resolve(
        &mut self,
        generation: u32,
        result: Result<Vec<Vec2>, RouteError>,
    ) -> RouteResolution {
        if generation != self.generation || self.state != MoverState::AwaitingRoute {
            return RouteResolution::Stale;
        }
        match result {
            Ok(route) => {
                self.state = MoverState::Following { route, waypoint: 0 };
                RouteResolution::Accepted
            }
            Err(err) => {
                // A dead request must not leave the unit waiting forever.
                self.state = MoverState::Idle;
                self.current_target = None;
                RouteResolution::Failed(err)
            }
        }
    }

    /// Walk one tick along the active route. Snaps onto a waypoint instead of
    /// overshooting it; leftover step is not carried into the next segment.
    pub fn advance(&mut self, position: Vec2, dt: f32) -> Vec2 {
        let MoverState::Following { route, waypoint } = &mut self.state else {
            return position;
        };

        let Some(&next) = route.get(*waypoint) else {
            self.finish();
            return position;
        };

        let step = self.speed * dt;
        let offset = next - position;
        let distance = offset.length();

        let direction = offset.normalize_or_zero();
        if direction != Vec2::ZERO {
            self.last_direction = direction;
            self.facing = FacingBucket::from_direction(direction);
        }

        if distance <= step {
            *waypoint += 1;
            if *waypoint >= route.len() {
                self.finish();
            }
            next
        } else {
            position + direction * step
        }
    }

    fn finish(&mut self) {
        self.state = MoverState::Idle;
        self.current_target = None;
    }

    pub fn state(&self) -> &MoverState {
        &self.state
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, MoverState::Following { .. })
    }

    /// The destination recorded by the most recent `set_target`, cleared when
    /// the route completes or fails.
    pub fn current_target(&self) -> Option<Vec2> {
        self.current_target
    }

    /// Last non-zero movement direction; used as the formation facing for
    /// orders issued on top of the leader.
    pub fn last_direction(&self) -> Vec2 {
        self.last_direction
    }

    pub fn facing(&self) -> FacingBucket {
        self.facing
    }
}

/// Apply resolved routes to their movers, discarding results that were
/// superseded while the oracle was working.
pub fn apply_route_results(
    mut resolved: EventReader<RouteResolved>,
    mut movers: Query<&mut UnitMover>,
) {
    for event in resolved.read() {
        let Ok(mut mover) = movers.get_mut(event.unit) else {
            continue;
        };
        match mover.resolve(event.generation, event.result.clone()) {
            RouteResolution::Accepted => {}
            RouteResolution::Stale => {
                debug!("discarding stale route for {:?}", event.unit);
            }
            RouteResolution::Failed(err) => {
                warn!("route for {:?} failed: {}", event.unit, err);
            }
        }
    }
}

/// Per-tick drive of every mover that is following a route.
pub fn advance_movers(time: Res<Time>, mut movers: Query<(&mut Transform, &mut UnitMover)>) {
    let dt = time.delta_secs();
    for (mut transform, mut mover) in movers.iter_mut() {
        if !mover.is_moving() {
            continue;
        }
        let position = transform.translation.truncate();
        let next = mover.advance(position, dt);
        transform.translation.x = next.x;
        transform.translation.y = next.y;
    }
}
