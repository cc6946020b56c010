// Route oracle seam. Movers talk to pathfinding exclusively through the
// RouteRequest/RouteResolved events, so the grid adapter below can be swapped
// for any other producer (tests answer the events by hand).
use bevy::prelude::*;
use pathfinding::prelude::astar;
use std::fmt;

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// The oracle found no walkable route to the target.
    NoPath,
    /// Start or target lies outside the navigated area.
    OffGrid,
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPath => write!(f, "no walkable route to target"),
            Self::OffGrid => write!(f, "position outside the navigation grid"),
        }
    }
}

/// Fire-and-forget route request for one unit. Requests from different units
/// are independent; no ordering is guaranteed between their answers.
#[derive(Event, Debug, Clone, Copy)]
pub struct RouteRequest {
    pub unit: Entity,
    pub from: Vec2,
    pub to: Vec2,
    pub generation: u32,
}

/// Answer to a [`RouteRequest`], tagged with the request's generation so
/// superseded answers can be recognized and dropped.
#[derive(Event, Debug, Clone)]
pub struct RouteResolved {
    pub unit: Entity,
    pub generation: u32,
    pub result: Result<Vec<Vec2>, RouteError>,
}

/// Walkability grid the built-in oracle searches over. Cell (0, 0) sits at
/// `origin`; cells grow toward +x/+y.
#[derive(Resource)]
pub struct NavGrid {
    size: IVec2,
    cell_size: f32,
    origin: Vec2,
    blocked: Vec<bool>,
}

impl Default for NavGrid {
    fn default() -> Self {
        Self::centered(IVec2::new(NAV_GRID_WIDTH, NAV_GRID_HEIGHT), NAV_CELL_SIZE)
    }
}

impl NavGrid {
    pub fn new(size: IVec2, cell_size: f32, origin: Vec2) -> Self {
        Self {
            size,
            cell_size,
            origin,
            blocked: vec![false; (size.x * size.y) as usize],
        }
    }

    /// Grid of `size` cells with the world origin at its center.
    pub fn centered(size: IVec2, cell_size: f32) -> Self {
        let origin = -size.as_vec2() * cell_size * 0.5;
        Self::new(size, cell_size, origin)
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.x < self.size.x && cell.y >= 0 && cell.y < self.size.y
    }

    fn index(&self, cell: IVec2) -> usize {
        (cell.y * self.size.x + cell.x) as usize
    }

    pub fn set_blocked(&mut self, cell: IVec2, blocked: bool) {
        if self.in_bounds(cell) {
            let index = self.index(cell);
            self.blocked[index] = blocked;
        }
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_blocked(&self, cell: IVec2) -> bool {
        !self.in_bounds(cell) || self.blocked[self.index(cell)]
    }

    pub fn world_to_cell(&self, world: Vec2) -> IVec2 {
        ((world - self.origin) / self.cell_size).floor().as_ivec2()
    }

    pub fn cell_center(&self, cell: IVec2) -> Vec2 {
        self.origin + (cell.as_vec2() + 0.5) * self.cell_size
    }

    /// Walkable 8-neighborhood. Diagonal steps are only offered when both
    /// flanking orthogonal cells are free, so routes never cut corners.
    fn successors(&self, cell: IVec2) -> Vec<(IVec2, i32)> {
        let mut next = Vec::with_capacity(8);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let step = IVec2::new(dx, dy);
                let neighbor = cell + step;
                if self.is_blocked(neighbor) {
                    continue;
                }
                if dx != 0 && dy != 0 {
                    if self.is_blocked(cell + IVec2::new(dx, 0))
                        || self.is_blocked(cell + IVec2::new(0, dy))
                    {
                        continue;
                    }
                    next.push((neighbor, 14));
                } else {
                    next.push((neighbor, 10));
                }
            }
        }
        next
    }

    /// Compute a waypoint route between two world points. The final waypoint
    /// is the exact requested point, not the snapped cell center.
    pub fn find_route(&self, from: Vec2, to: Vec2) -> Result<Vec<Vec2>, RouteError> {
        let start = self.world_to_cell(from);
        let goal = self.world_to_cell(to);
        if !self.in_bounds(start) || !self.in_bounds(goal) {
            return Err(RouteError::OffGrid);
        }
        if self.is_blocked(goal) {
            return Err(RouteError::NoPath);
        }
        if start == goal {
            return Ok(vec![to]);
        }

        let octile = |cell: &IVec2| {
            let d = (*cell - goal).abs();
            let (lo, hi) = (d.x.min(d.y), d.x.max(d.y));
            14 * lo + 10 * (hi - lo)
        };

        let (cells, _cost) = astar(
            &start,
            |cell| self.successors(*cell),
            octile,
            |cell| *cell == goal,
        )
        .ok_or(RouteError::NoPath)?;

        let mut waypoints: Vec<Vec2> = cells[1..].iter().map(|c| self.cell_center(*c)).collect();
        if let Some(last) = waypoints.last_mut() {
            *last = to;
        }
        Ok(waypoints)
    }
}

/// The built-in oracle: answers every pending request against the grid.
/// Results arrive as events, never by mutating movers directly.
pub fn route_request_system(
    grid: Res<NavGrid>,
    mut requests: EventReader<RouteRequest>,
    mut resolved: EventWriter<RouteResolved>,
) {
    for request in requests.read() {
        resolved.write(RouteResolved {
            unit: request.unit,
            generation: request.generation,
            result: grid.find_route(request.from, request.to),
        });
    }
}
