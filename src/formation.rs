// Formation target math. Pure functions so the offset table is testable
// without any ECS scaffolding.
use bevy::prelude::*;

/// Offset of follower slot `slot` (1-based, leader excluded) relative to the
/// commanded point, for a squad facing `direction`.
///
/// Slots 1 and 2 flank one row behind the leader, slot 3 sits two rows
/// directly behind. Slots past 3 keep stacking centered rows, which is the
/// natural extension for configs that raise the capacity.
pub fn follower_offset(slot: usize, direction: Vec2, spacing: f32) -> Vec2 {
    let (row, side) = match slot {
        1 => (1.0, -1.0),
        2 => (1.0, 1.0),
        3 => (2.0, 0.0),
        n => ((n - 1) as f32, 0.0),
    };
    // perp() is (-y, x): the squad's left-hand side.
    -direction * spacing * row + direction.perp() * side * spacing * row
}

/// Per-unit targets for a move order: element 0 is exactly `target` (the
/// leader), followers get the offset table applied along the approach
/// direction. A degenerate order (target on top of the leader) falls back to
/// the leader's current facing so followers still line up behind something.
pub fn plan_formation(
    target: Vec2,
    leader_pos: Vec2,
    leader_facing: Vec2,
    spacing: f32,
    count: usize,
) -> Vec<Vec2> {
    let mut direction = (target - leader_pos).normalize_or_zero();
    if direction == Vec2::ZERO {
        direction = leader_facing.normalize_or_zero();
    }
    if direction == Vec2::ZERO {
        direction = Vec2::NEG_Y;
    }

    let mut targets = Vec::with_capacity(count);
    for slot in 0..count {
        if slot == 0 {
            targets.push(target);
        } else {
            targets.push(target + follower_offset(slot, direction, spacing));
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn leader_gets_the_exact_point() {
        let targets = plan_formation(Vec2::new(3.5, -7.25), Vec2::ZERO, Vec2::X, 2.0, 4);
        assert_eq!(targets[0], Vec2::new(3.5, -7.25));
    }

    #[test]
    fn three_unit_wedge_matches_the_table() {
        // Leader at origin ordered to (10, 0): direction (1, 0), perp (0, 1).
        let targets = plan_formation(Vec2::new(10.0, 0.0), Vec2::ZERO, Vec2::X, 1.0, 3);
        assert!(close(targets[1], Vec2::new(9.0, -1.0)), "left flank: {:?}", targets[1]);
        assert!(close(targets[2], Vec2::new(9.0, 1.0)), "right flank: {:?}", targets[2]);
    }

    #[test]
    fn fourth_unit_sits_two_rows_straight_behind() {
        let targets = plan_formation(Vec2::new(10.0, 0.0), Vec2::ZERO, Vec2::X, 1.0, 4);
        assert!(close(targets[3], Vec2::new(8.0, 0.0)), "rear slot: {:?}", targets[3]);
    }

    #[test]
    fn wedge_rotates_with_the_approach_direction() {
        // Ordered straight up: perp of (0, 1) is (-1, 0).
        let targets = plan_formation(Vec2::new(0.0, 10.0), Vec2::ZERO, Vec2::X, 2.0, 3);
        assert!(close(targets[1], Vec2::new(2.0, 8.0)), "{:?}", targets[1]);
        assert!(close(targets[2], Vec2::new(-2.0, 8.0)), "{:?}", targets[2]);
    }

    #[test]
    fn zero_direction_falls_back_to_facing() {
        // Target equals the leader position; offsets must follow the facing.
        let targets = plan_formation(Vec2::ZERO, Vec2::ZERO, Vec2::Y, 1.0, 3);
        assert!(close(targets[1], Vec2::new(1.0, -1.0)), "{:?}", targets[1]);
        assert!(close(targets[2], Vec2::new(-1.0, -1.0)), "{:?}", targets[2]);
    }
}
