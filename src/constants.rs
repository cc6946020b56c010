// Selection settings
pub const SELECTION_CAPACITY: usize = 4;            // Leader plus up to three followers
pub const UNIT_PICK_RADIUS: f32 = 20.0;             // How close to a unit center a click must land
pub const CLICK_MAX_DURATION: f32 = 0.2;            // Seconds before a press counts as a drag
pub const CLICK_MAX_DRAG: f32 = 5.0;                // Pixels of cursor travel before a press counts as a drag

// Formation settings
pub const FORMATION_SPACING: f32 = 48.0;            // World-unit gap between formation slots

// Movement settings
pub const DEFAULT_MOVE_SPEED: f32 = 160.0;          // World units per second

// Target indicator visuals
pub const TARGET_INDICATOR_SIZE: f32 = 12.0;
pub const TARGET_INDICATOR_COLOR: bevy::prelude::Color = bevy::prelude::Color::srgba(0.2, 1.0, 0.3, 0.6);

// Navigation grid defaults (sandbox scale: one cell per sprite tile)
pub const NAV_GRID_WIDTH: i32 = 40;
pub const NAV_GRID_HEIGHT: i32 = 24;
pub const NAV_CELL_SIZE: f32 = 32.0;
