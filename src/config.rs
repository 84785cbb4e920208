// Tuning constants and command-line options
use std::path::PathBuf;

use clap::Parser;

// Drive motor power, signed percent
pub const DRIVING_POWER: i8 = 15;
// In-place turns run at driving power, then settle at a fraction of it
pub const TURN_POWER: i8 = 15;
pub const TURN_CREEP_DIVISOR: i8 = 5;
// Symmetric left/right power differential applied while heading is off zero
pub const HEADING_TRIM: i8 = 2;

// Auxiliary lift motor power for the basket arm
pub const ARM_POWER: i8 = 10;
// Claw positions, absolute
pub const CLAW_OPEN: i8 = 100;
pub const CLAW_CLOSED: i8 = 0;

// Wheel geometry: encoder degrees to centimetres of travel
pub const WHEEL_RADIUS_CM: f32 = 4.105;
pub const ENCODER_DEG_TO_CM: f32 = (std::f32::consts::PI / 180.0) * WHEEL_RADIUS_CM;

pub const FULL_TURN_DEG: i32 = 360;
pub const HALF_TURN_DEG: i32 = 180;
pub const QUARTER_TURN_DEG: i32 = 90;
// Cup carousel index angle between water fills
pub const WATER_INDEX_DEG: i32 = 120;

pub const SECOND_MS: u64 = 1000;
// Window in which a person can press the touch sensor to confirm a request
pub const CONFIRM_WINDOW_MS: u64 = 3 * SECOND_MS;
// Wait per cup while a person fills it
pub const WATER_FILL_MS: u64 = 5 * SECOND_MS;

// A person closer than this to the ultrasonic sensor counts as a request
pub const PERSON_RANGE_CM: f32 = 20.0;

pub const MAX_INSTRUCTIONS: usize = 30;
pub const MAX_ORDERS: usize = 30;

#[derive(Debug, Parser)]
#[command(name = "waiterbot-runtime", about = "Path-following service robot runtime")]
pub struct Cli {
    /// Route description file (drop-off offsets followed by instruction pairs)
    #[arg(long, default_value = "room_data.txt")]
    pub route: PathBuf,

    /// Where the delivery totals are written on exit
    #[arg(long, default_value = "totals.txt")]
    pub totals: PathBuf,

    /// Simulation tick length in milliseconds
    #[arg(long, default_value_t = 5)]
    pub tick_ms: u64,

    /// Dump the simulated robot's journal as JSON to this path on exit
    #[arg(long)]
    pub journal: Option<PathBuf>,

    /// Run fully scripted instead of with the interactive terminal panel
    #[arg(long)]
    pub headless: bool,
}
