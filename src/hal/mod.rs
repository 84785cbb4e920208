// Hardware capability layer
//
// The engine never touches motors or sensors directly; everything physical
// goes through the traits here. The interactive console robot and the
// deterministic test robot implement the same seams, so the control loops are
// byte-for-byte identical against real time and simulated time.

mod console;
mod sim;

pub use console::ConsoleRobot;
pub use sim::{JournalEvent, ScriptedPatron, SimRobot, SimScript};

/// Logical operator buttons on the robot's panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Enter,
    Left,
    Right,
    /// Matches any button at all.
    Any,
}

/// The drive motor pair and its distance feedback.
pub trait Chassis {
    /// Signed percent power for the left and right drive motors.
    fn set_drive(&mut self, left: i8, right: i8);
    /// Zeroes the wheel encoder reference.
    fn reset_distance(&mut self);
    /// Left wheel encoder, degrees turned since the last reset.
    fn distance_deg(&mut self) -> i32;
}

/// Single-axis heading feedback.
pub trait Gyro {
    /// Zeroes the heading reference.
    fn reset_heading(&mut self);
    /// Heading in degrees since the last reset, positive clockwise.
    fn heading_deg(&mut self) -> i32;
}

/// Sensing for people flagging the robot down along the route.
pub trait Bystander {
    /// Ultrasonic range to whatever is in front of the robot.
    fn proximity_cm(&mut self) -> f32;
    fn touch_pressed(&mut self) -> bool;
}

/// Operator display and buttons.
pub trait Panel {
    /// Shows a short prompt at a fixed display line.
    fn show(&mut self, line: u8, text: &str);
    fn clear(&mut self);
    fn button_pressed(&mut self, button: Button) -> bool;
}

/// Auxiliary lift motor and claw holding the snack basket.
pub trait Arm {
    fn set_lift(&mut self, power: i8);
    fn reset_lift(&mut self);
    /// Absolute claw position, 0 closed to 100 open.
    fn set_claw(&mut self, position: i8);
}

/// Time source for settle pauses and elapsed-time gates.
pub trait Clock {
    /// Monotonic milliseconds.
    fn now_ms(&mut self) -> u64;
    fn sleep_ms(&mut self, ms: u64);
}

/// Everything the engine needs from one robot.
pub trait Hal: Chassis + Gyro + Bystander + Panel + Arm + Clock {}

impl<T: Chassis + Gyro + Bystander + Panel + Arm + Clock> Hal for T {}
