// Closed-loop motion primitives
//
// drive() and turn() block until their feedback condition is met; they are the
// only operations besides the interpreter's polled segments that command the
// chassis. Both zero the encoder/heading references on entry, so each primitive
// starts from a clean frame.
//
// There are no motion timeouts: a stalled motor or disconnected sensor blocks
// forever. Known limitation of the platform, not detectable in software.

use tracing::debug;

use crate::config::{
    DRIVING_POWER, ENCODER_DEG_TO_CM, HEADING_TRIM, SECOND_MS, TURN_CREEP_DIVISOR, TURN_POWER,
};
use crate::hal::{Chassis, Clock, Gyro};

pub struct MotionController {
    drive_power: i8,
    turn_power: i8,
}

impl Default for MotionController {
    fn default() -> Self {
        Self {
            drive_power: DRIVING_POWER,
            turn_power: TURN_POWER,
        }
    }
}

impl MotionController {
    /// Drives forward `distance_cm`, trimming motor power whenever the heading
    /// has drifted off zero. Non-positive distances command no motion.
    pub fn drive<H: Chassis + Gyro + Clock>(&self, hal: &mut H, distance_cm: i32) {
        if distance_cm <= 0 {
            return;
        }
        debug!(distance_cm, "drive");
        hal.reset_distance();
        hal.sleep_ms(SECOND_MS);
        hal.reset_heading();
        hal.set_drive(self.drive_power, self.drive_power);
        while (hal.distance_deg() as f32) * ENCODER_DEG_TO_CM < distance_cm as f32 {
            let heading = hal.heading_deg();
            if heading > 0 {
                hal.set_drive(self.drive_power + HEADING_TRIM, self.drive_power - HEADING_TRIM);
            } else if heading < 0 {
                hal.set_drive(self.drive_power - HEADING_TRIM, self.drive_power + HEADING_TRIM);
            }
        }
        hal.set_drive(0, 0);
    }

    /// Rotates in place by `angle_deg`, positive clockwise. Spins at full turn
    /// power until the heading magnitude reaches the target, then creeps back
    /// in the opposite sense until the overshoot settles below it.
    pub fn turn<H: Chassis + Gyro>(&self, hal: &mut H, angle_deg: i32) {
        if angle_deg == 0 {
            return;
        }
        debug!(angle_deg, "turn");
        hal.reset_heading();
        let dir = angle_deg.signum() as i8;
        hal.set_drive(dir * self.turn_power, -dir * self.turn_power);
        while hal.heading_deg().abs() < angle_deg.abs() {}

        let creep = self.turn_power / TURN_CREEP_DIVISOR;
        hal.set_drive(-dir * creep, dir * creep);
        while hal.heading_deg().abs() > angle_deg.abs() {}
        hal.set_drive(0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{SimRobot, SimScript};

    #[test]
    fn drive_covers_commanded_distance() {
        let mut robot = SimRobot::new(SimScript::default());
        let motion = MotionController::default();
        motion.drive(&mut robot, 100);
        let (x, y, _) = robot.pose();
        let travelled = (x * x + y * y).sqrt();
        assert!((travelled - 100.0).abs() < 1.0, "travelled {travelled}");
    }

    #[test]
    fn turn_reaches_commanded_heading() {
        let mut robot = SimRobot::new(SimScript::default());
        let motion = MotionController::default();
        motion.turn(&mut robot, 90);
        let (_, _, heading) = robot.pose();
        assert!((heading - 90.0).abs() < 1.0, "heading {heading}");

        motion.turn(&mut robot, -90);
        let (_, _, heading) = robot.pose();
        assert!(heading.abs() < 1.0, "heading {heading}");
    }

    #[test]
    fn zero_angle_turn_commands_nothing() {
        let mut robot = SimRobot::new(SimScript::default());
        let motion = MotionController::default();
        motion.turn(&mut robot, 0);
        assert!(robot.journal().is_empty());
    }

    #[test]
    fn non_positive_drive_commands_nothing() {
        let mut robot = SimRobot::new(SimScript::default());
        let motion = MotionController::default();
        motion.drive(&mut robot, 0);
        motion.drive(&mut robot, -40);
        assert!(robot.journal().is_empty());
    }
}
