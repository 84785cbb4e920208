// Path interpreter: walks the route instruction by instruction, taking orders
// from people who flag the robot down while it drives.

use tracing::{debug, info, warn};

use crate::config::{
    CONFIRM_WINDOW_MS, DRIVING_POWER, ENCODER_DEG_TO_CM, PERSON_RANGE_CM, QUARTER_TURN_DEG,
    SECOND_MS,
};
use crate::fulfillment::FulfillmentEngine;
use crate::hal::{Button, Hal};
use crate::motion::MotionController;
use crate::orders::{ItemKind, OrderLedger, RunTotals};
use crate::route::{Instruction, Route};

/// Executes one pass over the route. Ledger, cumulative position and basket
/// state all start fresh, so build a new interpreter per pass.
pub struct PathInterpreter<'r> {
    route: &'r Route,
    motion: MotionController,
    ledger: OrderLedger,
    /// Distance covered by completed drive segments this pass, cm.
    total_path_cm: u32,
    basket_engaged: bool,
}

impl<'r> PathInterpreter<'r> {
    pub fn new(route: &'r Route, max_orders: usize) -> Self {
        Self {
            route,
            motion: MotionController::default(),
            ledger: OrderLedger::new(max_orders),
            total_path_cm: 0,
            basket_engaged: false,
        }
    }

    /// Runs every instruction in order, fulfilling orders at each checkpoint.
    /// Returns what was delivered during this pass.
    pub fn run_pass<H: Hal>(&mut self, hal: &mut H) -> RunTotals {
        let mut delivered = RunTotals::default();
        for (index, instruction) in self.route.instructions.iter().enumerate() {
            match *instruction {
                Instruction::Drive(distance) => self.drive_segment(hal, distance),
                Instruction::Turn(quarter_turns) => {
                    self.motion.turn(hal, QUARTER_TURN_DEG * quarter_turns);
                }
                Instruction::Checkpoint => {
                    delivered.record(self.ledger.snack_count(), self.ledger.water_count());
                    FulfillmentEngine::new(&self.motion).fulfil(
                        hal,
                        &self.route.instructions[..=index],
                        self.route.dropoff,
                        &mut self.ledger,
                        &mut self.basket_engaged,
                    );
                }
            }
            // Settle between instructions from a clean encoder reference.
            hal.reset_distance();
            hal.sleep_ms(SECOND_MS);
        }
        if !self.ledger.is_empty() {
            warn!(
                pending = self.ledger.len(),
                "pass ended with undelivered orders"
            );
        }
        delivered
    }

    /// Drives one segment at nominal power, polling for people along the way.
    /// Unlike the motion primitive this commands the motor pair directly, so
    /// travel can pause mid-segment for an order.
    fn drive_segment<H: Hal>(&mut self, hal: &mut H, distance_cm: i32) {
        if distance_cm <= 0 {
            return;
        }
        debug!(distance_cm, "drive segment");
        hal.reset_distance();
        hal.set_drive(DRIVING_POWER, DRIVING_POWER);
        while (hal.distance_deg() as f32) * ENCODER_DEG_TO_CM < distance_cm as f32 {
            if hal.proximity_cm() < PERSON_RANGE_CM {
                if self.ledger.is_full() {
                    warn!("order ledger full, rejecting request");
                    hal.show(6, "Sorry, too many orders.");
                    hal.sleep_ms(CONFIRM_WINDOW_MS);
                    hal.clear();
                } else {
                    hal.set_drive(0, 0);
                    self.capture_order(hal);
                    hal.set_drive(DRIVING_POWER, DRIVING_POWER);
                }
            }
        }
        hal.set_drive(0, 0);
        self.total_path_cm += distance_cm as u32;
    }

    /// Asks the stopped-for person to confirm and pick an item, recording the
    /// order at the current cumulative path position.
    fn capture_order<H: Hal>(&mut self, hal: &mut H) {
        hal.show(6, "Do you need assistance?");
        hal.show(8, "Activate the touch sensor if yes.");
        if !self.touch_confirmed(hal) {
            hal.clear();
            return;
        }
        hal.clear();

        hal.show(5, "Do you want a snack or water?");
        hal.show(7, "Left button for snack");
        hal.show(8, "Right button for water");
        let kind = loop {
            if hal.button_pressed(Button::Left) {
                break ItemKind::Snack;
            }
            if hal.button_pressed(Button::Right) {
                break ItemKind::Water;
            }
        };
        hal.clear();

        let position = self.total_path_cm + segment_position_cm(hal);
        if self.ledger.capture(position, kind).is_ok() {
            info!(position, ?kind, "order captured");
        }
        while hal.button_pressed(Button::Any) {}
        hal.sleep_ms(SECOND_MS);
    }

    /// Elapsed-time gate: true as soon as the touch sensor is pressed inside
    /// the confirmation window.
    fn touch_confirmed<H: Hal>(&self, hal: &mut H) -> bool {
        let started = hal.now_ms();
        while hal.now_ms() - started < CONFIRM_WINDOW_MS {
            if hal.touch_pressed() {
                return true;
            }
        }
        false
    }
}

fn segment_position_cm<H: Hal>(hal: &mut H) -> u32 {
    ((hal.distance_deg() as f32) * ENCODER_DEG_TO_CM).round() as u32
}
