// Order fulfillment: at a checkpoint the robot backtracks to the path origin,
// restocks at the drop-off point, then re-traverses the route handing each
// order over at the spot it was captured.

use tracing::{debug, info};

use crate::config::{
    ARM_POWER, CLAW_CLOSED, CLAW_OPEN, DRIVING_POWER, ENCODER_DEG_TO_CM, FULL_TURN_DEG,
    HALF_TURN_DEG, QUARTER_TURN_DEG, SECOND_MS, WATER_FILL_MS, WATER_INDEX_DEG,
};
use crate::hal::{Button, Chassis, Clock, Gyro, Hal};
use crate::motion::MotionController;
use crate::orders::{ItemKind, OrderLedger};
use crate::route::{Dropoff, Instruction};

/// Replays traversed instructions backwards: drives keep their magnitude,
/// turns are negated. Undoes the net displacement of the traversal.
pub fn replay_reverse<H: Chassis + Gyro + Clock>(
    hal: &mut H,
    motion: &MotionController,
    instructions: &[Instruction],
) {
    for instruction in instructions.iter().rev() {
        match *instruction {
            Instruction::Drive(distance) => motion.drive(hal, distance),
            Instruction::Turn(quarter_turns) => {
                motion.turn(hal, -QUARTER_TURN_DEG * quarter_turns);
            }
            Instruction::Checkpoint => {}
        }
    }
}

pub struct FulfillmentEngine<'m> {
    motion: &'m MotionController,
}

impl<'m> FulfillmentEngine<'m> {
    pub fn new(motion: &'m MotionController) -> Self {
        Self { motion }
    }

    /// Runs the whole backtrack / dispense / redeliver cycle for one
    /// checkpoint. `traversed` is the route prefix up to and including the
    /// checkpoint instruction. With no pending orders the checkpoint is a
    /// no-op. On return the ledger is empty and the robot is back at the
    /// checkpoint, facing along the route.
    pub fn fulfil<H: Hal>(
        &self,
        hal: &mut H,
        traversed: &[Instruction],
        dropoff: Dropoff,
        ledger: &mut OrderLedger,
        basket_engaged: &mut bool,
    ) {
        if ledger.is_empty() {
            debug!("checkpoint reached with no orders");
            return;
        }
        let waters = ledger.water_count();
        let snacks = ledger.snack_count();
        info!(waters, snacks, "fulfilling orders");

        self.motion.turn(hal, HALF_TURN_DEG);
        replay_reverse(hal, self.motion, traversed);

        if waters > 0 {
            self.dispense_water(hal, waters);
        }
        if snacks > 0 {
            self.restock_basket(hal, dropoff, basket_engaged);
        } else {
            // Match the half turn the snack leg would have cost, so the
            // forward replay starts from the expected heading.
            self.motion.turn(hal, HALF_TURN_DEG);
        }

        self.redeliver(hal, traversed, ledger);
        ledger.clear();
    }

    /// One fill wait per cup, indexing the carousel between cups, then a
    /// closing rotation back to the starting orientation.
    fn dispense_water<H: Hal>(&self, hal: &mut H, count: u32) {
        info!(count, "dispensing water");
        for index in 0..count {
            let started = hal.now_ms();
            while hal.now_ms() - started < WATER_FILL_MS {}
            if index != count - 1 {
                self.motion.turn(hal, WATER_INDEX_DEG);
            }
        }
        let indexed = (count as i32 - 1) * WATER_INDEX_DEG;
        self.motion.turn(hal, -(indexed % FULL_TURN_DEG));
    }

    /// Navigates to the drop-off offset, engages or refills the basket, and
    /// retraces the offset back to the path origin. A zero offset on either
    /// axis skips that leg entirely. The leg nets a half turn, leaving the
    /// robot facing along the route.
    fn restock_basket<H: Hal>(&self, hal: &mut H, dropoff: Dropoff, basket_engaged: &mut bool) {
        let Dropoff { x, y } = dropoff;
        debug!(x, y, "navigating to drop-off");

        self.motion.turn(hal, QUARTER_TURN_DEG * x.signum());
        self.motion.drive(hal, x.abs());
        self.motion.turn(hal, -QUARTER_TURN_DEG * (x * y).signum());
        self.motion.drive(hal, y.abs());
        if y < 0 {
            self.motion.turn(hal, HALF_TURN_DEG);
        }

        if *basket_engaged {
            hal.show(7, "Please fill basket with snacks.");
            hal.show(8, "Press ENTER when finished.");
            while !hal.button_pressed(Button::Enter) {}
            while hal.button_pressed(Button::Enter) {}
            hal.clear();
        } else {
            self.prime_arm(hal);
            *basket_engaged = true;
        }

        if y > 0 {
            self.motion.turn(hal, HALF_TURN_DEG);
        }
        self.motion.drive(hal, y.abs());
        self.motion.turn(hal, QUARTER_TURN_DEG * (x * y).signum());
        self.motion.drive(hal, x.abs());
        self.motion.turn(hal, -QUARTER_TURN_DEG * x.signum());
    }

    /// One-time grab of the snack basket: lower the arm, open the claw around
    /// the handle, lift, and close.
    fn prime_arm<H: Hal>(&self, hal: &mut H) {
        info!("priming basket arm");
        hal.reset_lift();
        hal.set_lift(-ARM_POWER);
        hal.sleep_ms(SECOND_MS / 2);
        hal.reset_lift();
        hal.set_lift(0);

        hal.sleep_ms(SECOND_MS);
        hal.set_claw(CLAW_OPEN);

        hal.set_lift(ARM_POWER);
        hal.sleep_ms(SECOND_MS / 2);
        hal.set_lift(0);
        hal.sleep_ms(SECOND_MS);
        hal.set_claw(CLAW_CLOSED);
    }

    /// Replays the traversed prefix forward, stopping to hand an order over
    /// whenever the replayed cumulative distance reaches its recorded
    /// position. Orders are handed out in capture order.
    fn redeliver<H: Hal>(&self, hal: &mut H, traversed: &[Instruction], ledger: &OrderLedger) {
        let mut pending = ledger.iter();
        let mut next = pending.next();
        let mut total_cm: u32 = 0;

        for instruction in traversed {
            match *instruction {
                Instruction::Drive(distance) => {
                    hal.reset_distance();
                    hal.set_drive(DRIVING_POWER, DRIVING_POWER);
                    while (hal.distance_deg() as f32) * ENCODER_DEG_TO_CM < distance as f32 {
                        if let Some(order) = next {
                            let here = total_cm
                                + ((hal.distance_deg() as f32) * ENCODER_DEG_TO_CM).round() as u32;
                            if here >= order.path_position {
                                hal.set_drive(0, 0);
                                self.hand_over(hal, order.kind);
                                hal.set_drive(DRIVING_POWER, DRIVING_POWER);
                                next = pending.next();
                            }
                        }
                    }
                    hal.set_drive(0, 0);
                    total_cm += distance.max(0) as u32;
                }
                Instruction::Turn(quarter_turns) => {
                    self.motion.turn(hal, QUARTER_TURN_DEG * quarter_turns);
                }
                Instruction::Checkpoint => {}
            }
        }
    }

    /// Stops until the person takes their item; two Enter presses are
    /// required so a stray press does not resume the route early.
    fn hand_over<H: Hal>(&self, hal: &mut H, kind: ItemKind) {
        info!(?kind, "handing order over");
        match kind {
            ItemKind::Water => hal.show(4, "Please take your water."),
            ItemKind::Snack => hal.show(4, "Please take your snack."),
        }
        hal.show(6, "After, press ENTER.");
        while !hal.button_pressed(Button::Enter) {}
        while !hal.button_pressed(Button::Enter) {}
        hal.clear();
        hal.sleep_ms(SECOND_MS);
    }
}
