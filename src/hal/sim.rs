// Deterministic simulated robot
//
// Every sensor or clock read advances the world by one fixed tick, so the
// engine's busy-poll loops consume simulated time instead of wall-clock time.
// Wheel powers integrate into encoder degrees, heading and a 2-D pose; a
// journal records motor commands and prompts so tests can assert on them.

use std::collections::VecDeque;

use serde::Serialize;

use crate::config::ENCODER_DEG_TO_CM;
use crate::hal::{Arm, Button, Bystander, Chassis, Clock, Gyro, Panel};
use crate::orders::ItemKind;

const DEFAULT_TICK_MS: u64 = 5;

/// Wheel travel per power unit per second, cm.
const CM_PER_POWER_SECOND: f32 = 1.0;
/// Heading change per power unit of left/right differential per second, deg.
const DEG_PER_POWER_SECOND: f32 = 1.5;

/// Ultrasonic reading with and without a person in front.
const RANGE_NEAR_CM: f32 = 10.0;
const RANGE_CLEAR_CM: f32 = 100.0;

/// A patron who flagged the robot down but was never served walks away.
const PATRON_PATIENCE_MS: u64 = 10_000;

/// A person standing along the route who flags the robot down.
///
/// `at_trip_cm` is measured on the robot's forward trip odometer (total
/// forward travel since power-on, including fulfillment backtracks), so
/// patrons must be listed in trigger order.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedPatron {
    pub at_trip_cm: f32,
    pub kind: ItemKind,
    /// Whether the patron presses the touch sensor inside the confirmation
    /// window.
    pub responds: bool,
}

/// Scripted world for one simulated run.
#[derive(Debug, Clone, Default)]
pub struct SimScript {
    pub patrons: Vec<ScriptedPatron>,
    /// Answers to the end-of-pass repeat prompt, first pass first; once
    /// exhausted the operator chooses to stop.
    pub repeat_replies: Vec<bool>,
}

/// Everything observable the simulated robot did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalEvent {
    Drive { left: i8, right: i8 },
    Prompt { line: u8, text: String, trip_cm: f32 },
    DisplayCleared,
    Lift { power: i8 },
    Claw { position: i8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatronPhase {
    /// Flagged the robot down, not yet confirmed via the touch sensor.
    Confirming,
    /// Confirmed, now picking an item with the panel buttons.
    Choosing,
}

#[derive(Debug)]
struct ActivePatron {
    kind: ItemKind,
    responds: bool,
    phase: PatronPhase,
    since_ms: u64,
}

pub struct SimRobot {
    tick_ms: u64,
    clock_ms: u64,
    left_power: i8,
    right_power: i8,
    encoder: f32,
    encoder_zero: f32,
    heading: f32,
    heading_zero: f32,
    x_cm: f32,
    y_cm: f32,
    trip: f32,
    patrons: VecDeque<ScriptedPatron>,
    active: Option<ActivePatron>,
    repeat_replies: VecDeque<bool>,
    enter_down: bool,
    any_down: bool,
    journal: Vec<JournalEvent>,
}

impl SimRobot {
    pub fn new(script: SimScript) -> Self {
        Self::with_tick(script, DEFAULT_TICK_MS)
    }

    pub fn with_tick(script: SimScript, tick_ms: u64) -> Self {
        Self {
            tick_ms,
            clock_ms: 0,
            left_power: 0,
            right_power: 0,
            encoder: 0.0,
            encoder_zero: 0.0,
            heading: 0.0,
            heading_zero: 0.0,
            x_cm: 0.0,
            y_cm: 0.0,
            trip: 0.0,
            patrons: script.patrons.into(),
            active: None,
            repeat_replies: script.repeat_replies.into(),
            enter_down: false,
            any_down: false,
            journal: Vec::new(),
        }
    }

    /// World pose: x, y in centimetres and absolute heading in degrees,
    /// clockwise positive. Never reset by the engine.
    pub fn pose(&self) -> (f32, f32, f32) {
        (self.x_cm, self.y_cm, self.heading)
    }

    /// Total forward travel since power-on, cm.
    pub fn trip_cm(&self) -> f32 {
        self.trip
    }

    pub fn journal(&self) -> &[JournalEvent] {
        &self.journal
    }

    fn step(&mut self) {
        self.advance(self.tick_ms);
    }

    fn advance(&mut self, ms: u64) {
        let dt = ms as f32 / 1000.0;
        let left_cm = self.left_power as f32 * CM_PER_POWER_SECOND * dt;
        let right_cm = self.right_power as f32 * CM_PER_POWER_SECOND * dt;
        let forward_cm = (left_cm + right_cm) / 2.0;
        let differential = (self.left_power as i32 - self.right_power as i32) as f32;

        self.clock_ms += ms;
        self.encoder += left_cm / ENCODER_DEG_TO_CM;
        self.heading += differential * DEG_PER_POWER_SECOND * dt;

        let heading_rad = self.heading.to_radians();
        self.x_cm += forward_cm * heading_rad.cos();
        self.y_cm += forward_cm * heading_rad.sin();
        if self.left_power > 0 && self.right_power > 0 {
            self.trip += forward_cm;
        }

        if let Some(active) = &self.active
            && active.phase == PatronPhase::Confirming
            && self.clock_ms - active.since_ms > PATRON_PATIENCE_MS
        {
            self.active = None;
        }
    }

    fn choosing(&self) -> Option<ItemKind> {
        match &self.active {
            Some(a) if a.phase == PatronPhase::Choosing => Some(a.kind),
            _ => None,
        }
    }
}

impl Chassis for SimRobot {
    fn set_drive(&mut self, left: i8, right: i8) {
        if (left, right) != (self.left_power, self.right_power) {
            self.journal.push(JournalEvent::Drive { left, right });
            self.left_power = left;
            self.right_power = right;
        }
    }

    fn reset_distance(&mut self) {
        self.encoder_zero = self.encoder;
    }

    fn distance_deg(&mut self) -> i32 {
        self.step();
        // Hardware counters report whole degrees; truncate like they do.
        (self.encoder - self.encoder_zero) as i32
    }
}

impl Gyro for SimRobot {
    fn reset_heading(&mut self) {
        self.heading_zero = self.heading;
    }

    fn heading_deg(&mut self) -> i32 {
        self.step();
        (self.heading - self.heading_zero) as i32
    }
}

impl Bystander for SimRobot {
    fn proximity_cm(&mut self) -> f32 {
        self.step();
        // A patron flags the robot down exactly once; afterwards the range
        // reads clear so travel can resume past them.
        let due = self.active.is_none()
            && self
                .patrons
                .front()
                .is_some_and(|patron| self.trip >= patron.at_trip_cm);
        if due && let Some(patron) = self.patrons.pop_front() {
            self.active = Some(ActivePatron {
                kind: patron.kind,
                responds: patron.responds,
                phase: PatronPhase::Confirming,
                since_ms: self.clock_ms,
            });
            return RANGE_NEAR_CM;
        }
        RANGE_CLEAR_CM
    }

    fn touch_pressed(&mut self) -> bool {
        self.step();
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.phase != PatronPhase::Confirming {
            return false;
        }
        if active.responds {
            active.phase = PatronPhase::Choosing;
            true
        } else {
            self.active = None;
            false
        }
    }
}

impl Panel for SimRobot {
    fn show(&mut self, line: u8, text: &str) {
        self.journal.push(JournalEvent::Prompt {
            line,
            text: text.to_string(),
            trip_cm: self.trip,
        });
    }

    fn clear(&mut self) {
        self.journal.push(JournalEvent::DisplayCleared);
    }

    fn button_pressed(&mut self, button: Button) -> bool {
        self.step();
        match button {
            // Presses read as one press followed by a release.
            Button::Enter => {
                self.enter_down = !self.enter_down;
                self.enter_down
            }
            Button::Left => {
                if let Some(kind) = self.choosing() {
                    kind == ItemKind::Snack
                } else if self.repeat_replies.front().copied() == Some(true) {
                    self.repeat_replies.pop_front();
                    true
                } else {
                    false
                }
            }
            Button::Right => {
                if let Some(kind) = self.choosing() {
                    kind == ItemKind::Water
                } else {
                    match self.repeat_replies.front().copied() {
                        Some(false) => {
                            self.repeat_replies.pop_front();
                            true
                        }
                        Some(true) => false,
                        // No scripted replies left: the operator stops the run.
                        None => true,
                    }
                }
            }
            Button::Any => {
                if self.choosing().is_some() {
                    // The served patron lets go of the panel and leaves.
                    self.active = None;
                    return false;
                }
                self.any_down = !self.any_down;
                self.any_down
            }
        }
    }
}

impl Arm for SimRobot {
    fn set_lift(&mut self, power: i8) {
        self.journal.push(JournalEvent::Lift { power });
    }

    fn reset_lift(&mut self) {}

    fn set_claw(&mut self, position: i8) {
        self.journal.push(JournalEvent::Claw { position });
    }
}

impl Clock for SimRobot {
    fn now_ms(&mut self) -> u64 {
        self.step();
        self.clock_ms
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.advance(ms);
    }
}
