// Run controller: owns the pass loop, the unconditional return to start, the
// operator repeat prompt, and totals persistence.

use std::fs;
use std::path::Path;

use tracing::{error, info};

use crate::config::{Cli, HALF_TURN_DEG, MAX_ORDERS};
use crate::fulfillment::replay_reverse;
use crate::hal::{Button, ConsoleRobot, Hal, SimRobot, SimScript};
use crate::interpreter::PathInterpreter;
use crate::motion::MotionController;
use crate::orders::RunTotals;
use crate::route::{Route, RouteError};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("route error: {0}")]
    Route(#[from] RouteError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode journal: {0}")]
    Journal(#[from] serde_json::Error),
}

pub fn run(cli: &Cli) -> Result<(), RunError> {
    if cli.headless {
        let mut robot = SimRobot::with_tick(SimScript::default(), cli.tick_ms);
        let result = drive_run(&mut robot, cli);
        if let Some(path) = &cli.journal {
            fs::write(path, serde_json::to_string_pretty(robot.journal())?)?;
        }
        result.map(|_| ())
    } else {
        let mut robot = ConsoleRobot::new()?;
        let result = drive_run(&mut robot, cli);
        if let Some(path) = &cli.journal {
            fs::write(path, serde_json::to_string_pretty(robot.journal())?)?;
        }
        result.map(|_| ())
    }
}

fn drive_run<H: Hal>(hal: &mut H, cli: &Cli) -> Result<RunTotals, RunError> {
    let route = match Route::load(&cli.route) {
        Ok(route) => route,
        Err(e) => {
            error!("failed to load route: {e}");
            hal.show(6, "File could not be opened.");
            hal.show(8, "Press any button to exit.");
            while !hal.button_pressed(Button::Any) {}
            while hal.button_pressed(Button::Any) {}
            hal.clear();
            return Err(e.into());
        }
    };
    info!(instructions = route.instructions.len(), "route loaded");

    let totals = run_route(hal, &route, MAX_ORDERS);
    write_totals(&cli.totals, totals)?;
    info!(snacks = totals.snacks, waters = totals.waters, "run complete");
    Ok(totals)
}

/// Runs passes over the route until the operator declines to repeat.
pub fn run_route<H: Hal>(hal: &mut H, route: &Route, max_orders: usize) -> RunTotals {
    let motion = MotionController::default();
    let mut totals = RunTotals::default();
    loop {
        info!("starting pass");
        let mut interpreter = PathInterpreter::new(route, max_orders);
        totals.fold(interpreter.run_pass(hal));

        // Back to the literal start pose, however many checkpoints fired.
        motion.turn(hal, HALF_TURN_DEG);
        replay_reverse(hal, &motion, &route.instructions);
        motion.turn(hal, HALF_TURN_DEG);

        if !operator_wants_repeat(hal) {
            break;
        }
    }
    totals
}

fn operator_wants_repeat<H: Hal>(hal: &mut H) -> bool {
    hal.show(5, "Would you like to repeat");
    hal.show(6, "the path?");
    hal.show(8, "Left button for yes");
    hal.show(9, "Right button for no");
    let repeat = loop {
        if hal.button_pressed(Button::Left) {
            break true;
        }
        if hal.button_pressed(Button::Right) {
            break false;
        }
    };
    hal.clear();
    repeat
}

fn write_totals(path: &Path, totals: RunTotals) -> std::io::Result<()> {
    let report = format!(
        "{} snacks were given\n{} waters were given",
        totals.snacks, totals.waters
    );
    fs::write(path, report)
}
