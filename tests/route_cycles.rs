// Full-route scenarios against the deterministic simulated robot.

use waiterbot_runtime::config::{MAX_ORDERS, TURN_POWER};
use waiterbot_runtime::fulfillment::replay_reverse;
use waiterbot_runtime::hal::{JournalEvent, ScriptedPatron, SimRobot, SimScript};
use waiterbot_runtime::motion::MotionController;
use waiterbot_runtime::orders::{ItemKind, RunTotals};
use waiterbot_runtime::route::{Dropoff, Instruction, Route};
use waiterbot_runtime::runtime::run_route;

use waiterbot_runtime::route::Instruction::{Checkpoint, Drive, Turn};

const POSITION_TOLERANCE_CM: f32 = 3.0;
const HEADING_TOLERANCE_DEG: f32 = 3.0;

fn route(dropoff: (i32, i32), instructions: Vec<Instruction>) -> Route {
    Route {
        dropoff: Dropoff {
            x: dropoff.0,
            y: dropoff.1,
        },
        instructions,
    }
}

fn patron(at_trip_cm: f32, kind: ItemKind) -> ScriptedPatron {
    ScriptedPatron {
        at_trip_cm,
        kind,
        responds: true,
    }
}

/// Trip positions of every prompt containing `needle`, in order.
fn prompt_trips(journal: &[JournalEvent], needle: &str) -> Vec<f32> {
    journal
        .iter()
        .filter_map(|event| match event {
            JournalEvent::Prompt { text, trip_cm, .. } if text.contains(needle) => Some(*trip_cm),
            _ => None,
        })
        .collect()
}

/// Number of full-power in-place rotations commanded (one per turn primitive).
fn coarse_turns(journal: &[JournalEvent]) -> usize {
    journal
        .iter()
        .filter(|event| match event {
            JournalEvent::Drive { left, right } => *left == -*right && left.abs() == TURN_POWER,
            _ => false,
        })
        .count()
}

fn heading_error_deg(heading: f32) -> f32 {
    let wrapped = heading.rem_euclid(360.0);
    wrapped.min(360.0 - wrapped)
}

fn assert_at_origin(robot: &SimRobot) {
    let (x, y, heading) = robot.pose();
    assert!(
        x.abs() < POSITION_TOLERANCE_CM && y.abs() < POSITION_TOLERANCE_CM,
        "ended at ({x}, {y})"
    );
    assert!(
        heading_error_deg(heading) < HEADING_TOLERANCE_DEG,
        "ended with heading {heading}"
    );
}

#[test]
fn reverse_replay_returns_to_start_pose() {
    let mut robot = SimRobot::new(SimScript::default());
    let motion = MotionController::default();
    let instructions = [Drive(60), Turn(1), Drive(40), Turn(-2)];

    for instruction in &instructions {
        match *instruction {
            Drive(distance) => motion.drive(&mut robot, distance),
            Turn(quarter_turns) => motion.turn(&mut robot, 90 * quarter_turns),
            Checkpoint => {}
        }
    }
    motion.turn(&mut robot, 180);
    replay_reverse(&mut robot, &motion, &instructions);
    motion.turn(&mut robot, 180);

    assert_at_origin(&robot);
}

#[test]
fn checkpoint_without_orders_is_a_noop() {
    let run = |instructions: Vec<Instruction>| {
        let mut robot = SimRobot::new(SimScript::default());
        let totals = run_route(&mut robot, &route((10, 10), instructions), MAX_ORDERS);
        (totals, robot)
    };

    let (totals, with_checkpoint) = run(vec![Drive(100), Checkpoint]);
    let (_, without_checkpoint) = run(vec![Drive(100)]);

    assert_eq!(totals, RunTotals::default());
    // An orderless checkpoint leaves no trace: same commands, same prompts.
    assert_eq!(with_checkpoint.journal(), without_checkpoint.journal());
}

#[test]
fn orders_are_redelivered_at_capture_positions() {
    let script = SimScript {
        patrons: vec![patron(30.0, ItemKind::Water), patron(90.0, ItemKind::Water)],
        repeat_replies: vec![],
    };
    let mut robot = SimRobot::new(script);
    let totals = run_route(&mut robot, &route((10, 10), vec![Drive(120), Checkpoint]), MAX_ORDERS);

    assert_eq!(totals, RunTotals { snacks: 0, waters: 2 });

    let captures = prompt_trips(robot.journal(), "Do you need assistance?");
    assert_eq!(captures.len(), 2);
    assert!((captures[0] - 30.0).abs() < POSITION_TOLERANCE_CM);
    assert!((captures[1] - 90.0).abs() < POSITION_TOLERANCE_CM);

    // Forward replay starts after 120 cm out and 120 cm back: deliveries land
    // at trip 240 + 30 and 240 + 90, in capture order.
    let deliveries = prompt_trips(robot.journal(), "Please take your water.");
    assert_eq!(deliveries.len(), 2);
    assert!((deliveries[0] - 270.0).abs() < POSITION_TOLERANCE_CM, "{deliveries:?}");
    assert!((deliveries[1] - 330.0).abs() < POSITION_TOLERANCE_CM, "{deliveries:?}");
    assert!(prompt_trips(robot.journal(), "Please take your snack.").is_empty());
}

fn water_run(count: usize) -> (RunTotals, SimRobot) {
    let patrons = (0..count)
        .map(|i| patron(5.0 + 5.0 * i as f32, ItemKind::Water))
        .collect();
    let script = SimScript {
        patrons,
        repeat_replies: vec![],
    };
    let mut robot = SimRobot::new(script);
    let totals = run_route(&mut robot, &route((10, 10), vec![Drive(50), Checkpoint]), MAX_ORDERS);
    (totals, robot)
}

#[test]
fn water_dispensing_rotations_close_back_to_zero() {
    // One water: no index rotation and a zero-angle closing rotation, so the
    // only turns are the two fulfillment half turns and the two return-leg
    // half turns.
    let (totals, robot) = water_run(1);
    assert_eq!(totals, RunTotals { snacks: 0, waters: 1 });
    assert_eq!(coarse_turns(robot.journal()), 4);
    assert_at_origin(&robot);

    // Four waters: three 120-degree index rotations sum to a full circle, so
    // the closing rotation is again zero.
    let (totals, robot) = water_run(4);
    assert_eq!(totals, RunTotals { snacks: 0, waters: 4 });
    assert_eq!(coarse_turns(robot.journal()), 7);
    assert_at_origin(&robot);

    // Three waters: two index rotations plus a -240 closing rotation.
    let (totals, robot) = water_run(3);
    assert_eq!(totals, RunTotals { snacks: 0, waters: 3 });
    assert_eq!(coarse_turns(robot.journal()), 7);
    assert_at_origin(&robot);
}

#[test]
fn end_to_end_single_water_order() {
    let script = SimScript {
        patrons: vec![patron(40.0, ItemKind::Water)],
        repeat_replies: vec![],
    };
    let mut robot = SimRobot::new(script);
    let totals = run_route(
        &mut robot,
        &route((10, 10), vec![Drive(100), Checkpoint, Turn(1)]),
        MAX_ORDERS,
    );

    assert_eq!(totals, RunTotals { snacks: 0, waters: 1 });

    // Delivery lands 40 cm into the forward replay, after 100 cm out and back.
    let deliveries = prompt_trips(robot.journal(), "Please take your water.");
    assert_eq!(deliveries.len(), 1);
    assert!((deliveries[0] - 240.0).abs() < POSITION_TOLERANCE_CM, "{deliveries:?}");

    // No snacks: the arm never runs.
    assert!(!robot
        .journal()
        .iter()
        .any(|event| matches!(event, JournalEvent::Claw { .. })));

    // Checkpoint half turn, no-snack half turn, the route's quarter turn, and
    // the three return-leg turns. K=1 means no water rotations at all.
    assert_eq!(coarse_turns(robot.journal()), 6);
    assert_at_origin(&robot);
}

#[test]
fn basket_is_primed_once_then_refilled_by_hand() {
    let script = SimScript {
        // The second patron flags the robot down 10 cm into the second
        // segment: 50 out, 50 back, 40 around the drop-off, 50 forward again.
        patrons: vec![patron(20.0, ItemKind::Snack), patron(200.0, ItemKind::Snack)],
        repeat_replies: vec![],
    };
    let mut robot = SimRobot::new(script);
    let totals = run_route(
        &mut robot,
        &route(
            (10, 10),
            vec![Drive(50), Checkpoint, Drive(50), Checkpoint],
        ),
        MAX_ORDERS,
    );

    assert_eq!(totals, RunTotals { snacks: 2, waters: 0 });

    // The arm grabs the basket at the first checkpoint only; the second one
    // asks a person to refill it instead.
    let claw_events: Vec<_> = robot
        .journal()
        .iter()
        .filter(|event| matches!(event, JournalEvent::Claw { .. }))
        .collect();
    assert_eq!(claw_events.len(), 2);
    assert_eq!(prompt_trips(robot.journal(), "Please fill basket").len(), 1);

    let deliveries = prompt_trips(robot.journal(), "Please take your snack.");
    assert_eq!(deliveries.len(), 2);
    assert!((deliveries[0] - 160.0).abs() < POSITION_TOLERANCE_CM, "{deliveries:?}");
    assert_at_origin(&robot);
}

#[test]
fn full_ledger_rejects_requests_without_stopping() {
    let script = SimScript {
        patrons: vec![
            patron(10.0, ItemKind::Water),
            patron(20.0, ItemKind::Water),
            patron(30.0, ItemKind::Water),
        ],
        repeat_replies: vec![],
    };
    let mut robot = SimRobot::new(script);
    let totals = run_route(&mut robot, &route((10, 10), vec![Drive(60), Checkpoint]), 2);

    assert_eq!(totals, RunTotals { snacks: 0, waters: 2 });
    assert_eq!(prompt_trips(robot.journal(), "Sorry, too many orders.").len(), 1);
    assert_eq!(prompt_trips(robot.journal(), "Please take your water.").len(), 2);
}

#[test]
fn unconfirmed_request_times_out_without_capture() {
    let script = SimScript {
        patrons: vec![ScriptedPatron {
            at_trip_cm: 10.0,
            kind: ItemKind::Water,
            responds: false,
        }],
        repeat_replies: vec![],
    };
    let mut robot = SimRobot::new(script);
    let totals = run_route(&mut robot, &route((10, 10), vec![Drive(50), Checkpoint]), MAX_ORDERS);

    assert_eq!(totals, RunTotals::default());
    assert_eq!(prompt_trips(robot.journal(), "Do you need assistance?").len(), 1);
    assert!(prompt_trips(robot.journal(), "Do you want a snack or water?").is_empty());
    assert!(prompt_trips(robot.journal(), "Please take your").is_empty());
    assert_at_origin(&robot);
}

#[test]
fn zero_dropoff_axis_skips_that_leg() {
    let script = SimScript {
        patrons: vec![patron(15.0, ItemKind::Snack)],
        repeat_replies: vec![],
    };
    let mut robot = SimRobot::new(script);
    let totals = run_route(&mut robot, &route((0, 10), vec![Drive(50), Checkpoint]), MAX_ORDERS);

    assert_eq!(totals, RunTotals { snacks: 1, waters: 0 });
    assert_eq!(prompt_trips(robot.journal(), "Please take your snack.").len(), 1);
    assert_at_origin(&robot);
}

#[test]
fn repeated_passes_accumulate_totals() {
    let script = SimScript {
        patrons: vec![patron(10.0, ItemKind::Water)],
        repeat_replies: vec![true],
    };
    let mut robot = SimRobot::new(script);
    let totals = run_route(&mut robot, &route((10, 10), vec![Drive(40), Checkpoint]), MAX_ORDERS);

    assert_eq!(totals, RunTotals { snacks: 0, waters: 1 });
    assert_eq!(prompt_trips(robot.journal(), "Would you like to repeat").len(), 2);
    assert_at_origin(&robot);
}
