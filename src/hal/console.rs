// Interactive robot: simulated chassis with a real terminal panel
//
// Motion runs against the same physics as the test robot, so a desk run
// behaves exactly like the test suite; the operator's display and buttons are
// a raw-mode terminal. Arrow keys and Enter are the panel buttons, `p` plays
// a person stepping in front of the ultrasonic sensor, `t` the touch sensor.

use std::io::{self, Stdout, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use tracing::warn;

use crate::hal::{
    Arm, Button, Bystander, Chassis, Clock, Gyro, JournalEvent, Panel, SimRobot, SimScript,
};

const PERSON_NEAR_CM: f32 = 10.0;
const PERSON_CLEAR_CM: f32 = 100.0;

struct ConsolePanel {
    out: Stdout,
    pending: Option<KeyCode>,
}

impl ConsolePanel {
    fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(Self { out, pending: None })
    }

    /// Polls the terminal briefly and latches the most recent key press.
    fn pump(&mut self) {
        if let Ok(true) = event::poll(Duration::from_millis(10))
            && let Ok(Event::Key(key)) = event::read()
            && key.kind == KeyEventKind::Press
        {
            self.pending = Some(key.code);
        }
    }

    fn take(&mut self, wanted: KeyCode) -> bool {
        if self.pending == Some(wanted) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    fn put(&mut self, line: u8, text: &str) {
        let result = execute!(
            self.out,
            MoveTo(0, line as u16),
            Clear(ClearType::CurrentLine),
            Print(text)
        );
        if let Err(e) = result {
            warn!("display write failed: {e}");
        }
    }

    fn wipe(&mut self) {
        if let Err(e) = execute!(self.out, Clear(ClearType::All), MoveTo(0, 0)) {
            warn!("display clear failed: {e}");
        }
    }
}

impl Drop for ConsolePanel {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to restore terminal: {e}");
        }
    }
}

pub struct ConsoleRobot {
    sim: SimRobot,
    panel: ConsolePanel,
    started: Instant,
}

impl ConsoleRobot {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            sim: SimRobot::new(SimScript::default()),
            panel: ConsolePanel::new()?,
            started: Instant::now(),
        })
    }

    pub fn journal(&self) -> &[JournalEvent] {
        self.sim.journal()
    }
}

impl Chassis for ConsoleRobot {
    fn set_drive(&mut self, left: i8, right: i8) {
        self.sim.set_drive(left, right);
    }

    fn reset_distance(&mut self) {
        self.sim.reset_distance();
    }

    fn distance_deg(&mut self) -> i32 {
        self.sim.distance_deg()
    }
}

impl Gyro for ConsoleRobot {
    fn reset_heading(&mut self) {
        self.sim.reset_heading();
    }

    fn heading_deg(&mut self) -> i32 {
        self.sim.heading_deg()
    }
}

impl Bystander for ConsoleRobot {
    fn proximity_cm(&mut self) -> f32 {
        self.panel.pump();
        if self.panel.take(KeyCode::Char('p')) {
            PERSON_NEAR_CM
        } else {
            PERSON_CLEAR_CM
        }
    }

    fn touch_pressed(&mut self) -> bool {
        self.panel.pump();
        self.panel.take(KeyCode::Char('t'))
    }
}

impl Panel for ConsoleRobot {
    fn show(&mut self, line: u8, text: &str) {
        self.panel.put(line, text);
    }

    fn clear(&mut self) {
        self.panel.wipe();
    }

    fn button_pressed(&mut self, button: Button) -> bool {
        self.panel.pump();
        match button {
            Button::Enter => self.panel.take(KeyCode::Enter),
            Button::Left => self.panel.take(KeyCode::Left),
            Button::Right => self.panel.take(KeyCode::Right),
            Button::Any => self.panel.pending.take().is_some(),
        }
    }
}

impl Arm for ConsoleRobot {
    fn set_lift(&mut self, power: i8) {
        self.sim.set_lift(power);
    }

    fn reset_lift(&mut self) {
        self.sim.reset_lift();
    }

    fn set_claw(&mut self, position: i8) {
        self.sim.set_claw(position);
    }
}

impl Clock for ConsoleRobot {
    fn now_ms(&mut self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn sleep_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}
