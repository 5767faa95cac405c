//! Display adapter.
//!
//! [`compose`] lays a [`DisplayFrame`] out as the text lines of a 128×64
//! monochrome panel (21 columns × 8 rows with the 6×8 font).  The panel
//! driver itself is an external collaborator; [`LogDisplay`] mirrors the
//! composed screen to the log so bench runs show what the panel shows.

use core::fmt::Write;

use log::debug;

use crate::app::ports::{DisplayFrame, DisplayPort};

pub const COLUMNS: usize = 21;
pub const ROWS: usize = 8;

pub type Line = heapless::String<COLUMNS>;
pub type Screen = heapless::Vec<Line, ROWS>;

/// Render `frame` into screen lines.  Overlong values are truncated.
pub fn compose(frame: &DisplayFrame) -> Screen {
    let mut screen = Screen::new();
    let mut push = |args: core::fmt::Arguments<'_>| {
        let mut line = Line::new();
        // A full line stops the write; the truncated prefix is kept.
        let _ = line.write_fmt(args);
        let _ = screen.push(line);
    };

    push(format_args!("Temp: {:.1} C", frame.temperature_c));
    push(format_args!("Hum:  {:.0} %", frame.humidity_pct));
    push(format_args!("AQ:   {:.2}", frame.air_quality));
    if frame.finger_present {
        push(format_args!("HR:   {} bpm", frame.heart_rate_bpm));
        push(format_args!("SpO2: {} %", frame.spo2_pct));
    } else {
        push(format_args!("HR:   --"));
        push(format_args!("SpO2: --"));
    }
    match frame.risk_score {
        Some(score) => push(format_args!("Score: {:.2}", score)),
        None => push(format_args!("Score: n/a")),
    }
    push(format_args!("Status: {}", frame.level));
    screen
}

/// Display that writes the composed screen to the log.
#[derive(Default)]
pub struct LogDisplay {
    last: Option<Screen>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// The most recently rendered screen.
    pub fn last_screen(&self) -> Option<&Screen> {
        self.last.as_ref()
    }
}

impl DisplayPort for LogDisplay {
    fn render(&mut self, frame: &DisplayFrame) {
        let screen = compose(frame);
        for line in &screen {
            debug!("LCD | {}", line);
        }
        self.last = Some(screen);
    }
}
