use chrono::{Local, Timelike};

/// Hour of day on the local wall clock, in [0, 23].
pub fn current_hour() -> u8 {
    Local::now().hour() as u8
}
