use chrono::Local;

/// Source of the short time string shown in the `[time]` prefix.
pub trait Clock {
    fn time_label(&self) -> String;
}

/// Local wall-clock time, e.g. `3:04:05 PM`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn time_label(&self) -> String {
        Local::now().format("%-I:%M:%S %p").to_string()
    }
}

/// Always reports the same label. Handy for deterministic output.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

impl Clock for FixedClock {
    fn time_label(&self) -> String {
        self.0.clone()
    }
}
