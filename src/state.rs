use crate::registry::{CheckDefinition, Thresholds, Unit};

pub const STATUS_OK: &str = "OK";
pub const NO_CHANNELS: &str = "No channels can be retrieved";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub name: &'static str,
    pub value: i64,
    pub unit: Unit,
    pub thresholds: Thresholds,
    pub primary: bool,
}

#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    pub channels: Vec<Channel>,
    pub message: String,
    pub error: Option<String>,
}

impl Default for CollectionOutcome {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            message: STATUS_OK.to_string(),
            error: None,
        }
    }
}

impl CollectionOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_channel(&mut self, check: &CheckDefinition, value: i64) {
        self.channels.push(Channel {
            name: check.channel,
            value,
            unit: check.unit,
            thresholds: check.thresholds,
            primary: check.primary,
        });
    }

    pub fn note_failure(&mut self, check_name: &str) {
        let note = format!("| can't check {check_name} |");
        if self.message == STATUS_OK {
            self.message = note;
        } else {
            self.message.push_str(&note);
        }
    }

    // latest error wins
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn finish(&mut self) {
        if self.channels.is_empty() && self.error.is_none() {
            self.add_error(NO_CHANNELS);
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.message == STATUS_OK
    }
}
