use crate::registry::{Direction, Unit};
use crate::state::{Channel, CollectionOutcome};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub prtg: ReportBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportBody {
    Result {
        result: Vec<ChannelEntry>,
        text: String,
    },
    Error {
        error: u8,
        text: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelEntry {
    pub channel: &'static str,
    pub value: i64,
    pub unit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_unit: Option<&'static str>,
    pub limit_mode: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_max_warning: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_max_error: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_min_warning: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_min_error: Option<i64>,
    pub float: u8,
    #[serde(skip_serializing_if = "is_zero")]
    pub primary: u8,
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

impl From<&Channel> for ChannelEntry {
    fn from(value: &Channel) -> Self {
        let (unit, custom_unit) = match value.unit {
            Unit::Percent => ("Percent", None),
            Unit::Custom(sub) => ("Custom", Some(sub.label())),
        };
        let t = value.thresholds;
        let (max, min) = match t.direction {
            Direction::Upper => ((Some(t.warning), Some(t.error)), (None, None)),
            Direction::Lower => ((None, None), (Some(t.warning), Some(t.error))),
        };

        Self {
            channel: value.name,
            value: value.value,
            unit,
            custom_unit,
            limit_mode: 1,
            limit_max_warning: max.0,
            limit_max_error: max.1,
            limit_min_warning: min.0,
            limit_min_error: min.1,
            float: 0,
            primary: u8::from(value.primary),
        }
    }
}

impl From<&CollectionOutcome> for Report {
    fn from(value: &CollectionOutcome) -> Self {
        let prtg = match &value.error {
            Some(message) => ReportBody::Error {
                error: 1,
                text: message.clone(),
            },
            None => ReportBody::Result {
                result: value.channels.iter().map(ChannelEntry::from).collect(),
                text: value.message.clone(),
            },
        };
        Self { prtg }
    }
}

pub fn render(outcome: &mut CollectionOutcome) -> Result<String, serde_json::Error> {
    outcome.finish();
    serde_json::to_string(&Report::from(&*outcome))
}
