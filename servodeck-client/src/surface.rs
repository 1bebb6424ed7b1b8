use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Every element of the control panel the client reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementId {
    /// Angle slider
    Angle,
    AngleVal,
    Raw,
    Cal,
    Min,
    Max,
    Range,
    Pulse,
    Wifi,
    Ip,
    Clients,
    /// Pulse readout next to the pulse controls
    PulseVal,
    /// Pulse slider
    PulseRange,
    /// Pulse number field
    PulseInput,
    ServoMin,
    ServoMax,
    ServoZero,
    ServoRange,
    /// Progress bar mirroring the calibrated reading
    CalFill,
    CalState,
    NoticeText,
}

impl ElementId {
    pub const ALL: [ElementId; 21] = [
        ElementId::Angle,
        ElementId::AngleVal,
        ElementId::Raw,
        ElementId::Cal,
        ElementId::Min,
        ElementId::Max,
        ElementId::Range,
        ElementId::Pulse,
        ElementId::Wifi,
        ElementId::Ip,
        ElementId::Clients,
        ElementId::PulseVal,
        ElementId::PulseRange,
        ElementId::PulseInput,
        ElementId::ServoMin,
        ElementId::ServoMax,
        ElementId::ServoZero,
        ElementId::ServoRange,
        ElementId::CalFill,
        ElementId::CalState,
        ElementId::NoticeText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::Angle => "angle",
            ElementId::AngleVal => "angleVal",
            ElementId::Raw => "raw",
            ElementId::Cal => "cal",
            ElementId::Min => "min",
            ElementId::Max => "max",
            ElementId::Range => "range",
            ElementId::Pulse => "pulse",
            ElementId::Wifi => "wifi",
            ElementId::Ip => "ip",
            ElementId::Clients => "clients",
            ElementId::PulseVal => "pulseVal",
            ElementId::PulseRange => "pulseRange",
            ElementId::PulseInput => "pulseInput",
            ElementId::ServoMin => "servoMin",
            ElementId::ServoMax => "servoMax",
            ElementId::ServoZero => "servoZero",
            ElementId::ServoRange => "servoRange",
            ElementId::CalFill => "calFill",
            ElementId::CalState => "calState",
            ElementId::NoticeText => "noticeText",
        }
    }

    /// Whether the user can type into or drag this element.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            ElementId::Angle
                | ElementId::PulseRange
                | ElementId::PulseInput
                | ElementId::ServoMin
                | ElementId::ServoMax
                | ElementId::ServoZero
        )
    }

    pub(crate) fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|id| id == self)
            .unwrap_or(Self::ALL.len())
    }
}

impl FromStr for ElementId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ElementId::ALL
            .into_iter()
            .find(|id| id.as_str() == value)
            .ok_or_else(|| Error::invalid_input(format!("unknown element '{value}'")))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered state of one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Text content for labels and readouts
    pub text: Option<String>,
    /// Current value for inputs
    pub value: Option<String>,
    /// Fill width in percent for progress bars
    pub width: Option<f64>,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.text, &self.value, self.width) {
            (Some(text), _, _) => write!(f, "{text}"),
            (None, Some(value), _) => write!(f, "[{value}]"),
            (None, None, Some(width)) => write!(f, "{width}%"),
            (None, None, None) => Ok(()),
        }
    }
}

/// In-memory model of the control panel.
///
/// Writes here are unconditional. Programmatic writes to editable elements go
/// through [`crate::focus::write_if_not_focused`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    elements: BTreeMap<ElementId, Element>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.elements.entry(id).or_default().text = Some(text.into());
    }

    pub fn set_value(&mut self, id: ElementId, value: impl Into<String>) {
        self.elements.entry(id).or_default().value = Some(value.into());
    }

    pub fn set_width(&mut self, id: ElementId, percent: f64) {
        self.elements.entry(id).or_default().width = Some(percent);
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.elements.get(&id).and_then(|e| e.text.as_deref())
    }

    pub fn value(&self, id: ElementId) -> Option<&str> {
        self.elements.get(&id).and_then(|e| e.value.as_deref())
    }

    pub fn width(&self, id: ElementId) -> Option<f64> {
        self.elements.get(&id).and_then(|e| e.width)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Elements in panel order, for rendering.
    pub fn snapshot(&self) -> Vec<(ElementId, Element)> {
        self.elements
            .iter()
            .map(|(id, element)| (*id, element.clone()))
            .collect()
    }

    /// Elements whose rendered state differs from `previous`.
    pub fn changed_since(&self, previous: &Surface) -> Vec<ElementId> {
        ElementId::ALL
            .into_iter()
            .filter(|id| self.elements.get(id) != previous.elements.get(id))
            .collect()
    }
}
