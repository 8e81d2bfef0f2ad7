//! Static alert pattern tables.
//!
//! A pattern is a fixed list of [`AlertStep`]s. Each step drives its
//! outputs HIGH for `hold_ms`, then LOW for `gap_ms`. Pauses between
//! groups of a pattern are folded into the gap of the group's last step.
//!
//! | Pattern   | Outputs      | Shape                                   |
//! |-----------|--------------|-----------------------------------------|
//! | Emergency | red + buzzer | 5 × (200 on / 200 off)                  |
//! | Distress  | buzzer       | ···  ───  ··· (200 / 500 / 200 on, 200 off, 400 between groups) |

use super::AlertKind;

/// Bit set of the local alert outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct OutputMask(u8);

impl OutputMask {
    pub const NONE: Self = Self(0);
    pub const RED: Self = Self(1 << 0);
    pub const GREEN: Self = Self(1 << 1);
    pub const BUZZER: Self = Self(1 << 2);
    pub const ALL: Self = Self(0b111);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl core::ops::BitOr for OutputMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// One on/off pulse of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertStep {
    pub outputs: OutputMask,
    pub hold_ms: u32,
    pub gap_ms: u32,
}

impl AlertStep {
    const fn pulse(outputs: OutputMask, hold_ms: u32, gap_ms: u32) -> Self {
        Self {
            outputs,
            hold_ms,
            gap_ms,
        }
    }
}

/// A complete alert sequence.
#[derive(Debug, PartialEq, Eq)]
pub struct AlertPattern {
    pub kind: AlertKind,
    pub steps: &'static [AlertStep],
}

impl AlertPattern {
    /// Wall time from the first step asserting to completion.
    pub fn total_duration_ms(&self) -> u32 {
        self.steps.iter().map(|s| s.hold_ms + s.gap_ms).sum()
    }

    /// Every output the pattern ever drives.
    pub fn outputs(&self) -> OutputMask {
        self.steps
            .iter()
            .fold(OutputMask::NONE, |acc, s| acc.union(s.outputs))
    }
}

// ── Emergency: red + buzzer, 5 pulses ──

const RED_BUZZER: OutputMask = OutputMask::RED.union(OutputMask::BUZZER);
const EMERGENCY_PULSE: AlertStep = AlertStep::pulse(RED_BUZZER, 200, 200);

static EMERGENCY_STEPS: [AlertStep; 5] = [EMERGENCY_PULSE; 5];

pub static EMERGENCY: AlertPattern = AlertPattern {
    kind: AlertKind::Emergency,
    steps: &EMERGENCY_STEPS,
};

// ── Distress: buzzer-only ···  ───  ··· ──

const DOT: AlertStep = AlertStep::pulse(OutputMask::BUZZER, 200, 200);
const DOT_LAST: AlertStep = AlertStep::pulse(OutputMask::BUZZER, 200, 600);
const DASH: AlertStep = AlertStep::pulse(OutputMask::BUZZER, 500, 200);
const DASH_LAST: AlertStep = AlertStep::pulse(OutputMask::BUZZER, 500, 600);

static DISTRESS_STEPS: [AlertStep; 9] = [
    DOT, DOT, DOT_LAST, //
    DASH, DASH, DASH_LAST, //
    DOT, DOT, DOT,
];

pub static DISTRESS: AlertPattern = AlertPattern {
    kind: AlertKind::Distress,
    steps: &DISTRESS_STEPS,
};
