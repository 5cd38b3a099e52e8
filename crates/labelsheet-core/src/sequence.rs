//! Identifier sequencing
//!
//! Turns free-form identifier text such as `"1-3, 7 12-10"` into the ordered
//! slot list that the composer lays out row-major. Unparseable tokens are
//! dropped without error.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Any run of whitespace and/or commas
    static ref TOKEN_SEPARATOR: Regex = Regex::new(r"[\s,]+").unwrap();

    /// `A-B` where either side may be negative, e.g. `5-1` or `-3--1`
    static ref RANGE_PATTERN: Regex = Regex::new(r"^(-?\d+)-(-?\d+)$").unwrap();

    /// Leading integer of a token, so `12abc` reads as 12
    static ref LEADING_INTEGER: Regex = Regex::new(r"^[+-]?\d+").unwrap();
}

/// One position in the output sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Slot {
    /// Consumes a grid position without drawing anything
    Blank,
    /// A real identifier; 0 and negative values are valid
    Item(i64),
}

impl Slot {
    pub fn item_id(&self) -> Option<i64> {
        match self {
            Slot::Blank => None,
            Slot::Item(id) => Some(*id),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Slot::Blank)
    }
}

/// Options controlling blank padding and repetition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SequenceOptions {
    /// Blank slots prepended before any identifier
    pub skip_first: usize,
    /// How many times each identifier of a range is emitted
    pub repeat_count: usize,
    /// Also repeat single (non-range) tokens. Off by default, which keeps
    /// single tokens at one slot each.
    pub repeat_single_values: bool,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            skip_first: 0,
            repeat_count: 1,
            repeat_single_values: false,
        }
    }
}

impl SequenceOptions {
    fn effective_repeat(&self) -> usize {
        self.repeat_count.max(1)
    }
}

/// Parse raw identifier text into an ordered slot sequence
///
/// 1. Prepend `skip_first` blanks
/// 2. Split on whitespace/commas
/// 3. Expand `A-B` ranges (ascending or descending), repeating each value
///    in place; parse anything else as a single integer
pub fn sequence(raw_text: &str, options: &SequenceOptions) -> Vec<Slot> {
    let mut slots = vec![Slot::Blank; options.skip_first];
    let repeat = options.effective_repeat();

    for token in TOKEN_SEPARATOR.split(raw_text).map(str::trim) {
        if token.is_empty() {
            continue;
        }

        if let Some(caps) = RANGE_PATTERN.captures(token) {
            // Both sides must fit in i64, otherwise the whole range is dropped
            if let (Ok(start), Ok(end)) = (caps[1].parse::<i64>(), caps[2].parse::<i64>()) {
                push_range(&mut slots, start, end, repeat);
            }
            continue;
        }

        if let Some(id) = parse_leading_integer(token) {
            let times = if options.repeat_single_values {
                repeat
            } else {
                1
            };
            slots.extend(std::iter::repeat(Slot::Item(id)).take(times));
        }
    }

    slots
}

fn push_range(slots: &mut Vec<Slot>, start: i64, end: i64, repeat: usize) {
    let mut push = |id: i64| slots.extend(std::iter::repeat(Slot::Item(id)).take(repeat));
    if start <= end {
        (start..=end).for_each(&mut push);
    } else {
        (end..=start).rev().for_each(&mut push);
    }
}

fn parse_leading_integer(token: &str) -> Option<i64> {
    LEADING_INTEGER
        .find(token)
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Counts shown to the user before generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSummary {
    pub total_slots: usize,
    pub blanks: usize,
    pub items: usize,
    /// Slots past the sheet capacity that will not be drawn
    pub overflow: usize,
}

impl SequenceSummary {
    pub fn new(slots: &[Slot], capacity: usize) -> Self {
        let blanks = slots.iter().filter(|s| s.is_blank()).count();
        Self {
            total_slots: slots.len(),
            blanks,
            items: slots.len() - blanks,
            overflow: slots.len().saturating_sub(capacity),
        }
    }
}
