//! Availability descriptors and keyword overlap
//!
//! Availability is stored as free text ("Weekends, weekday evenings",
//! "Monday, Friday; available during mornings"). Compatibility is a
//! case-insensitive overlap of day-of-week and time-of-day keywords.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Canonical keyword vocabulary, in display order
const VOCABULARY: [&str; 11] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "morning",
    "afternoon",
    "evening",
    "night",
];

const FLEXIBLE: &str = "flexible";

/// Time-of-day slot a user can pick on their profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Mornings,
    Afternoons,
    Evenings,
}

impl TimeSlot {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Mornings => "mornings",
            Self::Afternoons => "afternoons",
            Self::Evenings => "evenings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mornings => "Mornings (9am - 12pm)",
            Self::Afternoons => "Afternoons (12pm - 5pm)",
            Self::Evenings => "Evenings (5pm - 9pm)",
        }
    }
}

/// Structured availability picked on the profile form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySelection {
    pub days: Vec<Weekday>,
    pub slots: Vec<TimeSlot>,
}

/// Result of comparing two availability descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityOverlap {
    /// Nothing in common, or one side has no usable descriptor
    None,
    /// One side declared itself flexible
    Flexible,
    /// Shared canonical keywords, in week/day order
    Shared(Vec<String>),
}

impl AvailabilityOverlap {
    pub fn is_compatible(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Render a structured selection as the stored descriptor
pub fn describe_availability(selection: &AvailabilitySelection) -> String {
    let mut days: Vec<Weekday> = Vec::new();
    for day in &selection.days {
        if !days.contains(day) {
            days.push(*day);
        }
    }
    let mut slots: Vec<TimeSlot> = Vec::new();
    for slot in &selection.slots {
        if !slots.contains(slot) {
            slots.push(*slot);
        }
    }

    let day_list = days
        .iter()
        .map(|d| day_name(*d))
        .collect::<Vec<_>>()
        .join(", ");
    let slot_list = slots.iter().map(TimeSlot::id).collect::<Vec<_>>().join(", ");

    // Only an empty selection on both axes reads as flexible
    match (days.is_empty(), slots.is_empty()) {
        (true, true) => "Flexible days; available during any time".to_string(),
        (true, false) => format!("Any day; available during {slot_list}"),
        (false, true) => format!("{day_list}; available all day"),
        (false, false) => format!("{day_list}; available during {slot_list}"),
    }
}

/// Extract canonical day/time keywords from a free-text descriptor
pub fn availability_keywords(descriptor: &str) -> BTreeSet<String> {
    let lower = descriptor.to_lowercase();
    let mut keywords = BTreeSet::new();

    if lower.contains("any time") {
        keywords.insert(FLEXIBLE.to_string());
    }

    for token in lower.split(|c: char| !c.is_alphanumeric()) {
        let expanded: &[&str] = match token {
            "mon" | "monday" | "mondays" => &["monday"],
            "tue" | "tues" | "tuesday" | "tuesdays" => &["tuesday"],
            "wed" | "wednesday" | "wednesdays" => &["wednesday"],
            "thu" | "thur" | "thurs" | "thursday" | "thursdays" => &["thursday"],
            "fri" | "friday" | "fridays" => &["friday"],
            "sat" | "saturday" | "saturdays" => &["saturday"],
            "sun" | "sunday" | "sundays" => &["sunday"],
            "weekday" | "weekdays" => &["monday", "tuesday", "wednesday", "thursday", "friday"],
            "weekend" | "weekends" => &["saturday", "sunday"],
            "morning" | "mornings" => &["morning"],
            "afternoon" | "afternoons" => &["afternoon"],
            "evening" | "evenings" => &["evening"],
            "night" | "nights" => &["night"],
            "flexible" | "anytime" => &[FLEXIBLE],
            _ => &[],
        };
        keywords.extend(expanded.iter().map(|k| k.to_string()));
    }

    keywords
}

/// Compare two optional descriptors
pub fn compare_availability(a: Option<&str>, b: Option<&str>) -> AvailabilityOverlap {
    let (Some(a), Some(b)) = (a, b) else {
        return AvailabilityOverlap::None;
    };
    let a = availability_keywords(a);
    let b = availability_keywords(b);
    if a.is_empty() || b.is_empty() {
        return AvailabilityOverlap::None;
    }

    let shared: Vec<String> = VOCABULARY
        .iter()
        .filter(|k| a.contains(**k) && b.contains(**k))
        .map(|k| k.to_string())
        .collect();

    if !shared.is_empty() {
        AvailabilityOverlap::Shared(shared)
    } else if a.contains(FLEXIBLE) || b.contains(FLEXIBLE) {
        AvailabilityOverlap::Flexible
    } else {
        AvailabilityOverlap::None
    }
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
