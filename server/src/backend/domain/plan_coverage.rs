//! Meal plan coverage: how many of a plan's days have something planned.
//!
//! All computations here are pure. They take a plan's date span and its
//! entries and produce day counts, a coverage percentage, a weekly grouping
//! and the completion classification shown in listings and reports.

use chrono::NaiveDate;
use shared::PlanStatus;
use std::collections::{BTreeSet, HashMap};

use crate::backend::domain::models::meal_plan::MealPlanEntry;

/// Number of days in a plan week; weeks are counted from the plan start
pub const DAYS_PER_WEEK: usize = 7;

/// Covered days at which the summary chart counts a plan as complete
pub const GLOBAL_COMPLETION_DAYS: u32 = 7;

/// Entries that fall on one day of the plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDay {
    pub date: NaiveDate,
    pub entries: Vec<MealPlanEntry>,
}

/// A run of at most seven consecutive plan days
#[derive(Debug, Clone, PartialEq)]
pub struct PlanWeek {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<PlanDay>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanCoverage {
    pub total_days: u32,
    pub covered_days: u32,
    pub coverage_percent: u32,
    pub status: PlanStatus,
    pub weeks: Vec<PlanWeek>,
}

/// Inclusive number of days between `start` and `end`; zero when `end` precedes `start`
pub fn total_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    (end - start).num_days() as u32 + 1
}

/// Every date of the span in order
pub fn plan_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take(total_days(start, end) as usize).collect()
}

/// Count distinct dates inside the span
pub fn covered_days<I>(start: NaiveDate, end: NaiveDate, dates: I) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    dates
        .into_iter()
        .filter(|date| start <= *date && *date <= end)
        .collect::<BTreeSet<_>>()
        .len() as u32
}

/// Rounded percentage of covered days, 0 for an empty span
///
/// Halves round to the nearest even integer.
pub fn coverage_percent(covered_days: u32, total_days: u32) -> u32 {
    if total_days == 0 {
        return 0;
    }
    (100.0 * covered_days as f64 / total_days as f64).round_ties_even() as u32
}

/// Strict classification: Complete only for a fully covered seven-day plan
pub fn classify(total_days: u32, covered_days: u32) -> PlanStatus {
    if total_days == DAYS_PER_WEEK as u32 && covered_days == DAYS_PER_WEEK as u32 {
        PlanStatus::Complete
    } else if covered_days > 0 {
        PlanStatus::InProgress
    } else {
        PlanStatus::Empty
    }
}

/// Loose completion used by the global summary chart
///
/// Counts a plan as complete once seven or more days are covered, whatever
/// the length of its span. Kept apart from [`classify`] on purpose.
pub fn is_globally_complete(covered_days: u32) -> bool {
    covered_days >= GLOBAL_COMPLETION_DAYS
}

/// Compute the full coverage view for a plan
pub fn compute_coverage(
    start: NaiveDate,
    end: NaiveDate,
    entries: &[MealPlanEntry],
) -> PlanCoverage {
    let days = plan_days(start, end);
    let total = days.len() as u32;
    let covered = covered_days(start, end, entries.iter().map(|e| e.date));

    let entries_by_day = group_entries_by_day(entries);
    let weeks = days
        .chunks(DAYS_PER_WEEK)
        .filter_map(|chunk| {
            let first = *chunk.first()?;
            let last = *chunk.last()?;
            let days = chunk
                .iter()
                .map(|date| PlanDay {
                    date: *date,
                    entries: entries_by_day.get(date).cloned().unwrap_or_default(),
                })
                .collect();
            Some(PlanWeek {
                start: first,
                end: last,
                days,
            })
        })
        .collect();

    PlanCoverage {
        total_days: total,
        covered_days: covered,
        coverage_percent: coverage_percent(covered, total),
        status: classify(total, covered),
        weeks,
    }
}

fn group_entries_by_day(entries: &[MealPlanEntry]) -> HashMap<NaiveDate, Vec<MealPlanEntry>> {
    let mut entries_by_day: HashMap<NaiveDate, Vec<MealPlanEntry>> = HashMap::new();
    for entry in entries {
        entries_by_day
            .entry(entry.date)
            .or_default()
            .push(entry.clone());
    }
    entries_by_day
}
