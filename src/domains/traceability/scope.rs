use crate::domains::priority::Priority;
use crate::types::PriorityScope;
use chrono::{Datelike, NaiveDate};

/// Priorities of `scope` that are current on `reference`.
///
/// All scopes must match the reference year; daily priorities then match the
/// exact date, weekly ones the ISO-8601 week and monthly ones the month.
///
/// The year is always the calendar year of `reference`, also for weekly
/// priorities: 2024-12-30 falls in ISO week 1 and matches `{week 1, year 2024}`.
pub fn priorities_by_scope(
    priorities: &[Priority],
    scope: PriorityScope,
    reference: NaiveDate,
) -> Vec<&Priority> {
    priorities
        .iter()
        .filter(|p| p.scope == scope && p.year == reference.year())
        .filter(|p| match scope {
            PriorityScope::Daily => p.date == Some(reference),
            PriorityScope::Weekly => p.week_number == Some(reference.iso_week().week()),
            PriorityScope::Monthly => p.month == Some(reference.month()),
            PriorityScope::Yearly => true,
        })
        .collect()
}
