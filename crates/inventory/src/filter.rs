//! History filtering (search, movement type, calendar-day range).

use core::str::FromStr;

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Utc,
};

use medistock_core::DomainError;

use crate::transaction::{MovementType, Transaction};

/// Movement-type criterion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(MovementType),
}

impl TypeFilter {
    pub fn accepts(self, kind: MovementType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => wanted == kind,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ALL") {
            return Ok(TypeFilter::All);
        }
        s.parse().map(TypeFilter::Only)
    }
}

impl core::fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TypeFilter::All => f.write_str("ALL"),
            TypeFilter::Only(kind) => core::fmt::Display::fmt(kind, f),
        }
    }
}

/// Criteria for the history view and CSV export.
///
/// A movement passes when every criterion holds. The default filter passes
/// everything. Date bounds are whole calendar days, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionFilter {
    pub search_term: String,
    pub kind: TypeFilter,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_type(mut self, kind: TypeFilter) -> Self {
        self.kind = kind;
        self
    }

    pub fn from_date(mut self, day: NaiveDate) -> Self {
        self.start_date = Some(day);
        self
    }

    pub fn to_date(mut self, day: NaiveDate) -> Self {
        self.end_date = Some(day);
        self
    }

    /// Match using the host's local time zone for day bounds.
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_in(tx, &Local)
    }

    pub fn matches_in<Tz: TimeZone>(&self, tx: &Transaction, tz: &Tz) -> bool {
        self.matches_search(tx)
            && self.kind.accepts(tx.kind)
            && self
                .start_date
                .is_none_or(|day| tx.date >= start_of_day(day, tz))
            && self.end_date.is_none_or(|day| tx.date <= end_of_day(day, tz))
    }

    /// Keep matching movements, preserving their relative order.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        self.apply_in(transactions, &Local)
    }

    pub fn apply_in<Tz: TimeZone>(
        &self,
        transactions: &[Transaction],
        tz: &Tz,
    ) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|tx| self.matches_in(tx, tz))
            .cloned()
            .collect()
    }

    fn matches_search(&self, tx: &Transaction) -> bool {
        let term = self.search_term.to_lowercase();
        if term.is_empty() {
            return true;
        }
        let hit = |field: &str| field.to_lowercase().contains(&term);
        hit(&tx.material_name)
            || hit(&tx.batch_number)
            || hit(&tx.origin_or_destination)
            || tx.subtype.as_deref().is_some_and(hit)
    }
}

fn start_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    resolve_local(day.and_time(NaiveTime::MIN), tz, true)
}

fn end_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let last_milli = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    resolve_local(day.and_time(last_milli), tz, false)
}

/// How far past a skipped wall-clock time to look for the end of the gap.
/// Whole skipped calendar days exist.
const GAP_SEARCH_MINUTES: i64 = 2 * 24 * 60;

/// Local wall-clock time to an instant. Folds pick the earliest (`earliest`)
/// or latest reading. Inside a gap a start bound is the first instant after
/// the jump and an end bound the last one before it.
fn resolve_local<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz, earliest: bool) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(first, second) => {
            if earliest {
                first.with_timezone(&Utc)
            } else {
                second.with_timezone(&Utc)
            }
        }
        LocalResult::None => {
            // No valid reading within a day: read the wall clock as UTC.
            let jump = first_after_gap(naive, tz).unwrap_or_else(|| naive.and_utc());
            if earliest {
                jump
            } else {
                jump - Duration::milliseconds(1)
            }
        }
    }
}

/// First instant that exists after the gap containing `naive`. Offset
/// changes happen on whole minutes, so stepping by minutes lands on the jump.
fn first_after_gap<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    let minute = naive.with_second(0)?.with_nanosecond(0)?;
    (1..=GAP_SEARCH_MINUTES).find_map(|step| {
        match tz.from_local_datetime(&(minute + Duration::minutes(step))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
            LocalResult::None => None,
        }
    })
}
