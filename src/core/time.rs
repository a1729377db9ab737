use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, Utc};

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Offset used to decide which calendar day a timestamp falls on.
    fn offset(&self) -> FixedOffset {
        utc_offset()
    }

    /// Returns the current calendar date in `offset()`.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset()).date_naive()
    }
}

/// Wall clock using the host's local UTC offset.
///
/// The offset is sampled at call time, so day windows for dates on the other
/// side of a daylight-saving change are shifted by the DST delta.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        *Local::now().offset()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            offset: utc_offset(),
        }
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Returns a copy advanced by `delta`.
    pub fn advanced(&self, delta: Duration) -> Self {
        Self {
            now: self.now + delta,
            offset: self.offset,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Half-open `[start, end)` range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The 24 hours of `date` in `offset`, or `None` outside the representable range.
    pub fn day(date: NaiveDate, offset: &FixedOffset) -> Option<Self> {
        let start = day_start(date, offset)?;
        Some(Self {
            start,
            end: start.checked_add_signed(Duration::days(1))?,
        })
    }

    /// The calendar month `month` (1-based) of `year`, or `None` if invalid
    /// or not representable in `offset`.
    pub fn month(year: i32, month: u32, offset: &FixedOffset) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            start: day_start(first, offset)?,
            end: day_start(next, offset)?,
        })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Midnight of `date` in `offset`, expressed in UTC.
pub fn day_start(date: NaiveDate, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    let local_midnight = date.and_time(NaiveTime::MIN);
    let utc = local_midnight
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?;
    Some(DateTime::from_naive_utc_and_offset(utc, Utc))
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
