pub mod check_in_service;
pub mod member_service;
pub mod payment_service;
pub mod stats_service;

pub use check_in_service::CheckInService;
pub use member_service::MemberService;
pub use payment_service::PaymentService;
pub use stats_service::StatsService;

use chrono::NaiveDate;

use crate::core::errors::{GymError, GymResult};
use crate::core::time::{Clock, TimeWindow};

/// Rejects negative and non-finite amounts.
pub(crate) fn validate_amount(amount: f64) -> GymResult<()> {
    if !amount.is_finite() {
        return Err(GymError::validation("amount must be a finite number"));
    }
    if amount < 0.0 {
        return Err(GymError::validation(format!(
            "amount must not be negative (got {amount})"
        )));
    }
    Ok(())
}

/// The local day `date` in the clock's offset.
pub(crate) fn day_window(clock: &dyn Clock, date: NaiveDate) -> GymResult<TimeWindow> {
    TimeWindow::day(date, &clock.offset())
        .ok_or_else(|| GymError::validation(format!("date {date} is out of range")))
}
