//! Read-only aggregations behind the dashboard.
//!
//! Everything is recomputed from the store on each call; nothing is cached.

use chrono::{DateTime, Duration, Utc};

use crate::config::GymConfig;
use crate::core::errors::{GymError, GymResult};
use crate::core::services::{day_window, CheckInService, MemberService, PaymentService};
use crate::core::time::{Clock, TimeWindow};
use crate::domain::{
    Amounted, CheckIn, DailyCheckIns, DashboardAlerts, DashboardStats, Member, MemberStatus,
    Payment, SubscriptionType, TypeCount, TypeRevenue,
};
use crate::storage::RecordStore;

const WEEK_DAYS: i64 = 7;

pub struct StatsService;

impl StatsService {
    /// Sum of paid amounts dated within `window`.
    pub fn revenue_in<S: RecordStore>(store: &S, window: TimeWindow) -> GymResult<f64> {
        let payments = store.between::<Payment>(window)?;
        Ok(paid_total(&payments))
    }

    pub fn today_revenue<S: RecordStore>(store: &S, clock: &dyn Clock) -> GymResult<f64> {
        Self::revenue_in(store, day_window(clock, clock.today())?)
    }

    /// Paid revenue over a calendar month in the clock's offset.
    pub fn monthly_revenue<S: RecordStore>(
        store: &S,
        clock: &dyn Clock,
        year: i32,
        month: u32,
    ) -> GymResult<f64> {
        let window = TimeWindow::month(year, month, &clock.offset()).ok_or_else(|| {
            GymError::validation(format!("invalid month {year}-{month:02}"))
        })?;
        Self::revenue_in(store, window)
    }

    /// Paid totals per subscription type, in order of first appearance.
    pub fn revenue_by_type<S: RecordStore>(store: &S) -> GymResult<Vec<TypeRevenue>> {
        let paid = store.find::<Payment, _>(|payment| payment.is_paid())?;
        let mut groups: Vec<(SubscriptionType, f64)> = Vec::new();
        for payment in &paid {
            match groups
                .iter_mut()
                .find(|(kind, _)| *kind == payment.subscription_type)
            {
                Some((_, total)) => *total += payment.amount(),
                None => groups.push((payment.subscription_type, payment.amount())),
            }
        }
        Ok(groups
            .into_iter()
            .map(|(kind, amount)| TypeRevenue {
                label: kind.label(),
                amount,
            })
            .collect())
    }

    /// Member counts per subscription type, in order of first appearance.
    pub fn subscription_distribution<S: RecordStore>(store: &S) -> GymResult<Vec<TypeCount>> {
        let members = store.get_all::<Member>()?;
        Ok(distribution(&members))
    }

    /// Check-in counts for the last seven local days, oldest first, today last.
    pub fn weekly_check_ins<S: RecordStore>(
        store: &S,
        clock: &dyn Clock,
    ) -> GymResult<Vec<DailyCheckIns>> {
        let today = clock.today();
        let first = today
            .checked_sub_signed(Duration::days(WEEK_DAYS - 1))
            .ok_or_else(|| GymError::validation(format!("date {today} is out of range")))?;
        let week = TimeWindow::new(
            day_window(clock, first)?.start,
            day_window(clock, today)?.end,
        );
        let check_ins = store.between::<CheckIn>(week)?;

        let mut days = Vec::with_capacity(WEEK_DAYS as usize);
        for back in (0..WEEK_DAYS).rev() {
            let date = today - Duration::days(back);
            let window = day_window(clock, date)?;
            days.push(DailyCheckIns {
                day: date.format("%a").to_string(),
                date,
                count: check_ins
                    .iter()
                    .filter(|check_in| window.contains(check_in.timestamp))
                    .count(),
            });
        }
        Ok(days)
    }

    pub fn today_check_ins<S: RecordStore>(store: &S, clock: &dyn Clock) -> GymResult<usize> {
        Ok(CheckInService::today(store, clock)?.len())
    }

    /// Builds the full dashboard bundle, refreshing member statuses on the way.
    pub fn dashboard<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        config: &GymConfig,
    ) -> GymResult<DashboardStats> {
        let members = MemberService::list(store, clock)?;
        let incomplete = PaymentService::incomplete(store)?;
        let renewal_horizon = clock
            .now()
            .checked_add_signed(Duration::days(i64::from(config.renewal_alert_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let overdue_members: Vec<Member> = members
            .iter()
            .filter(|member| member.status == MemberStatus::Overdue)
            .cloned()
            .collect();
        let renewals_due: Vec<Member> = members
            .iter()
            .filter(|member| {
                member.status == MemberStatus::Active && member.subscription_end <= renewal_horizon
            })
            .cloned()
            .collect();

        Ok(DashboardStats {
            active_members: members
                .iter()
                .filter(|member| member.status == MemberStatus::Active)
                .count(),
            today_check_ins: Self::today_check_ins(store, clock)?,
            today_revenue: Self::today_revenue(store, clock)?,
            incomplete_payments: incomplete.len(),
            weekly_check_ins: Self::weekly_check_ins(store, clock)?,
            subscription_distribution: distribution(&members),
            revenue_by_type: Self::revenue_by_type(store)?,
            alerts: DashboardAlerts {
                overdue_members,
                incomplete_payments: incomplete,
                renewals_due,
            },
        })
    }
}

fn paid_total(payments: &[Payment]) -> f64 {
    payments
        .iter()
        .filter(|payment| payment.is_paid())
        .map(Amounted::amount)
        .sum()
}

fn distribution(members: &[Member]) -> Vec<TypeCount> {
    let mut groups: Vec<(SubscriptionType, usize)> = Vec::new();
    for member in members {
        match groups
            .iter_mut()
            .find(|(kind, _)| *kind == member.subscription_type)
        {
            Some((_, count)) => *count += 1,
            None => groups.push((member.subscription_type, 1)),
        }
    }
    groups
        .into_iter()
        .map(|(kind, count)| TypeCount {
            label: kind.label(),
            count,
        })
        .collect()
}
