use tracing::{info, warn};
use uuid::Uuid;

use crate::core::errors::{CheckInBlockReason, GymError, GymResult};
use crate::core::services::{day_window, MemberService};
use crate::core::time::Clock;
use crate::domain::{CheckIn, Member, MemberStatus};
use crate::storage::RecordStore;

/// Admission gate and check-in history.
pub struct CheckInService;

impl CheckInService {
    /// Returns why `member` may not enter, if anything.
    ///
    /// Payment is checked before the subscription. A `Due` member is admitted.
    pub fn admission_block(member: &Member) -> Option<CheckInBlockReason> {
        if !member.is_paid() {
            Some(CheckInBlockReason::PaymentIncomplete)
        } else if member.status == MemberStatus::Overdue {
            Some(CheckInBlockReason::SubscriptionInactive)
        } else {
            None
        }
    }

    /// Admits a member and records the check-in.
    pub fn check_in<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        member_id: Uuid,
    ) -> GymResult<CheckIn> {
        let member = MemberService::get(store, clock, member_id)?;
        if let Some(reason) = Self::admission_block(&member) {
            warn!(member = %member_id, code = reason.code(), "check-in refused");
            return Err(GymError::CheckInBlocked(reason));
        }

        let check_in = CheckIn::for_member(&member, clock.now());
        store.insert(check_in.clone())?;
        info!(member = %member_id, check_in = %check_in.id, "checked in {}", member.name);
        Ok(check_in)
    }

    /// Every check-in, newest first.
    pub fn list<S: RecordStore>(store: &S) -> GymResult<Vec<CheckIn>> {
        let mut check_ins = store.get_all::<CheckIn>()?;
        sort_newest_first(&mut check_ins);
        Ok(check_ins)
    }

    /// A member's check-ins, newest first, truncated to `limit` when given.
    pub fn history<S: RecordStore>(
        store: &S,
        member_id: Uuid,
        limit: Option<usize>,
    ) -> GymResult<Vec<CheckIn>> {
        let mut check_ins = store.find::<CheckIn, _>(|check_in| check_in.member_id == member_id)?;
        sort_newest_first(&mut check_ins);
        if let Some(limit) = limit {
            check_ins.truncate(limit);
        }
        Ok(check_ins)
    }

    /// Check-ins recorded during the clock's current local day.
    pub fn today<S: RecordStore>(store: &S, clock: &dyn Clock) -> GymResult<Vec<CheckIn>> {
        let window = day_window(clock, clock.today())?;
        Ok(store.between::<CheckIn>(window)?)
    }
}

fn sort_newest_first(check_ins: &mut [CheckIn]) {
    check_ins.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::test_support::{at, clock, draft};
    use crate::core::time::FixedClock;
    use crate::storage::MemoryStore;

    #[test]
    fn unpaid_member_is_blocked_before_subscription_check() {
        let mut store = MemoryStore::new();
        let clock = clock();
        let overdue =
            MemberService::add(&mut store, &clock, draft("Jo", at(2025, 6, 1, 0, 0))).unwrap();
        let err = CheckInService::check_in(&mut store, &clock, overdue.id).expect_err("unpaid");
        assert!(matches!(
            err,
            GymError::CheckInBlocked(CheckInBlockReason::PaymentIncomplete)
        ));
        assert!(store.data().check_ins.is_empty());
    }

    #[test]
    fn paid_overdue_member_is_blocked() {
        let mut store = MemoryStore::new();
        let clock = clock();
        let member = MemberService::add(
            &mut store,
            &clock,
            draft("Kai", at(2025, 6, 1, 0, 0)).paid(),
        )
        .unwrap();
        let err = CheckInService::check_in(&mut store, &clock, member.id).expect_err("overdue");
        assert!(matches!(
            err,
            GymError::CheckInBlocked(CheckInBlockReason::SubscriptionInactive)
        ));
    }

    #[test]
    fn due_member_is_admitted_with_snapshot() {
        let mut store = MemoryStore::new();
        let clock = clock();
        let member = MemberService::add(
            &mut store,
            &clock,
            draft("Lu", at(2025, 6, 10, 6, 0)).paid(),
        )
        .unwrap();
        assert_eq!(member.status, MemberStatus::Due);

        let check_in = CheckInService::check_in(&mut store, &clock, member.id).unwrap();
        assert_eq!(check_in.member_status, MemberStatus::Due);
        assert_eq!(check_in.member_name, "Lu");
        assert_eq!(check_in.timestamp, clock.now());
    }

    #[test]
    fn unknown_member_check_in_is_not_found() {
        let mut store = MemoryStore::new();
        let err = CheckInService::check_in(&mut store, &clock(), Uuid::new_v4())
            .expect_err("unknown member");
        assert!(matches!(err, GymError::NotFound { entity: "Member", .. }));
        assert!(store.data().check_ins.is_empty());
    }

    #[test]
    fn history_is_newest_first_and_limited() {
        let mut store = MemoryStore::new();
        let base = clock();
        let member = MemberService::add(
            &mut store,
            &base,
            draft("Mo", at(2025, 7, 1, 0, 0)).paid(),
        )
        .unwrap();
        for hour in [8, 14, 10] {
            let clock = FixedClock::new(at(2025, 6, 10, hour, 0));
            CheckInService::check_in(&mut store, &clock, member.id).unwrap();
        }

        let history = CheckInService::history(&store, member.id, Some(2)).unwrap();
        let hours: Vec<_> = history.iter().map(|c| c.timestamp).collect();
        assert_eq!(hours, vec![at(2025, 6, 10, 14, 0), at(2025, 6, 10, 10, 0)]);
        assert_eq!(CheckInService::history(&store, member.id, None).unwrap().len(), 3);
        assert_eq!(CheckInService::today(&store, &base).unwrap().len(), 3);
    }
}
