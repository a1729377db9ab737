//! Registry operations and lifecycle status upkeep for members.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DeletePolicy;
use crate::core::errors::{GymError, GymResult};
use crate::core::services::validate_amount;
use crate::core::time::Clock;
use crate::domain::{
    CheckIn, Displayable, Member, MemberFilter, MemberSort, MemberStatus, MemberUpdate,
    NamedEntity, NewMember, Payment, PaymentStatus, SubscriptionType,
};
use crate::storage::RecordStore;

/// Validated CRUD, search and self-healing reads over the member collection.
pub struct MemberService;

impl MemberService {
    /// Classifies a subscription ending at `subscription_end` against the clock.
    pub fn derive_status(clock: &dyn Clock, subscription_end: DateTime<Utc>) -> MemberStatus {
        MemberStatus::derive(subscription_end, clock.now(), &clock.offset())
    }

    /// Registers a new member and returns the stored record.
    pub fn add<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        draft: NewMember,
    ) -> GymResult<Member> {
        Self::validate_contact(&draft.name, &draft.phone)?;
        let end = match draft.subscription_end {
            Some(end) => end,
            None => Self::period_end(draft.subscription_type, draft.subscription_start)?,
        };
        Self::validate_period(draft.subscription_start, end)?;

        let member = Member::from_draft(draft, end, clock.now(), &clock.offset());
        store.insert(member.clone())?;
        info!(member = %member.id, "registered {}", member.display_label());
        Ok(member)
    }

    /// Loads a member, persisting a refreshed status if the cached one is stale.
    pub fn get<S: RecordStore>(store: &mut S, clock: &dyn Clock, id: Uuid) -> GymResult<Member> {
        let mut member = store
            .get_by_id::<Member>(id)?
            .ok_or_else(|| GymError::member_not_found(id))?;
        Self::heal(store, clock, &mut member)?;
        Ok(member)
    }

    /// Lists every member in storage order with refreshed statuses.
    pub fn list<S: RecordStore>(store: &mut S, clock: &dyn Clock) -> GymResult<Vec<Member>> {
        let mut members = store.get_all::<Member>()?;
        for member in &mut members {
            Self::heal(store, clock, member)?;
        }
        Ok(members)
    }

    /// Applies a partial update and re-derives the status.
    pub fn update<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        id: Uuid,
        changes: MemberUpdate,
    ) -> GymResult<Member> {
        if changes.is_empty() {
            return Self::get(store, clock, id);
        }
        let mut member = store
            .get_by_id::<Member>(id)?
            .ok_or_else(|| GymError::member_not_found(id))?;
        if let Some(name) = changes.name.as_deref() {
            Self::validate_contact(name, &member.phone)?;
        }
        if let Some(phone) = changes.phone.as_deref() {
            Self::validate_contact(&member.name, phone)?;
        }
        changes.apply(&mut member);
        Self::validate_period(member.subscription_start, member.subscription_end)?;

        let now = clock.now();
        member.refresh_status(now, &clock.offset());
        member.updated_at = now;
        let stored = member.clone();
        store.update::<Member, _>(id, move |record| *record = stored)?;
        info!(member = %id, "updated {}", member.display_label());
        Ok(member)
    }

    /// Removes a member, handling its history according to `policy`.
    pub fn delete<S: RecordStore>(
        store: &mut S,
        id: Uuid,
        policy: DeletePolicy,
    ) -> GymResult<Member> {
        let member = store
            .get_by_id::<Member>(id)?
            .ok_or_else(|| GymError::member_not_found(id))?;
        let payments = store.find::<Payment, _>(|payment| payment.member_id == id)?;
        let check_ins = store.find::<CheckIn, _>(|check_in| check_in.member_id == id)?;

        match policy {
            DeletePolicy::Restrict if !payments.is_empty() || !check_ins.is_empty() => {
                return Err(GymError::validation(format!(
                    "member `{}` has {} payment(s) and {} check-in(s)",
                    member.name,
                    payments.len(),
                    check_ins.len()
                )));
            }
            DeletePolicy::Cascade => {
                for payment in &payments {
                    store.delete::<Payment>(payment.id)?;
                }
                for check_in in &check_ins {
                    store.delete::<CheckIn>(check_in.id)?;
                }
            }
            _ => {}
        }

        store.delete::<Member>(id)?;
        info!(
            member = %id,
            ?policy,
            payments = payments.len(),
            check_ins = check_ins.len(),
            "deleted member"
        );
        Ok(member)
    }

    /// Free-text search over name, email, phone and id.
    pub fn search<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        query: &str,
    ) -> GymResult<Vec<Member>> {
        Self::filter(store, clock, &MemberFilter::text(query))
    }

    pub fn filter<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        filter: &MemberFilter,
    ) -> GymResult<Vec<Member>> {
        let mut matches: Vec<Member> = Self::list(store, clock)?
            .into_iter()
            .filter(|member| filter.matches(member))
            .collect();
        if filter.sort == MemberSort::Alphabetical {
            matches.sort_by_cached_key(|member| member.name().to_lowercase());
        }
        Ok(matches)
    }

    pub fn by_status<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        status: MemberStatus,
    ) -> GymResult<Vec<Member>> {
        Self::filter(store, clock, &MemberFilter::default().with_status(status))
    }

    /// Starts a new subscription period at `start` and opens an invoice for it.
    ///
    /// The member becomes `Incomplete` until the period is paid. An incomplete
    /// payment of `fee` is created unless the member already has one.
    pub fn renew<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        id: Uuid,
        start: DateTime<Utc>,
        fee: f64,
    ) -> GymResult<Member> {
        validate_amount(fee)?;
        let mut member = Self::get(store, clock, id)?;
        let end = Self::period_end(member.subscription_type, start)?;
        let now = clock.now();
        member.subscription_start = start;
        member.subscription_end = end;
        member.payment_status = PaymentStatus::Incomplete;
        member.refresh_status(now, &clock.offset());
        member.updated_at = now;
        let stored = member.clone();
        store.update::<Member, _>(id, move |record| *record = stored)?;

        let has_open = !store
            .find::<Payment, _>(|payment| payment.member_id == id && payment.is_incomplete())?
            .is_empty();
        if !has_open {
            let invoice = Payment::for_member(&member, fee, now, PaymentStatus::Incomplete);
            store.insert(invoice)?;
        }
        info!(
            member = %id,
            until = %member.subscription_end,
            "renewed {}",
            member.display_label()
        );
        Ok(member)
    }

    fn heal<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        member: &mut Member,
    ) -> GymResult<()> {
        let previous = member.status;
        if member.refresh_status(clock.now(), &clock.offset()) {
            let status = member.status;
            store.update::<Member, _>(member.id, move |record| record.status = status)?;
            debug!(member = %member.id, from = %previous, to = %status, "refreshed stale status");
        }
        Ok(())
    }

    fn period_end(kind: SubscriptionType, start: DateTime<Utc>) -> GymResult<DateTime<Utc>> {
        kind.renewal_date(start)
            .ok_or_else(|| GymError::validation("subscription period out of range"))
    }

    fn validate_contact(name: &str, phone: &str) -> GymResult<()> {
        if name.trim().is_empty() {
            return Err(GymError::validation("member name is required"));
        }
        if phone.trim().is_empty() {
            return Err(GymError::validation("member phone is required"));
        }
        Ok(())
    }

    fn validate_period(start: DateTime<Utc>, end: DateTime<Utc>) -> GymResult<()> {
        if end < start {
            Err(GymError::validation(
                "subscription end must not precede its start",
            ))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::test_support::{at, clock, draft};
    use crate::storage::MemoryStore;
    use chrono::Duration;

    #[test]
    fn add_computes_missing_end_from_subscription_type() {
        let mut store = MemoryStore::new();
        let clock = clock();
        let start = at(2025, 6, 10, 8, 0);
        let member = MemberService::add(
            &mut store,
            &clock,
            NewMember::new("Dana", "555-0101", SubscriptionType::Weekly, start),
        )
        .unwrap();
        assert_eq!(member.subscription_end, at(2025, 6, 17, 8, 0));
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.payment_status, PaymentStatus::Incomplete);
    }

    #[test]
    fn add_rejects_blank_name_and_inverted_period() {
        let mut store = MemoryStore::new();
        let clock = clock();
        let err = MemberService::add(&mut store, &clock, draft("  ", at(2025, 7, 1, 0, 0)))
            .expect_err("blank name");
        assert!(matches!(err, GymError::Validation(_)));

        let err = MemberService::add(&mut store, &clock, draft("Eve", at(2025, 4, 1, 0, 0)))
            .expect_err("end before start");
        assert!(matches!(err, GymError::Validation(_)));
        assert!(store.data().members.is_empty());
    }

    #[test]
    fn period_ending_past_the_last_instant_is_rejected() {
        let mut store = MemoryStore::new();
        let clock = clock();
        let start = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let err = MemberService::add(
            &mut store,
            &clock,
            NewMember::new("Zed", "555-0199", SubscriptionType::Daily, start),
        )
        .expect_err("end out of range");
        assert!(matches!(err, GymError::Validation(_)));
        assert!(store.data().members.is_empty());

        let member =
            MemberService::add(&mut store, &clock, draft("Zia", at(2025, 7, 1, 0, 0))).unwrap();
        let err = MemberService::renew(&mut store, &clock, member.id, start, 50.0)
            .expect_err("renewal out of range");
        assert!(err.to_string().contains("subscription period out of range"));
        assert!(store.data().payments.is_empty());
        assert_eq!(store.data().members[0].subscription_end, at(2025, 7, 1, 0, 0));
    }

    #[test]
    fn reads_persist_refreshed_status() {
        let mut store = MemoryStore::new();
        let registered = clock();
        let member =
            MemberService::add(&mut store, &registered, draft("Fay", at(2025, 6, 12, 9, 0)))
                .unwrap();
        assert_eq!(member.status, MemberStatus::Active);

        let later = registered.advanced(Duration::days(5));
        let read = MemberService::get(&mut store, &later, member.id).unwrap();
        assert_eq!(read.status, MemberStatus::Overdue);
        assert_eq!(store.data().members[0].status, MemberStatus::Overdue);
    }

    #[test]
    fn update_rederives_status_when_end_moves() {
        let mut store = MemoryStore::new();
        let clock = clock();
        let member =
            MemberService::add(&mut store, &clock, draft("Gus", at(2025, 7, 1, 0, 0))).unwrap();
        let updated = MemberService::update(
            &mut store,
            &clock,
            member.id,
            MemberUpdate {
                subscription_end: Some(at(2025, 6, 10, 23, 0)),
                ..MemberUpdate::default()
            },
        )
        .unwrap();
        assert_eq!(updated.status, MemberStatus::Due);
        assert_eq!(updated.updated_at, clock.now());
    }

    #[test]
    fn update_unknown_member_is_not_found() {
        let mut store = MemoryStore::new();
        let err = MemberService::update(&mut store, &clock(), Uuid::new_v4(), MemberUpdate::default())
            .expect_err("missing member");
        assert!(matches!(err, GymError::NotFound { entity: "Member", .. }));
    }

    #[test]
    fn alphabetical_filter_sorts_case_insensitively() {
        let mut store = MemoryStore::new();
        let clock = clock();
        for name in ["zoe", "Adam", "mia"] {
            MemberService::add(&mut store, &clock, draft(name, at(2025, 7, 1, 0, 0))).unwrap();
        }
        let storage_order: Vec<_> = MemberService::search(&mut store, &clock, "")
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(storage_order, vec!["zoe", "Adam", "mia"]);

        let sorted: Vec<_> = MemberService::filter(
            &mut store,
            &clock,
            &MemberFilter::default().sorted(MemberSort::Alphabetical),
        )
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
        assert_eq!(sorted, vec!["Adam", "mia", "zoe"]);
    }

    #[test]
    fn renew_opens_single_invoice() {
        let mut store = MemoryStore::new();
        let clock = clock();
        let member =
            MemberService::add(&mut store, &clock, draft("Hal", at(2025, 6, 1, 0, 0))).unwrap();
        assert_eq!(member.status, MemberStatus::Overdue);

        let start = at(2025, 6, 10, 0, 0);
        let renewed = MemberService::renew(&mut store, &clock, member.id, start, 50.0).unwrap();
        assert_eq!(renewed.subscription_end, at(2025, 7, 10, 0, 0));
        assert_eq!(renewed.status, MemberStatus::Active);
        assert_eq!(renewed.payment_status, PaymentStatus::Incomplete);

        MemberService::renew(&mut store, &clock, member.id, start, 50.0).unwrap();
        let open: Vec<_> = store
            .data()
            .payments
            .iter()
            .filter(|p| p.is_incomplete())
            .collect();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].amount, 50.0);
    }
}
