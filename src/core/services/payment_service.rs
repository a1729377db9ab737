use tracing::{info, warn};
use uuid::Uuid;

use crate::core::errors::{GymError, GymResult};
use crate::core::services::{validate_amount, MemberService};
use crate::core::time::Clock;
use crate::domain::{
    Displayable, Member, NewPayment, Payment, PaymentStatus, PaymentUpdate,
};
use crate::storage::RecordStore;

/// Payment ledger operations, including settlement of open invoices.
pub struct PaymentService;

impl PaymentService {
    pub fn get<S: RecordStore>(store: &S, id: Uuid) -> GymResult<Payment> {
        store
            .get_by_id::<Payment>(id)?
            .ok_or_else(|| GymError::payment_not_found(id))
    }

    /// All payments, optionally filtered by status, newest first.
    pub fn list<S: RecordStore>(
        store: &S,
        status: Option<PaymentStatus>,
    ) -> GymResult<Vec<Payment>> {
        let mut payments =
            store.find::<Payment, _>(|payment| status.map_or(true, |s| payment.status == s))?;
        sort_newest_first(&mut payments);
        Ok(payments)
    }

    pub fn for_member<S: RecordStore>(store: &S, member_id: Uuid) -> GymResult<Vec<Payment>> {
        let mut payments = store.find::<Payment, _>(|payment| payment.member_id == member_id)?;
        sort_newest_first(&mut payments);
        Ok(payments)
    }

    pub fn incomplete<S: RecordStore>(store: &S) -> GymResult<Vec<Payment>> {
        Self::list(store, Some(PaymentStatus::Incomplete))
    }

    /// Records a payment against an existing member.
    ///
    /// A member holds at most one incomplete payment at a time.
    pub fn add<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        draft: NewPayment,
    ) -> GymResult<Payment> {
        validate_amount(draft.amount)?;
        let member = MemberService::get(store, clock, draft.member_id)?;
        if draft.status == PaymentStatus::Incomplete {
            Self::ensure_no_open_payment(store, &member, None)?;
        }

        let date = draft.date.unwrap_or_else(|| clock.now());
        let mut payment = Payment::for_member(&member, draft.amount, date, draft.status);
        payment.notes = draft.notes.filter(|notes| !notes.trim().is_empty());
        store.insert(payment.clone())?;
        info!(member = %member.id, "recorded {}", payment.display_label());
        Ok(payment)
    }

    pub fn update<S: RecordStore>(
        store: &mut S,
        id: Uuid,
        changes: PaymentUpdate,
    ) -> GymResult<Payment> {
        let mut payment = Self::get(store, id)?;
        if let Some(amount) = changes.amount {
            validate_amount(amount)?;
        }
        if changes.status == Some(PaymentStatus::Incomplete) && !payment.is_incomplete() {
            if let Some(member) = store.get_by_id::<Member>(payment.member_id)? {
                Self::ensure_no_open_payment(store, &member, Some(id))?;
            }
        }

        changes.apply(&mut payment);
        let stored = payment.clone();
        store.update::<Payment, _>(id, move |record| *record = stored)?;
        info!("updated {}", payment.display_label());
        Ok(payment)
    }

    /// Settles the member's outstanding invoice, or records a fresh paid
    /// payment when none is open, and marks the member as paid.
    pub fn complete<S: RecordStore>(
        store: &mut S,
        clock: &dyn Clock,
        member_id: Uuid,
        amount: f64,
    ) -> GymResult<Payment> {
        validate_amount(amount)?;
        let member = MemberService::get(store, clock, member_id)?;
        let now = clock.now();

        let open = store
            .find::<Payment, _>(|payment| payment.member_id == member_id && payment.is_incomplete())?;
        if open.len() > 1 {
            warn!(
                member = %member_id,
                open = open.len(),
                "member has several incomplete payments; settling the first recorded"
            );
        }

        let payment = match open.into_iter().next() {
            Some(mut existing) => {
                existing.mark_paid(amount, now);
                let stored = existing.clone();
                store.update::<Payment, _>(existing.id, move |record| *record = stored)?;
                existing
            }
            None => {
                let payment = Payment::for_member(&member, amount, now, PaymentStatus::Paid);
                store.insert(payment.clone())?;
                payment
            }
        };

        store.update::<Member, _>(member_id, move |record| {
            record.payment_status = PaymentStatus::Paid;
            record.updated_at = now;
        })?;
        info!(member = %member_id, "completed {}", payment.display_label());
        Ok(payment)
    }

    fn ensure_no_open_payment<S: RecordStore>(
        store: &S,
        member: &Member,
        except: Option<Uuid>,
    ) -> GymResult<()> {
        let open = store.find::<Payment, _>(|payment| {
            payment.member_id == member.id && payment.is_incomplete() && Some(payment.id) != except
        })?;
        if open.is_empty() {
            Ok(())
        } else {
            Err(GymError::validation(format!(
                "member `{}` already has an incomplete payment",
                member.name
            )))
        }
    }
}

fn sort_newest_first(payments: &mut [Payment]) {
    payments.sort_by(|a, b| b.date.cmp(&a.date));
}
