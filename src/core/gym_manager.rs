use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::GymConfig;
use crate::core::errors::GymResult;
use crate::core::services::{CheckInService, MemberService, PaymentService, StatsService};
use crate::core::time::{Clock, SystemClock};
use crate::domain::{
    CheckIn, DailyCheckIns, DashboardStats, Member, MemberFilter, MemberStatus, MemberUpdate,
    NewMember, NewPayment, Payment, PaymentStatus, PaymentUpdate, TypeCount, TypeRevenue,
};
use crate::storage::{self, RecordStore};

/// Facade that binds a record store, a clock and the gym configuration to
/// the member, payment, check-in and statistics services.
pub struct GymManager<S: RecordStore> {
    store: S,
    clock: Box<dyn Clock>,
    config: GymConfig,
}

impl<S: RecordStore> GymManager<S> {
    pub fn new(store: S, config: GymConfig) -> Self {
        Self::with_clock(store, config, SystemClock)
    }

    pub fn with_clock(store: S, config: GymConfig, clock: impl Clock + 'static) -> Self {
        Self {
            store,
            clock: Box::new(clock),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    pub fn config(&self) -> &GymConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GymConfig) {
        self.config = config;
    }

    pub fn derive_status(&self, subscription_end: DateTime<Utc>) -> MemberStatus {
        MemberService::derive_status(self.clock.as_ref(), subscription_end)
    }

    // Members

    pub fn add_member(&mut self, draft: NewMember) -> GymResult<Member> {
        MemberService::add(&mut self.store, self.clock.as_ref(), draft)
    }

    pub fn update_member(&mut self, id: Uuid, changes: MemberUpdate) -> GymResult<Member> {
        MemberService::update(&mut self.store, self.clock.as_ref(), id, changes)
    }

    /// Deletes a member under the configured delete policy.
    pub fn delete_member(&mut self, id: Uuid) -> GymResult<Member> {
        MemberService::delete(&mut self.store, id, self.config.delete_policy)
    }

    pub fn get_member(&mut self, id: Uuid) -> GymResult<Member> {
        MemberService::get(&mut self.store, self.clock.as_ref(), id)
    }

    pub fn list_members(&mut self) -> GymResult<Vec<Member>> {
        MemberService::list(&mut self.store, self.clock.as_ref())
    }

    pub fn search_members(&mut self, query: &str) -> GymResult<Vec<Member>> {
        MemberService::search(&mut self.store, self.clock.as_ref(), query)
    }

    pub fn filter_members(&mut self, filter: &MemberFilter) -> GymResult<Vec<Member>> {
        MemberService::filter(&mut self.store, self.clock.as_ref(), filter)
    }

    pub fn members_by_status(&mut self, status: MemberStatus) -> GymResult<Vec<Member>> {
        MemberService::by_status(&mut self.store, self.clock.as_ref(), status)
    }

    /// Renews at the configured default fee for the member's subscription type.
    pub fn renew_member(&mut self, id: Uuid, start: DateTime<Utc>) -> GymResult<Member> {
        let member = MemberService::get(&mut self.store, self.clock.as_ref(), id)?;
        let fee = self
            .config
            .default_fees
            .for_type(member.subscription_type);
        MemberService::renew(&mut self.store, self.clock.as_ref(), id, start, fee)
    }

    // Payments

    pub fn add_payment(&mut self, draft: NewPayment) -> GymResult<Payment> {
        PaymentService::add(&mut self.store, self.clock.as_ref(), draft)
    }

    pub fn update_payment(&mut self, id: Uuid, changes: PaymentUpdate) -> GymResult<Payment> {
        PaymentService::update(&mut self.store, id, changes)
    }

    pub fn complete_payment(&mut self, member_id: Uuid, amount: f64) -> GymResult<Payment> {
        PaymentService::complete(&mut self.store, self.clock.as_ref(), member_id, amount)
    }

    pub fn list_payments(&self, status: Option<PaymentStatus>) -> GymResult<Vec<Payment>> {
        PaymentService::list(&self.store, status)
    }

    pub fn member_payments(&self, member_id: Uuid) -> GymResult<Vec<Payment>> {
        PaymentService::for_member(&self.store, member_id)
    }

    pub fn incomplete_payments(&self) -> GymResult<Vec<Payment>> {
        PaymentService::incomplete(&self.store)
    }

    // Check-ins

    pub fn check_in(&mut self, member_id: Uuid) -> GymResult<CheckIn> {
        CheckInService::check_in(&mut self.store, self.clock.as_ref(), member_id)
    }

    pub fn list_check_ins(&self) -> GymResult<Vec<CheckIn>> {
        CheckInService::list(&self.store)
    }

    pub fn member_check_ins(
        &self,
        member_id: Uuid,
        limit: Option<usize>,
    ) -> GymResult<Vec<CheckIn>> {
        CheckInService::history(&self.store, member_id, limit)
    }

    /// A member's latest check-ins, up to the configured history limit.
    pub fn recent_check_ins(&self, member_id: Uuid) -> GymResult<Vec<CheckIn>> {
        self.member_check_ins(member_id, Some(self.config.check_in_history_limit))
    }

    // Statistics

    pub fn today_revenue(&self) -> GymResult<f64> {
        StatsService::today_revenue(&self.store, self.clock.as_ref())
    }

    pub fn monthly_revenue(&self, year: i32, month: u32) -> GymResult<f64> {
        StatsService::monthly_revenue(&self.store, self.clock.as_ref(), year, month)
    }

    pub fn revenue_by_type(&self) -> GymResult<Vec<TypeRevenue>> {
        StatsService::revenue_by_type(&self.store)
    }

    pub fn today_check_ins(&self) -> GymResult<usize> {
        StatsService::today_check_ins(&self.store, self.clock.as_ref())
    }

    pub fn weekly_check_ins(&self) -> GymResult<Vec<DailyCheckIns>> {
        StatsService::weekly_check_ins(&self.store, self.clock.as_ref())
    }

    pub fn subscription_distribution(&self) -> GymResult<Vec<TypeCount>> {
        StatsService::subscription_distribution(&self.store)
    }

    pub fn dashboard(&mut self) -> GymResult<DashboardStats> {
        StatsService::dashboard(&mut self.store, self.clock.as_ref(), &self.config)
    }

    /// Dangling references and billing anomalies in the current data.
    pub fn integrity_warnings(&self) -> GymResult<Vec<String>> {
        let snapshot = self.store.snapshot()?;
        Ok(storage::integrity_warnings(&snapshot))
    }
}
