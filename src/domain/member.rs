use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A gym subscriber with billing and lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub subscription_type: SubscriptionType,
    pub subscription_start: DateTime<Utc>,
    pub subscription_end: DateTime<Utc>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Display cache of the derived lifecycle status.
    #[serde(default)]
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Builds a member from a validated draft, deriving its initial status.
    pub fn from_draft(
        draft: NewMember,
        subscription_end: DateTime<Utc>,
        now: DateTime<Utc>,
        offset: &FixedOffset,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            email: draft
                .email
                .map(|email| email.trim().to_string())
                .filter(|email| !email.is_empty()),
            subscription_type: draft.subscription_type,
            subscription_start: draft.subscription_start,
            subscription_end,
            payment_status: draft.payment_status,
            status: MemberStatus::derive(subscription_end, now, offset),
            created_at: now,
            updated_at: now,
        }
    }

    /// Recomputes the cached status, returning `true` when it changed.
    pub fn refresh_status(&mut self, now: DateTime<Utc>, offset: &FixedOffset) -> bool {
        let derived = MemberStatus::derive(self.subscription_end, now, offset);
        if derived == self.status {
            return false;
        }
        self.status = derived;
        true
    }

    /// Case-insensitive on name and email, case-sensitive on phone and id.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        let lowered = query.to_lowercase();
        self.name.to_lowercase().contains(&lowered)
            || self.phone.contains(query)
            || self
                .email
                .as_deref()
                .is_some_and(|email| email.to_lowercase().contains(&lowered))
            || self.id.to_string().contains(query)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

impl Identifiable for Member {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Member {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Member {
    fn display_label(&self) -> String {
        format!("{} ({}, {})", self.name, self.subscription_type, self.status)
    }
}

/// Caller-supplied fields for registering a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub subscription_type: SubscriptionType,
    pub subscription_start: DateTime<Utc>,
    /// Computed from the subscription type when absent.
    #[serde(default)]
    pub subscription_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl NewMember {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        subscription_type: SubscriptionType,
        subscription_start: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: None,
            subscription_type,
            subscription_start,
            subscription_end: None,
            payment_status: PaymentStatus::Incomplete,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_end(mut self, subscription_end: DateTime<Utc>) -> Self {
        self.subscription_end = Some(subscription_end);
        self
    }

    pub fn paid(mut self) -> Self {
        self.payment_status = PaymentStatus::Paid;
        self
    }
}

/// Partial update of the caller-editable member fields.
/// `status` is not editable; it is re-derived after every update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub subscription_type: Option<SubscriptionType>,
    pub subscription_start: Option<DateTime<Utc>>,
    pub subscription_end: Option<DateTime<Utc>>,
    pub payment_status: Option<PaymentStatus>,
}

impl MemberUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.subscription_type.is_none()
            && self.subscription_start.is_none()
            && self.subscription_end.is_none()
            && self.payment_status.is_none()
    }

    /// Applies the present fields to `member`.
    pub fn apply(self, member: &mut Member) {
        if let Some(name) = self.name {
            member.name = name.trim().to_string();
        }
        if let Some(phone) = self.phone {
            member.phone = phone.trim().to_string();
        }
        if let Some(email) = self.email {
            let trimmed = email.trim();
            member.email = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        if let Some(kind) = self.subscription_type {
            member.subscription_type = kind;
        }
        if let Some(start) = self.subscription_start {
            member.subscription_start = start;
        }
        if let Some(end) = self.subscription_end {
            member.subscription_end = end;
        }
        if let Some(payment_status) = self.payment_status {
            member.payment_status = payment_status;
        }
    }
}

/// Ordering applied to member query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberSort {
    /// Insertion order of the backing store.
    #[default]
    Storage,
    /// Case-insensitive by name.
    Alphabetical,
}

/// Text and status filter over the member registry.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub text: Option<String>,
    pub status: Option<MemberStatus>,
    pub sort: MemberSort,
}

impl MemberFilter {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            text: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: MemberStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn sorted(mut self, sort: MemberSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, member: &Member) -> bool {
        let text_ok = self
            .text
            .as_deref()
            .map_or(true, |query| member.matches_query(query));
        let status_ok = self.status.map_or(true, |status| member.status == status);
        text_ok && status_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(name: &str, phone: &str) -> Member {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let draft = NewMember::new(name, phone, SubscriptionType::Monthly, start)
            .with_email("someone@example.com");
        let offset = FixedOffset::east_opt(0).unwrap();
        Member::from_draft(draft, start + chrono::Duration::days(30), start, &offset)
    }

    #[test]
    fn query_matches_name_case_insensitively() {
        let member = sample("John Smith", "555-0100");
        assert!(member.matches_query("john"));
        assert!(member.matches_query("SMITH"));
        assert!(!member.matches_query("sarah"));
    }

    #[test]
    fn query_matches_phone_email_and_id() {
        let member = sample("Ann Lee", "555-0199");
        assert!(member.matches_query("0199"));
        assert!(member.matches_query("EXAMPLE.com"));
        let id_fragment = member.id.to_string()[..8].to_string();
        assert!(member.matches_query(&id_fragment));
    }

    #[test]
    fn draft_email_is_trimmed_or_dropped() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let offset = FixedOffset::east_opt(0).unwrap();
        let build = |email: &str| {
            let draft = NewMember::new("Ann", "555", SubscriptionType::Daily, start)
                .with_email(email);
            Member::from_draft(draft, start, start, &offset).email
        };
        assert_eq!(build("  ann@example.com ").as_deref(), Some("ann@example.com"));
        assert_eq!(build("   "), None);
    }

    #[test]
    fn update_never_touches_status() {
        let mut member = sample("Ann Lee", "555-0199");
        let before = member.status;
        MemberUpdate {
            name: Some("  Ann B. Lee ".into()),
            email: Some(String::new()),
            ..MemberUpdate::default()
        }
        .apply(&mut member);
        assert_eq!(member.name, "Ann B. Lee");
        assert_eq!(member.email, None);
        assert_eq!(member.status, before);
    }

    #[test]
    fn filter_combines_text_and_status() {
        let member = sample("John Smith", "555-0100");
        assert!(MemberFilter::text("john").matches(&member));
        assert!(!MemberFilter::text("john")
            .with_status(MemberStatus::Overdue)
            .matches(&member));
    }
}
