//! Shared traits and enums for membership records.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Billing cadence of a membership.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl SubscriptionType {
    pub const ALL: [SubscriptionType; 3] = [
        SubscriptionType::Daily,
        SubscriptionType::Weekly,
        SubscriptionType::Monthly,
    ];

    /// Lowercase key used in persisted records.
    pub fn key(self) -> &'static str {
        match self {
            SubscriptionType::Daily => "daily",
            SubscriptionType::Weekly => "weekly",
            SubscriptionType::Monthly => "monthly",
        }
    }

    /// Label-cased name (first letter uppercased).
    pub fn label(self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Returns the end of a subscription period that begins at `start`,
    /// or `None` when it falls outside the representable range.
    pub fn renewal_date(self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            SubscriptionType::Daily => start.checked_add_signed(Duration::days(1)),
            SubscriptionType::Weekly => start.checked_add_signed(Duration::weeks(1)),
            SubscriptionType::Monthly => start.checked_add_months(Months::new(1)),
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Lifecycle classification derived from a member's subscription end.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Due,
    Overdue,
}

impl MemberStatus {
    /// Derives the status for a subscription ending at `subscription_end`.
    ///
    /// Both timestamps are reduced to calendar days in `offset`. A subscription
    /// ending on the current day is `Due` regardless of the time of day; one
    /// that ended earlier is `Overdue`.
    pub fn derive(
        subscription_end: DateTime<Utc>,
        now: DateTime<Utc>,
        offset: &FixedOffset,
    ) -> MemberStatus {
        let end_day = subscription_end.with_timezone(offset).date_naive();
        let today = now.with_timezone(offset).date_naive();
        if end_day == today {
            MemberStatus::Due
        } else if subscription_end < now {
            MemberStatus::Overdue
        } else {
            MemberStatus::Active
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MemberStatus::Active => "Active",
            MemberStatus::Due => "Due",
            MemberStatus::Overdue => "Overdue",
        };
        f.write_str(label)
    }
}

/// Whether the current billing cycle has been paid in full.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Incomplete,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Incomplete => "Incomplete",
        };
        f.write_str(label)
    }
}
