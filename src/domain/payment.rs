//! Payment records and their caller-facing drafts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;
use crate::domain::member::Member;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub member_name: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub status: PaymentStatus,
    pub subscription_type: SubscriptionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Payment {
    /// Creates a payment snapshotting the member's name and subscription type.
    pub fn for_member(
        member: &Member,
        amount: f64,
        date: DateTime<Utc>,
        status: PaymentStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id: member.id,
            member_name: member.name.clone(),
            amount,
            date,
            status,
            subscription_type: member.subscription_type,
            notes: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    pub fn is_incomplete(&self) -> bool {
        self.status == PaymentStatus::Incomplete
    }

    pub fn mark_paid(&mut self, amount: f64, date: DateTime<Utc>) {
        self.amount = amount;
        self.date = date;
        self.status = PaymentStatus::Paid;
    }
}

impl Identifiable for Payment {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for Payment {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Payment {
    fn display_label(&self) -> String {
        format!("payment:{} {:.2} [{}]", self.id, self.amount, self.status)
    }
}

/// Caller-supplied fields for recording a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub member_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub status: PaymentStatus,
    /// Defaults to the current time.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewPayment {
    pub fn paid(member_id: Uuid, amount: f64) -> Self {
        Self {
            member_id,
            amount,
            status: PaymentStatus::Paid,
            date: None,
            notes: None,
        }
    }

    pub fn incomplete(member_id: Uuid, amount: f64) -> Self {
        Self {
            status: PaymentStatus::Incomplete,
            ..Self::paid(member_id, amount)
        }
    }

    pub fn on(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub amount: Option<f64>,
    pub date: Option<DateTime<Utc>>,
    pub status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

impl PaymentUpdate {
    pub fn apply(self, payment: &mut Payment) {
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(date) = self.date {
            payment.date = date;
        }
        if let Some(status) = self.status {
            payment.status = status;
        }
        if let Some(notes) = self.notes {
            payment.notes = (!notes.trim().is_empty()).then_some(notes);
        }
    }
}
