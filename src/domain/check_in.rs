use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;
use crate::domain::member::Member;

/// A timestamped admission event with a snapshot of the member at that moment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckIn {
    pub id: Uuid,
    pub member_id: Uuid,
    pub member_name: String,
    pub timestamp: DateTime<Utc>,
    pub subscription_type: SubscriptionType,
    pub member_status: MemberStatus,
}

impl CheckIn {
    pub fn for_member(member: &Member, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id: member.id,
            member_name: member.name.clone(),
            timestamp,
            subscription_type: member.subscription_type,
            member_status: member.status,
        }
    }
}

impl Identifiable for CheckIn {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for CheckIn {
    fn display_label(&self) -> String {
        format!(
            "check-in:{} {} at {}",
            self.id,
            self.member_name,
            self.timestamp.format("%Y-%m-%d %H:%M")
        )
    }
}
