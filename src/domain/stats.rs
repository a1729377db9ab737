//! Read-side summaries produced by the stats service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{member::Member, payment::Payment};

/// Check-in count for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCheckIns {
    /// Short weekday name, e.g. `Mon`.
    pub day: String,
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeRevenue {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardAlerts {
    pub overdue_members: Vec<Member>,
    pub incomplete_payments: Vec<Payment>,
    pub renewals_due: Vec<Member>,
}

/// Combined statistics bundle rendered by the dashboard view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardStats {
    pub active_members: usize,
    pub today_check_ins: usize,
    pub today_revenue: f64,
    pub incomplete_payments: usize,
    pub weekly_check_ins: Vec<DailyCheckIns>,
    pub subscription_distribution: Vec<TypeCount>,
    pub revenue_by_type: Vec<TypeRevenue>,
    pub alerts: DashboardAlerts,
}
