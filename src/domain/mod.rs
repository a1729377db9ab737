pub mod check_in;
pub mod common;
pub mod member;
pub mod payment;
pub mod stats;

pub use check_in::CheckIn;
pub use common::{
    Amounted, Displayable, Identifiable, MemberStatus, NamedEntity, PaymentStatus,
    SubscriptionType,
};
pub use member::{Member, MemberFilter, MemberSort, MemberUpdate, NewMember};
pub use payment::{NewPayment, Payment, PaymentUpdate};
pub use stats::{DailyCheckIns, DashboardAlerts, DashboardStats, TypeCount, TypeRevenue};
