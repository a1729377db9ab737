use chrono::Utc;
use gymflow_core::{
    domain::{NewMember, SubscriptionType},
    init, GymConfig, GymManager, MemoryStore,
};

#[test]
fn front_desk_smoke() {
    init();

    let mut manager = GymManager::new(MemoryStore::new(), GymConfig::default());
    let member = manager
        .add_member(NewMember::new(
            "Smoke Test",
            "555-0000",
            SubscriptionType::Monthly,
            Utc::now(),
        ))
        .unwrap();
    manager.complete_payment(member.id, 50.0).unwrap();
    manager.check_in(member.id).unwrap();

    let stats = manager.dashboard().unwrap();
    assert_eq!(stats.active_members, 1);
    assert_eq!(stats.today_check_ins, 1);
    assert_eq!(stats.today_revenue, 50.0);
    assert!(manager.integrity_warnings().unwrap().is_empty());
}
