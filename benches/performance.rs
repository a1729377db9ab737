use chrono::{Duration, FixedOffset, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use gymflow_core::{
    config::GymConfig,
    core::{gym_manager::GymManager, time::FixedClock},
    domain::{CheckIn, Member, NewMember, Payment, PaymentStatus, SubscriptionType},
    storage::{
        json_backend::{load_data_from_path, save_data_to_path},
        GymData, MemoryStore,
    },
};
use tempfile::tempdir;

fn build_sample_data(member_count: usize) -> GymData {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let offset = FixedOffset::east_opt(0).expect("utc offset");
    let mut data = GymData::default();

    for idx in 0..member_count {
        let kind = SubscriptionType::ALL[idx % SubscriptionType::ALL.len()];
        let start = now - Duration::days((idx % 60) as i64);
        let mut draft = NewMember::new(format!("Member {idx}"), format!("555-{idx:04}"), kind, start);
        if idx % 4 != 0 {
            draft = draft.paid();
        }
        let end = kind.renewal_date(start).expect("renewal date");
        let member = Member::from_draft(draft, end, now, &offset);

        let status = if idx % 5 == 0 {
            PaymentStatus::Incomplete
        } else {
            PaymentStatus::Paid
        };
        let paid_on = start + Duration::hours((idx % 24) as i64);
        data.payments
            .push(Payment::for_member(&member, 10.0 + (idx % 40) as f64, paid_on, status));
        for day in 0..3 {
            data.check_ins
                .push(CheckIn::for_member(&member, now - Duration::days(day + (idx % 5) as i64)));
        }
        data.members.push(member);
    }
    data
}

fn bench_store_io(c: &mut Criterion) {
    let data = build_sample_data(black_box(5_000));
    let dir = tempdir().expect("tempdir");
    let file_path = dir.path().join("gymflow.json");

    c.bench_function("data_save_5k", |b| {
        b.iter(|| {
            save_data_to_path(&data, &file_path).expect("save data");
        })
    });

    save_data_to_path(&data, &file_path).expect("seed");

    c.bench_function("data_load_5k", |b| {
        b.iter(|| {
            let loaded = load_data_from_path(&file_path).expect("load data");
            black_box(loaded);
        })
    });
}

fn bench_aggregations(c: &mut Criterion) {
    let data = build_sample_data(black_box(5_000));
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();

    c.bench_function("dashboard_5k", |b| {
        b.iter_batched(
            || {
                GymManager::with_clock(
                    MemoryStore::from_data(data.clone()),
                    GymConfig::default(),
                    FixedClock::new(now),
                )
            },
            |mut manager| {
                let stats = manager.dashboard().expect("dashboard");
                black_box(stats);
            },
            BatchSize::LargeInput,
        );
    });

    c.bench_function("search_5k", |b| {
        b.iter_batched(
            || {
                GymManager::with_clock(
                    MemoryStore::from_data(data.clone()),
                    GymConfig::default(),
                    FixedClock::new(now),
                )
            },
            |mut manager| {
                let hits = manager.search_members("member 12").expect("search");
                black_box(hits);
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_store_io, bench_aggregations);
criterion_main!(benches);
