use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use statusboard_types::{
    aggregate, canonical, normalize, strip_dates, ServiceId, Status, StatusEvent,
};

/// Checks every five minutes for `services` services over `days` days.
fn fixture(services: usize, days: i64) -> Vec<StatusEvent> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let per_day = 24 * 12;
    let mut events = Vec::with_capacity(services * days as usize * per_day);

    for slot in 0..days * per_day as i64 {
        let at = start + Duration::minutes(slot * 5);
        let ts = at.format("%Y-%m-%d %H:%M:%S%.6f+00").to_string();
        for s in 0..services {
            let status = match (slot as usize + s) % 97 {
                0 => Status::Error,
                1 | 2 => Status::Warn,
                _ => Status::Ok,
            };
            events.push(
                StatusEvent::new(format!("svc-{s}"), ts.clone(), status)
                    .with_response_time(100 + (slot as u32 % 400)),
            );
        }
    }
    events
}

/// Benchmark timestamp normalization on the backend's text form
fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_backend_form", |b| {
        b.iter(|| normalize(black_box("2025-12-28 06:07:09.312465+00")));
    });

    let instant = Utc.with_ymd_and_hms(2025, 12, 28, 6, 7, 9).unwrap();
    c.bench_function("canonical", |b| {
        b.iter(|| canonical(black_box(&instant)));
    });
}

/// Benchmark a full aggregation pass over growing histories
fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let zone = FixedOffset::east_opt(9 * 3600).unwrap();

    for days in [7i64, 30, 90].iter() {
        let events = fixture(10, *days);
        group.bench_with_input(BenchmarkId::from_parameter(days), &events, |b, events| {
            b.iter(|| aggregate(black_box(events), &zone));
        });
    }
    group.finish();
}

/// Benchmark painting a 90-day strip for every service from one aggregation
fn bench_strip_lookup(c: &mut Criterion) {
    let events = fixture(10, 90);
    let result = aggregate(&events, &Utc);
    let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
    let services: Vec<ServiceId> = (0..10).map(|s| ServiceId::new(format!("svc-{s}"))).collect();

    c.bench_function("strip_90_days_10_services", |b| {
        b.iter(|| {
            for service in &services {
                black_box(result.buckets.strip(service, today, 90));
            }
        });
    });

    c.bench_function("uptime_90_days", |b| {
        b.iter(|| result.buckets.uptime(&services[0], strip_dates(today, 90)));
    });
}

criterion_group!(benches, bench_normalize, bench_aggregate, bench_strip_lookup);
criterion_main!(benches);
