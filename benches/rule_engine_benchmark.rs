use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wx_station_check::models::{CheckProfile, Station, StationRecord, StationWindow};
use wx_station_check::processors::{RuleEngine, StationMonitor};
use wx_station_check::readers::MemorySource;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

// Hourly records for one station with every daily channel populated
fn create_station_records(count: usize, seed: usize) -> Vec<StationRecord> {
    (0..count)
        .map(|i| {
            let f = i as f64;
            let s = seed as f64;
            StationRecord::new(now() - Duration::hours(i as i64))
                .with_water_year(2024)
                .with_reading("Batt", Some(12.4 + (f * 0.37 + s).sin() * 0.3))
                .with_reading("Wind_Dir", Some((f * 17.0 + s * 11.0) % 360.0))
                .with_reading("Wind_Speed", Some((f * 0.13 + s).cos().abs() * 4.0))
                .with_reading("Air_Temp", Some(5.0 + (f * 0.26).sin() * 8.0))
                .with_reading("Soil_Temperature", Some(4.0 + (f * 0.05).sin()))
                .with_reading("Soil_Moisture", Some(30.0 + (f * 0.02).cos() * 5.0))
                .with_reading(
                    "RH",
                    if i % 11 == 0 {
                        None
                    } else {
                        Some(70.0 + (f * 0.3).sin() * 20.0)
                    },
                )
        })
        .collect()
}

fn benchmark_rule_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_engine");
    let station = Station::new("clean_bench", "Bench");

    for profile in [
        CheckProfile::transmission(),
        CheckProfile::daily(),
        CheckProfile::weekly(),
    ] {
        let window = StationWindow::new(
            "clean_bench",
            create_station_records(profile.window_size, 1),
            profile.window_size,
        )
        .unwrap();
        let engine = RuleEngine::new(&profile, now());

        group.bench_with_input(
            BenchmarkId::new("evaluate", profile.kind),
            &window,
            |b, window| b.iter(|| black_box(engine.evaluate(&station, window).unwrap())),
        );
    }

    group.finish();
}

fn benchmark_station_monitor(c: &mut Criterion) {
    let mut group = c.benchmark_group("station_monitor");

    for station_count in [10, 100, 500].iter() {
        let mut source = MemorySource::new();
        for seed in 0..*station_count {
            source.insert(
                format!("clean_station{:04}", seed),
                create_station_records(168, seed),
            );
        }
        let monitor = StationMonitor::new(source, CheckProfile::weekly());

        group.bench_with_input(
            BenchmarkId::new("weekly_check", station_count),
            station_count,
            |b, _| b.iter(|| black_box(monitor.check(now(), None).unwrap())),
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_rule_engine, benchmark_station_monitor);
criterion_main!(benches);
