//! Benchmarks for NutriFlex scoring and backup
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use nutriflex::scoring::{
    compute_streaks, daily_breakdown, weekly_detailed_stats, ActivityDays, ScoringRules,
};
use nutriflex::storage::FileStore;
use nutriflex::tracker::{
    CalendarDate, Clock, ExerciseLog, FixedClock, HabitLog, HistoryItem, Intensity, MealLog,
    MealStatus, Tracker,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::tempdir;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

struct Fixture {
    clock: FixedClock,
    items: Vec<HistoryItem>,
    water: BTreeMap<CalendarDate, u32>,
    habit_logs: Vec<HabitLog>,
}

/// One meal, one workout, some water and a habit per day for `days` days
fn create_history(days: usize) -> Fixture {
    let today = CalendarDate::from_ymd(2024, 6, 5).unwrap();
    let clock = FixedClock::on(today, 20);
    let now = clock.now_millis();

    let mut items = Vec::with_capacity(days * 2);
    let mut water = BTreeMap::new();
    let mut habit_logs = Vec::with_capacity(days);

    for offset in 0..days {
        let at = now - offset as i64 * DAY_MS;
        let day = today.days_before(offset as u64).unwrap();

        items.push(HistoryItem::Meal(MealLog {
            id: format!("meal-{}", offset),
            timestamp: at,
            title: "Ensalada".to_string(),
            calories: 450,
            is_healthy: offset % 3 != 0,
            score_value: None,
            status: MealStatus::Completed,
            consumed_at: Some(at),
            user_notes: String::new(),
        }));
        items.push(HistoryItem::Exercise(ExerciseLog {
            id: format!("exercise-{}", offset),
            timestamp: at,
            name: "Correr".to_string(),
            time: "07:30".to_string(),
            intensity: Intensity::Medium,
            duration: 30,
            calories_burned: 280,
        }));

        water.insert(day, (offset % 9) as u32);
        habit_logs.push(HabitLog {
            date: day,
            habit_id: "read".to_string(),
        });
    }

    Fixture {
        clock,
        items,
        water,
        habit_logs,
    }
}

fn bench_streaks(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaks");

    for days in [30, 365, 3650] {
        let fixture = create_history(days);
        let today = fixture.clock.today();

        group.throughput(Throughput::Elements(days as u64));

        group.bench_function(format!("collect_and_compute_{}", days), |b| {
            b.iter(|| {
                let activity = ActivityDays::collect(
                    black_box(&fixture.items),
                    &fixture.water,
                    &fixture.habit_logs,
                    &fixture.clock,
                );
                compute_streaks(&activity, today)
            })
        });
    }

    group.finish();
}

fn bench_aggregates(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregates");
    let rules = ScoringRules::default();

    for days in [30, 365, 3650] {
        let fixture = create_history(days);

        group.bench_function(format!("daily_breakdown_{}", days), |b| {
            b.iter(|| daily_breakdown(black_box(&fixture.items), 4, &fixture.clock, &rules))
        });

        group.bench_function(format!("weekly_stats_{}", days), |b| {
            b.iter(|| {
                weekly_detailed_stats(
                    black_box(&fixture.items),
                    &fixture.water,
                    &fixture.clock,
                    &rules,
                )
            })
        });
    }

    group.finish();
}

fn bench_backup(c: &mut Criterion) {
    let mut group = c.benchmark_group("backup");

    group.bench_function("export_import_365", |b| {
        let dir = tempdir().unwrap();
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let fixture = create_history(365);
        let tracker = Tracker::new(store, Arc::new(fixture.clock), ScoringRules::default());
        tracker.init().unwrap();

        for _ in 0..50 {
            tracker.update_water(1).unwrap();
        }
        let payload = serde_json::to_string(&tracker.export_full_data().unwrap()).unwrap();

        b.iter(|| {
            assert!(tracker.import_full_data(black_box(&payload)));
            tracker.export_full_data().unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_streaks, bench_aggregates, bench_backup);
criterion_main!(benches);
