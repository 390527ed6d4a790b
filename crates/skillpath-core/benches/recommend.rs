use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skillpath_core::engine::{EngineConfig, RecommendationEngine};
use skillpath_core::model::{Course, Dataset, Interaction, QuizResult, Student};
use skillpath_core::snapshot::Snapshot;

fn generate_dataset(students: usize, courses: usize) -> Dataset {
    let topics = ["Algebra", "Biology", "History", "Physics", "Statistics"];
    let mut dataset = Dataset::default();

    for c in 0..courses {
        dataset.courses.push(Course {
            id: format!("C{c:04}"),
            topic: topics[c % topics.len()].to_string(),
            name: format!("Course {c}"),
        });
    }

    for s in 0..students {
        let id = format!("S{s:05}");
        dataset.students.push(Student {
            id: id.clone(),
            name: format!("Student {s}"),
            year: ((s % 4) + 1).to_string(),
            major: topics[s % topics.len()].to_string(),
        });
        for k in 0..6 {
            let course_id = format!("C{:04}", (s * 7 + k * 13) % courses);
            dataset.interactions.push(Interaction {
                student_id: id.clone(),
                course_id: course_id.clone(),
                time_spent: (10 + k * 5) as f64,
            });
            dataset.quiz_results.push(QuizResult {
                student_id: id.clone(),
                course_id,
                score: ((s * 31 + k * 17) % 100) as f64,
            });
        }
    }
    dataset
}

fn bench_snapshot_build(c: &mut Criterion) {
    let dataset = Arc::new(generate_dataset(500, 60));
    let config = EngineConfig::default();
    c.bench_function("snapshot_build/500", |b| {
        b.iter(|| Snapshot::build(Arc::clone(black_box(&dataset)), &config))
    });
}

fn bench_recommend(c: &mut Criterion) {
    let config = EngineConfig::default();
    let snapshot = Snapshot::build(Arc::new(generate_dataset(500, 60)), &config);
    let engine = RecommendationEngine::new(config);

    let mut group = c.benchmark_group("recommend");
    group.bench_function("top5", |b| {
        b.iter(|| engine.recommend(black_box(&snapshot), black_box("S00123"), 5))
    });
    group.bench_function("top20", |b| {
        b.iter(|| engine.recommend(black_box(&snapshot), black_box("S00123"), 20))
    });
    group.finish();
}

criterion_group!(benches, bench_snapshot_build, bench_recommend);
criterion_main!(benches);
