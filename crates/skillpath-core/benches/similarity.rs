use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use skillpath_core::model::{SkillGap, TopicPerformance};
use skillpath_core::similarity::{cosine, MissingScorePolicy, SimilarityIndex};

const TOPICS: [&str; 8] = [
    "Algebra",
    "Biology",
    "Chemistry",
    "Geometry",
    "History",
    "Literature",
    "Physics",
    "Statistics",
];

fn generate_performances(students: usize) -> Vec<TopicPerformance> {
    let mut performances = Vec::new();
    for s in 0..students {
        for (t, topic) in TOPICS.iter().enumerate() {
            // Leave roughly a third of the cells empty.
            if (s + t) % 3 == 0 {
                continue;
            }
            let score = ((s * 37 + t * 11) % 100) as f64;
            performances.push(TopicPerformance {
                student_id: format!("S{s:05}"),
                topic: topic.to_string(),
                avg_time: 30.0,
                avg_score: score,
                skill_gap: SkillGap::Low,
                samples: 1,
            });
        }
    }
    performances
}

fn bench_cosine(c: &mut Criterion) {
    let a: Vec<f64> = (0..64).map(|i| i as f64).collect();
    let b: Vec<f64> = (0..64).map(|i| (64 - i) as f64).collect();
    c.bench_function("cosine/64", |bench| {
        bench.iter(|| cosine(black_box(&a), black_box(&b)))
    });
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity_build");
    for students in [100, 500, 1000] {
        let performances = generate_performances(students);
        group.bench_with_input(
            BenchmarkId::new("zero_fill", students),
            &performances,
            |b, p| b.iter(|| SimilarityIndex::build(black_box(p), MissingScorePolicy::ZeroFill)),
        );
        group.bench_with_input(
            BenchmarkId::new("co_evaluated", students),
            &performances,
            |b, p| {
                b.iter(|| SimilarityIndex::build(black_box(p), MissingScorePolicy::CoEvaluated))
            },
        );
    }
    group.finish();
}

fn bench_neighbors(c: &mut Criterion) {
    let index = SimilarityIndex::build(&generate_performances(1000), MissingScorePolicy::ZeroFill);
    c.bench_function("neighbors/1000/k=5", |b| {
        b.iter(|| index.neighbors(black_box("S00042"), black_box(5)))
    });
}

criterion_group!(benches, bench_cosine, bench_build, bench_neighbors);
criterion_main!(benches);
