use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spend_classifier::{dataset, Categorizer, TfidfVectorizer, TransactionRecord, VectorizerConfig};

fn setup_benchmark_categorizer() -> Categorizer {
    Categorizer::builder()
        .add_records(dataset::synthetic_records())
        .unwrap()
        .build()
        .unwrap()
}

fn bench_vectorizer(c: &mut Criterion) {
    let documents: Vec<String> = dataset::synthetic_records()
        .iter()
        .map(|r| r.record.document())
        .collect();
    let mut group = c.benchmark_group("Vectorizer");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("fit", |b| {
        b.iter(|| TfidfVectorizer::fit(black_box(&documents), &VectorizerConfig::default()).unwrap())
    });

    let vectorizer = TfidfVectorizer::fit(&documents, &VectorizerConfig::default()).unwrap();
    group.bench_function("transform_short", |b| {
        b.iter(|| vectorizer.transform(black_box("Uber ride airport cab")).unwrap())
    });
    group.bench_function("transform_long", |b| {
        b.iter(|| {
            vectorizer
                .transform(black_box(
                    "Swiggy food delivery bangalore biryani late night order with extra \
                     raita and dessert, delivered to office Swiggy small_amount",
                ))
                .unwrap()
        })
    });

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let categorizer = setup_benchmark_categorizer();
    let scorer = categorizer.to_artifact().scorer().unwrap();
    let record = TransactionRecord::new("Swiggy food delivery bangalore biryani")
        .with_merchant("Swiggy")
        .with_amount(450.0);

    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);

    group.bench_function("categorizer", |b| {
        b.iter(|| categorizer.predict(black_box(&record)).unwrap())
    });
    group.bench_function("artifact_scorer", |b| {
        b.iter(|| scorer.predict(black_box(&record)).unwrap())
    });

    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("Training");
    group.sample_size(10);
    group.bench_function("synthetic_corpus", |b| b.iter(setup_benchmark_categorizer));
    group.finish();
}

criterion_group!(benches, bench_vectorizer, bench_prediction, bench_training);
criterion_main!(benches);
