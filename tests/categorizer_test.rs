use std::collections::HashSet;

use env_logger::{Builder, Env};
use spend_classifier::vectorizer::analyze;
use spend_classifier::{
    dataset, Categorizer, CategorizerError, CategoryRegistry, LabeledRecord, ModelArtifact,
    TransactionRecord,
};

fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}

fn swiggy() -> TransactionRecord {
    TransactionRecord::new("Swiggy food delivery bangalore biryani")
        .with_merchant("Swiggy")
        .with_amount(450.0)
}

/// The illustrative corpus plus extra food-delivery rows, so the delivery vocabulary
/// survives the held-out split.
fn corpus() -> Vec<LabeledRecord> {
    let mut records = dataset::synthetic_records();
    let extra = [
        ("Swiggy food delivery dinner", 380.0),
        ("Swiggy order biryani lunch", 290.0),
        ("Swiggy food delivery pizza", 520.0),
        ("Food delivery order burger", 240.0),
        ("Swiggy instamart snacks delivery", 180.0),
        ("Zomato food delivery biryani", 410.0),
    ];
    for (description, amount) in extra {
        let merchant = description.split_whitespace().next().unwrap_or_default();
        records.push(LabeledRecord::new(
            TransactionRecord::new(description)
                .with_merchant(merchant)
                .with_amount(amount),
            "Food & Dining",
        ));
    }
    records
}

fn train() -> Result<Categorizer, CategorizerError> {
    Categorizer::builder().add_records(corpus())?.build()
}

#[test]
fn test_swiggy_document() -> Result<(), CategorizerError> {
    let document = swiggy().document();
    let features = analyze(&document)?;
    assert!(features.iter().any(|f| f == "swiggy"));
    assert!(features.iter().any(|f| f == "food delivery"));
    assert!(features.iter().any(|f| f == "small_amount"));
    Ok(())
}

#[test]
fn test_swiggy_end_to_end() -> Result<(), CategorizerError> {
    init();
    let categorizer = train()?;
    let scorer = categorizer.to_artifact().scorer()?;

    let ranked = scorer.predict_ranked(&swiggy())?;
    assert_eq!(ranked[0].0, "Food & Dining");
    assert!(ranked[0].1 > ranked[1].1);

    let (category, scores) = categorizer.predict(&swiggy())?;
    assert_eq!(category, "Food & Dining");
    let total: f64 = scores.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_artifact_agrees_with_categorizer() -> Result<(), CategorizerError> {
    init();
    let categorizer = train()?;
    let json = categorizer.to_artifact().to_json()?;
    let scorer = ModelArtifact::from_json(&json)?.scorer()?;

    for example in corpus() {
        let (expected, _) = categorizer.predict(&example.record)?;
        assert_eq!(
            scorer.predict(&example.record)?,
            expected,
            "disagreement on '{}'",
            example.record.document()
        );
    }
    Ok(())
}

#[test]
fn test_categories_are_registered() -> Result<(), CategorizerError> {
    init();
    let categorizer = train()?;
    let registry = CategoryRegistry::default();

    let observed: HashSet<String> = corpus().into_iter().map(|r| r.category).collect();
    let predictable: HashSet<String> = categorizer.info().categories.into_iter().collect();
    assert_eq!(predictable, observed);

    // registry order
    let positions: Vec<usize> = categorizer
        .model()
        .categories()
        .iter()
        .filter_map(|c| registry.position(c))
        .collect();
    assert_eq!(positions.len(), categorizer.model().categories().len());
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let unseen = TransactionRecord::new("completely unrelated words here");
    let (category, scores) = categorizer.predict(&unseen)?;
    assert!(registry.contains(&category));
    assert_eq!(scores.len(), observed.len());
    Ok(())
}

#[test]
fn test_unknown_categories_dropped() -> Result<(), CategorizerError> {
    init();
    let mut records = corpus();
    records.push(LabeledRecord::new(TransactionRecord::new("house rent march"), "Rent"));
    records.push(LabeledRecord::new(TransactionRecord::new("house rent april"), "Rent"));
    let categorizer = Categorizer::builder().add_records(records)?.build()?;

    assert_eq!(categorizer.info().training_samples, corpus().len());
    assert!(!categorizer.model().categories().iter().any(|c| c == "Rent"));
    Ok(())
}

#[test]
fn test_accents_and_case_do_not_matter() -> Result<(), CategorizerError> {
    init();
    let categorizer = train()?;
    let plain = categorizer.predict(&TransactionRecord::new("starbucks coffee latte"))?;
    let fancy = categorizer.predict(&TransactionRecord::new("STARBÜCKS Coffée LATTÉ"))?;
    assert_eq!(plain.0, fancy.0);
    for (category, p) in &plain.1 {
        assert!((p - fancy.1[category]).abs() < 1e-12);
    }
    Ok(())
}

#[test]
fn test_metrics_are_populated() -> Result<(), CategorizerError> {
    init();
    let categorizer = train()?;
    let metrics = categorizer.metrics();

    assert_eq!(metrics.train_size + metrics.test_size, corpus().len());
    assert_eq!(metrics.cross_validation.scores.len(), 5);
    assert!((0.0..=1.0).contains(&metrics.test_accuracy));
    assert!((0.0..=1.0).contains(&metrics.cross_validation.mean));

    let top = categorizer.top_features(5);
    assert_eq!(top.len(), categorizer.model().categories().len());
    assert!(top.iter().all(|(_, features)| features.len() <= 5));
    Ok(())
}
