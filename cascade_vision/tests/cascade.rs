use std::collections::BTreeMap;

use cascade_vision::core_modules::catalog::Catalog;
use cascade_vision::core_modules::domain::Domain;
use cascade_vision::core_modules::features::{FeatureVector, Shape, Symbol};
use cascade_vision::core_modules::matcher::{self, MatchOutcome, MATCH_FLOOR};
use cascade_vision::core_modules::pixel::pixel::ColorSample;
use cascade_vision::core_modules::utils::image_helper::image_helper::{encode_png, solid};
use cascade_vision::{CascadeClassifier, ClassifierPool, Stage};
use image::{Rgb, RgbImage};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8]))
}

fn checkerboard(width: u32, height: u32, cell: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
    })
}

fn fixtures() -> Vec<(&'static str, RgbImage)> {
    vec![
        ("gradient.png", gradient(160, 120)),
        ("checker.png", checkerboard(200, 200, 25)),
        ("olive.png", solid(100, 100, ColorSample::new(90, 90, 40))),
        ("sky.png", solid(100, 100, ColorSample::new(170, 210, 230))),
        ("tiny.png", solid(3, 1, ColorSample::new(250, 10, 10))),
    ]
}

fn flat_features(dominant: ColorSample, secondary: ColorSample, shape: Shape) -> FeatureVector {
    let mut shape_scores: BTreeMap<Shape, f64> = Shape::ALL.iter().map(|s| (*s, 0.0)).collect();
    shape_scores.insert(shape, 0.9);
    FeatureVector {
        dominant,
        secondary,
        shape_scores,
        symbol_scores: Symbol::ALL.iter().map(|s| (*s, 0.0)).collect(),
        has_stripes: false,
        has_text: false,
        contrast: 0.0,
    }
}

#[test]
fn confidence_stays_in_unit_interval() {
    for domain in Domain::ALL {
        let classifier = CascadeClassifier::new(domain);
        for (name, image) in fixtures() {
            let bytes = encode_png(&image).expect("encodable");
            let result = classifier.classify(&bytes, name);
            assert!((0.0..=1.0).contains(&result.confidence), "{domain} {name}: {}", result.confidence);
            assert!(!result.label.is_empty());
        }
    }
}

#[test]
fn covert_code_wins_regardless_of_content() {
    let shields = CascadeClassifier::new(Domain::Shield);
    for (name, mut image) in fixtures().into_iter().filter(|(_, img)| img.width() >= 4 && img.height() >= 2) {
        assert!(shields.profile().covert.embed(&mut image, 3));
        let result = shields.classify(&encode_png(&image).expect("encodable"), name);
        assert_eq!(result.stage, Stage::CovertChannel, "{name}");
        assert_eq!(result.label, "São Paulo");
        assert_eq!(result.category, "Brasileirão");
        assert_eq!(result.confidence, 0.98);
    }

    let faces = CascadeClassifier::new(Domain::Expression);
    let mut image = solid(80, 80, ColorSample::new(250, 230, 40));
    assert!(faces.profile().covert.embed(&mut image, 4));
    let result = faces.classify(&encode_png(&image).expect("encodable"), "yellow-but-coded.png");
    assert_eq!(result.label, "surprised");
    assert_eq!(result.confidence, 0.98);
}

#[test]
fn undersized_image_skips_the_covert_stage() {
    let result = CascadeClassifier::new(Domain::Shield).classify(
        &encode_png(&solid(3, 1, ColorSample::new(0, 1, 0))).expect("encodable"),
        "tiny.png",
    );
    assert!(!result.is_error());
    assert_ne!(result.stage, Stage::CovertChannel);
}

#[test]
fn orange_beats_red_on_an_overlapping_background() {
    // (255, 140, 0) satisfies both the orange and the red shield predicates.
    let bytes = encode_png(&solid(120, 120, ColorSample::new(255, 140, 0))).expect("encodable");
    let result = CascadeClassifier::new(Domain::Shield).classify(&bytes, "orange.png");
    assert_eq!(result.stage, Stage::DominantBackground);
    assert_eq!(result.label, "Galatasaray");
    assert_eq!(result.category, "Süper Lig");
}

#[test]
fn uniform_backgrounds_never_reach_the_matcher() {
    let classifier = CascadeClassifier::new(Domain::Shield);
    let cases = [
        (ColorSample::new(0, 200, 0), "Palmeiras"),
        (ColorSample::new(20, 20, 200), "PSG"),
        (ColorSample::new(220, 20, 20), "Flamengo"),
        (ColorSample::new(240, 240, 240), "Corinthians"),
    ];
    for (color, label) in cases {
        let bytes = encode_png(&solid(120, 120, color)).expect("encodable");
        let result = classifier.classify(&bytes, "flat.png");
        assert_eq!(result.stage, Stage::DominantBackground, "{color:?}");
        assert_eq!(result.label, label);
        assert_eq!(result.rationale, "dominant background");
    }
}

#[test]
fn exact_primary_color_selects_its_entry() {
    let catalog: &Catalog = &Domain::Shield.profile().catalog;
    let psg = catalog.by_label("PSG").expect("listed");
    let features = flat_features(psg.colors[0], psg.colors[0], Shape::Circular);

    let score = matcher::score_entry(&features, psg, catalog.shape_default());
    assert_eq!(score.color, 1.0);
    assert!(score.total >= 0.5);

    let best = matcher::best_match(&features, catalog).expect("catalog is not empty");
    assert_eq!(best.entry.label, "PSG");
}

#[test]
fn weak_matches_synthesize_an_unlisted_label() {
    let profile = Domain::Shield.profile();
    // Far from every reference color, and no catalog entry is triangular.
    let color = ColorSample::new(128, 128, 200);
    let features = flat_features(color, color, Shape::Triangular);

    match matcher::resolve(&features, &profile.catalog, &profile.synthesis) {
        MatchOutcome::Synthesized(entry) => {
            assert!(!profile.catalog.contains_label(&entry.label), "{}", entry.label);
            assert_eq!(entry.category, "Regional League");
            assert!(entry.best_score.is_some_and(|s| s < MATCH_FLOOR));
        }
        MatchOutcome::Catalog(found) => panic!("unexpected catalog match {}", found.entry.label),
    }
}

fn off_catalog_crest() -> RgbImage {
    RgbImage::from_fn(200, 200, |x, y| {
        if (69..131).contains(&x) && (69..131).contains(&y) { Rgb([255, 0, 255]) } else { Rgb([0, 255, 255]) }
    })
}

#[test]
fn unmatched_crest_synthesizes_an_unlisted_label() {
    let classifier = CascadeClassifier::new(Domain::Shield);
    let bytes = encode_png(&off_catalog_crest()).expect("encodable");
    let result = classifier.classify(&bytes, "crest.png");
    assert_eq!(result.stage, Stage::GenericSynthesis);
    assert_eq!(result.confidence, 0.75);
    assert_eq!(result.rationale, "generic synthesis");
    assert_eq!(result.category, "Regional League");
    assert_eq!(result.detected_shape.as_deref(), Some("Triangular"));
    assert!(!classifier.profile().catalog.contains_label(&result.label), "{}", result.label);
    assert_eq!(classifier.classify(&bytes, "crest.png").label, result.label);
}

#[test]
fn non_image_bytes_are_an_error_result() {
    for domain in Domain::ALL {
        let result = CascadeClassifier::new(domain).classify(b"\x89PNG but not really", "bad.png");
        assert_eq!(result.category, "ERROR");
        assert_eq!(result.label, "error");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.stage, Stage::DecodeError);
    }
}

#[test]
fn classification_is_idempotent() {
    for domain in Domain::ALL {
        let classifier = CascadeClassifier::new(domain);
        for (name, image) in fixtures() {
            let bytes = encode_png(&image).expect("encodable");
            let first = classifier.classify(&bytes, name);
            let second = classifier.classify(&bytes, name);
            assert_eq!(first.label, second.label);
            assert_eq!(first.category, second.category);
            assert_eq!(first.confidence, second.confidence);
            assert!(first.same_outcome(&second));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pool_agrees_with_the_classifier() {
    let pool = ClassifierPool::new(Domain::Shield, 4);
    let classifier = CascadeClassifier::new(Domain::Shield);
    let items: Vec<(String, Vec<u8>)> = fixtures()
        .into_iter()
        .map(|(name, image)| (name.to_string(), encode_png(&image).expect("encodable")))
        .collect();

    let pooled = pool.classify_batch(items.clone()).await;
    assert_eq!(pooled.len(), items.len());
    for ((name, bytes), result) in items.iter().zip(pooled) {
        let result = result.expect("pool is open");
        assert_eq!(&result.filename, name);
        assert!(result.same_outcome(&classifier.classify(bytes, name)));
    }
    pool.shutdown().await;
}
