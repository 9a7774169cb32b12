mod test_utils;

use transition_oracle::config::{ParserConfig, SystemKind};
use transition_oracle::driver::{
    self, attachment_scores, Classifier, ClassifierFactory, Driver, FeatureExtractor,
    FrequencyClassifierFactory, Observation, WindowFeatures,
};
use transition_oracle::lang::{Sentence, Token};
use transition_oracle::logging;
use transition_oracle::oracle::{StaticOracle, TieBreak};
use transition_oracle::syntax::transition::Action;

/// Always ranks the same action names.
struct FixedRanking(Vec<&'static str>);

impl Classifier for FixedRanking {
    fn train(&mut self, _observations: &[Observation]) -> Result<(), driver::Error> {
        Ok(())
    }

    fn predict(&self, _features: &[String]) -> Vec<String> {
        self.0.iter().map(|s| s.to_string()).collect()
    }

    fn probability(&self, _features: &[String], action: &str) -> f64 {
        if self.0.first() == Some(&action) {
            1.0
        } else {
            0.0
        }
    }
}

fn observation(features: &[&str], action: &str) -> Observation {
    Observation {
        features: features.iter().map(|f| f.to_string()).collect(),
        action: action.to_string(),
    }
}

fn features(names: &[&str]) -> Vec<String> {
    names.iter().map(|f| f.to_string()).collect()
}

#[test]
fn test_window_features() {
    let sentence = test_utils::cat_sat();
    let config = ParserConfig::default().system().initial(&sentence);
    let extracted = WindowFeatures::default().extract(&config);
    assert!(extracted.contains(&"s0.w=<ROOT>".to_string()));
    assert!(extracted.contains(&"s1.w=<NONE>".to_string()));
    assert!(extracted.contains(&"b0.w=The".to_string()));
    assert!(extracted.contains(&"b1.p=NOUN".to_string()));
    assert!(extracted.contains(&"s0.p+b0.p=ROOT+DET".to_string()));
    assert!(extracted.contains(&"s0.m=<NONE>".to_string()));
    assert_eq!(WindowFeatures::new(1, 3).extract(&config).len(), 2 * 4 + 3);
}

#[test]
fn test_frequency_classifier() {
    let mut classifier = FrequencyClassifierFactory.create();
    assert!(classifier.train(&[]).is_err());
    classifier
        .train(&[
            observation(&["a", "x"], "Shift"),
            observation(&["a", "y"], "Shift"),
            observation(&["b", "x"], "Reduce"),
        ])
        .unwrap();
    assert_eq!(classifier.num_actions(), 2);
    assert_eq!(classifier.predict(&features(&["a"])), vec!["Shift", "Reduce"]);
    assert_eq!(classifier.predict(&features(&["b"]))[0], "Reduce");

    let p = classifier.probability(&features(&["a", "x"]), "Shift");
    let q = classifier.probability(&features(&["a", "x"]), "Reduce");
    assert!(p > q);
    assert!((p + q - 1.0).abs() < 1e-9);
    assert_eq!(classifier.probability(&features(&["a"]), "Swap"), 0.0);
}

#[test]
fn test_observe_with_static_oracle() {
    let sentence = test_utils::cat_sat();
    let gold = test_utils::gold(&sentence);
    let config = ParserConfig::default();
    let mut driver = Driver::new(&config, logging::discard()).unwrap();
    assert!(!driver.is_dynamic());
    let mut rng = test_utils::rng(0);
    let observations = driver
        .observe(&sentence, &WindowFeatures::default(), &mut rng, None)
        .unwrap();
    let derived = StaticOracle::new(config.system()).derive(&sentence, &gold).unwrap();
    let actions: Vec<String> = observations.iter().map(|o| o.action.clone()).collect();
    let expected: Vec<String> = derived.actions().iter().map(Action::to_string).collect();
    assert_eq!(actions, expected);
    assert!(observations[0].features.contains(&"b0.w=The".to_string()));
}

#[test]
fn test_observe_with_dynamic_oracle() {
    let mut rng = test_utils::rng(1);
    for &stray_probability in &[0.0, 0.5, 1.0] {
        let config = ParserConfig {
            system: SystemKind::RevisedArcEager,
            dynamic: true,
            stray_probability: stray_probability,
            ..ParserConfig::default()
        };
        let mut driver = Driver::new(&config, logging::discard()).unwrap();
        assert!(driver.is_dynamic());
        for n in 1..8 {
            let sentence = test_utils::random_sentence(&mut rng, n, n % 2 == 0);
            let observations = driver
                .observe(&sentence, &WindowFeatures::default(), &mut rng, None)
                .unwrap();
            assert!(observations.len() >= n);
            for observation in &observations {
                assert!(observation.action.parse::<Action>().is_ok());
            }
        }
    }
}

#[test]
fn test_train_skips_failing_sentences() {
    let config = ParserConfig {
        fail_closed: true,
        ..ParserConfig::default()
    };
    let mut driver = Driver::new(&config, logging::discard()).unwrap();
    let corpus = vec![
        test_utils::cat_sat(),
        test_utils::crossing(),
        test_utils::cat_sat(),
    ];
    let mut rng = test_utils::rng(2);
    let (classifier, report) = driver
        .train(
            &corpus,
            &WindowFeatures::default(),
            &FrequencyClassifierFactory,
            &mut rng,
            None,
        )
        .unwrap();
    assert_eq!(report.sentences, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.observations, 12);
    assert!(classifier.num_actions() >= 2);
}

/// Keeps the observations it was trained on.
#[derive(Default)]
struct Recorder(Vec<Observation>);

impl Classifier for Recorder {
    fn train(&mut self, observations: &[Observation]) -> Result<(), driver::Error> {
        self.0 = observations.to_vec();
        Ok(())
    }

    fn predict(&self, _features: &[String]) -> Vec<String> {
        vec![]
    }

    fn probability(&self, _features: &[String], _action: &str) -> f64 {
        0.0
    }
}

struct RecorderFactory;

impl ClassifierFactory for RecorderFactory {
    type Output = Recorder;

    fn create(&self) -> Recorder {
        Recorder::default()
    }
}

/// After "a" is attached, reducing it and shifting "b" are both optimal.
fn reduce_or_shift() -> Sentence<Token<'static>> {
    Sentence::from_rows(&[
        ("a", "NOUN", 0, "root"),
        ("b", "DET", 3, "det"),
        ("c", "NOUN", 0, "obj"),
    ])
}

#[test]
fn test_train_with_preliminary_ranking() {
    let config = ParserConfig {
        dynamic: true,
        tie_break: TieBreak::Classifier,
        ..ParserConfig::default()
    };
    let corpus = vec![reduce_or_shift()];
    let extractor = WindowFeatures::default();
    let actions = |recorder: &Recorder| -> Vec<String> {
        recorder.0.iter().map(|o| o.action.clone()).collect()
    };

    let mut driver = Driver::new(&config, logging::discard()).unwrap();
    let mut rng = test_utils::rng(4);
    let (plain, report) = driver
        .train(&corpus, &extractor, &RecorderFactory, &mut rng, None)
        .unwrap();
    assert_eq!(report.observations, 5);
    assert_eq!(
        actions(&plain),
        vec!["RightArc(root)", "Shift", "LeftArc(det)", "Reduce", "RightArc(obj)"]
    );

    let ranking = FixedRanking(vec!["Reduce"]);
    let (ranked, report) = driver
        .train(&corpus, &extractor, &RecorderFactory, &mut rng, Some(&ranking))
        .unwrap();
    assert_eq!(report.observations, 5);
    assert_eq!(
        actions(&ranked),
        vec!["RightArc(root)", "Reduce", "Shift", "LeftArc(det)", "RightArc(obj)"]
    );
}

#[test]
fn test_train_and_parse() {
    let mut rng = test_utils::rng(3);
    let mut corpus = vec![test_utils::cat_sat()];
    for _ in 0..40 {
        let n = 3 + corpus.len() % 6;
        corpus.push(test_utils::random_sentence(&mut rng, n, true));
    }
    let config = ParserConfig {
        system: SystemKind::ArcEager,
        ..ParserConfig::default()
    };
    let mut driver = Driver::new(&config, logging::discard()).unwrap();
    let extractor = WindowFeatures::default();
    let (classifier, report) = driver
        .train(&corpus, &extractor, &FrequencyClassifierFactory, &mut rng, None)
        .unwrap();
    assert_eq!(report.skipped, 0);

    for sentence in &corpus {
        let gold = test_utils::gold(sentence);
        let outcome = driver.parse(sentence, &extractor, &classifier).unwrap();
        assert_eq!(outcome.heads.len(), gold.len());
        assert_eq!(outcome.heads[0], None);
        if outcome.complete {
            assert!(outcome.heads.iter().skip(1).all(Option::is_some));
        }
        let (uas, las) = attachment_scores(&gold, &outcome.heads, &outcome.deprels);
        assert!(0.0 <= las && las <= uas && uas <= 1.0);
    }
}

#[test]
fn test_parse_with_fixed_rankings() {
    let sentence = test_utils::cat_sat();
    let driver = Driver::new(&ParserConfig::default(), logging::discard()).unwrap();
    let extractor = WindowFeatures::default();

    let outcome = driver
        .parse(&sentence, &extractor, &FixedRanking(vec!["Reduce", "Shift"]))
        .unwrap();
    assert_eq!(outcome.actions, vec![Action::Shift; 4]);
    assert_eq!(outcome.heads, vec![None; 5]);
    assert!(!outcome.complete);

    let outcome = driver
        .parse(&sentence, &extractor, &FixedRanking(vec!["Reduce", "Swap"]))
        .unwrap();
    assert!(outcome.actions.is_empty());
    assert!(!outcome.complete);

    let outcome = driver
        .parse(
            &sentence,
            &extractor,
            &FixedRanking(vec!["RightArc(dep)", "Shift"]),
        )
        .unwrap();
    assert_eq!(outcome.heads, vec![None, Some(0), Some(1), Some(2), Some(3)]);
    assert!(outcome.complete);
    let gold = test_utils::gold(&sentence);
    assert_eq!(attachment_scores(&gold, &outcome.heads, &outcome.deprels), (0.25, 0.0));
}

#[test]
fn test_attachment_scores() {
    let sentence = test_utils::cat_sat();
    let gold = test_utils::gold(&sentence);
    assert_eq!(
        attachment_scores(&gold, gold.heads(), gold.deprels()),
        (1.0, 1.0)
    );
    let mut deprels = gold.deprels().to_vec();
    deprels[1] = Some("amod".to_string());
    assert_eq!(
        attachment_scores(&gold, gold.heads(), &deprels),
        (1.0, 0.75)
    );
    assert_eq!(attachment_scores(&gold, &[], &[]), (0.0, 0.0));
}
