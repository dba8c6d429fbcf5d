//! End-to-end training tests.

use std::num::NonZeroUsize;

use rfboost::model::{ConfigError, PredictionRule, RfBoostConfig, RfBoostModel};
use rfboost::testing::{random_dataset, separable_toy, separable_toy_dense_rows};
use rfboost::training::{HammingLoss, MultiLabelMetric, TrainError, ABSENT, PRESENT};
use rfboost::{DatasetError, MultiLabelDataset};

// =============================================================================
// Helpers
// =============================================================================

fn toy_config(n_rounds: u32, seed: u64) -> RfBoostConfig {
    RfBoostConfig::builder()
        .n_sweeps(30)
        .n_rounds(n_rounds)
        .pool_size(6)
        .seed(seed)
        .n_threads(NonZeroUsize::MIN)
        .build()
        .unwrap()
}

// =============================================================================
// Separable toy corpus
// =============================================================================

#[test]
fn separating_feature_is_first_pivot() {
    let data = separable_toy();
    for seed in [0, 1, 42, 1234] {
        let model = RfBoostModel::train(&data, toy_config(5, seed)).unwrap();
        let first = &model.rounds()[0];

        assert_eq!(first.feature, 0, "seed {seed}");
        assert!(first.hypothesis[[PRESENT, 0]] > 0.0);
        assert!(first.hypothesis[[ABSENT, 0]] < 0.0);
    }
}

#[test]
fn one_round_predicts_label_zero_on_identical_patterns() {
    let data = separable_toy();
    let model = RfBoostModel::train(&data, toy_config(1, 42)).unwrap();

    let expected_label_zero = [true, true, false, false];
    for (row, expected) in separable_toy_dense_rows().iter().zip(expected_label_zero) {
        let labels = model.predict_row(row).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0], expected);
    }
}

#[test]
fn held_out_rows_without_labels_are_classified() {
    let data = separable_toy();
    let model = RfBoostModel::train(&data, toy_config(1, 7)).unwrap();

    // same feature patterns, label prefix cleared
    let held_out = MultiLabelDataset::from_sparse(2, 6, [vec![2, 4], vec![5, 7]]).unwrap();
    let predicted = model.predict(&held_out).unwrap();
    assert!(predicted[[0, 0]]);
    assert!(!predicted[[1, 0]]);
}

// =============================================================================
// Determinism and idempotence
// =============================================================================

#[test]
fn same_seed_same_model() {
    let data = random_dataset(40, 3, 12, 0.3, 5);
    let config = RfBoostConfig::builder()
        .n_sweeps(20)
        .n_rounds(15)
        .pool_size(5)
        .seed(99)
        .build()
        .unwrap();

    let a = RfBoostModel::train(&data, config.clone()).unwrap();
    let b = RfBoostModel::train(&data, config).unwrap();
    assert_eq!(a.rounds(), b.rounds());
}

#[test]
fn thread_count_does_not_change_the_model() {
    let data = random_dataset(40, 3, 12, 0.3, 11);
    let base = RfBoostConfig::builder()
        .n_sweeps(20)
        .n_rounds(10)
        .pool_size(6)
        .seed(3);

    let single = RfBoostModel::train(&data, base.clone().n_threads(NonZeroUsize::MIN).build().unwrap())
        .unwrap();
    let multi = RfBoostModel::train(
        &data,
        base.n_threads(NonZeroUsize::new(4).unwrap()).build().unwrap(),
    )
    .unwrap();
    assert_eq!(single.rounds(), multi.rounds());
}

#[test]
fn prediction_is_idempotent() {
    let data = separable_toy();
    let model = RfBoostModel::train(&data, toy_config(10, 1)).unwrap();
    let row = &separable_toy_dense_rows()[1];

    let first = model.predict_scores_row(row).unwrap();
    let second = model.predict_scores_row(row).unwrap();
    assert_eq!(first, second);
    assert_eq!(model.predict_row(row).unwrap(), model.predict_row(row).unwrap());
}

// =============================================================================
// Numerical robustness
// =============================================================================

#[test]
fn hypotheses_are_finite_over_many_rounds() {
    let data = random_dataset(30, 4, 8, 0.4, 21);
    let config = RfBoostConfig::builder()
        .n_sweeps(10)
        .n_rounds(40)
        .pool_size(3)
        .build()
        .unwrap();
    let model = RfBoostModel::train(&data, config).unwrap();

    assert_eq!(model.n_rounds(), 40);
    for round in model.rounds() {
        assert!(round.hypothesis.iter().all(|h| h.is_finite()));
        assert!(round.score.is_finite() && round.score >= 0.0);
        assert!((round.feature as usize) < data.n_features());
    }
}

#[test]
fn single_label_documents_train() {
    // every document has exactly one label
    let data = MultiLabelDataset::from_sparse(
        2,
        3,
        [vec![0, 2, 3], vec![1, 4], vec![0, 2], vec![1, 3, 4]],
    )
    .unwrap();
    let config = RfBoostConfig::builder()
        .n_rounds(5)
        .pool_size(3)
        .build()
        .unwrap();
    let model = RfBoostModel::train(&data, config).unwrap();
    assert_eq!(model.n_rounds(), 5);
}

#[test]
fn single_label_dataset_trains_many_rounds() {
    // the only label is on every row, so every pivot scores z = 0
    let rows: Vec<Vec<usize>> = (0..200).map(|i| vec![0, 1 + i % 2]).collect();
    let data = MultiLabelDataset::from_sparse(1, 2, rows).unwrap();
    let config = RfBoostConfig::builder()
        .n_sweeps(5)
        .n_rounds(300)
        .pool_size(2)
        .build()
        .unwrap();
    let model = RfBoostModel::train(&data, config).unwrap();

    assert_eq!(model.n_rounds(), 300);
    for round in model.rounds() {
        assert_eq!(round.score, 0.0);
        assert!(round.hypothesis.iter().all(|h| h.is_finite()));
    }
    assert!(model.predict(&data).unwrap().iter().all(|&l| l));

    let json = model.to_json_string().unwrap();
    let loaded = RfBoostModel::from_json_str(&json).unwrap();
    assert_eq!(loaded.rounds(), model.rounds());
}

#[test]
fn training_beats_trivial_hamming_loss() {
    let data = random_dataset(80, 3, 10, 0.3, 17);
    let config = RfBoostConfig::builder()
        .n_sweeps(20)
        .n_rounds(30)
        .pool_size(5)
        .build()
        .unwrap();
    let model = RfBoostModel::train(&data, config).unwrap();

    let all_negative = ndarray::Array2::from_elem(data.labels().raw_dim(), false);
    let trivial = HammingLoss.compute(all_negative.view(), data.labels());
    let trained = model.evaluate(&data, &HammingLoss).unwrap();
    assert!(trained <= trivial, "trained {trained} vs trivial {trivial}");
}

#[test]
fn at_least_one_rule_never_returns_empty_rows() {
    let data = random_dataset(40, 3, 10, 0.3, 2);
    let config = RfBoostConfig::builder()
        .n_rounds(10)
        .pool_size(4)
        .prediction_rule(PredictionRule::AtLeastOne)
        .build()
        .unwrap();
    let model = RfBoostModel::train(&data, config).unwrap();

    let predicted = model.predict(&data).unwrap();
    for row in predicted.rows() {
        assert!(row.iter().any(|&l| l));
    }
}

// =============================================================================
// Setup errors
// =============================================================================

#[test]
fn pool_larger_than_feature_space_is_rejected() {
    let data = separable_toy();
    let config = RfBoostConfig::builder().pool_size(7).build().unwrap();
    let err = RfBoostModel::train(&data, config).unwrap_err();
    assert!(matches!(
        err,
        TrainError::Config(ConfigError::PoolSizeExceedsFeatures {
            pool_size: 7,
            n_features: 6
        })
    ));
}

#[test]
fn unlabeled_document_is_a_data_error() {
    let data = MultiLabelDataset::from_sparse(2, 2, [vec![0, 2], vec![3]]).unwrap();
    let config = RfBoostConfig::builder().pool_size(2).build().unwrap();
    let err = RfBoostModel::train(&data, config).unwrap_err();
    assert!(matches!(
        err,
        TrainError::Dataset(DatasetError::EmptyLabelSet { row: 1 })
    ));
}

#[test]
fn empty_dataset_is_rejected() {
    let data = MultiLabelDataset::from_sparse(2, 4, Vec::<Vec<usize>>::new()).unwrap();
    let config = RfBoostConfig::builder().pool_size(2).build().unwrap();
    assert!(matches!(
        RfBoostModel::train(&data, config),
        Err(TrainError::EmptyDataset)
    ));
}
