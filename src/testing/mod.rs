//! Test utilities: small fixed datasets, random generators and tolerances.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::MultiLabelDataset;

/// Default tolerance for `f32` comparisons.
pub const DEFAULT_TOLERANCE: f32 = 1e-5;

/// Default tolerance for `f64` comparisons.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-9;

/// Sparse rows of [`separable_toy`], labels first (`0..2`), features after (`2..8`).
pub const SEPARABLE_TOY_ROWS: [&[usize]; 4] = [
    &[0, 2, 4],    // labels {0}    features {0, 2}
    &[0, 1, 2, 5], // labels {0, 1} features {0, 3}
    &[1, 3, 5, 6], // labels {1}    features {1, 3, 4}
    &[1, 4, 7],    // labels {1}    features {2, 5}
];

/// 4 documents, 2 labels, 6 features. Feature 0 is present exactly in the
/// documents carrying label 0.
pub fn separable_toy() -> MultiLabelDataset {
    MultiLabelDataset::from_sparse(2, 6, SEPARABLE_TOY_ROWS).expect("separable toy rows are valid")
}

/// Dense full-width rows of [`separable_toy`] (label prefix included).
pub fn separable_toy_dense_rows() -> Vec<Vec<f32>> {
    SEPARABLE_TOY_ROWS
        .iter()
        .map(|row| {
            let mut dense = vec![0.0; 8];
            for &i in row.iter() {
                dense[i] = 1.0;
            }
            dense
        })
        .collect()
}

/// Random binary multi-label dataset.
///
/// Every row gets at least one label. Each further label is added with
/// probability 0.3 and each feature is present with probability `density`.
/// Label `l` is additionally switched on whenever feature `l` is present, so
/// the first features carry some signal.
pub fn random_dataset(
    n_samples: usize,
    n_labels: usize,
    n_features: usize,
    density: f64,
    seed: u64,
) -> MultiLabelDataset {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let rows: Vec<Vec<usize>> = (0..n_samples)
        .map(|_| {
            let mut row = vec![rng.gen_range(0..n_labels)];
            for l in 0..n_labels {
                if rng.gen_bool(0.3) {
                    row.push(l);
                }
            }
            for f in 0..n_features {
                if rng.gen_bool(density) {
                    row.push(n_labels + f);
                    if f < n_labels {
                        row.push(f);
                    }
                }
            }
            row
        })
        .collect();

    MultiLabelDataset::from_sparse(n_labels, n_features, rows).expect("generated rows are in range")
}
