use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::errors::TrainingError;

/// 학습/평가 데이터 분할 결과
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train_rows: Vec<Vec<f64>>,
    pub train_targets: Vec<f64>,
    pub eval_rows: Vec<Vec<f64>>,
    pub eval_targets: Vec<f64>,
}

/// Shuffle once with a seeded RNG and hold out `ceil(eval_ratio * n)` rows for evaluation.
///
/// Both sides always keep at least one row.
pub fn train_test_split(
    rows: &[Vec<f64>],
    targets: &[f64],
    eval_ratio: f64,
    seed: u64,
) -> Result<TrainTestSplit, TrainingError> {
    let n = rows.len().min(targets.len());
    if n < 2 {
        return Err(TrainingError::EmptyDataset { rows: n, required: 2 });
    }

    let n_eval = ((eval_ratio * n as f64).ceil() as usize).clamp(1, n - 1);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (eval_idx, train_idx) = indices.split_at(n_eval);

    Ok(TrainTestSplit {
        train_rows: train_idx.iter().map(|&i| rows[i].clone()).collect(),
        train_targets: train_idx.iter().map(|&i| targets[i]).collect(),
        eval_rows: eval_idx.iter().map(|&i| rows[i].clone()).collect(),
        eval_targets: eval_idx.iter().map(|&i| targets[i]).collect(),
    })
}
