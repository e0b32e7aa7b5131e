use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use replay_core::{
    replay_buffer::{PriorityReplayBuffer, PriorityReplayBufferConfig, Transition},
    ExperienceBufferBase, ReplayBufferBase, SumTree, TransitionBatch,
};
use test_log::test;

type Obs = Vec<f32>;
type Act = usize;
type Buffer = PriorityReplayBuffer<Obs, Act>;

fn transition(i: usize) -> Transition<Obs, Act> {
    let obs = vec![i as f32; 3];
    let next_obs = vec![i as f32 + 0.5; 3];
    Transition::new(obs, i, i as f32, next_obs, i % 3 == 0)
}

fn config() -> PriorityReplayBufferConfig {
    PriorityReplayBufferConfig::default()
        .capacity(8)
        .batch_size(4)
        .epsilon(0.01)
        .alpha(0.6)
        .beta(0.4)
        .beta_increment(0.001)
}

/// Sum of leaf priorities, read leaf by leaf.
fn leaf_sum<T>(sum_tree: &SumTree<T>) -> f32 {
    let cap = sum_tree.capacity();
    (cap - 1..2 * cap - 1)
        .filter_map(|ix| sum_tree.priority(ix))
        .sum()
}

#[test]
fn test_sum_tree_scenario() {
    let mut sum_tree = SumTree::new(4).unwrap();
    let ixs: Vec<_> = [1f32, 2., 3., 4.]
        .iter()
        .enumerate()
        .map(|(i, &p)| sum_tree.add(p, i))
        .collect();
    assert_eq!(sum_tree.total(), 10.0);

    sum_tree.update(ixs[0], 10.0);
    assert_eq!(sum_tree.total(), 19.0);

    let (ix, p, &data) = sum_tree.get(0.5).unwrap();
    assert_eq!(ix, ixs[0]);
    assert_eq!(p, 10.0);
    assert_eq!(data, 0);
}

#[test]
fn test_sum_invariant_under_random_operations() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut sum_tree = SumTree::new(13).unwrap();
    let mut ixs = vec![];

    for step in 0..2000 {
        if ixs.is_empty() || rng.gen::<f32>() < 0.4 {
            ixs.push(sum_tree.add(rng.gen_range(0.01..5.0), step));
        } else {
            let ix = ixs[rng.gen_range(0..ixs.len())];
            sum_tree.update(ix, rng.gen_range(0.01..5.0));
        }
        let expected = leaf_sum(&sum_tree);
        assert!(
            (sum_tree.total() - expected).abs() <= 1e-3 * expected.max(1.0),
            "step {}: total {} vs leaves {}",
            step,
            sum_tree.total(),
            expected
        );
    }
}

#[test]
fn test_proportional_sampling_with_random_draws() {
    let mut sum_tree = SumTree::new(3).unwrap();
    for (i, &p) in [1f32, 3., 6.].iter().enumerate() {
        sum_tree.add(p, i);
    }

    let mut rng = StdRng::seed_from_u64(42);
    let n_samples = 200_000;
    let mut counts = [0usize; 3];
    for _ in 0..n_samples {
        let s = rng.gen::<f32>() * sum_tree.total();
        counts[*sum_tree.get(s).unwrap().2] += 1;
    }

    for (&n, &expected) in counts.iter().zip([0.1f32, 0.3, 0.6].iter()) {
        let freq = n as f32 / n_samples as f32;
        assert!((freq - expected).abs() < 0.01, "{} vs {}", freq, expected);
    }
}

#[test]
fn test_circular_eviction() -> Result<()> {
    let mut buffer = Buffer::new(&config())?;
    let k = 5;
    for i in 0..8 + k {
        buffer.push(transition(i))?;
    }
    assert_eq!(ExperienceBufferBase::len(&buffer), 8);

    for _ in 0..50 {
        let batch = buffer.sample()?;
        assert!(batch.act.iter().all(|&i| i >= k));
    }
    Ok(())
}

#[test]
fn test_buffer_scenario() -> Result<()> {
    let mut buffer = Buffer::new(&config())?;
    for i in 0..8 {
        buffer.add(transition(i));
    }

    let batch = buffer.sample()?;
    assert_eq!(batch.len(), 4);
    let (obs, act, next_obs, reward, is_done, ixs, weight) = batch.unpack();
    assert_eq!(obs.len(), 4);
    assert_eq!(act.len(), 4);
    assert_eq!(next_obs.len(), 4);
    assert_eq!(reward.len(), 4);
    assert_eq!(is_done.len(), 4);
    assert_eq!(ixs.len(), 4);
    assert_eq!(weight.len(), 4);

    let w_max = weight.iter().cloned().fold(f32::MIN, f32::max);
    assert!((w_max - 1.0).abs() < f32::EPSILON);

    buffer.update(&ixs, &[0.0, 0.0, 0.0, 0.0])?;
    let expected = 0.01f32.powf(0.6);
    for &ix in ixs.iter() {
        let p = buffer.priority(ix).unwrap();
        assert!((p - expected).abs() < 1e-6, "{} vs {}", p, expected);
    }
    Ok(())
}

#[test]
fn test_max_weight_and_beta_over_training() -> Result<()> {
    let mut buffer = Buffer::build(&config().capacity(64).batch_size(16).beta_increment(0.01))?;
    let mut rng = StdRng::seed_from_u64(3);
    let mut prev_beta = buffer.beta();

    for step in 0..200 {
        buffer.push(transition(step))?;
        let batch = buffer.batch(16)?;

        let w_max = batch.weight.iter().cloned().fold(f32::MIN, f32::max);
        assert!((w_max - 1.0).abs() < f32::EPSILON);
        assert!(buffer.beta() >= prev_beta && buffer.beta() <= 1.0);
        prev_beta = buffer.beta();

        let td_errs: Vec<f32> = (0..batch.len()).map(|_| rng.gen_range(-2.0..2.0)).collect();
        buffer.update_priority(&batch.ix_sample, &td_errs)?;

        let total = buffer.total_priority();
        let leaves: f32 = (63..127).filter_map(|ix| buffer.priority(ix)).sum();
        assert!((total - leaves).abs() <= 1e-3 * leaves.max(1.0));
    }
    assert_eq!(buffer.beta(), 1.0);
    Ok(())
}

#[test]
fn test_high_error_transitions_are_preferred() -> Result<()> {
    let mut buffer = Buffer::new(&config().capacity(16).batch_size(8).alpha(1.0))?;
    let ixs: Vec<_> = (0..16).map(|i| buffer.add(transition(i))).collect();
    let errs: Vec<f32> = (0..16).map(|i| if i == 5 { 100.0 } else { 0.0 }).collect();
    buffer.update(&ixs, &errs)?;

    let mut hits = 0;
    let n_batches = 100;
    for _ in 0..n_batches {
        let batch = buffer.sample()?;
        hits += batch.act.iter().filter(|&&a| a == 5).count();
    }
    // Leaf 5 holds almost all of the mass, so most draws land on it.
    assert!(hits > 7 * n_batches);
    Ok(())
}
