//! Prioritized experience replay buffer.
mod iw_scheduler;
use super::{GenericTransitionBatch, PriorityReplayBufferConfig, Transition, WeightNormalizer};
use crate::{error::ReplayError, ExperienceBufferBase, ReplayBufferBase, SumTree};
use anyhow::Result;
pub use iw_scheduler::IwScheduler;
use log::{info, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// A fixed-capacity replay buffer sampling transitions in proportion to their priority.
///
/// The priority of a transition is $p_i=(|\delta_i|+\epsilon)^\alpha$, where $\delta_i$
/// is its TD error. New transitions have not been evaluated yet, so they are inserted
/// with the current maximum priority plus $\epsilon$, which makes them likely to be
/// sampled soon.
///
/// A batch is drawn by stratified sampling: the priority mass $[0, P)$ is split into
/// `batch_size` equal segments and one transition is drawn from each. Every sampled
/// transition gets the importance sampling weight $w_i=(N P(i))^{-\beta}$, divided by
/// the batch maximum (see [`WeightNormalizer`]). $\beta$ is annealed toward `1.0` by
/// [`IwScheduler`] at every sampling.
///
/// The buffer is driven by a training loop as follows:
///
/// ```mermaid
/// graph LR
///     A[Environment step] -->|Transition|B[PriorityReplayBuffer::add]
///     B --> C[SumTree]
///     C -->|sample|D[Learning step]
///     D -->|ix_sample, TD errors|E[PriorityReplayBuffer::update]
///     E --> C
/// ```
///
/// The buffer is not synchronized. When several threads feed one buffer, guard it
/// with a single lock around every call.
///
/// # Examples
///
/// ```rust
/// use replay_core::{
///     replay_buffer::{PriorityReplayBuffer, PriorityReplayBufferConfig, Transition},
///     TransitionBatch,
/// };
///
/// let config = PriorityReplayBufferConfig::default().capacity(8).batch_size(4);
/// let mut buffer = PriorityReplayBuffer::<[f32; 2], usize>::new(&config).unwrap();
///
/// for i in 0..8 {
///     let x = i as f32;
///     buffer.add(Transition::new([x, x], i % 2, 1.0, [x + 1.0, x], false));
/// }
///
/// let batch = buffer.sample().unwrap();
/// let (_obs, _act, _next_obs, _reward, _is_done, ixs, weight) = batch.unpack();
/// assert_eq!(weight.len(), 4);
///
/// buffer.update(&ixs, &[0.5, 0.1, 2.0, 0.0]).unwrap();
/// ```
pub struct PriorityReplayBuffer<O, A> {
    batch_size: usize,
    epsilon: f32,
    alpha: f32,
    normalize: WeightNormalizer,
    sum_tree: SumTree<Transition<O, A>>,
    iw_scheduler: IwScheduler,
    rng: StdRng,
}

impl<O, A> PriorityReplayBuffer<O, A>
where
    O: Clone,
    A: Clone,
{
    /// Creates a replay buffer.
    ///
    /// Fails with [`ReplayError::InvalidConfig`] if a parameter is out of range.
    pub fn new(config: &PriorityReplayBufferConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "Replay buffer: capacity={}, batch_size={}, alpha={}, beta={}",
            config.capacity, config.batch_size, config.alpha, config.beta
        );

        Ok(Self {
            batch_size: config.batch_size,
            epsilon: config.epsilon,
            alpha: config.alpha,
            normalize: config.normalize,
            sum_tree: SumTree::new(config.capacity)?,
            iw_scheduler: IwScheduler::new(config.beta, config.beta_increment),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.sum_tree.capacity()
    }

    /// Number of transitions in a batch returned by [`PriorityReplayBuffer::sample`].
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of stored transitions.
    pub fn len(&self) -> usize {
        self.sum_tree.len()
    }

    /// Returns `true` if no transition has been added.
    pub fn is_empty(&self) -> bool {
        self.sum_tree.is_empty()
    }

    /// Current exponent of importance sampling weights.
    pub fn beta(&self) -> f32 {
        self.iw_scheduler.beta()
    }

    /// Sum of the priorities of all stored transitions.
    pub fn total_priority(&self) -> f32 {
        self.sum_tree.total()
    }

    /// Priority of the transition at leaf `ix`.
    pub fn priority(&self, ix: usize) -> Option<f32> {
        if self.sum_tree.is_populated(ix) {
            self.sum_tree.priority(ix)
        } else {
            None
        }
    }

    /// Priority corresponding to a TD error, $(|\delta|+\epsilon)^\alpha$.
    ///
    /// Strictly positive for every finite `error`.
    pub fn priority_from_error(&self, error: f32) -> f32 {
        (error.abs() + self.epsilon).powf(self.alpha)
    }

    /// Adds a transition and returns its leaf index, evicting the oldest one if full.
    pub fn add(&mut self, tr: Transition<O, A>) -> usize {
        let max_p = self.sum_tree.max().unwrap_or(self.epsilon);
        self.sum_tree.add(max_p + self.epsilon, tr)
    }

    /// Samples a batch of `batch_size` transitions.
    ///
    /// Fails with [`ReplayError::EmptyBuffer`] if nothing has been added.
    pub fn sample(&mut self) -> Result<GenericTransitionBatch<O, A>> {
        self.sample_n(self.batch_size)
    }

    /// Updates the priorities of the transitions at leaves `ixs` from their TD errors.
    ///
    /// Nothing is modified unless `ixs` and `errors` have the same length and every
    /// index points to a stored transition.
    pub fn update(&mut self, ixs: &[usize], errors: &[f32]) -> Result<()> {
        if ixs.len() != errors.len() {
            return Err(ReplayError::LengthMismatch {
                n_ixs: ixs.len(),
                n_errs: errors.len(),
            }
            .into());
        }
        if let Some(&ix) = ixs.iter().find(|&&ix| !self.sum_tree.is_populated(ix)) {
            return Err(ReplayError::InvalidLeafIndex(ix).into());
        }

        for (&ix, &err) in ixs.iter().zip(errors.iter()) {
            let p = self.priority_from_error(err);
            self.sum_tree.update(ix, p);
        }
        Ok(())
    }

    fn sample_n(&mut self, size: usize) -> Result<GenericTransitionBatch<O, A>> {
        if self.sum_tree.is_empty() {
            return Err(ReplayError::EmptyBuffer.into());
        }
        if self.sum_tree.len() < size {
            warn!(
                "Sampling {} transitions from {} stored ones; batch contains duplicates",
                size,
                self.sum_tree.len()
            );
        }

        let p_sum = self.sum_tree.total();
        let segment = p_sum / size as f32;
        let mut batch = GenericTransitionBatch::with_capacity(size);
        let mut ps = Vec::with_capacity(size);

        for i in 0..size {
            let s = segment * (i as f32 + self.rng.gen::<f32>());
            let (ix, p, tr) = self.sum_tree.get(s).ok_or(ReplayError::EmptyBuffer)?;
            batch.push(ix, tr.clone());
            ps.push(p);
        }

        let beta = self.iw_scheduler.step();
        batch.weight = self.importance_weights(&ps, p_sum, beta);
        Ok(batch)
    }

    /// Computes $w_i=(N P(i))^{-\beta}$ with $P(i)=p_i/P$ and normalizes them.
    fn importance_weights(&self, ps: &[f32], p_sum: f32, beta: f32) -> Vec<f32> {
        let n = self.sum_tree.len() as f32 / p_sum;
        let ws = ps.iter().map(|&p| (n * p).powf(-beta)).collect::<Vec<_>>();

        match self.normalize {
            WeightNormalizer::Batch => {
                let w_max = ws.iter().fold(f32::MIN, |m, &w| m.max(w));
                trace!("beta={}, w_max={}", beta, w_max);
                ws.iter().map(|w| w / w_max).collect()
            }
            WeightNormalizer::All => {
                // The smallest priority gives the largest weight.
                let p_min = self.sum_tree.min().unwrap_or(p_sum);
                let w_max = (n * p_min).powf(-beta);
                trace!("beta={}, w_max={}", beta, w_max);
                ws.iter().map(|w| (w / w_max).min(1.0)).collect()
            }
        }
    }
}

impl<O, A> ExperienceBufferBase for PriorityReplayBuffer<O, A>
where
    O: Clone,
    A: Clone,
{
    type Item = Transition<O, A>;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.add(tr);
        Ok(())
    }

    fn len(&self) -> usize {
        self.sum_tree.len()
    }
}

impl<O, A> ReplayBufferBase for PriorityReplayBuffer<O, A>
where
    O: Clone,
    A: Clone,
{
    type Config = PriorityReplayBufferConfig;
    type Batch = GenericTransitionBatch<O, A>;

    fn build(config: &Self::Config) -> Result<Self> {
        Self::new(config)
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        self.sample_n(size)
    }

    fn update_priority(&mut self, ixs: &[usize], td_errs: &[f32]) -> Result<()> {
        self.update(ixs, td_errs)
    }
}
