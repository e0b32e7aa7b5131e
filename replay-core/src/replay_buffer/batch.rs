//! Transitions and batches of transitions.
use crate::TransitionBatch;

/// A single transition `(o_t, a_t, r_t, o_t+1, is_done_t)`.
///
/// The replay buffer moves transitions as a whole and never looks into
/// observations or actions.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<O, A> {
    /// Observation.
    pub obs: O,

    /// Action taken at `obs`.
    pub act: A,

    /// Reward.
    pub reward: f32,

    /// Next observation.
    pub next_obs: O,

    /// `1` if the episode ended with this transition, `0` otherwise.
    pub is_done: i8,
}

impl<O, A> Transition<O, A> {
    /// Creates a transition.
    pub fn new(obs: O, act: A, reward: f32, next_obs: O, is_done: bool) -> Self {
        Self {
            obs,
            act,
            reward,
            next_obs,
            is_done: is_done as i8,
        }
    }
}

/// A batch of transitions laid out as parallel arrays.
///
/// Element `i` of every field belongs to the same sampled transition.
#[derive(Clone, Debug, PartialEq)]
pub struct GenericTransitionBatch<O, A> {
    /// Observations.
    pub obs: Vec<O>,

    /// Actions.
    pub act: Vec<A>,

    /// Next observations.
    pub next_obs: Vec<O>,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Episode termination flags.
    pub is_done: Vec<i8>,

    /// Leaf indices of the sampled transitions, used to update their priorities.
    pub ix_sample: Vec<usize>,

    /// Normalized importance sampling weights.
    pub weight: Vec<f32>,
}

impl<O, A> GenericTransitionBatch<O, A> {
    /// Creates an empty batch with room for `capacity` transitions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            obs: Vec::with_capacity(capacity),
            act: Vec::with_capacity(capacity),
            next_obs: Vec::with_capacity(capacity),
            reward: Vec::with_capacity(capacity),
            is_done: Vec::with_capacity(capacity),
            ix_sample: Vec::with_capacity(capacity),
            weight: Vec::with_capacity(capacity),
        }
    }

    /// Appends a transition sampled at leaf `ix`.
    pub(crate) fn push(&mut self, ix: usize, tr: Transition<O, A>) {
        self.obs.push(tr.obs);
        self.act.push(tr.act);
        self.next_obs.push(tr.next_obs);
        self.reward.push(tr.reward);
        self.is_done.push(tr.is_done);
        self.ix_sample.push(ix);
    }
}

impl<O, A> TransitionBatch for GenericTransitionBatch<O, A> {
    type ObsBatch = Vec<O>;
    type ActBatch = Vec<A>;

    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<i8>,
        Vec<usize>,
        Vec<f32>,
    ) {
        (
            self.obs,
            self.act,
            self.next_obs,
            self.reward,
            self.is_done,
            self.ix_sample,
            self.weight,
        )
    }

    fn len(&self) -> usize {
        self.reward.len()
    }

    fn obs(&self) -> &Self::ObsBatch {
        &self.obs
    }

    fn act(&self) -> &Self::ActBatch {
        &self.act
    }
}
