/// Items pushed by a producer, sent to the thread owning the replay buffer.
pub struct PushedItemMessage<T> {
    /// ID of the producer.
    pub id: usize,

    /// Pushed items, in the order they were pushed.
    pub pushed_items: Vec<T>,
}
