use crate::{PushedItemMessage, ReplayAsyncError};
use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::debug;
use replay_core::ExperienceBufferBase;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::JoinHandle,
    time::Duration,
};

/// Interval of checking the stop flag while no message arrives.
const RECV_TIMEOUT: Duration = Duration::from_millis(10);

/// Receives [`PushedItemMessage`]s and pushes their items into a shared replay buffer.
pub struct PushedItemConsumer<R: ExperienceBufferBase> {
    /// Receiver of pushed items.
    receiver: Receiver<PushedItemMessage<R::Item>>,

    /// If `true`, the consumer thread exits after draining queued messages.
    stop: Arc<AtomicBool>,
}

impl<R> PushedItemConsumer<R>
where
    R: ExperienceBufferBase + Send + 'static,
    R::Item: Send + 'static,
{
    /// Creates a consumer of the messages arriving on `receiver`.
    pub fn build(receiver: Receiver<PushedItemMessage<R::Item>>) -> Self {
        Self {
            receiver,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Asks the consumer thread to exit once the queued messages are pushed.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Runs a thread pushing received items into `buffer`.
    ///
    /// The thread exits when [`PushedItemConsumer::stop`] is called or all senders
    /// are dropped, and returns the number of pushed items.
    pub fn run(&self, buffer: Arc<Mutex<R>>) -> JoinHandle<Result<usize>> {
        let r = self.receiver.clone();
        let stop = self.stop.clone();

        std::thread::spawn(move || {
            let mut n_pushed = 0;
            loop {
                match r.recv_timeout(RECV_TIMEOUT) {
                    Ok(msg) => n_pushed += push_items(&buffer, msg)?,
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        debug!("All producers disconnected");
                        break;
                    }
                }

                if stop.load(Ordering::SeqCst) {
                    for msg in r.try_iter() {
                        n_pushed += push_items(&buffer, msg)?;
                    }
                    debug!("Stopped the consumer of pushed items");
                    break;
                }
            }
            Ok(n_pushed)
        })
    }
}

fn push_items<R: ExperienceBufferBase>(
    buffer: &Mutex<R>,
    msg: PushedItemMessage<R::Item>,
) -> Result<usize> {
    let n = msg.pushed_items.len();
    debug!("Received {} items from producer {}", n, msg.id);

    let mut buffer = buffer
        .lock()
        .map_err(|_| ReplayAsyncError::BufferLockPoisoned)?;
    for item in msg.pushed_items {
        buffer.push(item)?;
    }
    Ok(n)
}
