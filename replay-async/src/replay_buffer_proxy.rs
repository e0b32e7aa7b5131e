use crate::{PushedItemMessage, ReplayAsyncError};
use anyhow::Result;
use crossbeam_channel::Sender;
use replay_core::ExperienceBufferBase;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Configuration of [`ReplayBufferProxy`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ReplayBufferProxyConfig {
    /// Number of items buffered until sent to the replay buffer.
    pub n_buffer: usize,
}

impl Default for ReplayBufferProxyConfig {
    fn default() -> Self {
        Self { n_buffer: 100 }
    }
}

/// A stand-in for a shared replay buffer on the producer side.
///
/// Pushed items are kept locally and sent in a single [`PushedItemMessage`] once
/// `n_buffer` of them are collected. Call [`ReplayBufferProxy::flush`] to send the
/// remainder.
pub struct ReplayBufferProxy<R: ExperienceBufferBase> {
    id: usize,

    /// Sender of [`PushedItemMessage`].
    sender: Sender<PushedItemMessage<R::Item>>,

    /// Number of items buffered until sent.
    n_buffer: usize,

    /// Items not sent yet.
    buffer: Vec<R::Item>,

    phantom: PhantomData<R>,
}

impl<R: ExperienceBufferBase> ReplayBufferProxy<R> {
    /// Creates a proxy sending items on `sender`, tagged with `id`.
    pub fn build_with_sender(
        id: usize,
        config: &ReplayBufferProxyConfig,
        sender: Sender<PushedItemMessage<R::Item>>,
    ) -> Self {
        // At least one item per message.
        let n_buffer = config.n_buffer.max(1);
        Self {
            id,
            sender,
            n_buffer,
            buffer: Vec::with_capacity(n_buffer),
            phantom: PhantomData,
        }
    }

    /// Sends the buffered items, if any.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let mut buffer = Vec::with_capacity(self.n_buffer);
        std::mem::swap(&mut self.buffer, &mut buffer);

        let msg = PushedItemMessage {
            id: self.id,
            pushed_items: buffer,
        };

        match self.sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(_e) => Err(ReplayAsyncError::SendMsgForPush.into()),
        }
    }
}

impl<R: ExperienceBufferBase> ExperienceBufferBase for ReplayBufferProxy<R> {
    type Item = R::Item;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.buffer.push(tr);
        if self.buffer.len() == self.n_buffer {
            self.flush()?;
        }
        Ok(())
    }

    /// Number of items buffered in the proxy and not sent yet.
    fn len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use replay_core::replay_buffer::{PriorityReplayBuffer, Transition};

    type Buffer = PriorityReplayBuffer<f32, usize>;

    fn transition(i: usize) -> Transition<f32, usize> {
        Transition::new(i as f32, i, 1.0, i as f32 + 1.0, false)
    }

    #[test]
    fn test_send_in_bulk() -> Result<()> {
        let (s, r) = unbounded();
        let config = ReplayBufferProxyConfig { n_buffer: 3 };
        let mut proxy = ReplayBufferProxy::<Buffer>::build_with_sender(7, &config, s);

        for i in 0..7 {
            proxy.push(transition(i))?;
        }
        assert_eq!(proxy.len(), 1);

        let msgs: Vec<_> = r.try_iter().collect();
        assert_eq!(msgs.len(), 2);
        assert!(msgs.iter().all(|m| m.id == 7 && m.pushed_items.len() == 3));
        assert_eq!(msgs[1].pushed_items[0].act, 3);

        proxy.flush()?;
        assert_eq!(proxy.len(), 0);
        let msg = r.try_recv()?;
        assert_eq!(msg.pushed_items.len(), 1);
        assert_eq!(msg.pushed_items[0].act, 6);

        // Nothing left to send.
        proxy.flush()?;
        assert!(r.try_recv().is_err());
        Ok(())
    }

    #[test]
    fn test_disconnected_receiver() {
        let (s, r) = unbounded();
        drop(r);
        let config = ReplayBufferProxyConfig { n_buffer: 1 };
        let mut proxy = ReplayBufferProxy::<Buffer>::build_with_sender(0, &config, s);

        let err = proxy.push(transition(0)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReplayAsyncError>(),
            Some(ReplayAsyncError::SendMsgForPush)
        ));
    }
}
