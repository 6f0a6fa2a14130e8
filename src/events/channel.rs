//! Event channel implementation using crossbeam-channel.
//!
//! The channel is unbounded so that a slow listener can never stall the
//! worker pool or the copy loop.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sends events from the core library. Cheap to clone, safe to share.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    pub fn new(sender: Sender<Event>) -> Self {
        Self { inner: sender }
    }

    /// Send an event. A dropped receiver silently discards it.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receives events on the front-end side
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event, `None` once every sender is gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Factory for sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (EventSender::new(sender), EventReceiver { inner: receiver })
    }
}

/// A sender nobody listens to, for runs without progress display
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{FingerprintEvent, FingerprintProgress, PipelineEvent};
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Fingerprint(FingerprintEvent::Progress(
                FingerprintProgress {
                    completed: 25,
                    total: 40,
                    current_path: PathBuf::from("/card/DCIM/IMG_0025.JPG"),
                },
            )));
        });

        handle.join().unwrap();

        match receiver.recv() {
            Some(Event::Fingerprint(FingerprintEvent::Progress(p))) => {
                assert_eq!(p.completed, 25);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Pipeline(PipelineEvent::Started { dry_run: false }));
    }

    #[test]
    fn receiver_ends_when_senders_drop() {
        let (sender, receiver) = EventChannel::new();
        sender.send(Event::Pipeline(PipelineEvent::Started { dry_run: true }));
        drop(sender);

        assert_eq!(receiver.iter().count(), 1);
        assert!(receiver.recv().is_none());
    }
}
