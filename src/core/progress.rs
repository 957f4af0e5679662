//! core/progress.rs
//! Coarse progress side channel for long passes.
//!
//! The core never blocks on the receiver: if nobody listens (or the
//! receiver is gone), events are dropped.

use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { label: &'static str, total: usize },
    Advanced { done: usize },
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct Progress {
    tx: Option<Sender<ProgressEvent>>,
}

impl Progress {
    /// A handle that reports nowhere.
    pub fn none() -> Self {
        Self { tx: None }
    }

    /// Handle + the receiver a presentation layer should drain.
    pub fn channel() -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn start(&self, label: &'static str, total: usize) {
        self.send(ProgressEvent::Started { label, total });
    }

    pub fn advance(&self, done: usize) {
        self.send(ProgressEvent::Advanced { done });
    }

    pub fn finish(&self) {
        self.send(ProgressEvent::Finished);
    }

    /// Best-effort send. If the listener died, the event is dropped.
    fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
