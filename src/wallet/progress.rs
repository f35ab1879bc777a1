//! Transfer progress side-channel
//!
//! Each stage of a transfer is announced once, synchronously, before the
//! stage's delay starts. Consumers either pass a [`ProgressObserver`] into the
//! call or subscribe to the simulator's broadcast stream; both see the same
//! events in the same order.

use serde::Serialize;

use super::simulator::TransferStage;

/// Buffered events per broadcast subscriber before lagging
pub(crate) const PROGRESS_BUFFER: usize = 64;

/// One announced stage of an in-flight transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Identifier the finished record will carry
    pub transfer_id: String,
    pub stage: TransferStage,
    /// Zero-based position of the stage in this transfer's sequence
    pub index: usize,
    /// Number of stages in this transfer's sequence
    pub total: usize,
    /// Human-readable stage description
    pub message: &'static str,
}

impl ProgressEvent {
    pub(crate) fn new(transfer_id: &str, stage: TransferStage, index: usize, total: usize) -> Self {
        Self {
            transfer_id: transfer_id.to_string(),
            stage,
            index,
            total,
            message: stage.description(),
        }
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

/// Receives stage announcements during a transfer
pub trait ProgressObserver: Send + Sync {
    fn on_stage(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_stage(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Fan-out of one event to several observers
pub struct ObserverSet<'a> {
    observers: Vec<&'a dyn ProgressObserver>,
}

impl<'a> ObserverSet<'a> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn with(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn push_optional(&mut self, observer: Option<&'a dyn ProgressObserver>) {
        if let Some(observer) = observer {
            self.observers.push(observer);
        }
    }
}

impl Default for ObserverSet<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ObserverSet<'_> {
    fn on_stage(&self, event: &ProgressEvent) {
        for observer in &self.observers {
            observer.on_stage(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_observer_receives_event() {
        let seen = Mutex::new(Vec::new());
        let observer = |event: &ProgressEvent| seen.lock().unwrap().push(event.message);

        let event = ProgressEvent::new("abc", TransferStage::Build, 0, 3);
        observer.on_stage(&event);

        assert_eq!(*seen.lock().unwrap(), vec![TransferStage::Build.description()]);
        assert!(!event.is_last());
    }

    #[test]
    fn test_observer_set_fans_out() {
        let first = Mutex::new(0usize);
        let second = Mutex::new(0usize);
        let a = |_: &ProgressEvent| *first.lock().unwrap() += 1;
        let b = |_: &ProgressEvent| *second.lock().unwrap() += 1;

        let set = ObserverSet::new().with(&a).with(&b);
        set.on_stage(&ProgressEvent::new("abc", TransferStage::Submit, 2, 3));

        assert_eq!(*first.lock().unwrap(), 1);
        assert_eq!(*second.lock().unwrap(), 1);
    }
}
