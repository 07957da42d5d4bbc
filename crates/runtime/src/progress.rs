// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::sync::mpsc;

/// A single step the UI layer may want to reflect, sent over the same
/// kind of unbuffered channel [`task::Handle`] reports file-copy
/// progress on.
#[derive(Debug, Clone)]
pub enum Event {
    ComponentStarted { name: String },
    OperationStarted { component: String, operation: String },
    OperationFinished { component: String, operation: String },
    ComponentFinished { name: String },
    RollbackStarted,
    Message(String),
}

/// Aggregates progress across every component/operation performed in
/// one install or uninstall run. Cloning shares the same underlying
/// channel, so worker threads can each hold their own handle.
#[derive(Clone)]
pub struct ProgressCoordinator {
    tx: mpsc::Sender<Event>,
}

impl ProgressCoordinator {
    pub fn new() -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    pub fn report(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reported_events_arrive_in_order() {
        let (coordinator, rx) = ProgressCoordinator::new();
        coordinator.report(Event::ComponentStarted { name: "a".to_string() });
        coordinator.report(Event::ComponentFinished { name: "a".to_string() });

        assert!(matches!(rx.recv().unwrap(), Event::ComponentStarted { .. }));
        assert!(matches!(rx.recv().unwrap(), Event::ComponentFinished { .. }));
    }
}
