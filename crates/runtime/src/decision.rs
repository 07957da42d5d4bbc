// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::sync::mpsc;

/// The user's answer to a failed operation or a still-running process
/// prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry,
    Ignore,
    Cancel,
}

/// The UI-thread side of a failure prompt. Blocking rather than async:
/// the runtime thread suspends here exactly the way it suspends on a
/// [`crate::progress::Event`] send, via a channel the UI side drains at
/// its own pace.
pub trait Prompter: Send {
    fn ask(&self, message: &str) -> Decision;
}

/// A [`Prompter`] driven by a blocking-queued request/response channel:
/// the runtime sends the prompt text and blocks on a oneshot reply.
/// The UI thread owns `requests`' receiving end and answers through the
/// `mpsc::Sender<Decision>` bundled with each request.
pub struct ChannelPrompter {
    requests: mpsc::Sender<(String, mpsc::Sender<Decision>)>,
}

impl ChannelPrompter {
    pub fn new(requests: mpsc::Sender<(String, mpsc::Sender<Decision>)>) -> Self {
        Self { requests }
    }
}

impl Prompter for ChannelPrompter {
    fn ask(&self, message: &str) -> Decision {
        let (reply_tx, reply_rx) = mpsc::channel();
        if self.requests.send((message.to_string(), reply_tx)).is_err() {
            // UI thread is gone; there is nobody left to ask.
            return Decision::Cancel;
        }
        reply_rx.recv().unwrap_or(Decision::Cancel)
    }
}

/// A headless [`Prompter`] that always answers the same way -- used by
/// unattended installs (`--script`) and by tests.
pub struct FixedPrompter(pub Decision);

impl Prompter for FixedPrompter {
    fn ask(&self, _message: &str) -> Decision {
        self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn channel_prompter_relays_the_ui_threads_answer() {
        let (tx, rx) = mpsc::channel();
        let prompter = ChannelPrompter::new(tx);

        let responder = std::thread::spawn(move || {
            let (message, reply_tx) = rx.recv().unwrap();
            assert_eq!(message, "retry?");
            reply_tx.send(Decision::Retry).unwrap();
        });

        assert_eq!(prompter.ask("retry?"), Decision::Retry);
        responder.join().unwrap();
    }

    #[test]
    fn channel_prompter_cancels_when_nobody_is_listening() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let prompter = ChannelPrompter::new(tx);
        assert_eq!(prompter.ask("anyone?"), Decision::Cancel);
    }
}
