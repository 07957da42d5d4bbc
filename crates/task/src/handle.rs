// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc, Condvar, Mutex,
};

use crate::{error::FileTaskError, FileTaskResult};

/// A running sample of bytes transferred, reported at every block
/// boundary so a UI can derive throughput without polling the task.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub bytes_done: u64,
    pub bytes_total: Option<u64>,
}

/// The cancel/pause/progress contract every task implementation drives
/// itself against. Tasks never own their own cancellation state; it is
/// handed to them so a coordinator can cancel a task it didn't create.
pub trait TaskHandle {
    fn is_canceled(&self) -> bool;
    /// Blocks while paused. Returns immediately if not paused or if
    /// canceled while waiting.
    fn wait_on_resume(&self);
    fn report_progress(&self, progress: Progress);
    fn report_result(&self, result: &FileTaskResult);
    fn report_exception(&self, error: &FileTaskError);
}

/// The default [`TaskHandle`]: an atomic cancel flag, a condvar-guarded
/// pause flag, and an mpsc progress channel.
pub struct Handle {
    canceled: AtomicBool,
    paused: Mutex<bool>,
    resume: Condvar,
    progress_tx: mpsc::Sender<Progress>,
}

impl Handle {
    pub fn new(progress_tx: mpsc::Sender<Progress>) -> Arc<Self> {
        Arc::new(Self {
            canceled: AtomicBool::new(false),
            paused: Mutex::new(false),
            resume: Condvar::new(),
            progress_tx,
        })
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
        // Wake a paused waiter so it observes the cancellation instead of
        // blocking forever.
        self.resume.notify_all();
    }

    pub fn pause(&self) {
        *self.paused.lock().expect("pause lock poisoned") = true;
    }

    pub fn resume(&self) {
        *self.paused.lock().expect("pause lock poisoned") = false;
        self.resume.notify_all();
    }
}

impl TaskHandle for Handle {
    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    fn wait_on_resume(&self) {
        let mut paused = self.paused.lock().expect("pause lock poisoned");
        while *paused && !self.is_canceled() {
            paused = self.resume.wait(paused).expect("pause lock poisoned");
        }
    }

    fn report_progress(&self, progress: Progress) {
        let _ = self.progress_tx.send(progress);
    }

    fn report_result(&self, result: &FileTaskResult) {
        log::trace!("task finished: {} bytes written", result.bytes_written);
    }

    fn report_exception(&self, error: &FileTaskError) {
        log::warn!("task failed: {}", error.message);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn cancel_wakes_a_paused_waiter() {
        let (tx, _rx) = channel();
        let handle = Handle::new(tx);
        handle.pause();

        let h2 = handle.clone();
        let thread = std::thread::spawn(move || {
            h2.wait_on_resume();
        });

        std::thread::sleep(std::time::Duration::from_millis(20));
        handle.cancel();
        thread.join().unwrap();
        assert!(handle.is_canceled());
    }
}
