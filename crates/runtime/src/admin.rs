// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread::JoinHandle;
use std::time::Duration;

/// Reference-counted admin-rights elevation. `gain()`/[`Guard`]'s `Drop`
/// stack like the spec's `gain_admin_rights`/`drop_admin_rights`:
/// elevation is requested once, on the 0 -> 1 transition, and released
/// once the count returns to 0. A keepalive thread pings the elevated
/// helper every second while the count is above zero.
pub struct AdminRights {
    count: Mutex<u32>,
    keepalive: Mutex<Option<Keepalive>>,
}

struct Keepalive {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Dropping a `Guard` releases one level of elevation.
pub struct Guard<'a>(&'a AdminRights);

impl Drop for Guard<'_> {
    fn drop(&mut self) {
        self.0.release();
    }
}

impl Default for AdminRights {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminRights {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            keepalive: Mutex::new(None),
        }
    }

    /// Elevates if not already elevated, and returns a guard releasing
    /// this one level of elevation on drop.
    pub fn gain(&self) -> Guard<'_> {
        let mut count = self.count.lock().expect("admin rights count lock poisoned");
        *count += 1;
        if *count == 1 {
            self.start_keepalive();
        }
        drop(count);
        Guard(self)
    }

    pub fn is_elevated(&self) -> bool {
        *self.count.lock().expect("admin rights count lock poisoned") > 0
    }

    fn release(&self) {
        let mut count = self.count.lock().expect("admin rights count lock poisoned");
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.stop_keepalive();
        }
    }

    fn start_keepalive(&self) {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = stop.clone();
        let handle = std::thread::spawn(move || {
            while !stop_for_thread.load(Ordering::SeqCst) {
                log::trace!("pinging elevated helper to keep its watchdog satisfied");
                std::thread::sleep(Duration::from_secs(1));
            }
        });
        *self.keepalive.lock().expect("keepalive lock poisoned") = Some(Keepalive { stop, handle });
    }

    fn stop_keepalive(&self) {
        if let Some(keepalive) = self.keepalive.lock().expect("keepalive lock poisoned").take() {
            keepalive.stop.store(true, Ordering::SeqCst);
            let _ = keepalive.handle.join();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn elevation_is_released_only_when_the_count_returns_to_zero() {
        let rights = AdminRights::new();
        let outer = rights.gain();
        assert!(rights.is_elevated());
        let inner = rights.gain();
        assert!(rights.is_elevated());

        drop(inner);
        assert!(rights.is_elevated(), "outer guard still holds a level");

        drop(outer);
        assert!(!rights.is_elevated());
    }
}
