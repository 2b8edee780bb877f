//! Thread-safe session handle.
//!
//! `SyncSession` wraps a loaded `Session` in `Arc<RwLock<Session>>` so that
//! several renderers (views) can query it from different threads. A separate
//! cycle lock serialises "query a delta, then apply it" so a delta computed
//! for one window is never applied after a newer one.
//!
//! # Examples
//!
//! ```rust
//! use tempograph::{Interval, Session, SyncSession, Window};
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new();
//! session.create_network(None, None, Interval::unbounded(), true)?;
//! session.create_node(Some("a"), None, Interval::new(0.0, 10.0))?;
//!
//! let shared = SyncSession::new(session);
//! let other = shared.clone();
//! let handle = thread::spawn(move || other.visible_nodes(Window::new(1.0, 2.0)).len());
//!
//! assert_eq!(handle.join().unwrap(), 1);
//! # Ok(())
//! # }
//! ```

use super::{Session, WindowDelta};
use crate::error::Result;
use crate::graph::{EdgeId, Identity, NodeId};
use crate::store::AttributeKey;
use crate::types::IngestStats;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tempograph_types::interval::Window;
use tempograph_types::value::AttrValue;

/// Shared handle to a `Session`. Cloning is cheap and shares the session.
#[derive(Clone)]
pub struct SyncSession {
    inner: Arc<RwLock<Session>>,
    cycle: Arc<Mutex<()>>,
}

impl SyncSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
            cycle: Arc::new(Mutex::new(())),
        }
    }

    /// Compute the delta from `previous` to `new` and hand it to `apply`,
    /// holding the cycle lock across both steps.
    ///
    /// Concurrent cycles run one after another; plain queries are not
    /// blocked by the cycle lock.
    pub fn window_cycle<F, R>(&self, previous: Window, new: Window, apply: F) -> Result<R>
    where
        F: FnOnce(&WindowDelta) -> R,
    {
        let _cycle = self.cycle.lock();
        let delta = self.inner.read().advance_window(previous, new)?;
        Ok(apply(&delta))
    }

    pub fn advance_window(&self, previous: Window, new: Window) -> Result<WindowDelta> {
        self.inner.read().advance_window(previous, new)
    }

    /// Owned copy of the value in effect at `t`.
    pub fn current_active_value(
        &self,
        identity: Identity,
        key: &AttributeKey,
        t: f64,
    ) -> Option<AttrValue> {
        self.inner.read().current_active_value(identity, key, t).cloned()
    }

    pub fn min_time(&self) -> Option<f64> {
        self.inner.read().min_time()
    }

    pub fn max_time(&self) -> Option<f64> {
        self.inner.read().max_time()
    }

    pub fn visible_nodes(&self, window: Window) -> Vec<NodeId> {
        self.inner.read().visible_nodes(window)
    }

    pub fn visible_edges(&self, window: Window) -> Vec<EdgeId> {
        self.inner.read().visible_edges(window)
    }

    pub fn stats(&self) -> IngestStats {
        self.inner.read().stats().clone()
    }

    /// Acquires a read lock for several queries under one lock.
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, Session> {
        self.inner.read()
    }

    /// Acquires a write lock, e.g. to keep recording into a loaded session.
    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, Session> {
        self.inner.write()
    }
}

impl From<Session> for SyncSession {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<SyncSession>;
};
