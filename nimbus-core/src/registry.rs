//! Lifecycle-safe fan-out of native signals to compositor callbacks.
//!
//! The toolkit frees its objects on its own schedule. Every native listener
//! the compositor hooks onto an object therefore has to be unhooked no later
//! than the object's destroy signal, or the toolkit will eventually call into
//! freed memory. [`EventRegistry`] owns all of those listeners:
//!
//! - one native listener per `(handle, signal)` pair, however many
//!   subscribers the pair has;
//! - subscribers run in registration order;
//! - [`EventRegistry::track_lifetime`] hooks the destroy signal so that every
//!   listener of the object is released the moment it dies;
//! - handles whose destroy signal has been observed are retired and refuse new
//!   registrations until a creation signal announces the value again
//!   ([`EventRegistry::revive`]).
//!
//! Callbacks receive the dispatch state `D` mutably, so compositor logic
//! never needs shared mutable captures. The registry's own tables sit behind a
//! mutex because the binding layer may register listeners from a setup thread
//! before the event loop starts; dispatch itself happens on the event-loop
//! thread only.

use crate::error::RegistryError;
use crate::events::Event;
use crate::{NativeHandle, Signal};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// A subscriber callback.
pub type Callback<D> = Arc<dyn Fn(&mut D, &Event) + Send + Sync>;

/// Identifies one subscriber, for [`EventRegistry::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Token for a native listener allocated by the binding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeListener(pub u64);

/// Native side of the signal plumbing, implemented by the binding layer.
///
/// `connect` allocates a native listener and adds it to the object's signal;
/// when that listener fires, the binding layer calls
/// [`EventRegistry::dispatch_native`] (or [`EventRegistry::dispatch`]).
/// `disconnect` removes the listener from the signal and frees it.
pub trait NativeSignals: Send + Sync {
    fn connect(&self, handle: NativeHandle, signal: Signal) -> NativeListener;
    fn disconnect(&self, listener: NativeListener);
}

struct Subscriber<D> {
    id: SubscriptionId,
    callback: Callback<D>,
}

struct ListenerEntry<D> {
    signal: Signal,
    native: NativeListener,
    subscribers: Vec<Subscriber<D>>,
}

struct Tables<D> {
    entries: HashMap<NativeHandle, Vec<ListenerEntry<D>>>,
    by_native: HashMap<NativeListener, (NativeHandle, Signal)>,
    subscriptions: HashMap<SubscriptionId, (NativeHandle, Signal)>,
    retired: HashSet<NativeHandle>,
    next_subscription: u64,
    shut_down: bool,
}

impl<D> Tables<D> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            by_native: HashMap::new(),
            subscriptions: HashMap::new(),
            retired: HashSet::new(),
            next_subscription: 0,
            shut_down: false,
        }
    }

    fn check_open(&self, handle: NativeHandle, signal: Signal) -> Result<(), RegistryError> {
        if self.shut_down {
            error!(handle = ?handle, signal = %signal, "register after registry shutdown");
            return Err(RegistryError::ShutDown);
        }
        if self.retired.contains(&handle) {
            error!(handle = ?handle, signal = %signal, "register on a destroyed handle");
            return Err(RegistryError::HandleRetired(handle));
        }
        Ok(())
    }

    /// Detaches every entry of `handle` from the lookup tables and hands them
    /// back so the caller can disconnect them outside the lock.
    fn take_handle(&mut self, handle: NativeHandle) -> Vec<ListenerEntry<D>> {
        let taken = self.entries.remove(&handle).unwrap_or_default();
        for entry in &taken {
            self.by_native.remove(&entry.native);
            for sub in &entry.subscribers {
                self.subscriptions.remove(&sub.id);
            }
        }
        taken
    }
}

/// Owner of every native listener the compositor has installed.
pub struct EventRegistry<D> {
    native: Arc<dyn NativeSignals>,
    tables: Mutex<Tables<D>>,
}

impl<D: 'static> EventRegistry<D> {
    /// Creates the registry for a freshly created display.
    pub fn new(native: Arc<dyn NativeSignals>) -> Self {
        Self {
            native,
            tables: Mutex::new(Tables::new()),
        }
    }

    /// Appends `callback` to the subscribers of `(handle, signal)`.
    ///
    /// The native listener for the pair is created on first use only, outside
    /// the table lock. Fails when `handle` has been destroyed and not
    /// re-announced since, or when the registry was shut down.
    pub fn register<F>(
        &self,
        handle: NativeHandle,
        signal: Signal,
        callback: F,
    ) -> Result<SubscriptionId, RegistryError>
    where
        F: Fn(&mut D, &Event) + Send + Sync + 'static,
    {
        let mut subscriber = Subscriber {
            id: SubscriptionId(0),
            callback: Arc::new(callback) as Callback<D>,
        };

        let mut connected = None;
        loop {
            let mut tables = self.tables.lock();
            if let Err(err) = tables.check_open(handle, signal) {
                drop(tables);
                if let Some(native) = connected {
                    self.native.disconnect(native);
                }
                return Err(err);
            }

            let id = SubscriptionId(tables.next_subscription);
            subscriber.id = id;

            let existing = tables
                .entries
                .get_mut(&handle)
                .and_then(|list| list.iter_mut().find(|e| e.signal == signal));
            if let Some(entry) = existing {
                entry.subscribers.push(subscriber);
                trace!(handle = ?handle, signal = %signal, subscribers = entry.subscribers.len(), "subscriber appended");
                tables.next_subscription += 1;
                tables.subscriptions.insert(id, (handle, signal));
                drop(tables);
                // Another registration installed the pair's listener first.
                if let Some(native) = connected {
                    self.native.disconnect(native);
                }
                return Ok(id);
            }

            let Some(native) = connected else {
                drop(tables);
                let native = self.native.connect(handle, signal);
                debug!(handle = ?handle, signal = %signal, listener = native.0, "native listener connected");
                connected = Some(native);
                continue;
            };

            tables.next_subscription += 1;
            tables.by_native.insert(native, (handle, signal));
            tables.entries.entry(handle).or_default().push(ListenerEntry {
                signal,
                native,
                subscribers: vec![subscriber],
            });
            tables.subscriptions.insert(id, (handle, signal));
            return Ok(id);
        }
    }

    /// Clears the destroyed mark of `handle`.
    ///
    /// Handles are object addresses, so the toolkit may hand out the value of
    /// a destroyed object again. Creation handlers call this before
    /// subscribing to the new object. Returns whether the handle was retired.
    pub fn revive(&self, handle: NativeHandle) -> bool {
        let revived = self.tables.lock().retired.remove(&handle);
        if revived {
            debug!(handle = ?handle, "retired handle reused by a new object");
        }
        revived
    }

    /// Releases every listener of `handle` once `destroy_signal` fires.
    ///
    /// Must be called for every object whose lifetime the toolkit owns. The
    /// handle is retired at the same time, so late registrations are refused.
    pub fn track_lifetime(
        self: &Arc<Self>,
        handle: NativeHandle,
        destroy_signal: Signal,
    ) -> Result<SubscriptionId, RegistryError> {
        let registry = Arc::downgrade(self);
        self.register(handle, destroy_signal, move |_, _| {
            if let Some(registry) = registry.upgrade() {
                registry.retire(handle);
            }
        })
    }

    /// Invokes every subscriber of `(handle, signal)` in registration order.
    ///
    /// The subscriber list is snapshotted first: callbacks may register or
    /// unregister freely, and each subscriber present at the start of the
    /// dispatch runs exactly once. Returns the number of callbacks invoked.
    pub fn dispatch(&self, state: &mut D, handle: NativeHandle, signal: Signal, event: &Event) -> usize {
        let snapshot: Vec<Callback<D>> = {
            let tables = self.tables.lock();
            tables
                .entries
                .get(&handle)
                .and_then(|list| list.iter().find(|e| e.signal == signal))
                .map(|entry| entry.subscribers.iter().map(|s| Arc::clone(&s.callback)).collect())
                .unwrap_or_default()
        };

        if snapshot.is_empty() {
            trace!(handle = ?handle, signal = %signal, "dispatch with no subscribers");
            return 0;
        }

        trace!(handle = ?handle, signal = %signal, subscribers = snapshot.len(), "dispatching");
        for callback in &snapshot {
            callback(state, event);
        }
        snapshot.len()
    }

    /// Entry point for the binding layer's shared native trampoline.
    pub fn dispatch_native(&self, state: &mut D, listener: NativeListener, event: &Event) -> usize {
        let target = self.tables.lock().by_native.get(&listener).copied();
        match target {
            Some((handle, signal)) => self.dispatch(state, handle, signal, event),
            None => {
                warn!(listener = listener.0, "native listener fired after release");
                0
            }
        }
    }

    /// Removes every listener of `handle` across all signals.
    ///
    /// Idempotent. Returns the number of native listeners released.
    pub fn unregister_all(&self, handle: NativeHandle) -> usize {
        let taken = self.tables.lock().take_handle(handle);
        self.disconnect_entries(handle, taken)
    }

    /// Removes a single subscriber. The pair's native listener is released
    /// together with its last subscriber. Returns `false` if `id` is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let released = {
            let mut tables = self.tables.lock();
            let Some((handle, signal)) = tables.subscriptions.remove(&id) else {
                return false;
            };

            let mut released = None;
            let mut handle_empty = false;
            if let Some(list) = tables.entries.get_mut(&handle) {
                if let Some(pos) = list.iter().position(|e| e.signal == signal) {
                    list[pos].subscribers.retain(|s| s.id != id);
                    if list[pos].subscribers.is_empty() {
                        released = Some(list.remove(pos).native);
                    }
                }
                handle_empty = list.is_empty();
            }
            if handle_empty {
                tables.entries.remove(&handle);
            }
            if let Some(native) = released {
                tables.by_native.remove(&native);
            }
            released
        };

        if let Some(native) = released {
            self.native.disconnect(native);
        }
        true
    }

    /// Whether any listener is installed on `handle`.
    pub fn is_tracked(&self, handle: NativeHandle) -> bool {
        self.tables.lock().entries.contains_key(&handle)
    }

    /// Whether the destroy signal of `handle` has been observed.
    pub fn is_retired(&self, handle: NativeHandle) -> bool {
        self.tables.lock().retired.contains(&handle)
    }

    /// Number of native listeners installed on `handle`.
    pub fn listener_count(&self, handle: NativeHandle) -> usize {
        self.tables.lock().entries.get(&handle).map_or(0, Vec::len)
    }

    /// Number of subscribers of `(handle, signal)`.
    pub fn subscriber_count(&self, handle: NativeHandle, signal: Signal) -> usize {
        self.tables
            .lock()
            .entries
            .get(&handle)
            .and_then(|list| list.iter().find(|e| e.signal == signal))
            .map_or(0, |e| e.subscribers.len())
    }

    /// Releases everything still registered and refuses further work.
    ///
    /// Objects that were tracked properly have already released their
    /// listeners through their destroy signals by the time the display goes
    /// away; anything left over is logged.
    pub fn shutdown(&self) {
        let leftovers: Vec<(NativeHandle, Vec<ListenerEntry<D>>)> = {
            let mut tables = self.tables.lock();
            tables.shut_down = true;
            tables.by_native.clear();
            tables.subscriptions.clear();
            tables.retired.clear();
            tables.entries.drain().collect()
        };

        if !leftovers.is_empty() {
            warn!(handles = leftovers.len(), "registry shut down with live listeners");
        }
        for (handle, entries) in leftovers {
            self.disconnect_entries(handle, entries);
        }
    }

    fn retire(&self, handle: NativeHandle) {
        let taken = {
            let mut tables = self.tables.lock();
            tables.retired.insert(handle);
            tables.take_handle(handle)
        };
        let released = self.disconnect_entries(handle, taken);
        debug!(handle = ?handle, released, "handle destroyed, listeners released");
    }

    fn disconnect_entries(&self, handle: NativeHandle, entries: Vec<ListenerEntry<D>>) -> usize {
        let count = entries.len();
        for entry in entries {
            trace!(handle = ?handle, signal = %entry.signal, listener = entry.native.0, "native listener disconnected");
            self.native.disconnect(entry.native);
        }
        count
    }
}

impl<D> fmt::Debug for EventRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.lock();
        f.debug_struct("EventRegistry")
            .field("handles", &tables.entries.len())
            .field("subscriptions", &tables.subscriptions.len())
            .field("retired", &tables.retired.len())
            .field("shut_down", &tables.shut_down)
            .finish()
    }
}
