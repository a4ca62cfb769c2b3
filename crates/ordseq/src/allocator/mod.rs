use crate::gateway::OrderDirectory;
use crate::id::OrderId;
use parking_lot::Mutex;
use serde::Serialize;


#[derive(Debug, Default)]
struct CounterState {
    last_used: u64,
    initialized: bool,
}

/// A read-only snapshot of the allocator, for diagnostics surfaces.
///
/// Taking a snapshot never consumes a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocatorStats {
    /// Whether a scan of the existing orders has completed at least once.
    pub initialized: bool,
    /// The highest sequence number known to be in use (0 = none observed).
    pub current_counter: u64,
    /// The identifier the next [`OrderIdAllocator::next_id`] call would
    /// return, absent interleaved calls.
    pub next_id: OrderId,
}

/// Issues strictly increasing order identifiers from a local high-water mark.
///
/// The counter is rebuilt from the backend's order collection on first use:
/// one scan lists the existing identifiers, parses each leniently, and keeps
/// the maximum. Concurrent callers collapse onto a single scan. After that,
/// every [`next_id`] is a plain increment with no suspension point, so issues
/// within one process never repeat.
///
/// The allocator is advisory, not authoritative. It holds no reference to the
/// backend's store beyond the listing seam, and a second session can hold its
/// own allocator computing the same numbers; the backend's uniqueness
/// constraint is what actually arbitrates, via the submitter's retry loop.
///
/// Failure modes degrade rather than propagate: an unavailable listing
/// endpoint leaves the counter at 0, because an order must remain creatable
/// even when the listing endpoint is down.
///
/// Share one instance per process ([`std::sync::Arc`] works; all methods take
/// `&self`).
///
/// [`next_id`]: Self::next_id
pub struct OrderIdAllocator<D> {
    directory: D,
    state: Mutex<CounterState>,
    // Held for the duration of a scan; concurrent initialize() callers queue
    // here instead of starting a second scan.
    init_gate: tokio::sync::Mutex<()>,
}

impl<D> OrderIdAllocator<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            state: Mutex::new(CounterState::default()),
            init_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// The listing collaborator this allocator scans.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Snapshots the allocator without consuming a number.
    pub fn stats(&self) -> AllocatorStats {
        let state = self.state.lock();
        AllocatorStats {
            initialized: state.initialized,
            current_counter: state.last_used,
            next_id: OrderId::from_raw(state.last_used + 1),
        }
    }

    /// Testing/migration hook: forgets everything and forces a rescan on the
    /// next use.
    ///
    /// Must not be called from request-handling paths, and must not race an
    /// in-flight [`initialize`]: a scan already past the gate will still
    /// publish its result.
    ///
    /// [`initialize`]: Self::initialize
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.last_used = 0;
        state.initialized = false;
    }

    /// Testing/migration hook: forces the high-water mark.
    ///
    /// Does not mark the allocator initialized; a later scan merges with
    /// `max`, so a forced counter is never lowered by stale listing data.
    pub fn set_counter(&self, sequence: u64) {
        self.state.lock().last_used = sequence;
    }
}

impl<D: OrderDirectory> OrderIdAllocator<D> {
    /// Derives the counter from the existing order collection.
    ///
    /// Idempotent and infallible: once a scan has completed this returns
    /// immediately, concurrent callers await the scan already in flight
    /// rather than starting their own, and a failed listing call is treated
    /// as an empty collection.
    pub async fn initialize(&self) {
        if self.state.lock().initialized {
            return;
        }
        let _gate = self.init_gate.lock().await;
        // A caller that was queued behind the scan lands here after it
        // published; the counter is already current.
        if self.state.lock().initialized {
            return;
        }

        let scanned = match self.directory.list_order_ids().await {
            Ok(ids) => {
                let mut high_water = 0u64;
                let mut skipped = 0usize;
                for raw in &ids {
                    match OrderId::parse_lenient(raw) {
                        Some(id) => high_water = high_water.max(id.sequence()),
                        None => {
                            skipped += 1;
                            tracing::trace!(
                                raw = raw.as_str(),
                                "skipping unrecognized order identifier"
                            );
                        }
                    }
                }
                tracing::debug!(
                    seen = ids.len(),
                    skipped,
                    high_water,
                    "scanned existing orders"
                );
                high_water
            }
            Err(err) => {
                tracing::warn!(%err, "order listing unavailable; counter starts at 0");
                0
            }
        };

        let mut state = self.state.lock();
        state.last_used = state.last_used.max(scanned);
        state.initialized = true;
    }

    /// Issues the next identifier.
    ///
    /// Runs [`initialize`] first if no scan has completed yet. The
    /// increment itself holds the state lock with no await in between, so two
    /// calls on the same instance can never observe and consume the same
    /// number.
    ///
    /// [`initialize`]: Self::initialize
    pub async fn next_id(&self) -> OrderId {
        self.initialize().await;
        let mut state = self.state.lock();
        state.last_used += 1;
        OrderId::from_raw(state.last_used)
    }
}
