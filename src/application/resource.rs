//! Local copies of server data that can be edited optimistically.

/// Where a [`ProvisionalResource`] stands relative to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Matches the last authoritative read.
    Clean,
    /// Carries local edits the server has not confirmed.
    ProvisionallyModified,
    /// An authoritative read is in flight.
    Reconciling,
}

/// A value with explicit provisional/authoritative bookkeeping.
///
/// Local edits go through [`modify`](Self::modify); the server's answer
/// always wins through [`reconcile`](Self::reconcile).
#[derive(Debug, Clone)]
pub struct ProvisionalResource<T> {
    value: T,
    state: ResourceState,
    before_reconcile: ResourceState,
}

impl<T> ProvisionalResource<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            state: ResourceState::Clean,
            before_reconcile: ResourceState::Clean,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn is_provisional(&self) -> bool {
        self.state != ResourceState::Clean
    }

    /// Applies an optimistic local edit.
    pub fn modify<R>(&mut self, edit: impl FnOnce(&mut T) -> R) -> R {
        let result = edit(&mut self.value);
        if self.state == ResourceState::Reconciling {
            self.before_reconcile = ResourceState::ProvisionallyModified;
        } else {
            self.state = ResourceState::ProvisionallyModified;
        }
        result
    }

    pub fn begin_reconcile(&mut self) {
        if self.state != ResourceState::Reconciling {
            self.before_reconcile = self.state;
            self.state = ResourceState::Reconciling;
        }
    }

    /// Replaces the local copy with server truth.
    pub fn reconcile(&mut self, value: T) {
        self.value = value;
        self.state = ResourceState::Clean;
        self.before_reconcile = ResourceState::Clean;
    }

    /// The read failed; local edits stay provisional.
    pub fn abort_reconcile(&mut self) {
        if self.state == ResourceState::Reconciling {
            self.state = self.before_reconcile;
        }
    }
}

impl<T: Default> Default for ProvisionalResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
