//! Subscription state machine.
//!
//! Tracks whether the feed is attached to the remote log and stamps each
//! attachment with a generation number. Callbacks registered with the
//! log may keep firing briefly after a detach; the generation lets the
//! delivery pump tell live events from stale ones without coordinating
//! with the callback source.
//!
//! # Invariants
//!
//! - Generations are assigned once and never reused, even across
//!   detach/re-attach cycles
//! - At most one generation is live at a time
//! - `accepts` is true only for the live generation

/// Monotonic attachment counter.
pub type Generation = u64;

/// Attachment state of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Not listening; all generations are stale.
    Detached,
    /// Listening under the given generation.
    Attached {
        /// The live generation.
        generation: Generation,
    },
}

/// Pure attach/detach state machine.
///
/// Holds no I/O resources. The owner decides what registering and
/// unregistering a listener means; this type only answers which events
/// are still wanted.
#[derive(Debug)]
pub struct Subscription {
    state: SubscriptionState,
    next_generation: Generation,
}

impl Subscription {
    /// Create a detached subscription.
    pub fn new() -> Self {
        Self { state: SubscriptionState::Detached, next_generation: 0 }
    }

    /// Current attachment state.
    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// Whether a generation is currently live.
    pub fn is_attached(&self) -> bool {
        matches!(self.state, SubscriptionState::Attached { .. })
    }

    /// Transition to attached.
    ///
    /// Returns the newly live generation, or `None` if already attached
    /// (the existing generation stays live and no listener should be
    /// registered).
    pub fn attach(&mut self) -> Option<Generation> {
        if self.is_attached() {
            return None;
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        self.state = SubscriptionState::Attached { generation };
        Some(generation)
    }

    /// Transition to detached.
    ///
    /// Returns the generation that just went stale, or `None` if already
    /// detached.
    pub fn detach(&mut self) -> Option<Generation> {
        match self.state {
            SubscriptionState::Attached { generation } => {
                self.state = SubscriptionState::Detached;
                Some(generation)
            },
            SubscriptionState::Detached => None,
        }
    }

    /// Whether an event stamped with `generation` should be delivered.
    pub fn accepts(&self, generation: Generation) -> bool {
        matches!(self.state, SubscriptionState::Attached { generation: live } if live == generation)
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}
