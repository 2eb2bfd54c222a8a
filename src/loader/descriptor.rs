use serde::{Deserialize, Serialize};
use strum::Display;

/// How a load attempt concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Settle {
    Loaded,
    Failed,
}

/// Lifecycle of a single image slot.
///
/// `Pending` holds the URL that has not been requested yet, `Active` the URL
/// that is being fetched. A descriptor never moves backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorState {
    Pending { source: String },
    Active { source: String },
    Settled { source: String, outcome: Settle },
}

/// Handle for one image to be fetched and displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    key: String,
    state: DescriptorState,
}

impl ImageDescriptor {
    /// Create a descriptor whose image has not been requested yet.
    pub fn pending(key: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: DescriptorState::Pending {
                source: source.into(),
            },
        }
    }

    /// Display label of the slot, e.g. `"a (x) vs. b (y)"`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &DescriptorState {
        &self.state
    }

    /// URL waiting to be requested, if the descriptor was never activated.
    pub fn pending_source(&self) -> Option<&str> {
        match &self.state {
            DescriptorState::Pending { source } => Some(source),
            _ => None,
        }
    }

    /// URL that was requested, once the descriptor has been activated.
    pub fn active_source(&self) -> Option<&str> {
        match &self.state {
            DescriptorState::Pending { .. } => None,
            DescriptorState::Active { source } | DescriptorState::Settled { source, .. } => {
                Some(source)
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DescriptorState::Pending { .. })
    }

    /// Activated but not settled yet.
    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, DescriptorState::Active { .. })
    }

    pub fn outcome(&self) -> Option<Settle> {
        match self.state {
            DescriptorState::Settled { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Move the pending source to the active slot. Returns the URL to fetch,
    /// or `None` when the descriptor was already activated.
    pub(crate) fn activate(&mut self) -> Option<&str> {
        if let DescriptorState::Pending { source } = &mut self.state {
            let source = std::mem::take(source);
            self.state = DescriptorState::Active { source };
        } else {
            return None;
        }
        self.active_source()
    }

    /// Record the outcome of an in-flight load. Returns `false` when the
    /// descriptor was not in flight, in which case nothing changes.
    pub(crate) fn settle(&mut self, outcome: Settle) -> bool {
        if let DescriptorState::Active { source } = &mut self.state {
            let source = std::mem::take(source);
            self.state = DescriptorState::Settled { source, outcome };
            true
        } else {
            false
        }
    }
}
