use std::num::NonZeroUsize;

use color_eyre::Result;
use tracing::{debug, trace, warn};

use super::descriptor::{ImageDescriptor, Settle};
use super::lifetime::ViewLifetime;

/// A descriptor that was just switched from pending to active.
/// The host is expected to start fetching `source` and report back with
/// [`LoadBatch::on_descriptor_settled`] using the same `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub index: usize,
    pub source: String,
}

/// Batch-counting scheduler over an ordered list of descriptors.
///
/// Descriptors are activated in order, `batch_size` at a time. The next batch
/// is only activated once every descriptor of the current batch has settled,
/// and only while the owning view is still live. The state machine is purely
/// reactive: every method returns the activations it performed and the caller
/// drives the actual loads.
#[derive(Debug)]
pub struct LoadBatch {
    descriptors: Vec<ImageDescriptor>,
    batch_size: NonZeroUsize,
    lifetime: ViewLifetime,
    /// Next descriptor to activate.
    cursor: usize,
    /// Settles seen for the current batch.
    completions: usize,
    /// Descriptors activated for the current batch; the batch is complete
    /// when `completions` reaches it.
    threshold: usize,
    halted: bool,
}

impl LoadBatch {
    /// Build the scheduler and immediately activate the first batch.
    ///
    /// Fails when `batch_size` is zero. An empty descriptor list is accepted and
    /// yields no activations.
    pub fn start(
        descriptors: Vec<ImageDescriptor>,
        batch_size: usize,
        lifetime: ViewLifetime,
    ) -> Result<(Self, Vec<Activation>)> {
        let batch_size = NonZeroUsize::new(batch_size)
            .ok_or_else(|| color_eyre::eyre::eyre!("batch size must be at least 1"))?;
        let mut batch = Self {
            descriptors,
            batch_size,
            lifetime,
            cursor: 0,
            completions: 0,
            threshold: 0,
            halted: false,
        };
        debug!(
            total = batch.descriptors.len(),
            batch_size = batch.batch_size.get(),
            "starting batched load"
        );
        let first = batch.schedule_next_batch();
        Ok((batch, first))
    }

    /// Activate the next batch.
    ///
    /// Does nothing once the view is dismissed, while the current batch still
    /// has loads in flight, or when every descriptor has been activated.
    /// Descriptors that were already activated (e.g. when resuming from an
    /// earlier run) are passed over and do not take a slot in the batch.
    pub fn schedule_next_batch(&mut self) -> Vec<Activation> {
        if !self.lifetime.is_live() {
            if !self.halted && self.has_pending() {
                debug!(cursor = self.cursor, "view no longer live, stopping scheduling");
                self.halted = true;
            }
            return Vec::new();
        }
        if self.in_flight() > 0 {
            trace!(in_flight = self.in_flight(), "batch still outstanding");
            return Vec::new();
        }

        let mut activated = Vec::with_capacity(self.batch_size.get());
        while self.cursor < self.descriptors.len() && activated.len() < self.batch_size.get() {
            let index = self.cursor;
            if let Some(source) = self.descriptors[index].activate() {
                activated.push(Activation {
                    index,
                    source: source.to_string(),
                });
            } else {
                trace!(index, "descriptor already activated, skipped");
            }
            self.cursor += 1;
        }
        self.completions = 0;
        self.threshold = activated.len();

        if !activated.is_empty() {
            debug!(
                first = activated[0].index,
                count = activated.len(),
                "activated batch"
            );
        }
        activated
    }

    /// Record that the load of descriptor `index` concluded.
    ///
    /// Failures count exactly like successes. When this settle completes the
    /// current batch, the next batch is scheduled and its activations returned.
    /// Settles for descriptors that are not in flight are ignored.
    pub fn on_descriptor_settled(&mut self, index: usize, outcome: Settle) -> Vec<Activation> {
        let Some(descriptor) = self.descriptors.get_mut(index) else {
            warn!(index, "settle for unknown descriptor ignored");
            return Vec::new();
        };
        if !descriptor.settle(outcome) {
            warn!(index, %outcome, "settle for descriptor that is not in flight ignored");
            return Vec::new();
        }
        if outcome == Settle::Failed {
            // Counted toward the batch like a success, otherwise the batch never completes.
            debug!(index, key = descriptor.key(), "load failed");
        }

        self.completions += 1;
        if self.completions < self.threshold {
            return Vec::new();
        }
        self.completions = 0;
        self.threshold = 0;
        self.schedule_next_batch()
    }

    pub fn descriptors(&self) -> &[ImageDescriptor] {
        &self.descriptors
    }

    pub fn into_descriptors(self) -> Vec<ImageDescriptor> {
        self.descriptors
    }

    /// Index of the next descriptor to activate.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Descriptors of the current batch that have not settled yet.
    pub fn in_flight(&self) -> usize {
        self.threshold - self.completions
    }

    /// True once scheduling stopped because the view was dismissed while
    /// descriptors were still waiting to be activated.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn has_pending(&self) -> bool {
        self.descriptors[self.cursor..]
            .iter()
            .any(ImageDescriptor::is_pending)
    }

    /// Every descriptor was activated and has settled.
    pub fn is_finished(&self) -> bool {
        self.cursor == self.descriptors.len() && self.in_flight() == 0
    }
}
