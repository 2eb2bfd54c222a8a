use std::future::Future;

use color_eyre::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use super::batch::{Activation, LoadBatch};
use super::descriptor::{ImageDescriptor, Settle};
use super::lifetime::ViewLifetime;
use super::source::{FetchError, ImageSource, RenderSurface};

/// Summary of one loader run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub total: usize,
    pub activated: usize,
    pub loaded: usize,
    pub failed: usize,
    /// The view was dismissed while descriptors were still waiting.
    pub halted: bool,
    #[serde(skip)]
    pub descriptors: Vec<ImageDescriptor>,
}

impl LoadReport {
    /// Descriptors this run did not request.
    pub fn skipped(&self) -> usize {
        self.total - self.activated
    }
}

/// Loads images a batch at a time on the current task.
///
/// All fetches of a batch are polled together; the next batch starts only
/// after each of them settled, whether it loaded or failed. There is no
/// timeout here: a fetch that never resolves holds the run forever, so bound
/// requests in the [`ImageSource`] if that matters.
pub struct BatchedImageLoader<S> {
    source: S,
    batch_size: usize,
}

impl<S: ImageSource> BatchedImageLoader<S> {
    pub fn new(source: S, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(color_eyre::eyre::eyre!("batch size must be at least 1"));
        }
        Ok(Self { source, batch_size })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load `descriptors` into `surface` until all have settled or the view is
    /// dismissed. Loads already in flight at dismissal are still awaited.
    pub async fn run<R: RenderSurface>(
        &self,
        descriptors: Vec<ImageDescriptor>,
        lifetime: ViewLifetime,
        surface: &mut R,
    ) -> Result<LoadReport> {
        let mut report = LoadReport {
            total: descriptors.len(),
            ..Default::default()
        };
        let (mut batch, first) = LoadBatch::start(descriptors, self.batch_size, lifetime)?;

        let mut in_flight = FuturesUnordered::new();
        for activation in first {
            report.activated += 1;
            in_flight.push(self.load(activation));
        }

        while let Some((index, fetched)) = in_flight.next().await {
            let descriptor = &batch.descriptors()[index];
            let outcome = match fetched {
                Ok(bytes) => match surface.render(descriptor, &bytes) {
                    Ok(()) => Settle::Loaded,
                    Err(e) => {
                        warn!(index, key = descriptor.key(), "render failed: {e}");
                        surface.failed(descriptor, &FetchError::Render(e.to_string()));
                        Settle::Failed
                    }
                },
                Err(e) => {
                    warn!(index, key = descriptor.key(), "fetch failed: {e}");
                    surface.failed(descriptor, &e);
                    Settle::Failed
                }
            };
            match outcome {
                Settle::Loaded => report.loaded += 1,
                Settle::Failed => report.failed += 1,
            }
            for activation in batch.on_descriptor_settled(index, outcome) {
                report.activated += 1;
                in_flight.push(self.load(activation));
            }
        }

        report.halted = batch.is_halted();
        info!(
            total = report.total,
            activated = report.activated,
            loaded = report.loaded,
            failed = report.failed,
            halted = report.halted,
            "batched load finished"
        );
        report.descriptors = batch.into_descriptors();
        Ok(report)
    }

    fn load(
        &self,
        activation: Activation,
    ) -> impl Future<Output = (usize, Result<Vec<u8>, FetchError>)> + '_ {
        async move {
            let fetched = self.source.fetch(&activation.source).await;
            (activation.index, fetched)
        }
    }
}
