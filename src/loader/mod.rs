//! Progressive image loading.
//!
//! Images are revealed in small fixed-size batches: a batch is requested all
//! at once, and the next one starts only after every image of the current one
//! settled. Scheduling stops as soon as the owning view is dismissed.

pub mod batch;
pub mod descriptor;
pub mod lifetime;
pub mod runner;
pub mod source;

pub use batch::{Activation, LoadBatch};
pub use descriptor::{DescriptorState, ImageDescriptor, Settle};
pub use lifetime::ViewLifetime;
pub use runner::{BatchedImageLoader, LoadReport};
pub use source::{FetchError, ImageSource, RenderSurface};
