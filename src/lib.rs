#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_match)]
#![allow(clippy::collapsible_else_if)]

pub mod config;
pub mod fetch;
pub mod loader;
pub mod logging;
pub mod matrix;

// Re-export commonly used types
pub use fetch::{DirectorySurface, HttpImageSource};
pub use loader::{BatchedImageLoader, ImageDescriptor, LoadBatch, LoadReport, Settle, ViewLifetime};
pub use matrix::{ColumnInfo, MatrixSettings, PlotContext, ScatterplotMatrix};
