use std::future::Future;

use color_eyre::Result;
use thiserror::Error;

use super::descriptor::ImageDescriptor;

/// Why a single image could not be loaded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server answered {status} for {url}")]
    Status { status: u16, url: String },
    #[error("could not render image: {0}")]
    Render(String),
    #[error("{0}")]
    Other(String),
}

/// Where image bytes come from.
pub trait ImageSource {
    fn fetch(&self, source: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>>;
}

/// Where loaded images end up.
pub trait RenderSurface {
    /// Display the bytes loaded for `descriptor`. An error here settles the
    /// descriptor as failed.
    fn render(&mut self, descriptor: &ImageDescriptor, image: &[u8]) -> Result<()>;

    /// Called when the image for `descriptor` could not be fetched or
    /// rendered ([`FetchError::Render`]).
    fn failed(&mut self, _descriptor: &ImageDescriptor, _error: &FetchError) {}
}
