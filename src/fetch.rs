//! HTTP image source and a render surface that writes thumbnails to disk.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use tracing::{debug, trace};

use crate::loader::{FetchError, ImageDescriptor, ImageSource, RenderSurface};

/// Fetches images over HTTP with a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    /// A request timeout turns a hung request into a failed load instead of
    /// stalling the batch forever.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, source: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> {
        let request = self.client.get(source);
        let url = source.to_string();
        async move {
            trace!(%url, "requesting image");
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url,
                });
            }
            let bytes = response.bytes().await?;
            debug!(%url, len = bytes.len(), "image fetched");
            Ok(bytes.to_vec())
        }
    }
}

/// Writes each loaded image as `NNN_<slug>.png` under a directory.
#[derive(Debug)]
pub struct DirectorySurface {
    dir: PathBuf,
    written: Vec<PathBuf>,
    next: usize,
}

impl DirectorySurface {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Vec::new(),
            next: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in settle order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl RenderSurface for DirectorySurface {
    fn render(&mut self, descriptor: &ImageDescriptor, image: &[u8]) -> Result<()> {
        let path = self
            .dir
            .join(format!("{:03}_{}.png", self.next, slug(descriptor.key())));
        std::fs::write(&path, image)?;
        self.next += 1;
        self.written.push(path);
        Ok(())
    }
}

/// File-name safe form of a descriptor key.
pub fn slug(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut last_dash = true;
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("image");
    }
    out
}
