use tokio_util::sync::CancellationToken;

/// Liveness of the view that owns a loader run.
///
/// The view holds one clone and calls [`ViewLifetime::dismiss`] when it closes;
/// the loader holds another and only ever reads it. Dismissal is one-way.
#[derive(Debug, Clone, Default)]
pub struct ViewLifetime {
    token: CancellationToken,
}

impl ViewLifetime {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Wrap an existing token, e.g. a child of an application-wide shutdown token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Mark the view as dismissed. Calling this more than once has no further effect.
    pub fn dismiss(&self) {
        if self.is_live() {
            tracing::debug!("view dismissed");
        }
        self.token.cancel();
    }

    /// Resolves once the view has been dismissed.
    pub async fn dismissed(&self) {
        self.token.cancelled().await
    }
}
