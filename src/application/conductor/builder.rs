use std::sync::Arc;

use super::conductor::Conductor;
use crate::domain::errors::ReconcileError;
use crate::domain::models::{Condition, Resource};
use crate::domain::ports::{Client, FnStatusHandler, StatusConditionHandler};

/// Assembles a [`Conductor`].
pub struct ConductorBuilder<P: Resource> {
    client: Option<Client>,
    status_handler: Option<Arc<dyn StatusConditionHandler<P>>>,
}

impl<P: Resource> ConductorBuilder<P> {
    pub const fn new() -> Self {
        Self {
            client: None,
            status_handler: None,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Handler that receives the conditions of every run that completes idle.
    pub fn with_status_handler<H>(mut self, handler: H) -> Self
    where
        H: StatusConditionHandler<P> + 'static,
    {
        self.status_handler = Some(Arc::new(handler));
        self
    }

    /// Like [`Self::with_status_handler`], for a plain closure.
    pub fn with_status_fn<F>(self, handler: F) -> Self
    where
        F: Fn(&P, &[Condition]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with_status_handler(FnStatusHandler::new(handler))
    }

    pub fn build(self) -> Result<Conductor<P>, ReconcileError> {
        let client = self.client.ok_or_else(|| {
            ReconcileError::InvalidConfiguration("conductor requires a client".to_string())
        })?;
        Ok(Conductor {
            client,
            reconcilers: Vec::new(),
            status_handler: self.status_handler,
        })
    }
}

impl<P: Resource> Default for ConductorBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}
