use async_trait::async_trait;
use std::marker::PhantomData;

use crate::domain::context::Context;
use crate::domain::models::{Condition, Resource};
use crate::domain::ports::Client;

/// Receives the outcome records of a completed run.
///
/// Typically merges them into the parent's status and writes it back.
#[async_trait]
pub trait StatusConditionHandler<P: Resource>: Send + Sync {
    async fn handle(
        &self,
        ctx: &Context,
        client: &Client,
        parent: &P,
        conditions: &[Condition],
    ) -> anyhow::Result<()>;
}

/// Adapts a synchronous closure into a [`StatusConditionHandler`].
pub struct FnStatusHandler<P, F> {
    handler: F,
    _parent: PhantomData<fn(&P)>,
}

impl<P, F> FnStatusHandler<P, F>
where
    P: Resource,
    F: Fn(&P, &[Condition]) -> anyhow::Result<()> + Send + Sync,
{
    pub const fn new(handler: F) -> Self {
        Self {
            handler,
            _parent: PhantomData,
        }
    }
}

#[async_trait]
impl<P, F> StatusConditionHandler<P> for FnStatusHandler<P, F>
where
    P: Resource,
    F: Fn(&P, &[Condition]) -> anyhow::Result<()> + Send + Sync,
{
    async fn handle(
        &self,
        _ctx: &Context,
        _client: &Client,
        parent: &P,
        conditions: &[Condition],
    ) -> anyhow::Result<()> {
        (self.handler)(parent, conditions)
    }
}
