use async_trait::async_trait;

use crate::application::request_context::RequestContext;

/// A request routed through the [`MessageBus`](super::MessageBus).
///
/// The response and error types are fixed by the request shape, so a call
/// site never chooses them independently of the handler.
pub trait Message: Send + 'static {
    type Response: Send + 'static;
    type Error: Send + 'static;
}

/// State-changing request.
pub trait Command: Message {}

/// Read-only, idempotent request.
pub trait Query: Message {}

#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, ctx: &RequestContext, command: C) -> Result<C::Response, C::Error>;
}

#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn handle(&self, ctx: &RequestContext, query: Q) -> Result<Q::Response, Q::Error>;
}
