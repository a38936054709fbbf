use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use super::message::{Command, CommandHandler, Message, Query, QueryHandler};
use crate::application::error_kind::{Classify, ErrorKind};
use crate::application::request_context::RequestContext;

type AnyBox = Box<dyn Any + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerCategory {
    Command,
    Query,
}

impl fmt::Display for HandlerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => f.write_str("command"),
            Self::Query => f.write_str("query"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BusError<E> {
    #[error("no {category} handler registered for {type_name}")]
    HandlerNotFound {
        category: HandlerCategory,
        type_name: &'static str,
    },
    #[error("handler for {type_name} received a request of another type")]
    RequestMismatch { type_name: &'static str },
    #[error("handler for {type_name} produced a response of another type")]
    ResponseMismatch { type_name: &'static str },
    #[error(transparent)]
    Handler(E),
}

impl<E: Classify> Classify for BusError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::HandlerNotFound { .. } => ErrorKind::HandlerNotFound,
            Self::RequestMismatch { .. } | Self::ResponseMismatch { .. } => ErrorKind::Internal,
            Self::Handler(error) => error.kind(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("a {category} handler for {type_name} is already registered")]
    Duplicate {
        category: HandlerCategory,
        type_name: &'static str,
    },
}

enum ErasedFailure {
    Handler(AnyBox),
    RequestMismatch,
}

#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn handle(&self, ctx: &RequestContext, message: AnyBox) -> Result<AnyBox, ErasedFailure>;
}

struct CommandSlot<C, H> {
    handler: Arc<H>,
    _command: PhantomData<fn(C)>,
}

#[async_trait]
impl<C, H> ErasedHandler for CommandSlot<C, H>
where
    C: Command,
    H: CommandHandler<C> + 'static,
{
    async fn handle(&self, ctx: &RequestContext, message: AnyBox) -> Result<AnyBox, ErasedFailure> {
        let command = message
            .downcast::<C>()
            .map_err(|_| ErasedFailure::RequestMismatch)?;
        self.handler
            .handle(ctx, *command)
            .await
            .map(|response| Box::new(response) as AnyBox)
            .map_err(|error| ErasedFailure::Handler(Box::new(error)))
    }
}

struct QuerySlot<Q, H> {
    handler: Arc<H>,
    _query: PhantomData<fn(Q)>,
}

#[async_trait]
impl<Q, H> ErasedHandler for QuerySlot<Q, H>
where
    Q: Query,
    H: QueryHandler<Q> + 'static,
{
    async fn handle(&self, ctx: &RequestContext, message: AnyBox) -> Result<AnyBox, ErasedFailure> {
        let query = message
            .downcast::<Q>()
            .map_err(|_| ErasedFailure::RequestMismatch)?;
        self.handler
            .handle(ctx, *query)
            .await
            .map(|response| Box::new(response) as AnyBox)
            .map_err(|error| ErasedFailure::Handler(Box::new(error)))
    }
}

struct Registration {
    type_name: &'static str,
    handler: Arc<dyn ErasedHandler>,
}

/// Routes typed requests to exactly one registered handler.
///
/// Handlers are keyed by the [`TypeId`] of the request type, with commands and
/// queries kept in separate registries. Registration happens once while the
/// process is being assembled; afterwards the bus is shared read-only, so
/// concurrent dispatch needs no locking.
#[derive(Default)]
pub struct MessageBus {
    commands: HashMap<TypeId, Registration>,
    queries: HashMap<TypeId, Registration>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_command<C, H>(&mut self, handler: Arc<H>) -> Result<(), RegistrationError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let slot = CommandSlot::<C, H> {
            handler,
            _command: PhantomData,
        };
        insert::<C>(&mut self.commands, HandlerCategory::Command, Arc::new(slot))
    }

    pub fn register_query<Q, H>(&mut self, handler: Arc<H>) -> Result<(), RegistrationError>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let slot = QuerySlot::<Q, H> {
            handler,
            _query: PhantomData,
        };
        insert::<Q>(&mut self.queries, HandlerCategory::Query, Arc::new(slot))
    }

    pub fn has_command<C: Command>(&self) -> bool {
        self.commands.contains_key(&TypeId::of::<C>())
    }

    pub fn has_query<Q: Query>(&self) -> bool {
        self.queries.contains_key(&TypeId::of::<Q>())
    }

    pub async fn exec<C: Command>(
        &self,
        ctx: &RequestContext,
        command: C,
    ) -> Result<C::Response, BusError<C::Error>> {
        dispatch(&self.commands, HandlerCategory::Command, ctx, command).await
    }

    pub async fn ask<Q: Query>(
        &self,
        ctx: &RequestContext,
        query: Q,
    ) -> Result<Q::Response, BusError<Q::Error>> {
        dispatch(&self.queries, HandlerCategory::Query, ctx, query).await
    }
}

fn insert<M: Message>(
    registry: &mut HashMap<TypeId, Registration>,
    category: HandlerCategory,
    handler: Arc<dyn ErasedHandler>,
) -> Result<(), RegistrationError> {
    let type_name = type_name::<M>();
    match registry.entry(TypeId::of::<M>()) {
        Entry::Occupied(_) => Err(RegistrationError::Duplicate {
            category,
            type_name,
        }),
        Entry::Vacant(slot) => {
            tracing::debug!(%category, type_name, "Handler registered");
            slot.insert(Registration { type_name, handler });
            Ok(())
        }
    }
}

async fn dispatch<M: Message>(
    registry: &HashMap<TypeId, Registration>,
    category: HandlerCategory,
    ctx: &RequestContext,
    message: M,
) -> Result<M::Response, BusError<M::Error>> {
    let Some(registration) = registry.get(&TypeId::of::<M>()) else {
        tracing::error!(%category, type_name = type_name::<M>(), "No handler registered");
        return Err(BusError::HandlerNotFound {
            category,
            type_name: type_name::<M>(),
        });
    };

    let type_name = registration.type_name;
    match registration.handler.handle(ctx, Box::new(message)).await {
        Ok(response) => response
            .downcast::<M::Response>()
            .map(|response| *response)
            .map_err(|_| BusError::ResponseMismatch { type_name }),
        Err(ErasedFailure::Handler(error)) => match error.downcast::<M::Error>() {
            Ok(error) => Err(BusError::Handler(*error)),
            Err(_) => Err(BusError::ResponseMismatch { type_name }),
        },
        Err(ErasedFailure::RequestMismatch) => Err(BusError::RequestMismatch { type_name }),
    }
}
