mod message;
mod message_bus;

pub use message::{Command, CommandHandler, Message, Query, QueryHandler};
pub use message_bus::{BusError, HandlerCategory, MessageBus, RegistrationError};
