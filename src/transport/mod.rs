//! Message transports.
//!
//! `recv` must be cancel-safe: the server races it against outbound
//! notifications in a `select!` loop, and a dropped `recv` may not lose
//! part of a message.

use crate::protocol::Message;

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

pub mod in_memory;
pub mod tcp;

pub use in_memory::InMemoryTransport;
pub use tcp::TcpTransport;
