//! A minimal IRC client session, as needed by the `linkuptime` tool.
//!
//! This crate owns the socket (optionally wrapped in TLS), splits the inbound
//! stream into lines, tokenises them, and deals with the protocol housekeeping
//! that every client needs (registration, `PING`, nickname collisions) so that
//! the application only ever sees the replies it actually cares about.

pub mod error;
pub use error::*;

mod message;
pub use message::*;

mod sink;
pub use sink::*;

mod connection;
pub use connection::*;

mod session;
pub use session::*;

mod internal {
    pub mod control;
    pub use control::*;
    pub mod connection_task;
    pub use connection_task::*;
    pub mod line_reader;
    pub use line_reader::*;
}

pub use internal::ConnectionEvent;
