//! Accepting and dispatching TCP connections.
//!
//! The [`ConnectionAcceptor`] owns the listening socket and a single accept
//! loop. Every accepted socket is handed to a [`ConnectionDispatcher`], which
//! returns immediately; the default [`TaskPerConnectionDispatcher`] runs each
//! connection on its own task.

mod acceptor;
mod dispatcher;

pub use acceptor::{AcceptorOptions, AcceptorState, ConnectionAcceptor};
pub use dispatcher::{ConnectionDispatcher, TaskPerConnectionDispatcher};
