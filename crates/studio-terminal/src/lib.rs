//! Studio Terminal - interactive process proxy
//!
//! Attaches one client channel to one locally spawned shell:
//! - Protocol: client control messages and outbound output events
//! - Backends: PTY-backed shell where available, piped subprocess otherwise
//! - Proxy: reader task + control loop with ordered, bounded teardown

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod error;
pub mod protocol;
pub mod proxy;

pub use backend::{spawn_shell, BackendKind, OutputStream, ProcessControl, SpawnedProcess};
pub use config::TerminalConfig;
pub use error::{Error, Result};
pub use protocol::{ClientMessage, OutboundEvent, Utf8Decoder};
pub use proxy::{CloseReason, ProxyState, TerminalProxy};
