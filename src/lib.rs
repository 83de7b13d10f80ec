#![warn(missing_docs)]

//! Routes the subcommands of a single host command to registered handlers.
//!
//! A [`Commander`] holds a [`Registry`] of [`Binding`]s keyed by canonical name and alias. Each
//! incoming argument list is resolved by its first argument, checked against a
//! [`PermissionGate`], and handed to the bound handler, or to one of the [`Hooks`] when that is
//! not possible. Partial input is completed either from the subcommand names the caller may use or
//! from the subcommand's own completion provider.
//!
//! Handler sources are usually declared with the [`handler_source`] attribute:
//!
//! ```ignore
//! #[derive(Clone)]
//! struct Teleport;
//!
//! #[handler_source(Player)]
//! impl Teleport {
//!     #[subcommand(name = "up", alias("u"), permission = "command.admin")]
//!     fn up(&self, player: &Player, _label: &str, _args: &[String]) -> HandlerResult {
//!         player.teleport_up();
//!         Ok(())
//!     }
//!
//!     #[complete(name = "up")]
//!     fn up_targets(&self, player: &Player, _args: &[String]) -> CompletionResult {
//!         Ok(player.server().online_players())
//!     }
//! }
//! ```

mod args;
mod binding;
mod caller;
mod commander;
mod complete;
pub mod config;
mod dispatch;
mod error;
pub mod permission;
mod registry;

pub use args::*;
pub use binding::*;
pub use caller::*;
pub use commander::*;
pub use complete::*;
pub use config::Settings;
pub use dispatch::*;
pub use error::*;
pub use permission::{OperatorGate, PermissionGate, WildcardGate};
pub use registry::*;
pub use subcommander_macros::handler_source;
