use tracing::{error, trace};

use crate::{error::InvocationError, permission::PermissionGate, registry::Registry};

/// Callbacks run when a command line cannot be routed to a handler.
///
/// All user-facing feedback lives here; the dispatcher itself never produces text.
pub trait Hooks<C> {
    /// Called when no subcommand matches, when no subcommand was given, or after a handler
    /// failed.
    ///
    /// `label` is the unmatched token (empty if none was given) and `args` is the full argument
    /// list as typed, label included.
    fn on_not_a_subcommand(&self, caller: &C, label: &str, args: &[String]);

    /// Called when the caller may not use the subcommand. `args` excludes the label.
    fn on_no_permission(&self, caller: &C, label: &str, args: &[String]);
}

/// Which path a dispatched command line took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The bound handler ran and succeeded.
    Executed,
    /// The not-a-subcommand hook ran.
    NotASubcommand,
    /// The no-permission hook ran.
    NoPermission,
}

/// Routes command lines to the handlers of a [`Registry`].
pub struct Dispatcher<'r, C> {
    registry: &'r Registry<C>,
    gate: &'r dyn PermissionGate<C>,
    hooks: &'r dyn Hooks<C>,
}

impl<'r, C> Dispatcher<'r, C> {
    /// Creates a dispatcher over the given registry.
    pub fn new(
        registry: &'r Registry<C>,
        gate: &'r dyn PermissionGate<C>,
        hooks: &'r dyn Hooks<C>,
    ) -> Self {
        Dispatcher {
            registry,
            gate,
            hooks,
        }
    }

    /// Dispatches the given arguments, the first of which names the subcommand.
    ///
    /// Exactly one of the two hooks or the handler runs. A failing handler is reported to the
    /// not-a-subcommand hook and then returned as an [`InvocationError`].
    pub fn dispatch(&self, caller: &C, args: &[String]) -> Result<Outcome, InvocationError> {
        let (label, rest) = match args.split_first() {
            Some((label, rest)) => (label.as_str(), rest),
            None => {
                trace!("Empty command, no subcommand given");
                self.hooks.on_not_a_subcommand(caller, "", args);
                return Ok(Outcome::NotASubcommand);
            }
        };

        let binding = match self.registry.lookup(label) {
            Some(binding) => binding,
            None => {
                trace!(label, "Unknown subcommand");
                self.hooks.on_not_a_subcommand(caller, label, args);
                return Ok(Outcome::NotASubcommand);
            }
        };

        if !self.gate.allows(caller, binding.permission()) {
            trace!(label, permission = binding.permission(), "Permission denied");
            self.hooks.on_no_permission(caller, label, rest);
            return Ok(Outcome::NoPermission);
        }

        trace!(label, name = binding.name(), "Invoking subcommand");
        match binding.invoke(caller, label, rest) {
            Ok(()) => Ok(Outcome::Executed),
            Err(e) => {
                error!(label, error = %e, "Subcommand handler failed");
                self.hooks.on_not_a_subcommand(caller, label, args);
                Err(InvocationError::new(label, e))
            }
        }
    }
}
