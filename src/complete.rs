use tracing::{trace, warn};

use crate::{dispatch::Hooks, permission::PermissionGate, registry::Registry};

/// Retains the candidates starting with `current`. The match is literal and case-sensitive.
pub fn filter_by_prefix<I, S>(candidates: I, current: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    candidates
        .into_iter()
        .map(Into::into)
        .filter(|candidate: &String| candidate.starts_with(current))
        .collect()
}

/// Produces completion candidates for partially typed command lines.
///
/// With at most one argument the candidates are the subcommand names the caller may use. Beyond
/// that the subcommand's own completion provider is asked, without a further permission check, and
/// its answer is filtered by the last argument. Completion never fails: anything that goes wrong
/// yields no candidates.
pub struct CompletionResolver<'r, C> {
    registry: &'r Registry<C>,
    gate: &'r dyn PermissionGate<C>,
    hooks: &'r dyn Hooks<C>,
}

impl<'r, C> CompletionResolver<'r, C> {
    /// Creates a resolver over the given registry.
    pub fn new(
        registry: &'r Registry<C>,
        gate: &'r dyn PermissionGate<C>,
        hooks: &'r dyn Hooks<C>,
    ) -> Self {
        CompletionResolver {
            registry,
            gate,
            hooks,
        }
    }

    /// Resolves the candidates for the last of the given arguments.
    pub fn resolve(&self, caller: &C, args: &[String]) -> Vec<String> {
        let label = match args {
            [] => return self.registry.list_top_level(caller, self.gate),
            [partial] => {
                let names = self.registry.list_top_level(caller, self.gate);
                return filter_by_prefix(names, partial);
            }
            [label, ..] => label.as_str(),
        };

        let binding = match self.registry.lookup(label) {
            Some(binding) => binding,
            None => {
                trace!(label, "Completing unknown subcommand");
                self.hooks.on_not_a_subcommand(caller, label, args);
                return Vec::new();
            }
        };

        let current = args.last().map(String::as_str).unwrap_or_default();
        match binding.complete(caller, &args[1 ..]) {
            Some(Ok(candidates)) => filter_by_prefix(candidates, current),
            Some(Err(e)) => {
                warn!(label, error = %e, "Completion provider failed");
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}
