use tracing::info;

use crate::{
    args::split_arguments,
    binding::HandlerSource,
    caller::Caller,
    complete::CompletionResolver,
    config::Settings,
    dispatch::{Dispatcher, Hooks, Outcome},
    error::{InvocationError, RegistrationError},
    permission::{OperatorGate, PermissionGate},
    registry::Registry,
};

/// A single host command whose first argument selects a subcommand.
///
/// Owns the registry, the permission gate and the fallback hooks. Register every handler source
/// before serving the first command; the commander is not synchronized internally.
pub struct Commander<C> {
    registry: Registry<C>,
    gate: Box<dyn PermissionGate<C>>,
    hooks: Box<dyn Hooks<C>>,
}

impl<C: Caller> Commander<C> {
    /// Creates a commander which lets operators and holders of the exact permission through.
    pub fn new<H>(hooks: H) -> Self
    where
        H: Hooks<C> + 'static,
    {
        Self::with_gate(hooks, OperatorGate)
    }
}

impl<C> Commander<C> {
    /// Creates a commander with a custom permission policy.
    pub fn with_gate<H, G>(hooks: H, gate: G) -> Self
    where
        H: Hooks<C> + 'static,
        G: PermissionGate<C> + 'static,
    {
        Commander {
            registry: Registry::new(),
            gate: Box::new(gate),
            hooks: Box::new(hooks),
        }
    }

    /// Replaces the registry settings. They govern every later registration call.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.registry.set_settings(settings);
        self
    }

    /// Registers the subcommands of `source`, then attaches its completion providers.
    pub fn register_source<S>(&mut self, source: &S) -> Result<(), RegistrationError>
    where
        S: HandlerSource<C> + ?Sized,
    {
        self.registry.register(source)?;
        self.registry.attach_completions(source)?;
        info!(
            subcommands = self.registry.len(),
            "Handler source registered"
        );
        Ok(())
    }

    /// Registers the subcommands of `source` only.
    pub fn register<S>(&mut self, source: &S) -> Result<(), RegistrationError>
    where
        S: HandlerSource<C> + ?Sized,
    {
        self.registry.register(source)
    }

    /// Attaches the completion providers of `source` only.
    pub fn attach_completions<S>(&mut self, source: &S) -> Result<(), RegistrationError>
    where
        S: HandlerSource<C> + ?Sized,
    {
        self.registry.attach_completions(source)
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    /// Mutable access to the registry, for registering single entries.
    pub fn registry_mut(&mut self) -> &mut Registry<C> {
        &mut self.registry
    }

    /// A dispatcher borrowing this commander's registry, gate and hooks.
    pub fn dispatcher(&self) -> Dispatcher<'_, C> {
        Dispatcher::new(&self.registry, &*self.gate, &*self.hooks)
    }

    /// A completion resolver borrowing this commander's registry, gate and hooks.
    pub fn resolver(&self) -> CompletionResolver<'_, C> {
        CompletionResolver::new(&self.registry, &*self.gate, &*self.hooks)
    }

    /// Dispatches already split arguments. See [`Dispatcher::dispatch`].
    pub fn dispatch(&self, caller: &C, args: &[String]) -> Result<Outcome, InvocationError> {
        self.dispatcher().dispatch(caller, args)
    }

    /// Splits `line` on whitespace and dispatches it.
    pub fn dispatch_line(&self, caller: &C, line: &str) -> Result<Outcome, InvocationError> {
        self.dispatch(caller, &split_arguments(line))
    }

    /// Resolves completions for already split arguments. See [`CompletionResolver::resolve`].
    pub fn complete(&self, caller: &C, args: &[String]) -> Vec<String> {
        self.resolver().resolve(caller, args)
    }

    /// Splits `line` on whitespace and resolves completions for it.
    pub fn complete_line(&self, caller: &C, line: &str) -> Vec<String> {
        self.complete(caller, &split_arguments(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binding::{Completion, CompletionResult, Subcommand},
        caller::SimpleCaller,
        permission::WildcardGate,
    };

    struct Silent;

    impl<C> Hooks<C> for Silent {
        fn on_not_a_subcommand(&self, _caller: &C, _label: &str, _args: &[String]) {}

        fn on_no_permission(&self, _caller: &C, _label: &str, _args: &[String]) {}
    }

    struct Source;

    impl HandlerSource<SimpleCaller> for Source {
        fn subcommands(&self) -> Vec<Subcommand<SimpleCaller>> {
            vec![
                Subcommand::new("kick", |_, _, _| Ok(())).permission("mod.kick"),
                Subcommand::new("help", |_, _, _| Ok(())).alias("?"),
            ]
        }

        fn completions(&self) -> Vec<Completion<SimpleCaller>> {
            vec![Completion::new("kick", |_, _| -> CompletionResult {
                Ok(vec!["alice".to_owned(), "bob".to_owned()])
            })]
        }
    }

    #[test]
    fn register_source_attaches_both_phases() {
        let mut commander = Commander::new(Silent);
        commander.register_source(&Source).unwrap();

        assert_eq!(commander.registry().len(), 2);
        assert!(commander.registry().lookup("kick").unwrap().has_completion());
        assert!(commander.register_source(&Source).is_err());
    }

    #[test]
    fn line_helpers() {
        let mut commander = Commander::new(Silent);
        commander.register_source(&Source).unwrap();
        let op = SimpleCaller::operator();

        assert_eq!(commander.dispatch_line(&op, "? topic").unwrap(), Outcome::Executed);
        assert_eq!(commander.dispatch_line(&op, "").unwrap(), Outcome::NotASubcommand);
        assert_eq!(commander.complete_line(&op, "kick "), vec!["alice", "bob"]);
        assert_eq!(commander.complete_line(&op, "kick a"), vec!["alice"]);
        assert_eq!(commander.complete_line(&op, "k"), vec!["kick"]);
    }

    #[test]
    fn custom_gate() {
        let mut commander = Commander::with_gate(Silent, WildcardGate);
        commander.register_source(&Source).unwrap();

        let moderator = SimpleCaller::new().with_capability("mod.*");
        assert_eq!(commander.dispatch_line(&moderator, "kick bob").unwrap(), Outcome::Executed);
        assert_eq!(commander.complete_line(&moderator, ""), vec!["help", "kick"]);
    }

    #[test]
    fn settings_apply_to_empty_commander() {
        let mut commander =
            Commander::new(Silent).with_settings(Settings::default().strict_completion_targets(true));
        let missing = Completion::new("missing", |_: &SimpleCaller, _: &[String]| -> CompletionResult {
            Ok(Vec::new())
        });
        assert!(commander.registry_mut().attach_completion(missing).is_err());
    }

    #[test]
    fn settings_apply_after_registration() {
        let mut commander = Commander::new(Silent);
        commander.register_source(&Source).unwrap();

        let mut commander =
            commander.with_settings(Settings::default().strict_completion_targets(true));
        assert!(commander.registry().settings().strict_completion_targets);
        assert_eq!(commander.registry().len(), 2);

        let missing = Completion::new("missing", |_: &SimpleCaller, _: &[String]| -> CompletionResult {
            Ok(Vec::new())
        });
        assert_eq!(
            commander.registry_mut().attach_completion(missing),
            Err(RegistrationError::UnknownCompletionTarget {
                name: "missing".to_owned()
            })
        );
    }
}
