use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
};

use crate::error::BoxError;

/// Result returned by a subcommand handler.
pub type HandlerResult = Result<(), BoxError>;

/// Result returned by a completion provider.
pub type CompletionResult = Result<Vec<String>, BoxError>;

/// A subcommand handler: `(caller, label, args)`.
///
/// `label` is the literal token the caller typed (the canonical name or one of the aliases) and
/// `args` are the tokens following it.
pub type Handler<C> = Box<dyn Fn(&C, &str, &[String]) -> HandlerResult>;

/// A completion provider: `(caller, args)`, where `args` excludes the subcommand label.
pub type CompletionProvider<C> = Box<dyn Fn(&C, &[String]) -> CompletionResult>;

/// Stable handle to a [`Binding`] stored in a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub(crate) usize);

impl BindingId {
    /// The position of the binding in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A registered subcommand.
///
/// Everything except the completion provider is fixed once the binding is registered. The provider
/// slot is filled at most once, after the fact, by the registry.
pub struct Binding<C> {
    name: String,
    aliases: Vec<String>,
    permission: String,
    handler: Handler<C>,
    completion: Option<CompletionProvider<C>>,
}

impl<C> Binding<C> {
    pub(crate) fn new(entry: Subcommand<C>) -> Self {
        Binding {
            name: entry.name,
            aliases: entry.aliases,
            permission: entry.permission,
            handler: entry.handler,
            completion: None,
        }
    }

    /// The canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Additional keys resolving to this binding, in declaration order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The permission required to use this subcommand. Empty means unrestricted.
    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// Whether a completion provider was attached.
    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Iterates over the canonical name followed by every alias.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Runs the handler. A panic is reported as an error like any other failure.
    pub(crate) fn invoke(&self, caller: &C, label: &str, args: &[String]) -> HandlerResult {
        panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(caller, label, args)))
            .unwrap_or_else(|payload| Err(panicked(payload)))
    }

    /// Runs the completion provider, if any. A panic is reported as an error.
    pub(crate) fn complete(&self, caller: &C, args: &[String]) -> Option<CompletionResult> {
        self.completion.as_ref().map(|provider| {
            panic::catch_unwind(AssertUnwindSafe(|| provider(caller, args)))
                .unwrap_or_else(|payload| Err(panicked(payload)))
        })
    }

    pub(crate) fn set_completion(&mut self, provider: CompletionProvider<C>) {
        self.completion = Some(provider);
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> BoxError {
    let message = match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_owned(),
            Err(_) => "unknown panic payload".to_owned(),
        },
    };

    format!("panicked: {}", message).into()
}

impl<C> fmt::Debug for Binding<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("permission", &self.permission)
            .field("has_completion", &self.has_completion())
            .finish()
    }
}

/// Declaration of a subcommand, consumed by [`Registry::register_subcommand`](crate::Registry::register_subcommand).
pub struct Subcommand<C> {
    name: String,
    aliases: Vec<String>,
    permission: String,
    handler: Handler<C>,
}

impl<C> Subcommand<C> {
    /// Declares a subcommand with no aliases and no permission requirement.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&C, &str, &[String]) -> HandlerResult + 'static,
    {
        Subcommand {
            name: name.into(),
            aliases: Vec::new(),
            permission: String::new(),
            handler: Box::new(handler),
        }
    }

    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds several aliases.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Sets the permission required to use the subcommand.
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = permission.into();
        self
    }

    /// The canonical name being declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl<C> fmt::Debug for Subcommand<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subcommand")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("permission", &self.permission)
            .finish()
    }
}

/// Declaration of a completion provider for the subcommand with the given canonical name.
pub struct Completion<C> {
    target: String,
    provider: CompletionProvider<C>,
}

impl<C> Completion<C> {
    /// Declares a completion provider. The target is matched case-insensitively against canonical
    /// names only, never against aliases.
    pub fn new<F>(target: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&C, &[String]) -> CompletionResult + 'static,
    {
        Completion {
            target: target.into(),
            provider: Box::new(provider),
        }
    }

    /// The canonical name this provider attaches to.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub(crate) fn into_provider(self) -> CompletionProvider<C> {
        self.provider
    }
}

impl<C> fmt::Debug for Completion<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("target", &self.target)
            .finish()
    }
}

/// A type declaring subcommands and completion providers.
///
/// This is usually implemented with the [`handler_source`](crate::handler_source) attribute, but
/// can be written by hand.
pub trait HandlerSource<C> {
    /// The subcommands declared by this source.
    fn subcommands(&self) -> Vec<Subcommand<C>>;

    /// The completion providers declared by this source.
    fn completions(&self) -> Vec<Completion<C>> {
        Vec::new()
    }
}
