use thiserror::Error;

/// Error type returned by handlers and completion providers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Raised while registering subcommands or attaching completion providers.
///
/// These indicate a programming mistake in the embedding code and are meant to fail fast at
/// startup. An entry which triggers one of these errors is rejected as a whole: none of its keys
/// are inserted into the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The canonical name was empty.
    #[error("must specify a name for the subcommand")]
    EmptyName,

    /// A name or alias was empty or contained whitespace.
    #[error("subcommand key \"{key}\" must be non-empty and contain no whitespace")]
    MalformedKey {
        /// The offending name or alias.
        key: String,
    },

    /// A name or alias was already taken, possibly by the same entry.
    #[error("subcommand names and aliases must be unique: \"{key}\" is already registered by \"{existing}\"")]
    DuplicateKey {
        /// The repeated name or alias.
        key: String,
        /// Canonical name of the subcommand already holding the key.
        existing: String,
    },

    /// A completion provider named no subcommand.
    #[error("must specify a subcommand for the completion provider to attach to")]
    EmptyCompletionTarget,

    /// The target already had a completion provider.
    #[error("the subcommand \"{name}\" already has an attached completion provider")]
    DuplicateCompletion {
        /// Canonical name of the subcommand.
        name: String,
    },

    /// Only raised with [`Settings::strict_completion_targets`](crate::Settings::strict_completion_targets).
    #[error("no subcommand named \"{name}\" to attach a completion provider to")]
    UnknownCompletionTarget {
        /// The target as declared.
        name: String,
    },
}

/// Raised when a bound handler reports a failure during dispatch.
///
/// The dispatcher has already invoked the not-a-subcommand hook by the time this is returned.
#[derive(Error, Debug)]
#[error("could not invoke the \"{label}\" subcommand: {source}")]
pub struct InvocationError {
    /// The token the caller typed to reach the handler.
    pub label: String,
    /// What the handler reported.
    #[source]
    pub source: BoxError,
}

impl InvocationError {
    pub(crate) fn new(label: impl Into<String>, source: BoxError) -> Self {
        InvocationError {
            label: label.into(),
            source,
        }
    }
}
