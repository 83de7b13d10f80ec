//! Registration behaviour which embedders may want to tighten.

/// Settings applied by a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Reject completion providers whose target matches no canonical subcommand name, instead of
    /// skipping them with a warning.
    pub strict_completion_targets: bool,
}

impl Settings {
    /// Sets [`strict_completion_targets`](Settings::strict_completion_targets).
    pub fn strict_completion_targets(mut self, strict: bool) -> Self {
        self.strict_completion_targets = strict;
        self
    }
}
