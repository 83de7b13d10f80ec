use std::collections::HashSet;

/// The identity issuing a command, as seen by permission checks.
pub trait Caller {
    /// Whether this caller is an operator. Operators pass every permission check.
    fn is_privileged(&self) -> bool;

    /// Whether this caller was explicitly granted the given capability.
    fn has_capability(&self, name: &str) -> bool;
}

impl<T: Caller + ?Sized> Caller for &T {
    fn is_privileged(&self) -> bool {
        (**self).is_privileged()
    }

    fn has_capability(&self, name: &str) -> bool {
        (**self).has_capability(name)
    }
}

/// A caller described by an operator flag and a flat set of capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleCaller {
    privileged: bool,
    capabilities: HashSet<String>,
}

impl SimpleCaller {
    /// Creates an unprivileged caller with no capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an operator.
    pub fn operator() -> Self {
        SimpleCaller {
            privileged: true,
            capabilities: HashSet::new(),
        }
    }

    /// Grants a capability to this caller.
    pub fn with_capability(mut self, name: impl Into<String>) -> Self {
        self.capabilities.insert(name.into());
        self
    }

    /// Iterates over the capabilities granted to this caller.
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        self.capabilities.iter().map(String::as_str)
    }
}

impl Caller for SimpleCaller {
    fn is_privileged(&self) -> bool {
        self.privileged
    }

    fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_are_exact() {
        let caller = SimpleCaller::new().with_capability("command.admin");
        assert!(caller.has_capability("command.admin"));
        assert!(!caller.has_capability("command"));
        assert!(!caller.is_privileged());
    }

    fn privileged<C: Caller>(caller: C) -> bool {
        caller.is_privileged()
    }

    #[test]
    fn references_forward() {
        let op = SimpleCaller::operator();
        let by_ref: &dyn Caller = &op;
        assert!(privileged(&op));
        assert!(privileged(by_ref));
        assert!(!privileged(&SimpleCaller::new()));
    }
}
