//! Permission checks applied before dispatch and when listing subcommands.

use crate::caller::Caller;

/// Decides whether a caller may use a subcommand guarded by a permission string.
///
/// Implement [`grants`](PermissionGate::grants) to plug in a richer policy. The empty
/// permission is handled by [`allows`](PermissionGate::allows) and never reaches `grants`.
pub trait PermissionGate<C> {
    /// Evaluates a non-empty permission for the given caller.
    fn grants(&self, caller: &C, permission: &str) -> bool;

    /// Returns whether `caller` may use a subcommand requiring `permission`.
    fn allows(&self, caller: &C, permission: &str) -> bool {
        permission.is_empty() || self.grants(caller, permission)
    }
}

impl<C, F> PermissionGate<C> for F
where
    F: Fn(&C, &str) -> bool,
{
    fn grants(&self, caller: &C, permission: &str) -> bool {
        self(caller, permission)
    }
}

/// Operators pass every check, everyone else needs the exact capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorGate;

impl<C: Caller> PermissionGate<C> for OperatorGate {
    fn grants(&self, caller: &C, permission: &str) -> bool {
        caller.is_privileged() || caller.has_capability(permission)
    }
}

/// Like [`OperatorGate`], but a capability ending in `.*` also grants every permission nested
/// under that prefix, and `*` grants everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct WildcardGate;

impl<C: Caller> PermissionGate<C> for WildcardGate {
    fn grants(&self, caller: &C, permission: &str) -> bool {
        if OperatorGate.grants(caller, permission) || caller.has_capability("*") {
            return true;
        }

        // Walk "a.b.c" -> "a.b.*" -> "a.*"
        let mut scope = permission;
        while let Some(index) = scope.rfind('.') {
            scope = &scope[.. index];
            if caller.has_capability(&format!("{}.*", scope)) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::SimpleCaller;

    #[test]
    fn empty_permission_always_allowed() {
        let nobody = SimpleCaller::new();
        assert!(OperatorGate.allows(&nobody, ""));
        assert!(WildcardGate.allows(&nobody, ""));

        let deny_all = |_: &SimpleCaller, _: &str| false;
        assert!(deny_all.allows(&nobody, ""));
        assert!(!deny_all.allows(&nobody, "anything"));
    }

    #[test]
    fn operator_gate() {
        let nobody = SimpleCaller::new();
        let admin = SimpleCaller::new().with_capability("command.admin");
        let op = SimpleCaller::operator();

        assert!(!OperatorGate.allows(&nobody, "command.admin"));
        assert!(OperatorGate.allows(&admin, "command.admin"));
        assert!(!OperatorGate.allows(&admin, "command.other"));
        assert!(OperatorGate.allows(&op, "command.other"));
    }

    #[test]
    fn wildcard_gate() {
        let scoped = SimpleCaller::new().with_capability("command.*");
        assert!(WildcardGate.allows(&scoped, "command.admin"));
        assert!(WildcardGate.allows(&scoped, "command.admin.kick"));
        assert!(!WildcardGate.allows(&scoped, "command"));
        assert!(!WildcardGate.allows(&scoped, "other.admin"));
        assert!(!OperatorGate.allows(&scoped, "command.admin"));

        let all = SimpleCaller::new().with_capability("*");
        assert!(WildcardGate.allows(&all, "anything.at.all"));
    }
}
