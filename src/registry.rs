use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::{
    binding::{Binding, BindingId, Completion, HandlerSource, Subcommand},
    config::Settings,
    error::RegistrationError,
    permission::PermissionGate,
};

lazy_static! {
    // A key must survive whitespace tokenization intact to ever be typed.
    static ref KEY: Regex = Regex::new(r"^\S+$").unwrap();
}

/// Lookup table from subcommand names and aliases to their bindings.
///
/// Bindings are stored in registration order and addressed by [`BindingId`]; every key maps to
/// exactly one id. The registry is meant to be filled once before serving commands. It performs no
/// internal synchronization, so an embedding which serves commands from several threads must guard
/// it externally.
pub struct Registry<C> {
    bindings: Vec<Binding<C>>,
    keys: HashMap<String, BindingId>,
    settings: Settings,
}

impl<C> Registry<C> {
    /// Creates an empty registry with default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Creates an empty registry with the given settings.
    pub fn with_settings(settings: Settings) -> Self {
        Registry {
            bindings: Vec::new(),
            keys: HashMap::new(),
            settings,
        }
    }

    /// The settings in effect.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings. Bindings already registered are kept as they are.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Registers every subcommand declared by `source`.
    ///
    /// Entries are registered in declaration order. If one is rejected, the entries before it stay
    /// registered and the rejected entry leaves no keys behind.
    pub fn register<S>(&mut self, source: &S) -> Result<(), RegistrationError>
    where
        S: HandlerSource<C> + ?Sized,
    {
        let entries = source.subcommands();
        let count = entries.len();
        for entry in entries {
            self.register_subcommand(entry)?;
        }

        info!(count, "Registered subcommands");
        Ok(())
    }

    /// Registers a single subcommand under its name and every alias.
    pub fn register_subcommand(&mut self, entry: Subcommand<C>) -> Result<BindingId, RegistrationError> {
        self.validate(&entry)?;

        let id = BindingId(self.bindings.len());
        let binding = Binding::new(entry);
        for key in binding.keys() {
            debug!(key, name = binding.name(), "Registering subcommand key");
            self.keys.insert(key.to_owned(), id);
        }
        self.bindings.push(binding);

        Ok(id)
    }

    fn validate(&self, entry: &Subcommand<C>) -> Result<(), RegistrationError> {
        if entry.name().is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        let mut seen: Vec<&str> = Vec::new();
        for key in entry.keys() {
            if !KEY.is_match(key) {
                return Err(RegistrationError::MalformedKey {
                    key: key.to_owned(),
                });
            }

            if let Some(&id) = self.keys.get(key) {
                return Err(RegistrationError::DuplicateKey {
                    key: key.to_owned(),
                    existing: self.bindings[id.0].name().to_owned(),
                });
            }

            // The entry itself may repeat a key
            if seen.contains(&key) {
                return Err(RegistrationError::DuplicateKey {
                    key: key.to_owned(),
                    existing: entry.name().to_owned(),
                });
            }
            seen.push(key);
        }

        Ok(())
    }

    /// Attaches every completion provider declared by `source`.
    pub fn attach_completions<S>(&mut self, source: &S) -> Result<(), RegistrationError>
    where
        S: HandlerSource<C> + ?Sized,
    {
        for entry in source.completions() {
            self.attach_completion(entry)?;
        }

        Ok(())
    }

    /// Attaches a completion provider to the first binding whose canonical name matches the target,
    /// ignoring case. Aliases are never matched.
    ///
    /// Returns `Ok(false)` if no binding matched and strict completion targets are disabled.
    pub fn attach_completion(&mut self, entry: Completion<C>) -> Result<bool, RegistrationError> {
        if entry.target().is_empty() {
            return Err(RegistrationError::EmptyCompletionTarget);
        }

        let target = entry.target();
        let folded = fold_case(target);
        let binding = match self
            .bindings
            .iter_mut()
            .find(|binding| fold_case(binding.name()) == folded)
        {
            Some(binding) => binding,
            None if self.settings.strict_completion_targets =>
                return Err(RegistrationError::UnknownCompletionTarget {
                    name: target.to_owned(),
                }),
            None => {
                warn!(name = target, "No subcommand to attach completion provider to, skipping");
                return Ok(false);
            }
        };

        if binding.has_completion() {
            return Err(RegistrationError::DuplicateCompletion {
                name: binding.name().to_owned(),
            });
        }

        debug!(name = binding.name(), "Attaching completion provider");
        binding.set_completion(entry.into_provider());
        Ok(true)
    }

    /// Looks up a binding by exact, case-sensitive key.
    pub fn lookup(&self, key: &str) -> Option<&Binding<C>> {
        self.keys.get(key).map(|&id| &self.bindings[id.0])
    }

    /// Returns the id of the binding registered under `key`.
    pub fn id_of(&self, key: &str) -> Option<BindingId> {
        self.keys.get(key).copied()
    }

    /// Returns the binding with the given id.
    pub fn get(&self, id: BindingId) -> Option<&Binding<C>> {
        self.bindings.get(id.0)
    }

    /// Whether `key` is registered as a name or alias.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// The number of distinct bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over every registered key, names and aliases alike, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Iterates over the bindings in registration order.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding<C>> {
        self.bindings.iter()
    }

    /// Lists the canonical names the caller may use, sorted. Aliases are excluded.
    pub fn list_top_level<G>(&self, caller: &C, gate: &G) -> Vec<String>
    where
        G: PermissionGate<C> + ?Sized,
    {
        let mut names = self
            .keys
            .iter()
            .filter_map(|(key, &id)| {
                let binding = &self.bindings[id.0];
                (binding.name() == key && gate.allows(caller, binding.permission()))
                    .then(|| key.clone())
            })
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

// Full Unicode lowercasing, so "ÄRGER" and "ärger" name the same subcommand.
fn fold_case(name: &str) -> String {
    name.chars().flat_map(char::to_lowercase).collect()
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binding::CompletionResult,
        caller::SimpleCaller,
        permission::OperatorGate,
    };

    type Reg = Registry<SimpleCaller>;

    fn entry(name: &str) -> Subcommand<SimpleCaller> {
        Subcommand::new(name, |_, _, _| Ok(()))
    }

    fn provider(target: &str) -> Completion<SimpleCaller> {
        Completion::new(target, |_, _| -> CompletionResult { Ok(vec!["x".to_owned()]) })
    }

    #[test]
    fn registers_name_and_aliases() {
        let mut reg = Reg::new();
        let id = reg
            .register_subcommand(entry("internal").aliases(["i", "int"]))
            .unwrap();

        for key in ["internal", "i", "int"] {
            assert_eq!(reg.id_of(key), Some(id));
            assert_eq!(reg.lookup(key).unwrap().name(), "internal");
        }
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.keys().count(), 3);
        assert!(reg.lookup("Internal").is_none());
    }

    #[test]
    fn every_key_maps_to_its_owner() {
        let mut reg = Reg::new();
        reg.register_subcommand(entry("internal").aliases(["i", "int"]))
            .unwrap();
        reg.register_subcommand(entry("external").aliases(["e", "ext"]))
            .unwrap();

        for key in reg.keys() {
            let binding = reg.lookup(key).unwrap();
            assert!(binding.keys().any(|k| k == key));
        }
    }

    #[test]
    fn rejects_empty_and_malformed() {
        let mut reg = Reg::new();
        assert_eq!(
            reg.register_subcommand(entry("")).unwrap_err(),
            RegistrationError::EmptyName
        );
        assert!(matches!(
            reg.register_subcommand(entry("two words")),
            Err(RegistrationError::MalformedKey { .. })
        ));
        assert!(matches!(
            reg.register_subcommand(entry("ok").alias("")),
            Err(RegistrationError::MalformedKey { key }) if key.is_empty()
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn duplicate_key_leaves_registry_unchanged() {
        let mut reg = Reg::new();
        reg.register_subcommand(entry("internal").alias("i")).unwrap();

        let err = reg
            .register_subcommand(entry("other").aliases(["o", "i"]))
            .unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateKey {
            key: "i".to_owned(),
            existing: "internal".to_owned(),
        });
        assert!(!reg.contains("other"));
        assert!(!reg.contains("o"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_key_within_entry() {
        let mut reg = Reg::new();
        assert!(matches!(
            reg.register_subcommand(entry("same").alias("same")),
            Err(RegistrationError::DuplicateKey { .. })
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn completion_targets_canonical_names_only() {
        let mut reg = Reg::new();
        reg.register_subcommand(entry("internal").alias("i")).unwrap();

        assert_eq!(reg.attach_completion(provider("i")), Ok(false));
        assert!(!reg.lookup("internal").unwrap().has_completion());

        assert_eq!(reg.attach_completion(provider("INTERNAL")), Ok(true));
        assert!(reg.lookup("i").unwrap().has_completion());
    }

    #[test]
    fn completion_target_folds_unicode_case() {
        let mut reg = Reg::new();
        reg.register_subcommand(entry("ärger")).unwrap();
        reg.register_subcommand(entry("straße")).unwrap();

        assert_eq!(reg.attach_completion(provider("ÄRGER")), Ok(true));
        assert!(reg.lookup("ärger").unwrap().has_completion());
        assert_eq!(reg.attach_completion(provider("STRAßE")), Ok(true));
        assert!(reg.lookup("straße").unwrap().has_completion());
    }

    #[test]
    fn duplicate_completion_rejected() {
        let mut reg = Reg::new();
        reg.register_subcommand(entry("internal")).unwrap();
        reg.attach_completion(provider("internal")).unwrap();

        assert_eq!(
            reg.attach_completion(provider("internal")),
            Err(RegistrationError::DuplicateCompletion {
                name: "internal".to_owned()
            })
        );
        assert_eq!(
            reg.attach_completion(provider("")),
            Err(RegistrationError::EmptyCompletionTarget)
        );
    }

    #[test]
    fn strict_completion_targets() {
        let mut reg = Reg::with_settings(Settings::default().strict_completion_targets(true));
        assert_eq!(
            reg.attach_completion(provider("missing")),
            Err(RegistrationError::UnknownCompletionTarget {
                name: "missing".to_owned()
            })
        );
    }

    #[test]
    fn top_level_listing() {
        let mut reg = Reg::new();
        reg.register_subcommand(entry("internal").alias("i").permission("command.admin"))
            .unwrap();
        reg.register_subcommand(entry("external").alias("e")).unwrap();

        assert_eq!(
            reg.list_top_level(&SimpleCaller::new(), &OperatorGate),
            vec!["external"]
        );
        assert_eq!(
            reg.list_top_level(&SimpleCaller::operator(), &OperatorGate),
            vec!["external", "internal"]
        );
    }
}
