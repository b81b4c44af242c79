use std::collections::HashMap;
use std::sync::Arc;

use dronevox_voiceprint::VoiceprintStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::action::{ActionCatalog, ActionToken};
use crate::FlightError;

/// Where the action of a binding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingSource {
    /// Supplied by the caller.
    Explicit,
    /// Looked up in the catalog's phrase table.
    Default,
}

/// A trained voice command bound to one directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBinding {
    pub command: String,
    pub action: ActionToken,
    pub source: BindingSource,
}

/// Session state mapping trained voice commands to directives.
///
/// At most one binding exists per command; binding again replaces it.
/// Bindings live in memory; [`CommandBinder::bindings`] and
/// [`CommandBinder::restore`] let an application persist them.
#[derive(Debug, Clone)]
pub struct CommandBinder {
    catalog: Arc<ActionCatalog>,
    bindings: HashMap<String, CommandBinding>,
}

impl CommandBinder {
    pub fn new(catalog: Arc<ActionCatalog>) -> Self {
        Self {
            catalog,
            bindings: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Binds the trained command `command` to `explicit`, or to its default
    /// phrase mapping when no action is given.
    pub fn bind(
        &mut self,
        store: &VoiceprintStore,
        command: &str,
        explicit: Option<&str>,
    ) -> Result<CommandBinding, FlightError> {
        let command = command.trim();
        if !store.contains(command) {
            return Err(FlightError::UnknownCommand {
                name: command.to_string(),
            });
        }

        let (action, source) = match explicit {
            Some(token) => (self.catalog.parse(token)?, BindingSource::Explicit),
            None => {
                let action = self.catalog.default_action(command).ok_or_else(|| {
                    FlightError::AmbiguousBinding {
                        name: command.to_string(),
                    }
                })?;
                (action, BindingSource::Default)
            }
        };

        let binding = CommandBinding {
            command: command.to_string(),
            action,
            source,
        };
        if let Some(prev) = self.bindings.insert(command.to_string(), binding.clone()) {
            if prev.action != action {
                info!(command, from = %prev.action, to = %action, "flight: binding replaced");
            }
        } else {
            info!(command, %action, ?source, "flight: command bound");
        }
        Ok(binding)
    }

    /// Returns the directive bound to `command`.
    pub fn resolve(&self, command: &str) -> Result<ActionToken, FlightError> {
        let command = command.trim();
        self.bindings
            .get(command)
            .map(|b| b.action)
            .ok_or_else(|| FlightError::NotBound {
                name: command.to_string(),
            })
    }

    /// Removes the binding of `command`, returning it if there was one.
    pub fn unbind(&mut self, command: &str) -> Option<CommandBinding> {
        self.bindings.remove(command.trim())
    }

    /// Returns all bindings sorted by command name.
    pub fn bindings(&self) -> Vec<CommandBinding> {
        let mut out: Vec<CommandBinding> = self.bindings.values().cloned().collect();
        out.sort_by(|a, b| a.command.cmp(&b.command));
        out
    }

    /// Reinstates previously saved bindings. Bindings of commands that are no
    /// longer trained are dropped. Returns how many were restored.
    pub fn restore(
        &mut self,
        store: &VoiceprintStore,
        saved: impl IntoIterator<Item = CommandBinding>,
    ) -> usize {
        let mut restored = 0;
        for binding in saved {
            if !store.contains(&binding.command) {
                warn!(command = %binding.command, "flight: dropping binding of untrained command");
                continue;
            }
            self.bindings.insert(binding.command.clone(), binding);
            restored += 1;
        }
        restored
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use dronevox_voiceprint::{FrameStatsExtractor, StoreConfig};

    use super::*;

    fn store_with(names: &[&str]) -> VoiceprintStore {
        let store = VoiceprintStore::in_memory(
            StoreConfig::default(),
            Arc::new(FrameStatsExtractor::new(2)),
        );
        for name in names {
            store
                .train_features(name, vec![vec![0.5, 0.5]; 4], &[])
                .unwrap();
        }
        store
    }

    fn binder() -> CommandBinder {
        CommandBinder::new(Arc::new(ActionCatalog::new()))
    }

    #[test]
    fn bind_untrained_command_fails() {
        let store = store_with(&[]);
        let err = binder().bind(&store, "взлет", None).unwrap_err();
        assert!(matches!(err, FlightError::UnknownCommand { name } if name == "взлет"));
    }

    #[test]
    fn bind_uses_default_mapping() {
        let store = store_with(&["взлет"]);
        let mut b = binder();
        let binding = b.bind(&store, "взлет", None).unwrap();
        assert_eq!(binding.action, ActionToken::Takeoff);
        assert_eq!(binding.source, BindingSource::Default);
        assert_eq!(b.resolve("взлет").unwrap(), ActionToken::Takeoff);
    }

    #[test]
    fn bind_without_default_is_ambiguous() {
        // Phrase table without an entry for "takeoff".
        let catalog = ActionCatalog::with_phrases([("взлет", ActionToken::Takeoff)]);
        let store = store_with(&["takeoff"]);
        let mut b = CommandBinder::new(Arc::new(catalog));
        let err = b.bind(&store, "takeoff", None).unwrap_err();
        assert!(matches!(err, FlightError::AmbiguousBinding { name } if name == "takeoff"));
        assert!(b.is_empty());
    }

    #[test]
    fn default_catalog_rejects_unmapped_phrase() {
        let store = store_with(&["patrol"]);
        let mut b = binder();
        let err = b.bind(&store, "patrol", None).unwrap_err();
        assert!(matches!(err, FlightError::AmbiguousBinding { name } if name == "patrol"));
    }

    #[test]
    fn padded_names_reach_the_trained_command() {
        let store = store_with(&[" вниз "]);
        let mut b = binder();
        let binding = b.bind(&store, " вниз", None).unwrap();
        assert_eq!(binding.command, "вниз");
        assert_eq!(b.resolve("вниз ").unwrap(), ActionToken::Down);
        assert!(b.unbind(" вниз ").is_some());
    }

    #[test]
    fn bind_explicit_action() {
        let store = store_with(&["go"]);
        let mut b = binder();
        let binding = b.bind(&store, "go", Some("forward")).unwrap();
        assert_eq!(binding.action, ActionToken::Forward);
        assert_eq!(binding.source, BindingSource::Explicit);
    }

    #[test]
    fn bind_unsupported_action_fails() {
        let store = store_with(&["go"]);
        let mut b = binder();
        let err = b.bind(&store, "go", Some("WARP")).unwrap_err();
        assert!(matches!(err, FlightError::UnsupportedAction { token } if token == "WARP"));
        assert!(matches!(b.resolve("go"), Err(FlightError::NotBound { .. })));
    }

    #[test]
    fn rebind_replaces() {
        let store = store_with(&["стоп"]);
        let mut b = binder();
        b.bind(&store, "стоп", None).unwrap();
        b.bind(&store, "стоп", Some("HOVER")).unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b.resolve("стоп").unwrap(), ActionToken::Hover);
    }

    #[test]
    fn resolve_unbound_fails() {
        let err = binder().resolve("вниз").unwrap_err();
        assert!(matches!(err, FlightError::NotBound { name } if name == "вниз"));
    }

    #[test]
    fn unbind_removes() {
        let store = store_with(&["вниз"]);
        let mut b = binder();
        b.bind(&store, "вниз", None).unwrap();
        assert_eq!(b.unbind("вниз").map(|x| x.action), Some(ActionToken::Down));
        assert!(b.unbind("вниз").is_none());
    }

    #[test]
    fn restore_skips_untrained_commands() {
        let store = store_with(&["вверх"]);
        let mut b = binder();
        let saved = vec![
            CommandBinding {
                command: "вверх".into(),
                action: ActionToken::Up,
                source: BindingSource::Default,
            },
            CommandBinding {
                command: "gone".into(),
                action: ActionToken::Land,
                source: BindingSource::Explicit,
            },
        ];
        assert_eq!(b.restore(&store, saved), 1);
        assert_eq!(b.resolve("вверх").unwrap(), ActionToken::Up);
        assert!(b.resolve("gone").is_err());
    }
}
