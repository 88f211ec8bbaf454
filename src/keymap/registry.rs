//! Command registry
//!
//! Owns every registered [`Command`] and the [`Keymap`] built from their
//! default keybindings. Registration and unregistration keep both in sync.

use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use super::binding::Keybinding;
use super::command::{Command, CommandId};
use super::context::ContextKeyStore;
use super::expr::ExprError;
use super::keymap::Keymap;
use super::types::Keystroke;

/// Programmer errors raised at registration time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command id already registered: {0}")]
    DuplicateCommandId(CommandId),
    #[error("invalid precondition for {id}: {source}")]
    InvalidPrecondition {
        id: CommandId,
        #[source]
        source: ExprError,
    },
}

/// Token returned by [`CommandRegistry::register`], used to unregister later
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistrationHandle {
    id: CommandId,
    generation: u64,
}

impl RegistrationHandle {
    pub fn id(&self) -> &CommandId {
        &self.id
    }
}

#[derive(Debug)]
struct Entry {
    command: Rc<Command>,
    generation: u64,
}

/// All registered commands, indexed by id and (through the keymap) by chord
#[derive(Debug)]
pub struct CommandRegistry {
    commands: HashMap<CommandId, Entry>,
    keymap: Keymap,
    /// Bumped on every registration; orders `commands()` and invalidates stale handles
    next_generation: u64,
    unique_ids: bool,
}

impl CommandRegistry {
    /// Create a registry. With `unique_ids` a duplicate id is rejected,
    /// otherwise the later registration replaces the earlier one.
    pub fn new(unique_ids: bool) -> Self {
        Self {
            commands: HashMap::new(),
            keymap: Keymap::new(),
            next_generation: 0,
            unique_ids,
        }
    }

    pub fn register(&mut self, command: Command) -> Result<RegistrationHandle, RegistryError> {
        if let Some(precondition) = &command.precondition {
            precondition
                .validate()
                .map_err(|source| RegistryError::InvalidPrecondition {
                    id: command.id.clone(),
                    source,
                })?;
        }

        if self.commands.contains_key(&command.id) {
            if self.unique_ids {
                return Err(RegistryError::DuplicateCommandId(command.id));
            }
            tracing::debug!(id = %command.id, "replacing previously registered command");
            self.remove(&command.id);
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        if let Some(spec) = command.keybinding {
            let mut binding = Keybinding::new(spec.chord, command.id.clone()).weight(spec.weight);
            if let Some(when) = &command.precondition {
                binding = binding.when(when.clone());
            }
            self.keymap.add_binding(binding);
        }

        tracing::debug!(
            id = %command.id,
            keybinding = ?command.keybinding.map(|k| k.chord.to_string()),
            "registered command"
        );

        let handle = RegistrationHandle {
            id: command.id.clone(),
            generation,
        };
        self.commands.insert(
            command.id.clone(),
            Entry {
                command: Rc::new(command),
                generation,
            },
        );
        Ok(handle)
    }

    /// Remove a command from every index. Stale handles are ignored.
    pub fn unregister(&mut self, handle: &RegistrationHandle) -> bool {
        match self.commands.get(&handle.id) {
            Some(entry) if entry.generation == handle.generation => {
                self.remove(&handle.id);
                tracing::debug!(id = %handle.id, "unregistered command");
                true
            }
            _ => false,
        }
    }

    fn remove(&mut self, id: &CommandId) {
        self.commands.remove(id);
        self.keymap.remove_command(id);
    }

    pub fn lookup_by_id(&self, id: &CommandId) -> Option<Rc<Command>> {
        self.commands.get(id).map(|entry| Rc::clone(&entry.command))
    }

    /// Every command in registration order
    pub fn commands(&self) -> Vec<Rc<Command>> {
        let mut entries: Vec<&Entry> = self.commands.values().collect();
        entries.sort_by_key(|entry| entry.generation);
        entries
            .into_iter()
            .map(|entry| Rc::clone(&entry.command))
            .collect()
    }

    /// Commands that declare a default keybinding, in registration order
    pub fn all_with_keybindings(&self) -> Vec<Rc<Command>> {
        self.commands()
            .into_iter()
            .filter(|command| command.keybinding.is_some())
            .collect()
    }

    /// Resolve a chord to the command that should run for the current context
    pub fn resolve(&self, chord: &Keystroke, store: &ContextKeyStore) -> Option<Rc<Command>> {
        let binding = self.keymap.resolve(chord, store)?;
        self.lookup_by_id(&binding.command)
    }

    /// Display string of a command's keybinding
    pub fn display_for(&self, id: &CommandId) -> Option<String> {
        self.keymap.display_for(id)
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}
