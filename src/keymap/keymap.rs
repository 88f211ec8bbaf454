//! Keymap struct for storing and resolving keybindings

use std::cmp::Reverse;
use std::collections::HashMap;

use super::binding::Keybinding;
use super::command::CommandId;
use super::context::ContextKeyStore;
use super::types::Keystroke;

/// The keymap stores all keybindings and resolves chords against context
///
/// Resolution order for one chord:
/// 1. bindings whose precondition is false are discarded
/// 2. the highest weight wins
/// 3. equal weights fall back to registration order, earliest first
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    /// Bindings per chord, each list in registration order
    by_chord: HashMap<Keystroke, Vec<Keybinding>>,
    next_seq: u64,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a keymap with the given bindings, registered in order
    pub fn with_bindings(bindings: impl IntoIterator<Item = Keybinding>) -> Self {
        let mut keymap = Self::new();
        for binding in bindings {
            keymap.add_binding(binding);
        }
        keymap
    }

    /// Add a binding, returning its registration sequence number
    pub fn add_binding(&mut self, mut binding: Keybinding) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        binding.seq = seq;
        self.by_chord.entry(binding.chord).or_default().push(binding);
        seq
    }

    /// Remove every binding that targets `command`, returning how many were removed
    pub fn remove_command(&mut self, command: &CommandId) -> usize {
        let mut removed = 0;
        self.by_chord.retain(|_, bindings| {
            let before = bindings.len();
            bindings.retain(|b| &b.command != command);
            removed += before - bindings.len();
            !bindings.is_empty()
        });
        removed
    }

    /// Resolve a chord to the winning binding, if any
    pub fn resolve(&self, chord: &Keystroke, store: &ContextKeyStore) -> Option<&Keybinding> {
        let candidates = self.resolve_all(chord, store);
        let winner = candidates.first().copied()?;

        let tied = candidates
            .iter()
            .skip(1)
            .take_while(|b| b.weight == winner.weight)
            .count();
        if tied > 0 {
            tracing::debug!(
                chord = %chord,
                winner = %winner.command,
                tied,
                "ambiguous keybinding resolved by registration order"
            );
        }

        Some(winner)
    }

    /// All bindings for a chord whose preconditions hold, in precedence order
    pub fn resolve_all(&self, chord: &Keystroke, store: &ContextKeyStore) -> Vec<&Keybinding> {
        let Some(bindings) = self.by_chord.get(chord) else {
            return Vec::new();
        };

        let mut matching: Vec<&Keybinding> = bindings
            .iter()
            .filter(|b| b.when.as_ref().map_or(true, |when| when.evaluate(store)))
            .collect();
        matching.sort_by_key(|b| (Reverse(b.weight), b.seq));
        matching
    }

    /// Bindings registered for a chord, regardless of context
    pub fn bindings_for(&self, chord: &Keystroke) -> &[Keybinding] {
        self.by_chord.get(chord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get the keybinding for a command (earliest registered)
    pub fn binding_for(&self, command: &CommandId) -> Option<&Keybinding> {
        self.by_chord
            .values()
            .flatten()
            .filter(|b| &b.command == command)
            .min_by_key(|b| b.seq)
    }

    /// Get display string for a command's keybinding
    pub fn display_for(&self, command: &CommandId) -> Option<String> {
        self.binding_for(command).map(|b| b.display_string())
    }

    pub fn len(&self) -> usize {
        self.by_chord.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_chord.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::command::KeybindingWeight;
    use crate::keymap::expr::ContextKeyExpr;
    use crate::keymap::types::{KeyCode, Modifiers};

    fn enter() -> Keystroke {
        Keystroke::key(KeyCode::Enter)
    }

    fn ctrl_f() -> Keystroke {
        Keystroke::new(KeyCode::Char('f'), Modifiers::CTRL)
    }

    #[test]
    fn test_no_bindings_for_chord() {
        let keymap = Keymap::with_bindings([Keybinding::new(ctrl_f(), "find")]);
        assert!(keymap.resolve(&enter(), &ContextKeyStore::new()).is_none());
    }

    #[test]
    fn test_unconditional_binding_resolves() {
        let keymap = Keymap::with_bindings([Keybinding::new(ctrl_f(), "find")]);
        let binding = keymap.resolve(&ctrl_f(), &ContextKeyStore::new()).unwrap();
        assert_eq!(binding.command.as_str(), "find");
    }

    #[test]
    fn test_modifiers_must_match_exactly() {
        let keymap = Keymap::with_bindings([Keybinding::new(enter(), "find-next")]);
        let shift_enter = Keystroke::new(KeyCode::Enter, Modifiers::SHIFT);
        assert!(keymap.resolve(&shift_enter, &ContextKeyStore::new()).is_none());
    }

    #[test]
    fn test_false_precondition_discards_binding() {
        let keymap = Keymap::with_bindings([
            Keybinding::new(enter(), "find-next").when(ContextKeyExpr::has("find-widget-focused"))
        ]);
        assert!(keymap.resolve(&enter(), &ContextKeyStore::new()).is_none());
    }

    #[test]
    fn test_higher_weight_wins() {
        let keymap = Keymap::with_bindings([
            Keybinding::new(enter(), "newline").weight(KeybindingWeight::EDITOR_CORE),
            Keybinding::new(enter(), "find-next").weight(KeybindingWeight::EDITOR_CONTRIB),
        ]);
        let binding = keymap.resolve(&enter(), &ContextKeyStore::new()).unwrap();
        assert_eq!(binding.command.as_str(), "find-next");
    }

    #[test]
    fn test_equal_weight_earliest_registration_wins() {
        let keymap = Keymap::with_bindings([
            Keybinding::new(enter(), "first"),
            Keybinding::new(enter(), "second"),
        ]);
        let store = ContextKeyStore::new();
        for _ in 0..10 {
            assert_eq!(
                keymap.resolve(&enter(), &store).unwrap().command.as_str(),
                "first"
            );
        }
        let order: Vec<_> = keymap
            .resolve_all(&enter(), &store)
            .iter()
            .map(|b| b.command.as_str())
            .collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[test]
    fn test_remove_command_keeps_order_of_others() {
        let mut keymap = Keymap::with_bindings([
            Keybinding::new(enter(), "a"),
            Keybinding::new(enter(), "b"),
            Keybinding::new(ctrl_f(), "a"),
        ]);
        assert_eq!(keymap.remove_command(&CommandId::from("a")), 2);
        assert_eq!(keymap.len(), 1);
        assert!(keymap.bindings_for(&ctrl_f()).is_empty());

        // New bindings never reuse an old sequence number
        keymap.add_binding(Keybinding::new(enter(), "c"));
        let store = ContextKeyStore::new();
        assert_eq!(keymap.resolve(&enter(), &store).unwrap().command.as_str(), "b");
    }

    #[test]
    fn test_display_for_command() {
        let keymap = Keymap::with_bindings([Keybinding::new(ctrl_f(), "find")]);
        let display = keymap.display_for(&CommandId::from("find")).unwrap();
        assert!(display.contains('F'));
        assert!(keymap.display_for(&CommandId::from("other")).is_none());
    }
}
