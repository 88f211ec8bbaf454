//! Keybinding struct representing a mapping from a chord to a command

use super::command::{CommandId, KeybindingWeight};
use super::expr::ContextKeyExpr;
use super::types::Keystroke;

/// A single chord → command mapping held by the [`Keymap`](super::Keymap)
#[derive(Debug, Clone, PartialEq)]
pub struct Keybinding {
    pub chord: Keystroke,
    pub command: CommandId,
    pub weight: KeybindingWeight,
    /// Precondition that must hold for this binding to activate
    pub when: Option<ContextKeyExpr>,
    /// Registration order, assigned by the keymap; never reused
    pub(crate) seq: u64,
}

impl Keybinding {
    pub fn new(chord: Keystroke, command: impl Into<CommandId>) -> Self {
        Self {
            chord,
            command: command.into(),
            weight: KeybindingWeight::default(),
            when: None,
            seq: 0,
        }
    }

    /// Add a precondition to this binding (builder pattern)
    pub fn when(mut self, when: ContextKeyExpr) -> Self {
        self.when = Some(when);
        self
    }

    pub fn weight(mut self, weight: KeybindingWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Registration sequence number
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Get display string for this keybinding
    pub fn display_string(&self) -> String {
        self.chord.display_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::types::{KeyCode, Modifiers};

    #[test]
    fn test_builder() {
        let stroke = Keystroke::new(KeyCode::Escape, Modifiers::NONE);
        let binding = Keybinding::new(stroke, "hide-find")
            .weight(KeybindingWeight::EDITOR_CONTRIB)
            .when(ContextKeyExpr::has("find-widget-visible"));

        assert_eq!(binding.command.as_str(), "hide-find");
        assert_eq!(binding.weight, KeybindingWeight::EDITOR_CONTRIB);
        assert!(binding.when.is_some());
        assert_eq!(binding.display_string(), stroke.display_string());
    }
}
