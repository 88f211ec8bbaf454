//! Chord types: Keystroke, Modifiers, KeyCode
//!
//! A keystroke arrives here already normalized from the platform event, so a
//! chord is just a key code plus a modifier set and matching is structural.

use std::fmt;

use serde::Serialize;

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & Self::CTRL.0 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & Self::SHIFT.0 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & Self::ALT.0 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & Self::META.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// The platform "command" modifier: Cmd on macOS, Ctrl elsewhere
    pub const fn cmd() -> Modifiers {
        if cfg!(target_os = "macos") {
            Modifiers::META
        } else {
            Modifiers::CTRL
        }
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("Ctrl");
        }
        if self.shift() {
            parts.push("Shift");
        }
        if self.alt() {
            parts.push(if cfg!(target_os = "macos") {
                "Option"
            } else {
                "Alt"
            });
        }
        if self.meta() {
            parts.push(if cfg!(target_os = "macos") {
                "Cmd"
            } else {
                "Win"
            });
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A logical key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key (normalized to lowercase)
    Char(char),

    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,

    Up,
    Down,
    Left,
    Right,

    Home,
    End,
    PageUp,
    PageDown,

    F(u8), // F1-F24
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{}", c.to_uppercase()),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Escape => write!(f, "Escape"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::Backspace => write!(f, "Backspace"),
            KeyCode::Delete => write!(f, "Delete"),
            KeyCode::Space => write!(f, "Space"),
            KeyCode::Up => write!(f, "↑"),
            KeyCode::Down => write!(f, "↓"),
            KeyCode::Left => write!(f, "←"),
            KeyCode::Right => write!(f, "→"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            KeyCode::F(n) => write!(f, "F{}", n),
        }
    }
}

/// A chord: one key with a modifier set
///
/// Two chords match only if both the key and the full modifier set are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Keystroke {
    pub key: KeyCode,
    pub mods: Modifiers,
}

impl Keystroke {
    pub const fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self { key, mods }
    }

    /// Create a keystroke with no modifiers
    pub const fn key(key: KeyCode) -> Self {
        Self {
            key,
            mods: Modifiers::NONE,
        }
    }

    /// Create a keystroke with a character and modifiers
    pub fn char_with_mods(c: char, mods: Modifiers) -> Self {
        Self {
            key: KeyCode::Char(c.to_ascii_lowercase()),
            mods,
        }
    }

    /// Ctrl+<c> on Windows/Linux, Cmd+<c> on macOS
    pub fn cmd(c: char) -> Self {
        Self::char_with_mods(c, Modifiers::cmd())
    }

    /// Display the keystroke using platform-specific symbols
    pub fn display_string(&self) -> String {
        let mut parts = Vec::new();

        if cfg!(target_os = "macos") {
            // ⌃ ⌥ ⇧ ⌘
            if self.mods.ctrl() {
                parts.push("⌃");
            }
            if self.mods.alt() {
                parts.push("⌥");
            }
            if self.mods.shift() {
                parts.push("⇧");
            }
            if self.mods.meta() {
                parts.push("⌘");
            }
        } else {
            if self.mods.ctrl() {
                parts.push("Ctrl+");
            }
            if self.mods.alt() {
                parts.push("Alt+");
            }
            if self.mods.shift() {
                parts.push("Shift+");
            }
            if self.mods.meta() {
                parts.push("Win+");
            }
        }

        format!("{}{}", parts.join(""), self.key)
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mods.is_empty() {
            write!(f, "{}+{}", self.mods, self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}

impl Serialize for Keystroke {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_combined() {
        let mods = Modifiers::CTRL | Modifiers::SHIFT;
        assert!(mods.ctrl());
        assert!(mods.shift());
        assert!(!mods.alt());
        assert!(!mods.meta());
    }

    #[test]
    fn test_cmd_is_platform_modifier() {
        let cmd = Modifiers::cmd();
        if cfg!(target_os = "macos") {
            assert_eq!(cmd, Modifiers::META);
        } else {
            assert_eq!(cmd, Modifiers::CTRL);
        }
    }

    #[test]
    fn test_chord_match_is_exact() {
        let enter = Keystroke::key(KeyCode::Enter);
        let shift_enter = Keystroke::new(KeyCode::Enter, Modifiers::SHIFT);
        assert_ne!(enter, shift_enter);
        assert_eq!(shift_enter, Keystroke::new(KeyCode::Enter, Modifiers::SHIFT));
    }

    #[test]
    fn test_keystroke_char_lowercase() {
        assert_eq!(
            Keystroke::char_with_mods('F', Modifiers::CTRL),
            Keystroke::char_with_mods('f', Modifiers::CTRL)
        );
    }

    #[test]
    fn test_keystroke_display() {
        let stroke = Keystroke::new(KeyCode::Char('f'), Modifiers::CTRL);
        let display = format!("{}", stroke);
        assert_eq!(display, "Ctrl+F");
    }
}
