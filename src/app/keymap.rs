//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Only Normal mode goes through the keymap. The add form, the search box and
//! modals use fixed editing keys so typed text is never swallowed by a binding.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use std::path::Path;

/// Semantic keyboard actions that can be bound to key combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Move focus into the add-customer form.
    FocusAddForm,
    /// Move focus into the search box.
    StartSearch,
    /// Open the edit modal for the selected card.
    EditSelection,
    /// Delete the selected customer.
    DeleteSelection,
    /// Re-fetch the customer list.
    Reload,
    /// Hide the notification before it times out.
    DismissToast,
    /// Display the help/keybindings reference.
    OpenHelp,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    /// Bound but does nothing.
    Ignore,
}

const ALL_ACTIONS: [KeyAction; 15] = [
    KeyAction::Quit,
    KeyAction::FocusAddForm,
    KeyAction::StartSearch,
    KeyAction::EditSelection,
    KeyAction::DeleteSelection,
    KeyAction::Reload,
    KeyAction::DismissToast,
    KeyAction::OpenHelp,
    KeyAction::MoveUp,
    KeyAction::MoveDown,
    KeyAction::MoveLeft,
    KeyAction::MoveRight,
    KeyAction::PageUp,
    KeyAction::PageDown,
    KeyAction::Ignore,
];

/// Mapping from `(KeyModifiers, KeyCode)` to [`KeyAction`].
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Default bindings: arrows and hjkl to move, single letters for actions.
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::CONTROL, Char('c')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('a')), KeyAction::FocusAddForm);
        bindings.insert((M::NONE, Char('n')), KeyAction::FocusAddForm);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('e')), KeyAction::EditSelection);
        bindings.insert((M::NONE, Enter), KeyAction::EditSelection);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Char('r')), KeyAction::Reload);
        bindings.insert((M::NONE, Char('x')), KeyAction::DismissToast);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        // Some terminals report '?' with SHIFT held
        bindings.insert((M::SHIFT, Char('?')), KeyAction::OpenHelp);

        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Left), KeyAction::MoveLeft);
        bindings.insert((M::NONE, Right), KeyAction::MoveRight);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::MoveLeft);
        bindings.insert((M::NONE, Char('l')), KeyAction::MoveRight);
        bindings.insert((M::NONE, PageUp), KeyAction::PageUp);
        bindings.insert((M::NONE, PageDown), KeyAction::PageDown);

        Self { bindings }
    }

    /// Load the keymap from `path`, writing the defaults there first if it is missing.
    pub fn load_or_init(path: impl AsRef<Path>) -> Self {
        let p = path.as_ref();
        if p.exists() {
            return Self::from_file(p).unwrap_or_default();
        }
        let km = Self::default();
        if let Err(e) = km.write_file(p) {
            tracing::warn!(path = %p.display(), error = %e, "could not write default keybindings");
        }
        km
    }

    /// Load a keymap file on top of the defaults.
    ///
    /// Lines read `<Action> = <KeySpec>`; the reversed `<KeySpec> = <Action>`
    /// is accepted too. Returns `None` if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let lhs = parts.next().map(|s| s.trim()).unwrap_or("");
            let rhs = parts.next().map(|s| s.trim()).unwrap_or("");
            if lhs.is_empty() || rhs.is_empty() {
                continue;
            }
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
                continue;
            }
            if let (Some(key), Some(action)) = (parse_key(lhs), parse_action(rhs)) {
                map.bindings.insert(key, action);
            }
        }
        map
    }

    /// Write every current binding, one per line, sorted for stable output.
    pub fn write_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# customer-manager keybindings (Normal mode)\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+c, Enter, Esc, Tab, BackTab, Up, Down, Left, Right, PageUp, PageDown, Delete, /, ?\n");
        let names: Vec<&str> = ALL_ACTIONS.iter().map(|a| format_action(*a)).collect();
        let _ = writeln!(&mut buf, "# Actions: {}\n", names.join(", "));

        let mut lines: Vec<String> = self
            .bindings
            .iter()
            .map(|((mods, code), action)| {
                format!("{} = {}", format_action(*action), Self::format_key(*mods, *code))
            })
            .collect();
        lines.sort();
        for line in lines {
            buf.push_str(&line);
            buf.push('\n');
        }
        super::write_config(path.as_ref(), &buf)
    }

    /// Resolve a key event to its action, if bound.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Snapshot of all bindings.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Keys bound to `action`, formatted and sorted.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|((m, c), _)| Self::format_key(*m, *c))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Format a key into a spec like "Ctrl+c" or "PageDown".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = spec.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    ALL_ACTIONS
        .into_iter()
        .find(|a| format_action(*a) == s.trim())
}

pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::FocusAddForm => "FocusAddForm",
        KeyAction::StartSearch => "StartSearch",
        KeyAction::EditSelection => "EditSelection",
        KeyAction::DeleteSelection => "DeleteSelection",
        KeyAction::Reload => "Reload",
        KeyAction::DismissToast => "DismissToast",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::MoveLeft => "MoveLeft",
        KeyAction::MoveRight => "MoveRight",
        KeyAction::PageUp => "PageUp",
        KeyAction::PageDown => "PageDown",
        KeyAction::Ignore => "Ignore",
    }
}
