//! Application state types and entry glue.
//!
//! Defines enums and structs that model the TUI state, the theme, and where
//! config files live. The operations and the event loop are in [`update`]
//! (the loop is re-exported as `run`).
//!
pub mod form;
pub mod keymap;
pub mod settings;
pub mod update;

use ratatui::style::Color;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::api::{ApiRequest, Customer, CustomerId};
use form::CustomerDraft;
use keymap::Keymap;

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// Navigating the customer cards.
    Normal,
    /// Typing into the add form.
    AddForm,
    /// Typing into the search box.
    Search,
    /// A modal dialog owns the keyboard.
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub toast: Color,
    pub alert: Color,
    /// Card border colors, picked by position in the filtered list.
    pub cards: [Color; 6],
}

impl Theme {
    /// Plain theme using named terminal colors.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            toast: Color::Blue,
            alert: Color::Red,
            cards: [
                Color::LightMagenta,
                Color::Yellow,
                Color::LightGreen,
                Color::LightCyan,
                Color::LightRed,
                Color::Magenta,
            ],
        }
    }

    /// Catppuccin Mocha chrome with the customer card palette.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0x89, 0xb4, 0xfa),        // blue
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            toast: Color::Rgb(0x89, 0xb4, 0xfa),        // blue
            alert: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
            cards: [
                Color::Rgb(0xFF, 0xDE, 0xE9),
                Color::Rgb(0xFE, 0xE1, 0x40),
                Color::Rgb(0xC9, 0xFF, 0xBF),
                Color::Rgb(0x89, 0xF7, 0xFE),
                Color::Rgb(0xFC, 0xCF, 0x31),
                Color::Rgb(0xD9, 0xAF, 0xD9),
            ],
        }
    }

    pub fn card_color(&self, index: usize) -> Color {
        self.cards[index % self.cards.len()]
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: impl AsRef<Path>) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            let Some(color) = Self::parse_color(val) else {
                continue;
            };
            match key {
                "text" => theme.text = color,
                "muted" => theme.muted = color,
                "title" => theme.title = color,
                "border" => theme.border = color,
                "header_bg" => theme.header_bg = color,
                "header_fg" => theme.header_fg = color,
                "status_bg" => theme.status_bg = color,
                "status_fg" => theme.status_fg = color,
                "highlight_fg" => theme.highlight_fg = color,
                "highlight_bg" => theme.highlight_bg = color,
                "toast" => theme.toast = color,
                "alert" => theme.alert = color,
                _ => {
                    if let Some(slot) = key
                        .strip_prefix("card")
                        .and_then(|n| n.parse::<usize>().ok())
                        .filter(|n| *n < theme.cards.len())
                    {
                        theme.cards[slot] = color;
                    }
                }
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB"), a palette index (0-255) or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        if let Ok(index) = lower.parse::<u8>() {
            return Some(Color::Indexed(index));
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# customer-manager theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, a palette index 0-255, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                Color::Reset => "reset".to_string(),
                // Named colors get a best-effort hex approximation
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Green => "#00FF00".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Blue => "#0000FF".to_string(),
                Color::Magenta => "#FF00FF".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                Color::LightRed => "#FF6666".to_string(),
                Color::LightGreen => "#66FF66".to_string(),
                Color::LightYellow => "#FFFF66".to_string(),
                Color::LightBlue => "#6666FF".to_string(),
                Color::LightMagenta => "#FF66FF".to_string(),
                Color::LightCyan => "#66FFFF".to_string(),
                Color::White => "#FFFFFF".to_string(),
                Color::Indexed(i) => i.to_string(),
            }
        }

        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };
        kv("text", self.text);
        kv("muted", self.muted);
        kv("title", self.title);
        kv("border", self.border);
        kv("header_bg", self.header_bg);
        kv("header_fg", self.header_fg);
        kv("status_bg", self.status_bg);
        kv("status_fg", self.status_fg);
        kv("highlight_fg", self.highlight_fg);
        kv("highlight_bg", self.highlight_bg);
        kv("toast", self.toast);
        kv("alert", self.alert);
        for (i, c) in self.cards.iter().enumerate() {
            kv(&format!("card{i}"), *c);
        }

        write_config(path.as_ref(), &buf)
    }

    /// Load the theme from `path`, writing the `mocha` defaults there first if it is missing.
    pub fn load_or_init(path: impl AsRef<Path>) -> Self {
        let p = path.as_ref();
        if p.exists() {
            return Self::from_file(p).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(e) = t.write_file(p) {
            tracing::warn!(path = %p.display(), error = %e, "could not write default theme");
        }
        t
    }
}

/// Modal dialogs. At most one is open; while it is, it owns the keyboard.
#[derive(Clone, Debug)]
pub enum ModalState {
    /// Editing `target`; `draft` starts as a copy of its fields.
    Edit {
        target: Customer,
        draft: CustomerDraft,
    },
    Help {
        scroll: u16,
    },
}

/// A transient notification in the bottom-right corner.
#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub shown_at: Instant,
}

pub struct AppState {
    pub started_at: Instant,
    /// Last list received from the server.
    pub customers_all: Vec<Customer>,
    /// `customers_all` narrowed by `search_query`.
    pub customers: Vec<Customer>,
    pub selected_index: usize,
    pub cards_per_row: usize,
    pub cards_per_page: usize,
    pub input_mode: InputMode,
    pub search_query: String,
    pub add_form: CustomerDraft,
    pub modal: Option<ModalState>,
    /// Blocking alert drawn above everything else.
    pub alert: Option<String>,
    pub toast: Option<Toast>,
    pub toast_duration: Duration,
    pub theme: Theme,
    pub keymap: Keymap,
    pub api_url: String,
    /// Requests queued for the dispatcher since the last tick.
    pub outbox: Vec<ApiRequest>,
    pub in_flight: usize,
    pub last_reload_seq: u64,
    pub applied_reload_seq: u64,
    pub last_issued_id: CustomerId,
}

impl AppState {
    pub fn new(theme: Theme, keymap: Keymap, toast_duration: Duration, api_url: impl Into<String>) -> Self {
        Self {
            started_at: Instant::now(),
            customers_all: Vec::new(),
            customers: Vec::new(),
            selected_index: 0,
            cards_per_row: 1,
            cards_per_page: 1,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            add_form: CustomerDraft::default(),
            modal: None,
            alert: None,
            toast: None,
            toast_duration,
            theme,
            keymap,
            api_url: api_url.into(),
            outbox: Vec::new(),
            in_flight: 0,
            last_reload_seq: 0,
            applied_reload_seq: 0,
            last_issued_id: 0,
        }
    }

    /// Customer under the card cursor, if the filtered view is not empty.
    pub fn selected_customer(&self) -> Option<&Customer> {
        self.customers.get(self.selected_index)
    }

    /// The customer being edited; `Some` exactly while the edit modal is open.
    pub fn edit_target(&self) -> Option<&Customer> {
        match &self.modal {
            Some(ModalState::Edit { target, .. }) => Some(target),
            _ => None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            Theme::dark(),
            Keymap::default(),
            Duration::from_millis(settings::DEFAULT_TOAST_MS),
            crate::api::DEFAULT_API_URL,
        )
    }
}

/// Directory holding `settings.conf`, `theme.conf`, `keybinds.conf` and the log.
///
/// `$XDG_CONFIG_HOME/customer-manager`, then `$HOME/.config/customer-manager`,
/// then the working directory.
pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("customer-manager");
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".config").join("customer-manager");
    }
    PathBuf::from(".")
}

/// Write a config file, creating its directory when needed.
pub(crate) fn write_config(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
