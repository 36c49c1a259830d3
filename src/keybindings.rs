//! Keybinding registry: maps key events to actions, with config overrides.
//!
//! Bindings are data, looked up per dispatch context, so users can remap any
//! action from `[keybindings]` in config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    ScrollTop,
    NextCategory,
    PrevCategory,
    OpenCategory,
    Back,
    Retry,
    MoreColumns,
    FewerColumns,
    CycleTheme,
    ShowHelp,
    SignIn,
    SignOut,
    OpenRemix,
    OpenAccount,
    AddImage,
    RemoveImage,
    Generate,
    Confirm,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::ScrollDown => "Scroll down",
            Self::ScrollUp => "Scroll up",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::ScrollTop => "Back to top",
            Self::NextCategory => "Next category tab",
            Self::PrevCategory => "Previous category tab",
            Self::OpenCategory => "Open category gallery",
            Self::Back => "Go back / dismiss",
            Self::Retry => "Retry loading",
            Self::MoreColumns => "More columns",
            Self::FewerColumns => "Fewer columns",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
            Self::SignIn => "Sign in",
            Self::SignOut => "Sign out",
            Self::OpenRemix => "Remix this category",
            Self::OpenAccount => "Account",
            Self::AddImage => "Add reference image",
            Self::RemoveImage => "Remove last image",
            Self::Generate => "Generate video",
            Self::Confirm => "Confirm",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        let action = match normalized.as_str() {
            "quit" => Self::Quit,
            "scrolldown" | "down" => Self::ScrollDown,
            "scrollup" | "up" => Self::ScrollUp,
            "pagedown" => Self::PageDown,
            "pageup" => Self::PageUp,
            "scrolltop" | "top" => Self::ScrollTop,
            "nextcategory" | "next" => Self::NextCategory,
            "prevcategory" | "prev" => Self::PrevCategory,
            "opencategory" | "open" => Self::OpenCategory,
            "back" => Self::Back,
            "retry" | "reload" => Self::Retry,
            "morecolumns" => Self::MoreColumns,
            "fewercolumns" => Self::FewerColumns,
            "cycletheme" | "theme" => Self::CycleTheme,
            "showhelp" | "help" => Self::ShowHelp,
            "signin" | "login" => Self::SignIn,
            "signout" | "logout" => Self::SignOut,
            "openremix" | "remix" => Self::OpenRemix,
            "openaccount" | "account" => Self::OpenAccount,
            "addimage" => Self::AddImage,
            "removeimage" => Self::RemoveImage,
            "generate" => Self::Generate,
            "confirm" => Self::Confirm,
            _ => return None,
        };
        Some(action)
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context; determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Home,
    Gallery,
    Account,
    Remix,
    LoginModal,
    Help,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config.
///
/// Accepts single characters ("q"), named keys ("Enter", "PageDown"),
/// "Ctrl+x" combos and function keys "F1" to "F12".
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then(|| KeySpec::ctrl(c));
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "home" => Some(KeyCode::Home),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then(|| KeySpec::ch(c))
}

/// Format a KeySpec for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Default bindings, in help-screen order.
const DEFAULTS: &[(Context, KeySpec, Action)] = &[
    (Context::Global, KeySpec::ch('q'), Action::Quit),
    (Context::Global, KeySpec::ctrl('c'), Action::Quit),
    (Context::Global, KeySpec::ch('?'), Action::ShowHelp),
    (Context::Global, KeySpec::ch('t'), Action::CycleTheme),
    (Context::Global, KeySpec::ch('L'), Action::SignIn),
    (Context::Global, KeySpec::ch('O'), Action::SignOut),
    (Context::Global, KeySpec::ch('u'), Action::OpenAccount),
    (Context::Global, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Global, KeySpec::ch('j'), Action::ScrollDown),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::ScrollDown),
    (Context::Global, KeySpec::ch('k'), Action::ScrollUp),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::ScrollUp),
    (Context::Global, KeySpec::plain(KeyCode::PageDown), Action::PageDown),
    (Context::Global, KeySpec::ctrl('d'), Action::PageDown),
    (Context::Global, KeySpec::plain(KeyCode::PageUp), Action::PageUp),
    (Context::Global, KeySpec::ctrl('u'), Action::PageUp),
    (Context::Global, KeySpec::ch('g'), Action::ScrollTop),
    (Context::Global, KeySpec::plain(KeyCode::Home), Action::ScrollTop),
    (Context::Global, KeySpec::ch('+'), Action::MoreColumns),
    (Context::Global, KeySpec::ch('-'), Action::FewerColumns),
    (Context::Home, KeySpec::ch('l'), Action::NextCategory),
    (Context::Home, KeySpec::plain(KeyCode::Right), Action::NextCategory),
    (Context::Home, KeySpec::ch('h'), Action::PrevCategory),
    (Context::Home, KeySpec::plain(KeyCode::Left), Action::PrevCategory),
    (Context::Home, KeySpec::plain(KeyCode::Enter), Action::OpenCategory),
    (Context::Home, KeySpec::ch('r'), Action::Retry),
    (Context::Home, KeySpec::ch('m'), Action::OpenRemix),
    (Context::Gallery, KeySpec::ch('r'), Action::Retry),
    (Context::Gallery, KeySpec::ch('m'), Action::OpenRemix),
    (Context::Remix, KeySpec::ch('a'), Action::AddImage),
    (Context::Remix, KeySpec::ch('x'), Action::RemoveImage),
    (Context::Remix, KeySpec::plain(KeyCode::Enter), Action::Generate),
    (Context::LoginModal, KeySpec::plain(KeyCode::Enter), Action::Confirm),
];

/// Registry of keybindings: defaults plus config overrides.
///
/// The same key can map to different actions in different contexts.
#[derive(Debug, Clone)]
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        for &(context, key, action) in DEFAULTS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    /// Apply user overrides: action name → key string.
    ///
    /// An override replaces every default key of that action, in the same
    /// contexts. Returns warnings for unknown actions and unparseable keys.
    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Vec<String>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = Action::from_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Action for a key in `context`, falling back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);
        self.lookup.get(&(context, key)).copied().or_else(|| {
            (context != Context::Global)
                .then(|| self.lookup.get(&(Context::Global, key)).copied())
                .flatten()
        })
    }

    /// (context, key label, action, description) for the help screen.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
