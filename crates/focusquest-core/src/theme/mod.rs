//! Theme catalog.
//!
//! A fixed list of palettes. Everything except the default theme starts
//! locked and is bought with points. Unlocks are permanent.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::integrations::Confirm;
use crate::reward::PointsWallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub panel: &'static str,
    pub accent: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub colors: Palette,
}

const fn theme(
    id: &'static str,
    name: &'static str,
    background: &'static str,
    text: &'static str,
    panel: &'static str,
    accent: &'static str,
) -> Theme {
    Theme {
        id,
        name,
        colors: Palette {
            background,
            text,
            panel,
            accent,
        },
    }
}

pub const DEFAULT_THEME: &str = "light";

pub static THEMES: [Theme; 12] = [
    theme("light", "Light", "#f5f5f5", "#000", "#fff", "#007bff"),
    theme("dark", "Dark", "#121212", "#e0e0e0", "#1e1e1e", "#bb86fc"),
    theme("forest", "Forest", "#e8f5e9", "#1b5e20", "#c8e6c9", "#43a047"),
    theme("ocean", "Ocean", "#e3f2fd", "#0d47a1", "#bbdefb", "#2196f3"),
    theme("sakura", "Sakura", "#fff0f5", "#880e4f", "#f8bbd0", "#ec407a"),
    theme("midnight", "Midnight", "#0b132b", "#f8f9fa", "#1c2541", "#5bc0be"),
    theme("sunset", "Sunset", "#fff3e0", "#e65100", "#ffe0b2", "#ff9800"),
    theme("mint", "Mint", "#e8fdf5", "#004d40", "#b2fef7", "#26a69a"),
    theme("lavender", "Lavender", "#f3e5f5", "#4a148c", "#e1bee7", "#9c27b0"),
    theme("sand", "Sand", "#fff8e1", "#795548", "#ffe082", "#ffca28"),
    theme("ice", "Ice", "#e0f7fa", "#01579b", "#b2ebf2", "#00bcd4"),
    theme("ember", "Ember", "#fff5f5", "#b71c1c", "#ffcdd2", "#e53935"),
];

pub fn find_theme(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

/// Render state of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeView {
    pub id: &'static str,
    pub name: &'static str,
    pub accent: &'static str,
    pub unlocked: bool,
    pub selected: bool,
    pub tooltip: String,
}

/// Result of a selection that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Theme was already owned and is now active.
    Applied(Event),
    /// Theme was bought and applied: debit, unlock, select, in that order.
    Unlocked(Vec<Event>),
    /// The user said no. Nothing changed.
    Declined,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeCatalog {
    unlock_cost: u32,
    unlocked: Vec<String>,
    selected: String,
}

impl ThemeCatalog {
    pub fn new(unlock_cost: u32) -> Self {
        Self::with_default(unlock_cost, DEFAULT_THEME)
    }

    /// Start with `default_id` owned and selected, falling back to the
    /// built-in default when the id is not in the catalog.
    pub fn with_default(unlock_cost: u32, default_id: &str) -> Self {
        let default_id = match find_theme(default_id) {
            Some(t) => t.id,
            None => {
                tracing::warn!(default_id, "unknown default theme, using {DEFAULT_THEME}");
                DEFAULT_THEME
            }
        };
        Self {
            unlock_cost,
            unlocked: vec![default_id.to_string()],
            selected: default_id.to_string(),
        }
    }

    pub fn unlock_cost(&self) -> u32 {
        self.unlock_cost
    }

    pub fn selected(&self) -> &'static Theme {
        find_theme(&self.selected).unwrap_or(&THEMES[0])
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.iter().any(|u| u == id)
    }

    pub fn unlocked_ids(&self) -> &[String] {
        &self.unlocked
    }

    /// Question put to the user before buying `id`.
    pub fn unlock_prompt(&self, id: &str) -> String {
        format!("Unlock {id} theme for {} points?", self.unlock_cost)
    }

    /// Catalog in display order with lock/selection flags.
    pub fn views(&self) -> Vec<ThemeView> {
        THEMES
            .iter()
            .map(|t| {
                let unlocked = self.is_unlocked(t.id);
                ThemeView {
                    id: t.id,
                    name: t.name,
                    accent: t.colors.accent,
                    unlocked,
                    selected: self.selected == t.id,
                    tooltip: if unlocked {
                        t.name.to_string()
                    } else {
                        format!("{} - Unlock for {} points", t.name, self.unlock_cost)
                    },
                }
            })
            .collect()
    }

    /// Whether selecting `id` with `balance` points would put the unlock
    /// question to the user. When this is `false`, [`select`](Self::select)
    /// never calls its `Confirm`.
    pub fn needs_confirmation(&self, id: &str, balance: u32) -> bool {
        find_theme(id).is_some() && !self.is_unlocked(id) && balance >= self.unlock_cost
    }

    /// Make `id` the active theme, buying it first if it is locked.
    ///
    /// Buying needs `unlock_cost` points and a yes from `confirm`. Every
    /// failure and a declined prompt leave points and catalog untouched.
    pub fn select(
        &mut self,
        id: &str,
        wallet: &mut dyn PointsWallet,
        confirm: &dyn Confirm,
    ) -> Result<Selection> {
        let theme = find_theme(id).ok_or_else(|| CoreError::UnknownTheme(id.to_string()))?;

        if self.is_unlocked(theme.id) {
            return Ok(Selection::Applied(self.apply(theme)));
        }

        let available = wallet.balance();
        if !self.needs_confirmation(theme.id, available) {
            return Err(CoreError::InsufficientPoints {
                needed: self.unlock_cost,
                available,
            });
        }

        if !confirm.confirm(&self.unlock_prompt(theme.id)) {
            tracing::info!(id = theme.id, "theme unlock declined");
            return Ok(Selection::Declined);
        }

        let spent = wallet.debit(self.unlock_cost)?;
        self.unlocked.push(theme.id.to_string());
        tracing::info!(id = theme.id, cost = self.unlock_cost, "theme unlocked");
        let unlocked = Event::ThemeUnlocked {
            id: theme.id.to_string(),
            at: Utc::now(),
        };
        let applied = self.apply(theme);
        Ok(Selection::Unlocked(vec![spent, unlocked, applied]))
    }

    fn apply(&mut self, theme: &Theme) -> Event {
        self.selected = theme.id.to_string();
        Event::ThemeSelected {
            id: theme.id.to_string(),
            at: Utc::now(),
        }
    }
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self::new(20)
    }
}
