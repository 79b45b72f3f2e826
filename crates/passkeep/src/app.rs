//! Dashboard state

use chrono::{DateTime, Local};
use passkeep::{totp, DisplayModel, EntryStore, TotpParams};

/// Watch dashboard state
pub struct App {
    pub store: EntryStore,
    pub model: DisplayModel,
    pub refresh_interval: f64,
    pub paused: bool,
    pub show_help: bool,
    pub show_passwords: bool,
    pub selected: usize,
    pub last_refresh: DateTime<Local>,
}

impl App {
    pub fn new(store: EntryStore, params: TotpParams, refresh_interval: f64) -> Self {
        let model = DisplayModel::build(&store, totp::unix_now(), params);
        Self {
            store,
            model,
            refresh_interval,
            paused: false,
            show_help: false,
            show_passwords: false,
            selected: 0,
            last_refresh: Local::now(),
        }
    }

    pub fn refresh(&mut self) {
        self.refresh_at(totp::unix_now());
    }

    pub fn refresh_at(&mut self, now: u64) {
        self.model.refresh(&self.store, now);
        self.last_refresh = Local::now();
        if self.selected >= self.model.rows.len() {
            self.selected = self.model.rows.len().saturating_sub(1);
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_passwords(&mut self) {
        self.show_passwords = !self.show_passwords;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.model.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
