//! passkeep - Local credential keeper
//!
//! Commands:
//! - add <NAME>: Store a new entry
//! - edit <SELECTOR>: Change fields of an entry
//! - delete <SELECTOR>: Remove an entry
//! - list: Show entries with their current TOTP codes
//! - code <SELECTOR>: Print the current TOTP code of an entry
//! - preview <SECRET>: Show the code a secret produces right now
//! - gen-password: Print a random password
//! - gen-secret: Print a random TOTP secret
//! - import <FILE>: Load entries from a JSON export
//! - export [FILE]: Write entries to a JSON file
//! - watch: Live dashboard with codes and countdowns
//! - config: Show configuration

mod app;
mod ui;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use passkeep::{
    display::{DisplayModel, Preview, TotpState},
    generate_password,
    totp::{self, Secret, TotpParams},
    Entry, EntryStore, ImportMode,
};
use passkeep_core::{format, Config, Paths};
use ratatui::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use app::App;

#[derive(Parser)]
#[command(name = "passkeep")]
#[command(about = "Local credential keeper with TOTP codes, password generation and JSON import/export")]
#[command(version)]
#[command(after_help = r#"SELECTORS:
    Entries are picked by their position in `passkeep list` (1, 2, ...)
    or by exact name. Use the position when two entries share a name.

STORAGE:
    - Entries live in ~/.local/share/passkeep/entries.json
    - Settings live in ~/.config/passkeep/config.json
    - The store is plain JSON. Nothing is encrypted."#)]
struct Cli {
    /// Use this store file instead of the default
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a new entry
    Add {
        /// Entry name (e.g., github, work-mail)
        name: String,
        #[arg(short, long, default_value = "")]
        username: String,
        #[arg(short, long, conflicts_with = "generate_password")]
        password: Option<String>,
        /// Generate a random password
        #[arg(short = 'g', long)]
        generate_password: bool,
        /// Length of the generated password
        #[arg(long, requires = "generate_password")]
        length: Option<usize>,
        /// Base32 TOTP secret
        #[arg(short, long, conflicts_with = "generate_totp")]
        totp: Option<String>,
        /// Generate a random TOTP secret
        #[arg(long)]
        generate_totp: bool,
    },

    /// Change fields of an entry
    Edit {
        /// Position or name
        selector: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(short, long, conflicts_with = "clear_totp")]
        totp: Option<String>,
        /// Remove the TOTP secret
        #[arg(long)]
        clear_totp: bool,
    },

    /// Remove an entry
    Delete {
        /// Position or name
        selector: String,
    },

    /// Show entries with their current TOTP codes
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
        /// Print passwords instead of a mask
        #[arg(long)]
        show_passwords: bool,
    },

    /// Print the current TOTP code of an entry
    Code {
        /// Don't print trailing newline (useful for piping)
        #[arg(short = 'n')]
        no_newline: bool,
        /// Position or name
        selector: String,
    },

    /// Show the code a secret produces right now
    Preview {
        /// Base32 TOTP secret
        secret: String,
    },

    /// Print a random password
    GenPassword {
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Print a random TOTP secret
    GenSecret,

    /// Load entries from a JSON export (replaces the current list)
    Import {
        file: PathBuf,
        /// Append instead of replacing
        #[arg(long)]
        merge: bool,
    },

    /// Write all entries to a JSON file
    Export {
        #[arg(default_value = "passkeep_export.json")]
        file: PathBuf,
    },

    /// Live dashboard with codes and countdowns
    Watch {
        /// Refresh interval in seconds
        #[arg(short, long)]
        interval: Option<f64>,
    },

    /// Show configuration
    Config,
}

/// Settings shared by every command
struct Settings {
    config: Config,
    config_path: PathBuf,
    store_path: PathBuf,
    params: TotpParams,
}

impl Settings {
    fn load(store_override: Option<PathBuf>) -> Result<Self> {
        let paths = Paths::new();
        let config_path = paths.config_file();
        let config = Config::load(&config_path)?;
        let params = TotpParams::new(config.totp_interval, config.totp_digits)
            .with_context(|| format!("Invalid TOTP settings in {}", config_path.display()))?;
        let store_path = store_override
            .or_else(|| config.store_path.clone())
            .unwrap_or_else(|| paths.store());

        Ok(Self {
            config,
            config_path,
            store_path,
            params,
        })
    }

    fn open_store(&self) -> Result<EntryStore> {
        Ok(EntryStore::load(&self.store_path)?)
    }

    fn save_store(&self, store: &EntryStore) -> Result<()> {
        Ok(store.save(&self.store_path)?)
    }
}

fn main() -> Result<()> {
    // Initialize logging (stderr keeps command output and the dashboard clean)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = Settings::load(cli.store)?;

    match cli.command {
        Some(Commands::Add {
            name,
            username,
            password,
            generate_password,
            length,
            totp,
            generate_totp,
        }) => cmd_add(&ctx, name, username, password, generate_password, length, totp, generate_totp),
        Some(Commands::Edit {
            selector,
            name,
            username,
            password,
            totp,
            clear_totp,
        }) => cmd_edit(&ctx, &selector, name, username, password, totp, clear_totp),
        Some(Commands::Delete { selector }) => cmd_delete(&ctx, &selector),
        Some(Commands::List { json, show_passwords }) => cmd_list(&ctx, json, show_passwords),
        Some(Commands::Code { no_newline, selector }) => cmd_code(&ctx, &selector, no_newline),
        Some(Commands::Preview { secret }) => cmd_preview(&ctx, &secret),
        Some(Commands::GenPassword { length }) => cmd_gen_password(&ctx, length),
        Some(Commands::GenSecret) => cmd_gen_secret(),
        Some(Commands::Import { file, merge }) => cmd_import(&ctx, &file, merge),
        Some(Commands::Export { file }) => cmd_export(&ctx, &file),
        Some(Commands::Watch { interval }) => cmd_watch(&ctx, interval),
        Some(Commands::Config) => cmd_config(&ctx),
        None => cmd_list(&ctx, false, false),
    }
}

/// Canonicalize a user-supplied secret; blank means "no TOTP"
fn parse_secret(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Ok(String::new());
    }
    let secret = Secret::parse(raw).with_context(|| format!("Rejected TOTP secret '{}'", raw))?;
    Ok(secret.into_string())
}

#[allow(clippy::too_many_arguments)]
fn cmd_add(
    ctx: &Settings,
    name: String,
    username: String,
    password: Option<String>,
    generate: bool,
    length: Option<usize>,
    given_secret: Option<String>,
    generate_totp: bool,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Entry name cannot be empty");
    }

    let password = if generate {
        generate_password(length.unwrap_or(ctx.config.password_length))?
    } else {
        password.unwrap_or_default()
    };

    let secret = if generate_totp {
        totp::generate_secret().into_string()
    } else {
        parse_secret(given_secret.as_deref().unwrap_or_default())?
    };

    let mut store = ctx.open_store()?;
    let index = store.add(Entry::new(name.clone(), username, password.clone(), secret.clone()));
    ctx.save_store(&store)?;

    println!("success: Entry #{} saved: {}", index + 1, name);
    if generate {
        println!("Password: {}", password);
    }
    if generate_totp {
        println!("TOTP secret generated: {}", secret);
    }
    if let Some(preview) = Preview::for_secret(&secret, totp::unix_now(), &ctx.params)? {
        print_preview(&preview);
    }

    Ok(())
}

fn cmd_edit(
    ctx: &Settings,
    selector: &str,
    name: Option<String>,
    username: Option<String>,
    password: Option<String>,
    given_secret: Option<String>,
    clear_totp: bool,
) -> Result<()> {
    let mut store = ctx.open_store()?;
    let index = store.resolve(selector)?;
    let mut entry = store
        .get(index)
        .cloned()
        .with_context(|| format!("Entry #{} disappeared", index + 1))?;

    if let Some(name) = name {
        if name.trim().is_empty() {
            bail!("Entry name cannot be empty");
        }
        entry.name = name;
    }
    if let Some(username) = username {
        entry.username = username;
    }
    if let Some(password) = password {
        entry.password = password;
    }
    if let Some(secret) = given_secret {
        entry.totp = parse_secret(&secret)?;
    }
    if clear_totp {
        entry.totp.clear();
    }

    let name = entry.name.clone();
    store.update(index, entry)?;
    ctx.save_store(&store)?;

    println!("success: Entry #{} updated: {}", index + 1, name);
    Ok(())
}

fn cmd_delete(ctx: &Settings, selector: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let index = store.resolve(selector)?;
    let removed = store.remove(index)?;
    ctx.save_store(&store)?;

    println!("success: Entry deleted: {}", removed.name);
    Ok(())
}

fn cmd_list(ctx: &Settings, json: bool, show_passwords: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let model = DisplayModel::build(&store, totp::unix_now(), ctx.params);

    if json {
        let rows: Vec<serde_json::Value> = model
            .rows
            .iter()
            .map(|row| {
                let password = if show_passwords {
                    row.password.clone()
                } else {
                    format::mask(&row.password)
                };
                let error = match &row.totp {
                    TotpState::Invalid(reason) => Some(reason.clone()),
                    _ => None,
                };
                serde_json::json!({
                    "position": row.position,
                    "name": row.name,
                    "username": row.username,
                    "password": password,
                    "totp_code": row.totp.code().map(|c| c.to_string()),
                    "totp_remaining": row.totp.remaining(),
                    "totp_error": error,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if model.rows.is_empty() {
        println!("No entries stored. Add one with: passkeep add <name>");
        return Ok(());
    }

    println!(
        "{:<4} {:<20} {:<20} {:<14} {:<9} {}",
        "#", "Name", "Username", "Password", "Code", "Left"
    );
    for row in &model.rows {
        let password = if show_passwords {
            row.password.clone()
        } else {
            format::mask(&row.password)
        };
        let (code, left) = match &row.totp {
            TotpState::Absent => ("-".to_string(), String::new()),
            TotpState::Active { code, remaining } => (format::code(code.as_str()), format::countdown(*remaining)),
            TotpState::Invalid(_) => ("invalid".to_string(), String::new()),
        };
        println!(
            "{:<4} {:<20} {:<20} {:<14} {:<9} {}",
            row.position,
            format::truncate(&row.name, 20),
            format::truncate(&row.username, 20),
            format::truncate(&password, 14),
            code,
            left
        );
    }

    Ok(())
}

fn cmd_code(ctx: &Settings, selector: &str, no_newline: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let index = store.resolve(selector)?;
    let entry = store
        .get(index)
        .with_context(|| format!("Entry #{} disappeared", index + 1))?;

    let Some(secret) = entry.totp_secret() else {
        bail!("Entry '{}' has no TOTP secret", entry.name);
    };
    let code = totp::current_code(secret, totp::unix_now(), &ctx.params)
        .with_context(|| format!("Cannot compute code for '{}'", entry.name))?;

    if no_newline {
        print!("{}", code);
    } else {
        println!("{}", code);
    }

    Ok(())
}

fn cmd_preview(ctx: &Settings, secret: &str) -> Result<()> {
    match Preview::for_secret(secret, totp::unix_now(), &ctx.params)? {
        Some(preview) => print_preview(&preview),
        None => bail!("Empty secret: nothing to preview"),
    }
    Ok(())
}

fn print_preview(preview: &Preview) {
    println!("TOTP preview: {}", preview.code);
    println!("Time remaining: {} seconds", preview.remaining);
}

fn cmd_gen_password(ctx: &Settings, length: Option<usize>) -> Result<()> {
    println!("{}", generate_password(length.unwrap_or(ctx.config.password_length))?);
    Ok(())
}

fn cmd_gen_secret() -> Result<()> {
    println!("{}", totp::generate_secret());
    Ok(())
}

fn cmd_import(ctx: &Settings, file: &Path, merge: bool) -> Result<()> {
    if !file.exists() {
        bail!("Import file not found: {}", file.display());
    }

    let mut store = ctx.open_store()?;
    let mode = if merge { ImportMode::Merge } else { ImportMode::Replace };
    let count = store.import(file, mode)?;
    ctx.save_store(&store)?;

    println!("success: Imported {} entries from {}", count, file.display());
    Ok(())
}

fn cmd_export(ctx: &Settings, file: &Path) -> Result<()> {
    let store = ctx.open_store()?;
    store.export(file)?;

    println!("success: Exported {} entries to {}", store.len(), file.display());
    println!("The export is plain JSON. Passwords and secrets are readable.");
    Ok(())
}

fn cmd_config(ctx: &Settings) -> Result<()> {
    println!("Config file: {}", ctx.config_path.display());
    println!("Store file:  {}", ctx.store_path.display());
    println!();
    println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    Ok(())
}

fn cmd_watch(ctx: &Settings, interval: Option<f64>) -> Result<()> {
    let refresh = interval.unwrap_or(ctx.config.refresh_interval);
    if !refresh.is_finite() || refresh <= 0.0 {
        bail!("Refresh interval must be a positive number of seconds");
    }
    let store = ctx.open_store()?;
    let mut app = App::new(store, ctx.params, refresh);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_secs_f64(app.refresh_interval);
    let mut last_tick = Instant::now();

    app.refresh();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('r') => app.refresh(),
                        KeyCode::Char('p') => app.toggle_pause(),
                        KeyCode::Char('s') => app.toggle_passwords(),
                        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
                        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
                        KeyCode::Char('?') => app.toggle_help(),
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if !app.paused {
                app.refresh();
            }
            last_tick = Instant::now();
        }
    }
}
