mod config;
mod document;
mod email;
mod error;
mod export;
mod invoice;
mod models;
mod pdf;
mod ui;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::{SettingsStore, SmtpConfig};
use crate::error::EmailError;
use crate::invoice::InvoiceState;
use crate::models::CompanyProfile;
use crate::ui::email_wizard::{
    handle_input as handle_email_input, render_email_wizard, EmailWizardAction, EmailWizardState,
};
use crate::ui::invoice_screen::{
    handle_input as handle_invoice_input, render_invoice_screen, suggested_filename,
    InvoiceScreenAction, InvoiceScreenState,
};
use crate::ui::settings_screen::{
    handle_input as handle_settings_input, render_settings_screen, SettingsAction,
    SettingsScreenState,
};
use crate::ui::Notice;

#[derive(Parser)]
#[command(name = "invoice-flow", version, about = "Invoice entry, PDF and export tool")]
struct Args {
    /// Path to the settings file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Where to write the log file
    #[arg(long, default_value = "invoice-flow.log")]
    log_file: PathBuf,
}

// Represents the current screen in the app
enum AppScreen {
    Invoice,
    Settings,
    Email,
}

// Main application state
struct AppState {
    store: SettingsStore,
    smtp: SmtpConfig,
    profile: CompanyProfile,
    invoice: InvoiceState,
    screen: AppScreen,
    invoice_screen: InvoiceScreenState,
    settings_screen: Option<SettingsScreenState>,
    email_wizard: Option<EmailWizardState>,
}

impl AppState {
    fn new(store: SettingsStore, smtp: SmtpConfig) -> Self {
        let profile = store.load();
        let invoice = InvoiceState::new(profile.currency);
        let invoice_screen = InvoiceScreenState::new(&invoice);
        Self {
            store,
            smtp,
            profile,
            invoice,
            screen: AppScreen::Invoice,
            invoice_screen,
            settings_screen: None,
            email_wizard: None,
        }
    }
}

/// The terminal owns stdout while the UI runs, so logs go to a file.
fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_file)?;

    let smtp = SmtpConfig::load()?;
    let store = SettingsStore::new(&args.config);
    info!(config = %store.path().display(), "starting invoice-flow");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(store, smtp);

    let result = run_app(&mut terminal, &mut app_state);

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(%err, "exited with error");
        println!("Error: {}", err);
    }

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| match app_state.screen {
            AppScreen::Invoice => {
                render_invoice_screen(f, &mut app_state.invoice_screen, &app_state.invoice);
            }
            AppScreen::Settings => {
                if let Some(state) = &mut app_state.settings_screen {
                    render_settings_screen(f, state);
                }
            }
            AppScreen::Email => {
                if let Some(state) = &mut app_state.email_wizard {
                    render_email_wizard(f, state);
                }
            }
        })?;

        let should_quit = match app_state.screen {
            AppScreen::Invoice => handle_invoice_screen(app_state)?,
            AppScreen::Settings => handle_settings_screen(app_state)?,
            AppScreen::Email => handle_email_screen(app_state)?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_invoice_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_invoice_input(&mut app_state.invoice_screen, &mut app_state.invoice)? {
        Some(InvoiceScreenAction::Quit) => {
            return Ok(true);
        }
        Some(InvoiceScreenAction::OpenSettings) => {
            app_state.settings_screen =
                Some(SettingsScreenState::new(app_state.profile.clone()));
            app_state.screen = AppScreen::Settings;
        }
        Some(InvoiceScreenAction::OpenEmailWizard) => {
            open_email_wizard(app_state);
        }
        Some(InvoiceScreenAction::GeneratePdf(path)) => {
            app_state.invoice_screen.notice = Some(generate_pdf(app_state, &path));
        }
        Some(InvoiceScreenAction::Export(path)) => {
            app_state.invoice_screen.notice = Some(export_invoice(app_state, &path));
        }
        None => {}
    }

    Ok(false)
}

fn generate_pdf(app_state: &AppState, path: &Path) -> Notice {
    let result = document::build_document(&app_state.invoice, &app_state.profile)
        .and_then(|doc| pdf::render_to_file(&doc, path));
    match result {
        Ok(()) => {
            info!(path = %path.display(), "invoice PDF written");
            Notice::info(format!("Saved PDF to {}", path.display()))
        }
        Err(err) => {
            error!(%err, "PDF generation failed");
            Notice::error(err.to_string())
        }
    }
}

fn export_invoice(app_state: &AppState, path: &Path) -> Notice {
    let result = export::build_export_rows(&app_state.invoice)
        .and_then(|table| export::write_export(&table, path));
    match result {
        Ok(written) => {
            info!(path = %written.display(), "invoice exported");
            Notice::info(format!("Exported to {}", written.display()))
        }
        Err(err) => {
            error!(%err, "export failed");
            Notice::error(err.to_string())
        }
    }
}

/// Generate the attachment into the temp directory and seed the wizard with
/// default subject and body. The wizard owns the file from here on.
fn open_email_wizard(app_state: &mut AppState) {
    let invoice_number = app_state.invoice.invoice_number.clone();
    let attachment =
        std::env::temp_dir().join(suggested_filename(&invoice_number, "pdf"));

    let generated = document::build_document(&app_state.invoice, &app_state.profile)
        .and_then(|doc| pdf::render_to_file(&doc, &attachment));
    if let Err(err) = generated {
        error!(%err, "could not prepare email attachment");
        app_state.invoice_screen.notice = Some(Notice::error(err.to_string()));
        return;
    }

    let mut wizard = EmailWizardState::new(invoice_number.clone(), attachment);
    wizard.subject = email::default_subject(&invoice_number);
    wizard.message = email::default_body(
        &invoice_number,
        &app_state.invoice.customer_name,
        app_state.profile.display_name(),
    );
    wizard.sender = app_state.profile.email.clone();

    app_state.email_wizard = Some(wizard);
    app_state.screen = AppScreen::Email;
}

fn handle_settings_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.settings_screen {
        match handle_settings_input(state)? {
            Some(SettingsAction::Back) => {
                app_state.settings_screen = None;
                app_state.screen = AppScreen::Invoice;
            }
            Some(SettingsAction::Save(profile)) => match app_state.store.save(&profile) {
                Ok(()) => {
                    info!(path = %app_state.store.path().display(), "settings saved");
                    // The active invoice picks up the currency right away.
                    app_state.invoice.currency = profile.currency;
                    app_state.profile = profile;
                    state.notice = Some(Notice::info(format!(
                        "Settings saved to {}",
                        app_state.store.path().display()
                    )));
                }
                Err(err) => {
                    error!(%err, "saving settings failed");
                    state.notice = Some(Notice::error(err.to_string()));
                }
            },
            None => {}
        }
    }

    Ok(false)
}

fn handle_email_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.email_wizard {
        match handle_email_input(state)? {
            Some(EmailWizardAction::Cancel) => {
                if !state.has_success_message() {
                    info!("{}", EmailError::Cancelled);
                }
                // Dropping the wizard removes the temp attachment.
                app_state.email_wizard = None;
                app_state.screen = AppScreen::Invoice;
            }
            Some(EmailWizardAction::Send) => {
                let request = state.to_request();
                match email::send_invoice(&app_state.smtp, &request) {
                    Ok(()) => {
                        state.show_success = Some(format!(
                            "Invoice {} sent to {}",
                            state.invoice_number, request.recipient
                        ));
                    }
                    Err(err) => {
                        error!(%err, "sending invoice email failed");
                        state.show_error = Some(err.to_string());
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}
