use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing_subscriber::EnvFilter;

use terapia_api::http::HttpTransport;
use terapia_console::config::{self, API_URL_ENV};
use terapia_console::confirm::{AssumeYes, Confirm, TerminalConfirm};
use terapia_console::fields::{apply_fields, parse_assignment};
use terapia_console::list_store::RemoveOutcome;
use terapia_console::messages;
use terapia_console::patients::SearchOutcome;
use terapia_console::router::{self, Navigation};
use terapia_console::summary::Summary;
use terapia_console::{
    ConsoleState, EntityFormController, LoadOutcome, SubmitOutcome, ToggleOutcome,
};
use terapia_core::entity::{Entity, EntityKind};
use terapia_core::models::document_type::DocumentType;
use terapia_core::models::patient::Patient;
use terapia_core::models::professional::Professional;
use terapia_core::models::service_department::ServiceDepartment;
use terapia_core::models::therapy_session::{TherapySession, group_by_day};
use terapia_core::models::therapy_type::TherapyType;
use terapia_storage::kv::{FileStore, KeyValueStore, MemoryStore};

#[derive(Parser)]
#[command(name = "terapia-console")]
#[command(about = "Clinic administration console")]
struct Cli {
    /// Backend base URL (overrides config and TERAPIA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List records of one entity
    List {
        entity: EntityKind,
        /// Only active records
        #[arg(long)]
        active: bool,
    },

    /// Create a record from FIELD=VALUE assignments
    Create {
        entity: EntityKind,
        #[arg(long = "field", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },

    /// Change fields of an existing record
    Edit {
        entity: EntityKind,
        id: i64,
        #[arg(long = "field", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },

    /// Activate or deactivate a record
    Toggle { entity: EntityKind, id: i64 },

    /// Delete a record
    Delete {
        entity: EntityKind,
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Check where a console path leads for the current session
    Open { path: String },

    /// Patient lookups
    Patients {
        #[command(subcommand)]
        command: PatientsCommand,
    },

    /// Therapy sessions by day; a professional's own when no filter is given
    Sessions {
        #[arg(long, conflicts_with = "professional")]
        patient: Option<i64>,
        #[arg(long)]
        professional: Option<i64>,
    },

    /// Show or change the saved configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    Show,
    Set {
        #[arg(long)]
        api_base_url: Option<String>,
        #[arg(long)]
        timeout_secs: Option<u64>,
        #[arg(long)]
        state_path: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PatientsCommand {
    /// Find a patient by document number or by name
    Search {
        #[arg(long, conflicts_with_all = ["name", "surname"])]
        document: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        surname: Option<String>,
    },

    /// Patients grouped by professional
    Overview,

    /// Register a patient, or update one when `--id` is given
    Save {
        #[arg(long)]
        id: Option<i64>,
        #[arg(long = "field", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
}

/// Run a generic command for the record type behind `kind`.
macro_rules! for_entity {
    ($kind:expr, $func:ident($($arg:expr),*)) => {
        match $kind {
            EntityKind::Professional => $func::<Professional>($($arg),*).await,
            EntityKind::Patient => $func::<Patient>($($arg),*).await,
            EntityKind::DocumentType => $func::<DocumentType>($($arg),*).await,
            EntityKind::TherapyType => $func::<TherapyType>($($arg),*).await,
            EntityKind::ServiceDepartment => $func::<ServiceDepartment>($($arg),*).await,
            EntityKind::TherapySession => $func::<TherapySession>($($arg),*).await,
        }
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = config::load_config()?;
    let command = match cli.command {
        Command::Config { command } => return configure(config, command),
        command => command,
    };
    let env_url = std::env::var(API_URL_ENV).ok();
    let base_url = config.resolve_api_base(cli.api_url.as_deref(), env_url.as_deref());
    let transport = HttpTransport::new(&base_url, config.request_timeout())
        .map_err(|e| eyre::eyre!("{e}"))?;
    let store: Arc<dyn KeyValueStore> = if cli.ephemeral {
        Arc::new(MemoryStore::default())
    } else {
        let store = FileStore::open(config.session_path()?)?;
        tracing::debug!(session = %store.path().display(), "using persisted session");
        Arc::new(store)
    };
    tracing::debug!(api = %base_url, "console starting");

    let state = ConsoleState::new(Arc::new(transport), store);

    match command {
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            let outcome = state
                .gate
                .login(&username, &password)
                .await
                .map_err(|e| eyre::eyre!(e.user_message()))?;
            println!(
                "Signed in as {}. Start at {}",
                outcome.session.display_name(),
                outcome.landing
            );
        }
        Command::Logout => {
            let redirect = state.gate.logout();
            println!("Signed out. Continue at {}", redirect.href());
        }
        Command::Whoami => {
            let session = state.gate.current();
            match &session.profile {
                Some(profile) if session.is_authenticated() => {
                    match &profile.email {
                        Some(email) => println!("{} <{email}>", profile.display_name()),
                        None => println!("{}", profile.display_name()),
                    }
                    println!("roles: {}", profile.roles.join(", "));
                    for route in router::sidebar(&session) {
                        println!("  {:<34} {}", route.path, route.title);
                    }
                }
                _ => println!("Not signed in"),
            }
        }
        Command::List { entity, active } => for_entity!(entity, list(&state, active))?,
        Command::Create { entity, fields } => for_entity!(entity, create(&state, &fields))?,
        Command::Edit { entity, id, fields } => for_entity!(entity, edit(&state, id, &fields))?,
        Command::Toggle { entity, id } => for_entity!(entity, toggle(&state, id))?,
        Command::Delete { entity, id, yes } => {
            let confirm: &dyn Confirm = if yes { &AssumeYes } else { &TerminalConfirm };
            for_entity!(entity, delete(&state, id, confirm))?
        }
        Command::Open { path } => match state.navigate(&path) {
            Navigation::Mount(screen) => println!("{path}: {screen:?}"),
            Navigation::Redirect(to) => println!("{path}: redirected to {to}"),
            Navigation::NotFound => println!("{path}: not found"),
        },
        Command::Patients { command } => patients(&state, command).await?,
        Command::Sessions {
            patient,
            professional,
        } => sessions(&state, patient, professional).await?,
        Command::Config { .. } => {}
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn list<E: Entity + Summary>(state: &ConsoleState, active: bool) -> Result<()> {
    let store = state.list_store::<E>();
    let outcome = if active {
        store.reload_active().await
    } else {
        store.reload().await
    };
    if outcome == LoadOutcome::Failed {
        eyre::bail!("{}", store.notice().error());
    }
    let items = store.items();
    if items.is_empty() {
        println!("No {}", E::KIND.plural());
    }
    for item in &items {
        println!("{}", item.summary());
    }
    Ok(())
}

async fn create<E: Entity + Summary>(
    state: &ConsoleState,
    fields: &[(String, String)],
) -> Result<()> {
    let list = state.list_store::<E>();
    let form = state.form(&list);
    form.open_create();
    print_saved(fill_and_submit(&form, fields).await?, &list.notice().success())
}

async fn edit<E: Entity + Summary>(
    state: &ConsoleState,
    id: i64,
    fields: &[(String, String)],
) -> Result<()> {
    let record = state
        .api::<E>()
        .get(id)
        .await
        .map_err(|e| eyre::eyre!(e.user_message(&messages::load_failed(E::KIND))))?;
    let list = state.list_store::<E>();
    let form = state.form(&list);
    form.open_edit(&record);
    print_saved(fill_and_submit(&form, fields).await?, &list.notice().success())
}

async fn fill_and_submit<E: Entity>(
    form: &EntityFormController<E>,
    fields: &[(String, String)],
) -> Result<Option<E>> {
    let draft = form
        .draft()
        .ok_or_else(|| eyre::eyre!("no {} form is open", E::KIND.label()))?;
    let filled = apply_fields(&draft, fields)?;
    form.update_draft(|draft| *draft = filled);
    match form.submit().await {
        SubmitOutcome::Saved { record, .. } => Ok(record),
        SubmitOutcome::Invalid(missing) => {
            eyre::bail!("{}: {}", messages::REQUIRED_FIELDS, missing.join(", "))
        }
        SubmitOutcome::Failed(message) => eyre::bail!("{message}"),
        SubmitOutcome::Ignored | SubmitOutcome::Closed => {
            eyre::bail!("the {} form was not submitted", E::KIND.label())
        }
    }
}

fn print_saved<E: Summary>(record: Option<E>, notice: &str) -> Result<()> {
    if let Some(record) = record {
        println!("{}", record.summary());
    }
    println!("{notice}");
    Ok(())
}

async fn toggle<E: Entity + Summary>(state: &ConsoleState, id: i64) -> Result<()> {
    let store = state.list_store::<E>();
    if store.reload().await == LoadOutcome::Failed {
        eyre::bail!("{}", store.notice().error());
    }
    match store.toggle_active(id).await {
        ToggleOutcome::Committed { .. } => println!("{}", store.notice().success()),
        ToggleOutcome::RolledBack { message, .. } => eyre::bail!("{message}"),
        ToggleOutcome::Skipped => eyre::bail!("no {} with id {id}", E::KIND.label()),
    }
    Ok(())
}

async fn delete<E: Entity>(
    state: &ConsoleState,
    id: i64,
    confirm: &dyn Confirm,
) -> Result<()> {
    let store = state.list_store::<E>();
    match store.remove(id, confirm).await {
        RemoveOutcome::Deleted => println!("{}", store.notice().success()),
        RemoveOutcome::Declined => println!("Cancelled"),
        RemoveOutcome::Failed(message) => eyre::bail!("{message}"),
    }
    Ok(())
}

async fn patients(state: &ConsoleState, command: PatientsCommand) -> Result<()> {
    let directory = state.patient_directory();
    match command {
        PatientsCommand::Search {
            document,
            name,
            surname,
        } => {
            let outcome = match document {
                Some(document) => directory.search_by_document(&document).await,
                None => {
                    directory
                        .search_by_name(
                            name.as_deref().unwrap_or_default(),
                            surname.as_deref().unwrap_or_default(),
                        )
                        .await
                }
            };
            match outcome {
                SearchOutcome::Selected(patient) => {
                    println!("{}", patient.summary());
                    for (day, sessions) in directory.sessions_by_day() {
                        println!("{day}");
                        for session in sessions {
                            println!("  {}", session.summary());
                        }
                    }
                }
                SearchOutcome::Listed(_) => {
                    for patient in directory.snapshot().results {
                        println!("{}", patient.summary());
                    }
                }
                SearchOutcome::CreationOffered => println!("{}", directory.notice().error()),
                SearchOutcome::Invalid | SearchOutcome::Failed(_) => {
                    eyre::bail!("{}", directory.notice().error())
                }
            }
        }
        PatientsCommand::Overview => {
            directory.load_overview().await;
            let snapshot = directory.snapshot();
            if snapshot.notice.is_error() {
                eyre::bail!("{}", snapshot.notice.error());
            }
            for group in &snapshot.overview {
                println!(
                    "{} ({} patients)",
                    group.professional_full_name(),
                    group.pacientes.len()
                );
                for patient in &group.pacientes {
                    println!("  {}", patient.summary());
                }
            }
            println!("Total: {}", directory.total_patients());
        }
        PatientsCommand::Save { id, fields } => {
            directory.load_document_types().await;
            match id {
                Some(id) => {
                    let patient = state.api::<Patient>().get(id).await.map_err(|e| {
                        eyre::eyre!(e.user_message(&messages::load_failed(EntityKind::Patient)))
                    })?;
                    directory.open_edit(&patient);
                }
                None => directory.open_create(),
            }
            let form = directory.form();
            let draft = form
                .draft()
                .ok_or_else(|| eyre::eyre!("no patient form is open"))?;
            let filled = apply_fields(&draft, &fields)?;
            form.update_draft(|draft| *draft = filled);
            match directory.save().await {
                SubmitOutcome::Saved { record, .. } => {
                    print_saved(record, &directory.notice().success())?
                }
                SubmitOutcome::Invalid(missing) => {
                    eyre::bail!("{}: {}", messages::REQUIRED_FIELDS, missing.join(", "))
                }
                SubmitOutcome::Failed(message) => eyre::bail!("{message}"),
                SubmitOutcome::Ignored | SubmitOutcome::Closed => {
                    eyre::bail!("the patient form was not submitted")
                }
            }
        }
    }
    Ok(())
}

async fn sessions(
    state: &ConsoleState,
    patient: Option<i64>,
    professional: Option<i64>,
) -> Result<()> {
    let api = state.api::<TherapySession>();
    let result = match (patient, professional) {
        (Some(id), _) => api.by_patient(id).await,
        (None, Some(id)) => api.by_professional(id).await,
        (None, None) => {
            let session = state.gate.current();
            let own_id = session
                .profile
                .as_ref()
                .and_then(|profile| profile.id)
                .filter(|_| session.is_professional())
                .ok_or_else(|| eyre::eyre!("pass --patient or --professional"))?;
            api.by_professional(own_id).await
        }
    };
    let mut found = result.map_err(|e| {
        eyre::eyre!(e.user_message(&messages::load_failed(EntityKind::TherapySession)))
    })?;
    TherapySession::sort_for_display(&mut found);
    if found.is_empty() {
        println!("No {}", EntityKind::TherapySession.plural());
    }
    for (day, group) in group_by_day(&found) {
        println!("{day}");
        for session in group {
            println!("  {}", session.summary());
        }
    }
    Ok(())
}

fn configure(mut config: config::ConsoleConfig, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {}
        ConfigCommand::Set {
            api_base_url,
            timeout_secs,
            state_path,
        } => {
            if let Some(url) = api_base_url {
                config.api_base_url = url.trim().trim_end_matches('/').to_string();
            }
            if let Some(secs) = timeout_secs {
                config.request_timeout_secs = Some(secs);
            }
            if let Some(path) = state_path {
                config.state_path = Some(path);
            }
            config::save_config(&config)?;
        }
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
