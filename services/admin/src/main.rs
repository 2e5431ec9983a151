use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use admin::{AdminError, AdminView, Confirm, Dashboard, PreviewRegistry, Tab};
use anyhow::Result;
use auth::SessionManager;
use clap::{Args, Parser, Subcommand};
use common::{
    config::ClientConfig,
    http::{HttpApi, PortfolioApi},
    models::PhotoMetadata,
    notify::{Level, Notifications},
    token_store::FileTokenStore,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(version, about = "Manage the portfolio: collections and photo uploads", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file, without extension
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with the admin password
    Login {
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show whether a valid session is stored
    Status,
    /// Create, edit and delete collections
    #[command(subcommand)]
    Collections(CollectionCommand),
    /// Upload photos into a collection
    Upload(UploadArgs),
}

#[derive(Subcommand)]
enum CollectionCommand {
    /// List every collection, published or not
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Keep the collection hidden from the public gallery
        #[arg(long)]
        draft: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        published: Option<bool>,
    },
    /// Delete a collection and all of its photos
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct UploadArgs {
    /// Target collection id
    #[arg(long)]
    collection: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Comma separated
    #[arg(long)]
    tags: Option<String>,
    #[arg(long)]
    camera: Option<String>,
    #[arg(long)]
    lens: Option<String>,
    #[arg(long)]
    aperture: Option<String>,
    #[arg(long)]
    shutter: Option<String>,
    #[arg(long)]
    iso: Option<String>,
    #[arg(long)]
    focal_length: Option<String>,
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl UploadArgs {
    fn metadata(&self) -> PhotoMetadata {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        PhotoMetadata {
            title: field(&self.title),
            description: field(&self.description),
            tags: field(&self.tags),
            camera: field(&self.camera),
            lens: field(&self.lens),
            aperture: field(&self.aperture),
            shutter: field(&self.shutter),
            iso: field(&self.iso),
            focal_length: field(&self.focal_length),
        }
    }
}

/// Asks on the terminal, anything but y/yes declines
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

fn read_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;

    let mut password = String::new();
    io::stdin().lock().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}

/// Print pending notifications, returning whether any was an error
fn flush(notifications: &mut Notifications) -> bool {
    let mut failed = false;
    for notification in notifications.drain() {
        failed |= notification.level == Level::Error;
        println!("{}", notification);
    }
    failed
}

async fn run_collections(dashboard: &mut Dashboard, command: CollectionCommand) -> bool {
    let manager = &mut dashboard.collections;
    manager.refresh().await;

    let ok = match command {
        CollectionCommand::List => {
            for collection in manager.collections() {
                let state = if collection.is_published { "published" } else { "draft" };
                println!("{}  {} ({})", collection.id, collection.name, state);
                if let Some(description) = &collection.description {
                    println!("    {}", description);
                }
            }
            true
        }
        CollectionCommand::Create {
            name,
            description,
            draft,
        } => {
            manager.start_create();
            let form = manager.form_mut();
            form.name = name;
            form.description = description.unwrap_or_default();
            form.is_published = !draft;
            manager.submit().await
        }
        CollectionCommand::Update {
            id,
            name,
            description,
            published,
        } => {
            let Some(collection) = manager.collections().iter().find(|c| c.id == id).cloned()
            else {
                println!("[error] Collection not found");
                return false;
            };
            manager.start_edit(&collection);
            let form = manager.form_mut();
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(published) = published {
                form.is_published = published;
            }
            manager.submit().await
        }
        CollectionCommand::Delete { id, yes } => {
            let confirm: &dyn Confirm = if yes { &AlwaysConfirm } else { &PromptConfirm };
            manager.delete(&id, confirm).await
        }
    };

    let failed = flush(manager.notifications_mut());
    ok && !failed
}

async fn run_upload(dashboard: &mut Dashboard, args: UploadArgs) -> bool {
    dashboard.select_tab(Tab::Upload);
    dashboard.load_active().await;

    let uploader = &mut dashboard.uploads;
    if !uploader.collections().iter().any(|c| c.id == args.collection) {
        flush(uploader.notifications_mut());
        println!("[error] Collection not found");
        return false;
    }

    uploader.select_collection(&args.collection);
    *uploader.metadata_mut() = args.metadata();
    for rejected in uploader.queue_mut().add(args.files) {
        println!("[info] Skipped: {}", rejected);
    }

    let ok = match uploader.submit().await {
        Ok(report) => {
            for result in &report.results {
                match &result.error {
                    None => println!("  uploaded {}", result.file_name),
                    Some(error) => println!("  failed   {}: {}", result.file_name, error),
                }
            }
            report.is_success()
        }
        Err(_) => false,
    };

    let failed = flush(uploader.notifications_mut());
    ok && !failed
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::load(path),
        None => ClientConfig::from_env(),
    }
    .unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        exit(1);
    });

    let api: Arc<dyn PortfolioApi> = Arc::new(HttpApi::new(&config)?);
    let session = Arc::new(SessionManager::new(
        api,
        Arc::new(FileTokenStore::new(&config.token_path)),
    ));

    if let Commands::Login { password } = &cli.command {
        let password = match password {
            Some(password) => password.clone(),
            None => read_password()?,
        };
        let outcome = session.login(&password).await;
        if outcome.success {
            println!("[ok] Logged in");
            return Ok(());
        }
        eprintln!(
            "[error] {}",
            outcome.message.as_deref().unwrap_or("Login failed")
        );
        exit(1);
    }

    session.restore().await;

    let ok = match cli.command {
        Commands::Login { .. } => true,
        Commands::Logout => {
            session.logout();
            println!("[ok] Logged out");
            true
        }
        Commands::Status => {
            match AdminView::for_session(&session) {
                AdminView::Dashboard => println!("Logged in ({})", config.api_url),
                _ => println!("Not logged in ({})", config.api_url),
            }
            true
        }
        command => {
            if !session.is_authenticated() {
                eprintln!("[error] {}", AdminError::NotAuthenticated);
                exit(1);
            }

            let mut dashboard = Dashboard::new(session.clone(), PreviewRegistry::new());
            match command {
                Commands::Collections(command) => run_collections(&mut dashboard, command).await,
                Commands::Upload(args) => run_upload(&mut dashboard, args).await,
                _ => true,
            }
        }
    };

    info!("Admin command finished");
    if !ok {
        exit(1);
    }
    Ok(())
}
