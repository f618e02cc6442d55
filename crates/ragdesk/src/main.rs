mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ragdesk_client::api::FileStatus;
use ragdesk_client::workflow::{AdminWorkflow, AutoConfirm, ChatWorkflow, Confirm, LoginWorkflow};
use ragdesk_client::{
    Action, ClientConfig, FileStore, Gateway, Outcome, Page, PageGuard, SessionProvider,
    WorkflowRegistry,
};

#[derive(Parser)]
#[command(name = "ragdesk")]
#[command(version, about = "Chat with and administer a RAG document assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML, JSON or YAML). Defaults to $RAGDESK_CONFIG
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    ///
    /// Examples:
    ///     ragdesk login --email admin@example.com
    ///     ragdesk login -e admin@example.com --password "$PASSWORD"
    #[command(verbatim_doc_comment)]
    Login {
        #[arg(short, long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and discard the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Ask a question about the uploaded documents
    ///
    /// Examples:
    ///     ragdesk chat What is the refund policy?
    ///     ragdesk chat "Summarize the onboarding guide"
    #[command(verbatim_doc_comment)]
    Chat {
        #[arg(value_name = "MESSAGE", required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Manage indexed documents (admin only)
    Files {
        #[command(subcommand)]
        command: FilesCommand,
    },
    /// Check backend health
    Health,
}

#[derive(Subcommand)]
enum FilesCommand {
    /// List uploaded files
    ///
    /// Examples:
    ///     ragdesk files list
    ///     ragdesk files list --status error
    #[command(verbatim_doc_comment)]
    List {
        /// Filter by status: uploaded, indexing, indexed, error
        #[arg(long)]
        status: Option<String>,
    },
    /// Upload a .txt, .md or .pdf file for indexing
    Upload {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Delete a file and its embeddings
    ///
    /// Examples:
    ///     ragdesk files delete 0b9ab0a4-2d3c-4a43-9c55-0a0c4d0e8a11
    ///     ragdesk files delete 0b9ab0a4-2d3c-4a43-9c55-0a0c4d0e8a11 --yes
    #[command(verbatim_doc_comment)]
    Delete {
        #[arg(value_name = "FILE_ID")]
        file_id: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Confirmation read from stdin, defaulting to no.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N]: ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) => input.trim().eq_ignore_ascii_case("y"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read confirmation");
                false
            }
        }
    }
}

/// Wired client components for one invocation.
struct App {
    session: Arc<SessionProvider>,
    gateway: Arc<Gateway>,
    guard: PageGuard,
    registry: WorkflowRegistry,
}

impl App {
    fn new(config: &ClientConfig, page: Page, confirm: Arc<dyn Confirm>) -> Result<Self> {
        let store_path = config.session_store_path()?;
        tracing::debug!(path = %store_path.display(), "Using session store");

        let session = Arc::new(SessionProvider::new(config, Arc::new(FileStore::new(store_path))));
        let gateway = Arc::new(Gateway::new(config, session.clone()));
        let guard = PageGuard::new(session.clone(), Arc::new(page.clone()));

        let mut registry = WorkflowRegistry::new(page);
        registry.register(LoginWorkflow::new(session.clone()));
        registry.register(ChatWorkflow::new(gateway.clone()));
        registry.register(AdminWorkflow::new(
            gateway.clone(),
            config.upload.clone(),
            confirm,
        ));

        Ok(Self {
            session,
            gateway,
            guard,
            registry,
        })
    }

    async fn run(self, command: Commands) -> Result<ExitCode> {
        let outcome = match command {
            Commands::Login { email, password } => {
                let password = match password {
                    Some(password) => password,
                    None => rpassword::prompt_password("Password: ")
                        .context("failed to read password")?,
                };
                self.registry.dispatch(Action::Login { email, password }).await
            }
            Commands::Logout => self.registry.dispatch(Action::Logout).await,
            Commands::Whoami => return Ok(self.whoami().await),
            Commands::Health => {
                let health = self.gateway.health().await?;
                println!(
                    "{} {}",
                    health.status,
                    health.timestamp.as_deref().unwrap_or_default()
                );
                return Ok(ExitCode::SUCCESS);
            }
            Commands::Chat { message } => {
                if !self.guard.require_auth().await {
                    return Ok(ExitCode::FAILURE);
                }
                let message = message.join(" ");
                self.registry.dispatch(Action::SubmitChat { message }).await
            }
            Commands::Files { command } => {
                let action = files_action(command)?;
                if !self.guard.require_admin().await {
                    if self.session.get_token().await.is_some() {
                        self.registry.page().error("admin access required");
                    }
                    return Ok(ExitCode::FAILURE);
                }
                let is_delete = matches!(action, Action::DeleteFile { .. });
                let outcome = self.registry.dispatch(action).await;
                if is_delete && matches!(outcome, Outcome::Skipped) {
                    println!("Operation cancelled.");
                }
                outcome
            }
        };

        Ok(match outcome {
            Outcome::Completed | Outcome::Skipped => ExitCode::SUCCESS,
            Outcome::Failed(_) => ExitCode::FAILURE,
        })
    }

    async fn whoami(&self) -> ExitCode {
        match self.session.get_current_user().await {
            Some(user) => {
                println!("{}", user.email);
                println!("id:    {}", user.id);
                println!(
                    "admin: {}",
                    if self.session.is_admin().await { "yes" } else { "no" }
                );
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("Not signed in.");
                ExitCode::FAILURE
            }
        }
    }
}

fn files_action(command: FilesCommand) -> Result<Action> {
    Ok(match command {
        FilesCommand::List { status } => Action::RefreshFiles {
            status: status
                .as_deref()
                .map(str::parse::<FileStatus>)
                .transpose()?,
        },
        FilesCommand::Upload { path } => Action::UploadFile { path: Some(path) },
        FilesCommand::Delete { file_id, .. } => Action::DeleteFile { file_id },
    })
}

fn confirm_for(command: &Commands) -> Arc<dyn Confirm> {
    match command {
        Commands::Files {
            command: FilesCommand::Delete { yes: true, .. },
        } => Arc::new(AutoConfirm(true)),
        _ => Arc::new(StdinConfirm),
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(
        identity = config.identity.url.as_deref().unwrap_or("<unset>"),
        api = config.api.base_url.as_deref().unwrap_or("<unset>"),
        "Configuration loaded"
    );

    let (page, rx) = Page::channel();
    let renderer = tokio::spawn(render::drain(rx));

    // Every page sender lives in the app; dropping it closes the channel.
    let result = match App::new(&config, page, confirm_for(&cli.command)) {
        Ok(app) => app.run(cli.command).await,
        Err(e) => Err(e),
    };

    renderer.await.context("renderer task failed")?;
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,ragdesk=info,ragdesk_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
