//! Command-line front end for the generation workflow.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use tailor_api::auth::{AnonymousAuth, AuthProvider, GoTrueAuth, OAuthProvider};
use tailor_api::client::upload::{HttpTextExtractor, UploadedFile};
use tailor_api::client::GatewayClient;
use tailor_api::config::ClientConfig;
use tailor_api::history::HistoryStore;
use tailor_api::models::ArtifactKind;
use tailor_api::session::SessionManager;
use tailor_api::workflow::{
    ArtifactStatus, GenerationWorkflow, NoticeLevel, SharedWorkflow,
};

#[derive(Parser)]
#[command(name = "tailor")]
#[command(about = "Tailor a resume and cover letter to a job description", long_about = None)]
struct Cli {
    /// Keeps signed-out history between runs in this JSON file
    #[arg(long, global = true, env = "TAILOR_HISTORY_FILE")]
    history_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a tailored resume, cover letter, or both
    Generate {
        #[arg(long, value_enum, default_value_t = Target::Both)]
        target: Target,

        /// Resume as a text file
        #[arg(long, conflicts_with = "upload")]
        resume: Option<PathBuf>,

        /// Resume as an uploaded .txt or .pdf file
        #[arg(long)]
        upload: Option<PathBuf>,

        /// Job description as a text file
        #[arg(long)]
        job: PathBuf,

        /// Also export each result as PDF into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Export a history entry as PDF (newest when no id is given)
    Export {
        #[arg(long)]
        id: Option<Uuid>,

        /// Only consider entries of this kind (resume or cover)
        #[arg(long)]
        kind: Option<ArtifactKind>,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Inspect or clear generation history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Print the OAuth sign-in URL
    LoginUrl {
        #[arg(long, value_enum, default_value_t = Provider::Github)]
        provider: Provider,
    },

    /// End the current session
    Logout,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List entries, newest first
    List,
    /// Delete every entry in the current scope
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Resume,
    Cover,
    Both,
}

impl Target {
    fn kinds(self) -> Vec<ArtifactKind> {
        match self {
            Target::Resume => vec![ArtifactKind::Resume],
            Target::Cover => vec![ArtifactKind::Cover],
            Target::Both => ArtifactKind::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Provider {
    Github,
    Google,
}

impl From<Provider> for OAuthProvider {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Github => OAuthProvider::Github,
            Provider::Google => OAuthProvider::Google,
        }
    }
}

/// Workflow plus the collaborators it was wired with.
struct App {
    workflow: SharedWorkflow,
    auth: Arc<dyn AuthProvider>,
    _session: SessionManager,
    history_file: Option<PathBuf>,
}

impl App {
    async fn start(config: &ClientConfig, history_file: Option<PathBuf>) -> Result<Self> {
        let backend = Arc::new(GatewayClient::new(&config.api_url)?);
        let extractor = Arc::new(HttpTextExtractor::new(&config.extraction_url)?);

        let store = HistoryStore::connect(config.database_url.as_deref()).await;
        // An unreadable snapshot is left on disk rather than overwritten.
        let history_file = history_file.filter(|path| store.restore_local(path));

        let auth: Arc<dyn AuthProvider> = match &config.auth {
            Some(auth_config) => {
                let gotrue = GoTrueAuth::new(auth_config, &config.site_url)?;
                if let Some(token) = &config.access_token {
                    if let Err(e) = gotrue.set_access_token(token.clone()).await {
                        warn!("Could not restore session: {e}");
                    }
                }
                Arc::new(gotrue)
            }
            None => Arc::new(AnonymousAuth::default()),
        };

        let workflow = Arc::new(Mutex::new(GenerationWorkflow::new(
            backend, extractor, store,
        )));
        let session = SessionManager::start(Arc::clone(&auth), Arc::clone(&workflow)).await;

        Ok(Self {
            workflow,
            auth,
            _session: session,
            history_file,
        })
    }

    /// Waits for history writes and saves the local snapshot.
    async fn finish(&self) {
        let mut wf = self.workflow.lock().await;
        let failed = wf.flush_background().await;
        if failed > 0 {
            warn!("{failed} history entries could not be saved");
        }
        if let Some(path) = &self.history_file {
            if let Err(e) = wf.store().save_local(path) {
                warn!("Could not write history file {}: {e}", path.display());
            }
        }
    }
}

fn print_notices(wf: &mut GenerationWorkflow) {
    for notice in wf.take_notices() {
        match notice.level {
            NoticeLevel::Success => eprintln!("✓ {}", notice.message),
            NoticeLevel::Error => eprintln!("✗ {}", notice.message),
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("tailor_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let app = App::start(&config, cli.history_file).await?;
    let outcome = run(&app, cli.command).await;
    app.finish().await;
    outcome
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Generate {
            target,
            resume,
            upload,
            job,
            out_dir,
        } => generate(app, target, resume, upload, job, out_dir).await,
        Commands::Export { id, kind, out_dir } => export(app, id, kind, &out_dir).await,
        Commands::History { action } => match action {
            HistoryAction::List => list_history(app).await,
            HistoryAction::Clear => clear_history(app).await,
        },
        Commands::LoginUrl { provider } => {
            println!("{}", app.auth.sign_in_url(provider.into())?);
            Ok(())
        }
        Commands::Logout => {
            app.auth.sign_out().await?;
            println!("Signed out");
            Ok(())
        }
    }
}

async fn generate(
    app: &App,
    target: Target,
    resume: Option<PathBuf>,
    upload: Option<PathBuf>,
    job: PathBuf,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let mut wf = app.workflow.lock().await;

    match (resume, upload) {
        (Some(path), _) => wf.set_resume(read_text(&path)?),
        (None, Some(path)) => {
            let file = UploadedFile::from_path(&path)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let loaded = wf.upload(file).await;
            print_notices(&mut wf);
            if !loaded {
                anyhow::bail!("Could not load resume from {}", path.display());
            }
        }
        (None, None) => anyhow::bail!("Provide --resume or --upload"),
    }
    wf.set_job_description(read_text(&job)?);

    let kinds = target.kinds();
    for kind in &kinds {
        if !wf.can_submit(*kind) {
            anyhow::bail!("Resume and job description must both be non-empty");
        }
    }
    match target {
        Target::Both => {
            wf.generate_both().await;
        }
        Target::Resume | Target::Cover => {
            wf.generate(kinds[0]).await;
        }
    }
    print_notices(&mut wf);

    let mut failed = 0;
    for kind in kinds {
        match wf.artifact(kind).status {
            ArtifactStatus::Ready => {
                println!("===== {} =====\n{}\n", kind.label(), wf.artifact(kind).text);
                if let Some(dir) = &out_dir {
                    wf.select_tab(kind);
                    if let Some(path) = wf.export_active(dir) {
                        info!("Wrote {}", path.display());
                    }
                    print_notices(&mut wf);
                }
            }
            _ => failed += 1,
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} generation(s) failed");
    }
    Ok(())
}

async fn export(
    app: &App,
    id: Option<Uuid>,
    kind: Option<ArtifactKind>,
    out_dir: &Path,
) -> Result<()> {
    let mut wf = app.workflow.lock().await;
    let entry_id = wf
        .history()
        .iter()
        .filter(|e| kind.map_or(true, |k| e.kind == k))
        .find(|e| id.map_or(true, |id| e.id == id))
        .map(|e| e.id)
        .context("No matching history entry")?;

    wf.load_from_history(entry_id);
    let path = wf.export_active(out_dir);
    print_notices(&mut wf);
    let path = path.context("Export failed")?;
    println!("{}", path.display());
    Ok(())
}

async fn list_history(app: &App) -> Result<()> {
    let wf = app.workflow.lock().await;
    if wf.history().is_empty() {
        println!("No history yet");
        return Ok(());
    }
    for entry in wf.history() {
        let preview: String = entry
            .output_text
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(60)
            .collect();
        println!(
            "{}  {:<6}  {}  {}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.kind.as_str(),
            entry.id,
            preview
        );
    }
    Ok(())
}

async fn clear_history(app: &App) -> Result<()> {
    let mut wf = app.workflow.lock().await;
    let cleared = wf.clear_history().await;
    print_notices(&mut wf);
    if !cleared {
        anyhow::bail!("Could not clear history");
    }
    Ok(())
}
