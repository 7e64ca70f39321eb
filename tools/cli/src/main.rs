//! KinVault CLI - Command line interface for family vault operations.
//!
//! This tool drives the vault access manager against a local backend
//! directory, acting as the identity given on the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use kinvault_common::{FamilyId, Identity, ItemId, ObjectPath, Role, UserId, Visibility};
use kinvault_storage::{create_default_registry, JsonRecordStore, ObjectStore};
use kinvault_vault::{
    config::RECORDS_FILENAME, AddItemRequest, FileUpload, StaticIdentityProvider,
    VaultAccessManager, VaultConfig,
};

#[derive(Parser)]
#[command(name = "kinvault")]
#[command(about = "KinVault - Shared family vault")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Local vault directory.
    #[arg(short, long, global = true, default_value = ".kinvault")]
    root: PathBuf,

    /// JSON configuration file (default: local layout under --root).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Acting user id.
    #[arg(short, long, global = true, default_value = "owner")]
    user: String,

    /// Acting family id.
    #[arg(short, long, global = true, default_value = "family")]
    family: String,

    /// Acting role: "owner", "admin", or "member".
    #[arg(long, global = true, default_value = "owner")]
    role: Role,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the items visible to the acting user.
    List,

    /// Add a text secret.
    AddText {
        #[arg(short, long)]
        title: String,

        /// Secret value; stored encrypted.
        #[arg(short, long)]
        secret: String,

        #[arg(long)]
        category: Option<String>,

        /// "parents", "family", or "member".
        #[arg(long, default_value = "family")]
        visibility: Visibility,

        /// Assigned user id (repeatable); required for "member" visibility.
        #[arg(short, long)]
        assign: Vec<String>,
    },

    /// Upload a file.
    AddFile {
        #[arg(short, long)]
        title: String,

        /// Source file to upload.
        #[arg(long)]
        file: PathBuf,

        /// Content type (default: application/octet-stream).
        #[arg(short, long)]
        mime: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long, default_value = "family")]
        visibility: Visibility,

        #[arg(short, long)]
        assign: Vec<String>,
    },

    /// Print the secret of a text item.
    Reveal {
        #[arg(short, long)]
        id: String,
    },

    /// Issue a time-limited link for a stored file.
    Url {
        #[arg(short, long)]
        path: String,
    },

    /// Download a file through a signed link.
    Fetch {
        #[arg(long)]
        url: String,

        /// Destination file path.
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Delete an item and its file.
    Delete {
        #[arg(short, long)]
        id: String,

        /// Stored file path (default: the file the item references).
        #[arg(short, long)]
        path: Option<String>,
    },
}

/// Manager and collaborators opened for one command.
struct Session {
    manager: VaultAccessManager,
    objects: Arc<dyn ObjectStore>,
    identity: Identity,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let ctx = open(&cli).await?;

    match cli.command {
        Commands::List => cmd_list(&ctx).await,

        Commands::AddText {
            title,
            secret,
            category,
            visibility,
            assign,
        } => {
            let request = AddItemRequest::text(title, secret, visibility);
            cmd_add(&ctx, with_options(request, category, assign)?).await
        }

        Commands::AddFile {
            title,
            file,
            mime,
            category,
            visibility,
            assign,
        } => {
            let upload = read_upload(&file, mime).await?;
            let request = AddItemRequest::file(title, upload, visibility);
            cmd_add(&ctx, with_options(request, category, assign)?).await
        }

        Commands::Reveal { id } => cmd_reveal(&ctx, &id).await,

        Commands::Url { path } => cmd_url(&ctx, &path).await,

        Commands::Fetch { url, out } => cmd_fetch(&ctx, &url, &out).await,

        Commands::Delete { id, path } => cmd_delete(&ctx, &id, path.as_deref()).await,
    }
}

/// Load configuration and wire the manager to the local backends.
async fn open(cli: &Cli) -> Result<Session> {
    let config = match &cli.config {
        Some(path) => VaultConfig::load(path).context("Failed to load configuration")?,
        None => VaultConfig::local(&cli.root),
    };

    let records_path = config
        .records_path
        .clone()
        .unwrap_or_else(|| cli.root.join(RECORDS_FILENAME));
    let records = Arc::new(JsonRecordStore::new(records_path));

    let objects = create_default_registry()
        .resolve(
            &config.object_store.provider_type,
            config.object_store.provider_config.clone(),
        )
        .context("Failed to open object store")?;

    let auth = Arc::new(StaticIdentityProvider::new());
    let manager = VaultAccessManager::from_config(&config, records, objects.clone(), auth.clone())
        .with_context(|| format!("Failed to configure vault (is {} set?)", config.cipher_key_env))?;

    let caller = Identity::new(
        UserId::new(cli.user.as_str()).context("Invalid user id")?,
        FamilyId::new(cli.family.as_str()).context("Invalid family id")?,
        cli.role,
    );
    let token = auth.sign_in(caller).await;
    let identity = manager
        .identity_for(&token)
        .await
        .context("Failed to resolve identity")?;

    Ok(Session {
        manager,
        objects,
        identity,
    })
}

fn with_options(
    mut request: AddItemRequest,
    category: Option<String>,
    assign: Vec<String>,
) -> Result<AddItemRequest> {
    if let Some(category) = category {
        request = request.with_category(category);
    }
    if !assign.is_empty() {
        let users = assign
            .into_iter()
            .map(UserId::new)
            .collect::<kinvault_common::Result<Vec<_>>>()
            .context("Invalid assignee")?;
        request = request.with_assignees(users);
    }
    Ok(request)
}

async fn read_upload(file: &Path, mime: Option<String>) -> Result<FileUpload> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .context("Source has no file name")?;
    Ok(FileUpload::new(file_name, mime.unwrap_or_default(), data))
}

/// List visible items.
async fn cmd_list(ctx: &Session) -> Result<()> {
    let items = ctx
        .manager
        .list_items(&ctx.identity)
        .await
        .context("Failed to list items")?;

    if items.is_empty() {
        println!("No visible items.");
        return Ok(());
    }

    for item in items {
        let location = item
            .file_path()
            .map(|p| format!(" -> {}", p))
            .unwrap_or_default();
        println!(
            "  {} [{:?}] {} ({}, {}) {}{}",
            item.id,
            item.kind(),
            item.title,
            item.category,
            item.visibility,
            item.created_at.format("%Y-%m-%d %H:%M"),
            location
        );
    }

    Ok(())
}

/// Add an item.
async fn cmd_add(ctx: &Session, request: AddItemRequest) -> Result<()> {
    info!("Adding item: {}", request.title);

    let created = ctx
        .manager
        .add_item(&ctx.identity, request)
        .await
        .context("Failed to add item")?;

    println!("Item added successfully!");
    println!("  ID: {}", created.id);
    if let Some(path) = created.file_path {
        println!("  File: {}", path);
    }

    Ok(())
}

/// Print a decrypted secret.
async fn cmd_reveal(ctx: &Session, id: &str) -> Result<()> {
    let id = ItemId::new(id).context("Invalid item id")?;
    let secret = ctx
        .manager
        .reveal_secret(&ctx.identity, &id)
        .await
        .context("Failed to reveal secret")?;

    println!("{}", secret.expose());

    Ok(())
}

/// Print a signed link.
async fn cmd_url(ctx: &Session, path: &str) -> Result<()> {
    let path = ObjectPath::parse(path).context("Invalid file path")?;
    let link = ctx
        .manager
        .get_file_access_url(&path)
        .await
        .context("Failed to issue link")?;

    println!("{}", link.url);
    println!("  Expires: {}", link.expires_at);

    Ok(())
}

/// Download through a signed link.
async fn cmd_fetch(ctx: &Session, url: &str, out: &Path) -> Result<()> {
    let content = ctx
        .objects
        .open_signed(url)
        .await
        .context("Failed to open link")?;

    tokio::fs::write(out, &content)
        .await
        .context("Failed to write output file")?;

    println!("File saved: {} ({} bytes)", out.display(), content.len());

    Ok(())
}

/// Delete an item and its file.
async fn cmd_delete(ctx: &Session, id: &str, path: Option<&str>) -> Result<()> {
    let id = ItemId::new(id).context("Invalid item id")?;

    let path = path
        .map(|p| ObjectPath::parse(p).context("Invalid file path"))
        .transpose()?;

    let outcome = ctx
        .manager
        .delete_item(&id, path.as_ref())
        .await
        .context("Failed to delete item")?;

    println!("Item deleted: {}", outcome.item_id);
    if let Some(removed) = outcome.removed_file {
        println!("  File removed: {}", removed);
    }
    if let Some(orphan) = outcome.orphaned_file {
        println!("  Warning: file left in storage: {} ({})", orphan.path, orphan.error);
    }

    Ok(())
}
