use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};

use cv_core::{
    Aroma, Body, Structure, Sweetness, Tannins, WineDraft, WineFilter, WinePatch, WineType, BLEND,
    SEED_ID_PREFIX,
};
use cv_fs::{
    load_config, render_wine_markdown, resolve_store_path, set_config_path, wine_file_name,
    CellarConfig, FsStore,
};
use cv_insights::{build_graph, find_pairings, matching_rules};
use cv_search::SearchClient;
use cv_sync::{is_temp_id, SyncSettings, WineRepository};

mod render;

#[derive(Parser)]
#[command(name = "cv", version, about = "CellarVault CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize the cellar store.
    Init {
        /// Optional path to initialize the store at.
        #[arg(long)]
        path: Option<String>,
    },
    /// List wines in the cellar.
    List {
        /// Skip the cache and reload from the store.
        #[arg(long)]
        refresh: bool,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long = "type")]
        wine_type: Option<WineType>,
        /// Match name, winery, region, or grape.
        #[arg(long)]
        text: Option<String>,
    },
    /// Show a wine card by id.
    Show { id: String },
    /// Add a wine.
    Add {
        name: String,
        #[command(flatten)]
        fields: WineFields,
    },
    /// Change fields of a wine.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: WineFields,
    },
    /// Delete a wine by id.
    Delete { id: String },
    /// List vintages, newest first.
    Years,
    /// List regions in the cellar.
    Regions,
    /// Suggest wines for a dish.
    Pair { dish: String },
    /// Print the relationship graph as JSON.
    Graph,
    /// Look up wines in the external catalogue.
    Search {
        query: String,
        /// Maximum number of hits.
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Add the hit with this number to the cellar.
        #[arg(long)]
        import: Option<usize>,
    },
    /// Export wine cards to a directory.
    Export { path: String },
}

#[derive(Args)]
struct WineFields {
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    winery: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long = "type")]
    wine_type: Option<WineType>,
    #[arg(long)]
    image: Option<String>,
    /// Grape variety; repeat for a blend.
    #[arg(long = "grape")]
    grapes: Vec<String>,
    #[arg(long)]
    body: Option<Body>,
    #[arg(long)]
    structure: Option<Structure>,
    #[arg(long)]
    tannins: Option<Tannins>,
    #[arg(long)]
    sweetness: Option<Sweetness>,
    #[arg(long)]
    aroma: Option<Aroma>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    pairing: Option<String>,
    #[arg(long)]
    storage: Option<String>,
    #[arg(long)]
    rating: Option<u8>,
}

impl WineFields {
    fn into_draft(self, name: String) -> WineDraft {
        let (grape, grapes) = match self.grapes.len() {
            0 => (None, None),
            1 => (self.grapes.first().cloned(), None),
            _ => (Some(BLEND.to_string()), Some(self.grapes)),
        };
        WineDraft {
            name: Some(name),
            region: self.region,
            winery: self.winery,
            year: self.year,
            wine_type: self.wine_type,
            image: self.image,
            grape,
            grapes,
            body: self.body,
            structure: self.structure,
            tannins: self.tannins,
            sweetness: self.sweetness,
            aroma: self.aroma,
            description: self.description,
            pairing: self.pairing,
            storage: self.storage,
            rating: self.rating,
        }
    }

    fn into_patch(self, name: Option<String>) -> WinePatch {
        let mut patch = WinePatch {
            name,
            region: self.region,
            winery: self.winery,
            year: self.year,
            wine_type: self.wine_type,
            image: self.image,
            body: self.body,
            structure: self.structure,
            tannins: self.tannins,
            sweetness: self.sweetness,
            aroma: self.aroma,
            description: self.description,
            pairing: self.pairing,
            storage: self.storage,
            rating: self.rating,
            ..WinePatch::default()
        };
        if !self.grapes.is_empty() {
            patch = patch.varietals(self.grapes);
        }
        patch
    }
}

type Repository = WineRepository<FsStore>;

pub fn run() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    if let Command::Init { path } = &cli.command {
        let path = path
            .clone()
            .map(PathBuf::from)
            .unwrap_or(FsStore::default_path()?);
        let store = FsStore::new(path.clone());
        store.init().context("failed to initialize store")?;
        set_config_path(&path)?;
        println!("Cellar initialized at {}", path.display());
        return Ok(());
    }

    let store = FsStore::new(resolve_store_path()?);
    if !store.exists() {
        return Err(anyhow!(
            "CellarVault is not initialized. Run `cellarvault init` to get started."
        ));
    }
    let config = load_config().context("failed to load config")?;
    let repository = WineRepository::new(Arc::new(store), settings_from(&config));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to initialize runtime")?;
    runtime.block_on(dispatch(&repository, &config, cli.command))
}

fn setup_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn settings_from(config: &CellarConfig) -> SyncSettings {
    let mut settings = SyncSettings::default();
    if let Some(validity) = config.cache_validity() {
        settings.cache_validity = validity;
    }
    settings
}

async fn dispatch(repository: &Repository, config: &CellarConfig, command: Command) -> Result<()> {
    match command {
        Command::List {
            refresh,
            year,
            region,
            wine_type,
            text,
        } => {
            let filter = WineFilter {
                year,
                region,
                wine_type,
                text,
            };
            list_wines(repository, refresh, &filter).await
        }
        Command::Show { id } => show_wine(repository, &id).await,
        Command::Add { name, fields } => add_wine(repository, fields.into_draft(name)).await,
        Command::Update { id, name, fields } => {
            ensure_writable(&id)?;
            repository
                .update(&id, fields.into_patch(name))
                .await
                .context("failed to update wine")?;
            Ok(())
        }
        Command::Delete { id } => {
            ensure_writable(&id)?;
            repository
                .delete(&id)
                .await
                .context("failed to delete wine")?;
            Ok(())
        }
        Command::Years => {
            repository.load(false).await;
            for year in repository.get_years() {
                println!("{year}");
            }
            Ok(())
        }
        Command::Regions => {
            repository.load(false).await;
            for region in repository.get_regions() {
                println!("{region}");
            }
            Ok(())
        }
        Command::Pair { dish } => {
            let wines = repository.load(false).await;
            let rules = matching_rules(&dish);
            if rules.is_empty() {
                warn!(dish = %dish, "pair: no pairing rule recognises this dish");
            } else {
                debug!(rules = ?rules, "pair: dish matched rules");
            }
            let matches = find_pairings(&wines, &dish);
            print_block(&render::pairing_rows(&matches));
            Ok(())
        }
        Command::Graph => {
            let wines = repository.load(false).await;
            let graph = build_graph(&wines);
            let json = serde_json::to_string_pretty(&graph).context("failed to encode graph")?;
            println!("{json}");
            Ok(())
        }
        Command::Search {
            query,
            limit,
            import,
        } => search_catalogue(repository, config, &query, limit, import).await,
        Command::Export { path } => export_wines(repository, &path).await,
        Command::Init { .. } => unreachable!("handled above"),
    }
}

async fn list_wines(repository: &Repository, refresh: bool, filter: &WineFilter) -> Result<()> {
    let wines = repository.load(refresh).await;
    report_offline(repository);
    print_block(&render::wine_rows(filter.apply(&wines)));
    Ok(())
}

async fn show_wine(repository: &Repository, id: &str) -> Result<()> {
    repository.load(false).await;
    let wine = repository.get(id).await.context("failed to get wine")?;
    let Some(wine) = wine else {
        return Err(anyhow!("no wine with id {id}"));
    };
    let markdown = render_wine_markdown(&wine).context("failed to render wine")?;
    println!("{markdown}");
    Ok(())
}

async fn add_wine(repository: &Repository, draft: WineDraft) -> Result<()> {
    let wine = repository.add(draft).await.context("failed to add wine")?;
    if is_temp_id(&wine.id) {
        eprintln!("warning: store unreachable, {} kept locally only", wine.name);
    }
    println!("{}", render::wine_row(&wine));
    Ok(())
}

async fn search_catalogue(
    repository: &Repository,
    config: &CellarConfig,
    query: &str,
    limit: usize,
    import: Option<usize>,
) -> Result<()> {
    let search = config
        .search
        .as_ref()
        .ok_or_else(|| anyhow!("no catalogue configured; set search.base_url in config.yaml"))?;
    let client = SearchClient::new(search.base_url.clone(), search.api_key.clone());
    let drafts = client
        .find(query, limit)
        .await
        .context("catalogue search failed")?;

    let Some(number) = import else {
        print_block(&render::draft_rows(&drafts));
        return Ok(());
    };
    let draft = number
        .checked_sub(1)
        .and_then(|index| drafts.get(index))
        .cloned()
        .ok_or_else(|| anyhow!("no catalogue hit numbered {number}"))?;
    debug!(number, "importing catalogue hit");
    add_wine(repository, draft).await
}

async fn export_wines(repository: &Repository, path: &str) -> Result<()> {
    let target = PathBuf::from(path);
    if !target.exists() {
        std::fs::create_dir_all(&target).context("failed to create export directory")?;
    }

    let wines = repository.load(true).await;
    report_offline(repository);
    for wine in wines.iter() {
        let dest = target.join(wine_file_name(wine));
        let content = render_wine_markdown(wine).context("failed to render wine")?;
        std::fs::write(dest, content).context("failed to export wine")?;
    }
    Ok(())
}

/// Built-in wines only live in memory; the store has no record to change.
fn ensure_writable(id: &str) -> Result<()> {
    if id.starts_with(SEED_ID_PREFIX) {
        return Err(anyhow!(
            "{id} is a built-in wine and cannot be changed; add it to the cellar first"
        ));
    }
    Ok(())
}

fn report_offline(repository: &Repository) {
    let state = repository.connection().state();
    if state.offline {
        warn!(state = %render::connection_row(state), "showing cached wines");
    }
}

fn print_block(block: &str) {
    if !block.is_empty() {
        println!("{block}");
    }
}
