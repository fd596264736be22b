use std::path::Path;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use guild_core::application::errors::BotError;
use guild_core::application::messaging::{Dispatcher, EventRegistry};
use guild_core::application::services::{GuildConfigCache, Localizer};
use guild_core::domain::entities::CommandRegistry;
use guild_core::domain::traits::SettingsStore;
use guild_core::infrastructure::config::Config;
use guild_core::infrastructure::database::Database;
use guild_core::infrastructure::i18n;
use guild_core::infrastructure::storage::MemorySettingsStore;
use guild_core::plugins::streamers::{HttpStatusChecker, MemoryStreamerStore, StreamerStore, LEGACY_KEY};
use guild_core::plugins::{CorePlugin, PluginContext, PluginManager, StreamersPlugin};

#[derive(Parser)]
#[command(name = "guild-core")]
#[command(about = "Multi-guild chat bot core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Command prefix (overrides config)
    #[arg(short, long)]
    prefix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot with a console front end
    Run {
        /// Guild the console starts in
        #[arg(short, long, default_value = "console")]
        guild: String,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// List the languages found in the resource directory
    Languages,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config, cli.prefix);

    let result = match cli.command {
        Commands::Run { guild } => run_bot(config, guild),
        Commands::Version => {
            println!("guild-core v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
        Commands::Languages => list_languages(&config),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &str, prefix: Option<String>) -> Config {
    let mut config = if Path::new(path).exists() {
        Config::load(path)
            .map(Config::with_env)
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()
            })
    } else {
        Config::load_env()
    };

    if let Some(prefix) = prefix {
        config.bot.prefix = prefix;
    }
    config
}

fn run_bot(config: Config, guild: String) -> Result<(), BotError> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("failed to start runtime: {}", e)))?;
    rt.block_on(run(config, guild))
}

async fn run(config: Config, mut guild: String) -> Result<(), BotError> {
    config.validate()?;
    tracing::info!("Starting {}", config.bot.name);

    let database = match &config.storage.database {
        Some(path) => {
            let db = Database::new(path)
                .map_err(|e| BotError::Internal(format!("failed to open {}: {}", path.display(), e)))?;
            tracing::info!("Database initialized at {}", path.display());
            Some(db)
        }
        None => {
            tracing::warn!("No database configured, settings are kept in memory");
            None
        }
    };

    let settings_store: Arc<dyn SettingsStore> = match &database {
        Some(db) => Arc::new(db.clone()),
        None => Arc::new(MemorySettingsStore::new()),
    };
    let streamer_store: Arc<dyn StreamerStore> = match &database {
        Some(db) => Arc::new(db.clone()),
        None => Arc::new(MemoryStreamerStore::new()),
    };

    let guild_config = Arc::new(GuildConfigCache::new(settings_store));
    let localizer = Arc::new(
        Localizer::new(&config.localization.directory, Arc::clone(&guild_config))
            .with_default_language(&config.localization.default_language),
    );
    if let Err(e) = localizer.load() {
        tracing::warn!("Starting without translations: {}", e);
    }

    let registry = Arc::new(CommandRegistry::new());
    let events = Arc::new(EventRegistry::new());

    let ctx = PluginContext::new(
        Arc::clone(&registry),
        Arc::clone(&events),
        Arc::clone(&guild_config),
        Arc::clone(&localizer),
    );
    let mut plugins = PluginManager::new(ctx);
    plugins.register(CorePlugin)?;
    if config.plugins.streamers.enabled {
        let checker = HttpStatusChecker::new(config.plugins.streamers.twitch_client_id.clone());
        plugins.register(StreamersPlugin::new(streamer_store, Arc::new(checker)))?;
    }
    for (name, e) in plugins.start_all().await {
        tracing::error!("Plugin {} not started: {}", name, e);
    }
    tracing::info!("{} commands available", registry.len());

    // Guilds still on the old streamer format get converted as if just joined
    if let Some(db) = &database {
        for guild_id in db.guilds_with_setting(LEGACY_KEY).await? {
            events.emit_guild_joined(&guild_id).await;
        }
    }

    let dispatcher = Dispatcher::new(
        config.bot.prefix.clone(),
        Arc::clone(&registry),
        Arc::clone(&guild_config),
        Arc::clone(&localizer),
    );

    println!("guild-core console. Type {}help, :guild <id>, :join <id>, :plugins or :quit", dispatcher.prefix());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(rest) = input.strip_prefix(':') {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("quit"), _) => break,
                (Some("guild"), Some(id)) => {
                    guild = id.to_string();
                    println!("[{}] switched", guild);
                }
                (Some("join"), Some(id)) => {
                    let handled = events.emit_guild_joined(id).await;
                    println!("[{}] joined ({} handlers)", id, handled);
                }
                (Some("plugins"), _) => {
                    for info in plugins.list_plugins() {
                        let state = if info.running { "running" } else { "stopped" };
                        println!("{} ({}): {}", info.name, state, info.description);
                    }
                }
                _ => println!("Console commands: :guild <id>, :join <id>, :plugins, :quit"),
            }
            continue;
        }

        match dispatcher.respond(&guild, input).await {
            Some(result) if result.ok => println!("[{}] {}", guild, result.message),
            Some(result) => println!("[{}] Error: {}", guild, result.message),
            None => {}
        }
    }

    plugins.stop_all().await;
    tracing::info!("Bye");
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config)
        .map_err(|e| BotError::Internal(format!("failed to render config: {}", e)))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}

fn list_languages(config: &Config) -> Result<(), BotError> {
    let bundles = i18n::load_bundles(&config.localization.directory)?;
    let mut codes: Vec<_> = bundles.values().collect();
    codes.sort_by(|a, b| a.code.cmp(&b.code));

    for bundle in codes {
        let marker = if bundle.code == config.localization.default_language { " (default)" } else { "" };
        println!("{}{}: {} messages", bundle.code, marker, bundle.len());
    }
    Ok(())
}
