//! End-to-end tests over settings, translation, plugins and migration
//! Run with: cargo test --test guild_core_test

use std::fs;
use std::path::Path;
use std::sync::{Arc, Once};

use async_trait::async_trait;
use guild_core::application::errors::{CommandError, PluginError, StorageError};
use guild_core::application::messaging::{Dispatcher, EventRegistry};
use guild_core::application::services::{GuildConfigCache, Localizer};
use guild_core::domain::entities::{Command, CommandRegistry, GuildEventKind, LANGUAGE_KEY};
use guild_core::domain::traits::SettingsStore;
use guild_core::infrastructure::database::Database;
use guild_core::infrastructure::storage::MemorySettingsStore;
use guild_core::plugins::streamers::{
    StatusChecker, StatusError, StreamPlatform, StreamStatus, StreamerStore, LEGACY_KEY,
};
use guild_core::plugins::{CorePlugin, PluginContext, PluginManager, StreamersPlugin};
use tempfile::TempDir;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Reports every streamer as existing; only "ninja" is live
struct FakeChecker;

#[async_trait]
impl StatusChecker for FakeChecker {
    async fn check_status(&self, _platform: StreamPlatform, username: &str) -> Result<StreamStatus, StatusError> {
        if username == "ninja" {
            Ok(StreamStatus {
                live: true,
                status: Some("Road to 100".to_string()),
                game: Some("Fortnite".to_string()),
                started_at: None,
            })
        } else {
            Ok(StreamStatus::offline())
        }
    }

    async fn streamer_exists(&self, _platform: StreamPlatform, username: &str) -> Result<bool, StatusError> {
        Ok(username != "ghost")
    }
}

fn write_languages(dir: &Path) {
    fs::write(
        dir.join("en.properties"),
        "greeting=Hello %s\ncommand.unknown=No such command: %s\nlanguage.set=Language set to %s.\n\
         setting.saved=%s set to %s.\nsetting.value=%s = %s\n\
         addstreamer.added=%s on %s is now followed.\nstreamers.header=Streamers:\n\
         streamers.live=%s is live on %s: %s (%s)\nstreamers.offline=%s is offline on %s.\n",
    )
    .unwrap();
    fs::write(dir.join("fr.properties"), "greeting=Bonjour %s\nlanguage.set=Langue r\\u00e9gl\\u00e9e sur %s.\n").unwrap();
}

struct Bot {
    _languages: TempDir,
    config: Arc<GuildConfigCache>,
    localizer: Arc<Localizer>,
    registry: Arc<CommandRegistry>,
    events: Arc<EventRegistry>,
    streamers: Arc<dyn StreamerStore>,
    plugins: PluginManager,
    dispatcher: Dispatcher,
}

async fn bot_with(settings: Arc<dyn SettingsStore>, streamers: Arc<dyn StreamerStore>) -> Bot {
    ensure_init();
    let languages = TempDir::new().unwrap();
    write_languages(languages.path());

    let config = Arc::new(GuildConfigCache::new(settings));
    let localizer = Arc::new(Localizer::new(languages.path(), Arc::clone(&config)));
    assert_eq!(localizer.load().unwrap(), 2);

    let registry = Arc::new(CommandRegistry::new());
    let events = Arc::new(EventRegistry::new());
    let ctx = PluginContext::new(
        Arc::clone(&registry),
        Arc::clone(&events),
        Arc::clone(&config),
        Arc::clone(&localizer),
    );

    let mut plugins = PluginManager::new(ctx);
    plugins.register(CorePlugin).unwrap();
    plugins
        .register(StreamersPlugin::new(Arc::clone(&streamers), Arc::new(FakeChecker)))
        .unwrap();

    let dispatcher = Dispatcher::new("!", Arc::clone(&registry), Arc::clone(&config), Arc::clone(&localizer));

    Bot {
        _languages: languages,
        config,
        localizer,
        registry,
        events,
        streamers,
        plugins,
        dispatcher,
    }
}

async fn memory_bot() -> Bot {
    let db = Database::in_memory().unwrap();
    bot_with(Arc::new(MemorySettingsStore::new()), Arc::new(db)).await
}

#[tokio::test]
async fn settings_survive_invalidation_and_restart() {
    ensure_init();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("guilds.db");

    let config = GuildConfigCache::new(Arc::new(Database::new(&path).unwrap()));
    config.set_setting("g1", "prefix", "?").await.unwrap();
    config.invalidate("g1").await;
    assert_eq!(config.get_setting("g1", "prefix").await.unwrap().as_deref(), Some("?"));

    // A fresh cache over the same file sees the value
    let reopened = GuildConfigCache::new(Arc::new(Database::new(&path).unwrap()));
    assert_eq!(reopened.get_setting("g1", "prefix").await.unwrap().as_deref(), Some("?"));
    assert_eq!(reopened.get_setting("g2", "prefix").await.unwrap(), None);
}

#[tokio::test]
async fn unset_is_never_stale() {
    let config = GuildConfigCache::new(Arc::new(Database::in_memory().unwrap()));
    config.set_setting("g1", "k", "v").await.unwrap();
    assert!(config.get("g1").await.unwrap().contains("k"));

    config.unset_setting("g1", "k").await.unwrap();
    assert_eq!(config.get_setting("g1", "k").await.unwrap(), None);

    config.invalidate("g1").await;
    assert_eq!(config.get_setting("g1", "k").await.unwrap(), None);
}

#[tokio::test]
async fn failed_write_leaves_cache_untouched() {
    let store = Arc::new(MemorySettingsStore::new());
    let config = GuildConfigCache::new(Arc::clone(&store) as Arc<dyn SettingsStore>);
    config.set_setting("g1", "k", "old").await.unwrap();

    store.set_available(false);
    let result = config.set_setting("g1", "k", "new").await;
    assert!(matches!(result, Err(StorageError::Unavailable(_))));

    store.set_available(true);
    assert_eq!(config.get_setting("g1", "k").await.unwrap().as_deref(), Some("old"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_to_one_key_both_succeed() {
    let config = Arc::new(GuildConfigCache::new(Arc::new(Database::in_memory().unwrap())));

    let a = {
        let config = Arc::clone(&config);
        tokio::spawn(async move { config.set_setting("g1", "k", "a").await })
    };
    let b = {
        let config = Arc::clone(&config);
        tokio::spawn(async move { config.set_setting("g1", "k", "b").await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let cached = config.get_setting("g1", "k").await.unwrap().unwrap();
    assert!(cached == "a" || cached == "b");

    // Cache and store agree on the winner
    config.invalidate("g1").await;
    assert_eq!(config.get_setting("g1", "k").await.unwrap().unwrap(), cached);
}

#[tokio::test]
async fn translation_follows_guild_language() {
    let bot = memory_bot().await;

    assert_eq!(bot.localizer.translate("g1", "greeting", &["Ana"]).await.unwrap(), "Hello Ana");

    bot.config.set_setting("g1", LANGUAGE_KEY, "fr").await.unwrap();
    assert_eq!(bot.localizer.translate("g1", "greeting", &["Ana"]).await.unwrap(), "Bonjour Ana");

    // Other guilds keep the default
    assert_eq!(bot.localizer.translate("g2", "greeting", &["Ana"]).await.unwrap(), "Hello Ana");

    bot.config.unset_setting("g1", LANGUAGE_KEY).await.unwrap();
    assert_eq!(bot.localizer.translate("g1", "greeting", &["Ana"]).await.unwrap(), "Hello Ana");
}

#[tokio::test]
async fn reload_picks_up_new_files() {
    let bot = memory_bot().await;
    assert!(!bot.localizer.has_language("de"));

    fs::write(bot._languages.path().join("de.properties"), "greeting=Hallo %s\n").unwrap();
    assert_eq!(bot.localizer.reload().unwrap(), 3);

    bot.config.set_setting("g1", LANGUAGE_KEY, "de").await.unwrap();
    assert_eq!(bot.localizer.translate("g1", "greeting", &["Ana"]).await.unwrap(), "Hallo Ana");
}

#[tokio::test]
async fn plugins_register_and_remove_their_commands() {
    let mut bot = memory_bot().await;
    assert!(bot.plugins.start_all().await.is_empty());

    for name in ["help", "language", "reloadlanguages", "setting", "streamers", "addstreamer", "removestreamer"] {
        assert!(bot.registry.contains(name), "{} missing", name);
    }
    assert_eq!(bot.events.subscriber_count(GuildEventKind::GuildJoined), 1);

    bot.plugins.stop("streamers").await.unwrap();
    assert!(!bot.registry.contains("streamers"));
    assert!(bot.registry.contains("help"));
    assert_eq!(bot.events.subscriber_count(GuildEventKind::GuildJoined), 0);

    let listed: Vec<(String, bool)> = bot.plugins.list_plugins().into_iter().map(|p| (p.name, p.running)).collect();
    assert_eq!(listed, vec![("core".to_string(), true), ("streamers".to_string(), false)]);

    // Starting again after a stop works since the names are free
    bot.plugins.start("streamers").await.unwrap();
    assert!(bot.registry.contains("addstreamer"));

    bot.plugins.stop_all().await;
    assert!(bot.registry.is_empty());
    assert!(bot.plugins.list_plugins().iter().all(|p| !p.running));
}

#[tokio::test]
async fn failed_start_unwinds_partial_registrations() {
    let mut bot = memory_bot().await;
    bot.registry
        .register(Command::from_fn("setting", "Other", |_, _| Ok("taken".to_string())))
        .unwrap();

    let result = bot.plugins.start("core").await;
    assert!(matches!(
        result,
        Err(PluginError::Start { source: CommandError::Duplicate(ref name), .. }) if name == "setting"
    ));

    assert!(!bot.plugins.is_running("core"));
    assert!(!bot.registry.contains("help"));
    assert!(!bot.registry.contains("language"));
    // The command that blocked the start belongs to someone else and stays
    assert!(bot.registry.contains("setting"));
}

#[tokio::test]
async fn dispatcher_reports_unknown_commands() {
    let mut bot = memory_bot().await;
    bot.plugins.start_all().await;

    let result = bot.dispatcher.dispatch("g1", "nope", "").await;
    assert!(matches!(result, Err(CommandError::Unknown(ref name)) if name == "nope"));

    let reply = bot.dispatcher.respond("g1", "!nope").await.unwrap();
    assert!(!reply.ok);
    assert_eq!(reply.message, "No such command: nope");

    assert!(bot.dispatcher.respond("g1", "just chatting").await.is_none());
}

#[tokio::test]
async fn commands_change_settings_and_language() {
    let mut bot = memory_bot().await;
    bot.plugins.start_all().await;

    let reply = bot.dispatcher.respond("g1", "!setting set motd hello there").await.unwrap();
    assert!(reply.ok);
    assert_eq!(reply.message, "motd set to hello there.");
    assert_eq!(bot.config.get_setting("g1", "motd").await.unwrap().as_deref(), Some("hello there"));

    let reply = bot.dispatcher.respond("g1", "!language FR").await.unwrap();
    assert!(reply.ok);
    assert_eq!(reply.message, "Langue réglée sur fr.");
    assert_eq!(bot.config.get_setting("g1", LANGUAGE_KEY).await.unwrap().as_deref(), Some("fr"));

    let reply = bot.dispatcher.respond("g1", "!language xx").await.unwrap();
    assert!(!reply.ok);
}

#[tokio::test]
async fn streamer_commands_use_the_store() {
    let mut bot = memory_bot().await;
    bot.plugins.start_all().await;

    let reply = bot.dispatcher.respond("g1", "!addstreamer twitch ninja").await.unwrap();
    assert!(reply.ok);
    assert_eq!(reply.message, "ninja on TWITCH is now followed.");

    let reply = bot.dispatcher.respond("g1", "!addstreamer twitch ghost").await.unwrap();
    assert!(!reply.ok);

    bot.streamers.add("g1", StreamPlatform::Mixer, "sam").await.unwrap();
    let reply = bot.dispatcher.respond("g1", "!streamers").await.unwrap();
    assert_eq!(
        reply.message,
        "Streamers:\nninja is live on TWITCH: Road to 100 (Fortnite)\nsam is offline on MIXER."
    );
}

#[tokio::test]
async fn guild_join_migrates_legacy_streamers() {
    let mut bot = memory_bot().await;
    bot.plugins.start_all().await;

    bot.config
        .set_setting("g1", LEGACY_KEY, "ninja,TWITCH;badrecord;sam,MIXER")
        .await
        .unwrap();

    assert_eq!(bot.events.emit_guild_joined("g1").await, 1);

    let list = bot.streamers.list("g1").await.unwrap();
    assert!(list[&StreamPlatform::Twitch].contains("ninja"));
    assert!(list[&StreamPlatform::Mixer].contains("sam"));
    assert_eq!(list.values().map(|users| users.len()).sum::<usize>(), 2);
    assert_eq!(bot.config.get_setting("g1", LEGACY_KEY).await.unwrap(), None);

    // Joining again has nothing left to convert
    assert_eq!(bot.events.emit_guild_joined("g1").await, 1);
    assert_eq!(bot.streamers.list("g1").await.unwrap(), list);
}
