//! Built-in commands: help, language selection and raw settings access

use std::sync::Arc;
use async_trait::async_trait;
use crate::application::errors::{CommandError, PluginError};
use crate::application::messaging::CommandContext;
use crate::domain::entities::{Command, CommandHandler, LANGUAGE_KEY};
use crate::plugins::trait_def::{Plugin, PluginContext};

pub const PLUGIN_NAME: &str = "core";

const GENERAL_CATEGORY: &str = "General Commands";
const ADMIN_CATEGORY: &str = "Admin Commands";

const COMMANDS: [&str; 4] = ["help", "language", "reloadlanguages", "setting"];

fn storage_failure(ctx: &CommandContext, e: impl std::fmt::Display) -> CommandError {
    tracing::warn!("[{}] {}", ctx.guild_id, e);
    ctx.fail("storage.unavailable", &[])
}

fn help_entry(ctx: &CommandContext, command: &Command) -> String {
    let name = format!("{}{}", ctx.prefix, command.name);
    ctx.t("help.entry", &[name.as_str(), command.description.as_deref().unwrap_or("")])
}

struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<String, CommandError> {
        if let Some(name) = args.first() {
            let command = ctx
                .registry()
                .get(name)
                .ok_or_else(|| ctx.fail("help.unknown", &[name.as_str()]))?;

            let mut text = help_entry(ctx, &command);
            if let Some(usage) = &command.usage {
                let usage = format!("{}{}", ctx.prefix, usage);
                text.push('\n');
                text.push_str(&ctx.t("help.usage", &[usage.as_str()]));
            }
            return Ok(text);
        }

        let mut lines = vec![ctx.t("help.header", &[])];
        for (category, commands) in ctx.registry().by_category() {
            lines.push(ctx.t("help.category", &[category.as_str()]));
            for command in commands {
                lines.push(help_entry(ctx, &command));
            }
        }
        Ok(lines.join("\n"))
    }
}

struct LanguageCommand;

#[async_trait]
impl CommandHandler for LanguageCommand {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<String, CommandError> {
        let localizer = ctx.localizer();

        let Some(code) = args.first() else {
            let current = ctx.settings.language().unwrap_or(localizer.default_language()).to_string();
            let available = localizer.list_languages().into_iter().collect::<Vec<_>>().join(", ");
            return Ok(ctx.t("language.current", &[current.as_str(), available.as_str()]));
        };

        let code = code.to_lowercase();
        if !localizer.has_language(&code) {
            return Err(ctx.fail("language.unknown", &[code.as_str()]));
        }

        ctx.set_setting(LANGUAGE_KEY, &code)
            .await
            .map_err(|e| storage_failure(ctx, e))?;

        // The context still holds the old snapshot; answer in the new language.
        Ok(localizer
            .translate_in(Some(&code), "language.set", &[code.as_str()])
            .unwrap_or_else(|_| ctx.t("language.set", &[code.as_str()])))
    }
}

struct ReloadLanguagesCommand;

#[async_trait]
impl CommandHandler for ReloadLanguagesCommand {
    async fn handle(&self, ctx: &CommandContext, _args: &[String]) -> Result<String, CommandError> {
        match ctx.localizer().reload() {
            Ok(count) => Ok(ctx.t("language.reloaded", &[count.to_string().as_str()])),
            Err(e) => {
                tracing::error!("Language reload failed: {}", e);
                Err(ctx.fail("language.reload_failed", &[e.to_string().as_str()]))
            }
        }
    }
}

struct SettingCommand;

#[async_trait]
impl CommandHandler for SettingCommand {
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<String, CommandError> {
        let usage = || ctx.fail("setting.usage", &[ctx.prefix.as_str()]);

        match args {
            [action, key] if action == "get" => Ok(match ctx.settings.get(key) {
                Some(value) => ctx.t("setting.value", &[key.as_str(), value]),
                None => ctx.t("setting.unset_value", &[key.as_str()]),
            }),
            [action, key, value @ ..] if action == "set" && !value.is_empty() => {
                let value = value.join(" ");
                ctx.set_setting(key, &value)
                    .await
                    .map_err(|e| storage_failure(ctx, e))?;
                Ok(ctx.t("setting.saved", &[key.as_str(), value.as_str()]))
            }
            [action, key] if action == "unset" => {
                ctx.unset_setting(key)
                    .await
                    .map_err(|e| storage_failure(ctx, e))?;
                Ok(ctx.t("setting.removed", &[key.as_str()]))
            }
            _ => Err(usage()),
        }
    }
}

/// Always-on plugin with the bot's own commands
pub struct CorePlugin;

#[async_trait]
impl Plugin for CorePlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn description(&self) -> &str {
        "Help, language and settings commands"
    }

    async fn start(&self, ctx: &PluginContext) -> Result<(), PluginError> {
        ctx.add_command(
            Command::new("help", GENERAL_CATEGORY, Arc::new(HelpCommand))
                .with_description("List commands or describe one")
                .with_usage("help [command]"),
        )?;
        ctx.add_command(
            Command::new("language", GENERAL_CATEGORY, Arc::new(LanguageCommand))
                .with_description("Show or change the guild language")
                .with_usage("language [code]"),
        )?;
        ctx.add_command(
            Command::new("reloadlanguages", ADMIN_CATEGORY, Arc::new(ReloadLanguagesCommand))
                .with_description("Reload the language files"),
        )?;
        ctx.add_command(
            Command::new("setting", ADMIN_CATEGORY, Arc::new(SettingCommand))
                .with_description("Read or change a guild setting")
                .with_usage("setting <get|set|unset> <key> [value]"),
        )?;
        Ok(())
    }

    async fn stop(&self, ctx: &PluginContext) {
        for name in COMMANDS {
            ctx.remove_command(name);
        }
    }
}
