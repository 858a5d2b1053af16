use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::Context;
use crate::commands::log_blank;
use crate::error::CliError;
use crate::settings::API_KEY_ENV;

fn mask_value(s: &str) -> String {
    match s.get(..2) {
        Some(prefix) if s.len() > 2 => format!("{prefix}****"),
        _ => "****".to_string(),
    }
}

fn describe(value: Option<String>) -> String {
    value.unwrap_or_else(|| "(not set)".to_string())
}

/// Show the settings in effect and where they came from.
pub(crate) fn run_config_show(ctx: &Context) -> Result<(), CliError> {
    let path = &ctx.settings_path;
    log::info!(
        "{}",
        "gridport Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!(
        "  Override file: {}",
        ctx.overrides_path
            .display()
            .if_supports_color(Stdout, |t| t.cyan()),
    );
    log_blank();

    let settings = &ctx.settings;
    let from_env = std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty());
    let key_source = if from_env.is_some() {
        format!("(from {API_KEY_ENV})")
    } else {
        "(from settings file)".to_string()
    };
    match settings.api_key(from_env) {
        Some(key) => log::info!(
            "  {:<16} {} {}",
            "api_key",
            mask_value(&key),
            key_source.if_supports_color(Stdout, |t| t.dimmed()),
        ),
        None => log::info!(
            "  {:<16} {}",
            "api_key",
            "(not set)".if_supports_color(Stdout, |t| t.red()),
        ),
    }

    let fields = [
        ("base_url", settings.catalog.base_url.clone()),
        (
            "steam.path",
            settings
                .steam_root()
                .or_else(gridport_steam::default_root)
                .map(|p| p.display().to_string()),
        ),
        ("steam.user_id", settings.steam.user_id.clone()),
        (
            "library.path",
            settings.library_path().map(|p| p.display().to_string()),
        ),
    ];
    for (name, value) in fields {
        log::info!("  {name:<16} {}", describe(value));
    }

    let libraries = settings.oculus_libraries();
    if libraries.is_empty() {
        log::info!("  {:<16} {}", "oculus.libraries", describe(None));
    }
    for lib in libraries {
        log::info!("  {:<16} {}", "oculus.libraries", lib.display());
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path(ctx: &Context) -> Result<(), CliError> {
    println!("{}", ctx.settings_path.display());
    Ok(())
}
