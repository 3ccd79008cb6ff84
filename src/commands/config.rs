use crate::TreesourceContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - Failed to set the configuration value
/// - Failed to save configuration
pub fn execute(
    ctx: &mut TreesourceContext,
    key: Option<&str>,
    value: Option<&str>,
    list: bool,
) -> Result<()> {
    // If --list flag is set or no key is provided, show all configuration
    let Some(key) = key.filter(|_| !list) else {
        show_all_config(ctx);
        return Ok(());
    };

    if let Some(val) = value {
        ctx.config.set(key, val)?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Set {key} = {val}"));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else {
        output::warning(&format!("Configuration key '{key}' is not set"));
    }

    Ok(())
}

/// Show all configuration values
fn show_all_config(ctx: &TreesourceContext) {
    println!("{}", "[core]".bold());
    println!("  session = {}", ctx.config.core.session);
    println!("  save_delay_ms = {}", ctx.config.core.save_delay_ms);

    println!("\n{}", "[tracking]".bold());
    println!("  ignore_dot = {}", ctx.config.tracking.ignore_dot);
    println!("  sync_on_load = {}", ctx.config.tracking.sync_on_load);
}
