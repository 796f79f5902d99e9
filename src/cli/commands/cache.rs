//! Cache command - inspect or clear the page cache

use crate::cache::PageCache;
use crate::cli::args::{CacheAction, CacheArgs};
use crate::config::{Config, ConfigManager};
use crate::error::ProbeResult;
use crate::ui::{self, UiContext};

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> ProbeResult<()> {
    let root = ConfigManager::cache_dir(config);

    match args.action {
        CacheAction::Path => {
            println!("{}", root.display());
            Ok(())
        }
        CacheAction::Stats => show_stats(&PageCache::open(root).await?).await,
        CacheAction::Clear { yes } => clear(&PageCache::open(root).await?, yes).await,
    }
}

async fn show_stats(cache: &PageCache) -> ProbeResult<()> {
    let ctx = UiContext::detect();
    let stats = cache.stats().await?;

    ui::key_value(&ctx, "Directory", &cache.root().display().to_string());
    ui::key_value(&ctx, "Pages", &stats.entries.to_string());
    ui::key_value(&ctx, "Size", &format_bytes(stats.bytes));
    ui::key_value_status(
        &ctx,
        "Interrupted writes",
        &stats.stray_temp.to_string(),
        stats.stray_temp == 0,
    );

    Ok(())
}

async fn clear(cache: &PageCache, yes: bool) -> ProbeResult<()> {
    let ctx = UiContext::detect();

    if !yes {
        ui::step_warn(
            &ctx,
            &format!("This removes every page under {}", cache.root().display()),
            Some("Re-run with --yes to confirm"),
        );
        return Ok(());
    }

    let removed = cache.clear().await?;
    ui::step_ok(&ctx, &format!("Removed {} cached pages", removed));
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KIB {
        format!("{} B", bytes)
    } else if value < KIB * KIB {
        format!("{:.1} KiB", value / KIB)
    } else if value < KIB * KIB * KIB {
        format!("{:.1} MiB", value / (KIB * KIB))
    } else {
        format!("{:.1} GiB", value / (KIB * KIB * KIB))
    }
}
