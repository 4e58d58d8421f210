use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::preview::host::{get_preview_cache_dir, DEFAULT_PREVIEW_PAGE};

/// Slot config location relative to the site root
const DEFAULT_SLOT_CONFIG: &str = "image-replacer/image-config.json";

/// Replace a static website's images and videos, with live preview
#[derive(Debug, Clone, Parser)]
#[command(name = "site-media-editor", version, about)]
pub struct Cli {
    /// Root directory of the website being edited
    #[arg(long, env = "SITE_MEDIA_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Slot config file [default: <root>/image-replacer/image-config.json]
    #[arg(long)]
    pub slots: Option<PathBuf>,

    /// Page previewed on startup
    #[arg(long, default_value = DEFAULT_PREVIEW_PAGE)]
    pub page: String,

    /// Where rendered previews are written [default: user cache directory]
    #[arg(long)]
    pub preview_dir: Option<PathBuf>,
}

/// Resolved runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub root: PathBuf,
    pub slot_config: PathBuf,
    pub start_page: String,
    pub preview_dir: PathBuf,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        let slot_config = cli.slots.unwrap_or_else(|| cli.root.join(DEFAULT_SLOT_CONFIG));
        Self {
            slot_config,
            start_page: cli.page,
            preview_dir: cli.preview_dir.unwrap_or_else(get_preview_cache_dir),
            root: cli.root,
        }
    }
}

/// Install the global log subscriber. `RUST_LOG` overrides the default level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_derive_from_root() {
        let cli = Cli::try_parse_from(["site-media-editor", "--root", "/srv/site"]).unwrap();
        let config = AppConfig::from(cli);

        assert_eq!(config.root, PathBuf::from("/srv/site"));
        assert_eq!(config.slot_config, PathBuf::from("/srv/site/image-replacer/image-config.json"));
        assert_eq!(config.start_page, "portfolio.html");
    }

    #[test]
    fn test_explicit_paths_win() {
        let cli = Cli::try_parse_from([
            "site-media-editor",
            "--root",
            "/srv/site",
            "--slots",
            "/etc/slots.json",
            "--page",
            "index.html",
            "--preview-dir",
            "/tmp/previews",
        ])
        .unwrap();
        let config = AppConfig::from(cli);

        assert_eq!(config.slot_config, PathBuf::from("/etc/slots.json"));
        assert_eq!(config.start_page, "index.html");
        assert_eq!(config.preview_dir, PathBuf::from("/tmp/previews"));
    }
}
