//! CLI argument parsing using clap derive

use std::path::PathBuf;

use blog_core::SyncOptions;
use clap::{Parser, Subcommand};

use crate::settings::HostingType;

/// blogsync - Bidirectional sync between Markdown files and a Write.as blog
#[derive(Parser, Debug)]
#[command(name = "blogsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Write.as collection alias
    #[arg(short = 'a', long, env = "WRITEAS_ALIAS", global = true)]
    pub alias: Option<String>,

    /// Root directory of the blog [default: current directory]
    #[arg(short = 'r', long, global = true)]
    pub root: Option<PathBuf>,

    /// Write.as login
    #[arg(short = 'l', long, env = "WRITEAS_LOGIN", global = true)]
    pub login: Option<String>,

    /// Write.as password
    #[arg(
        short = 'p',
        long,
        env = "WRITEAS_PASS",
        hide_env_values = true,
        global = true
    )]
    pub password: Option<String>,

    /// Image hosting backend [default: snapas]
    #[arg(short = 't', long, value_enum, global = true)]
    pub image_hosting_type: Option<HostingType>,

    /// Image hosting login, the Write.as login if not specified
    #[arg(short = 'i', long, global = true)]
    pub image_login: Option<String>,

    /// Image hosting password, the Write.as password if not specified
    #[arg(short = 'v', long, global = true)]
    pub image_password: Option<String>,

    /// WebDAV endpoint URL
    #[arg(long, env = "WRITEAS_WEBDAV_URL", global = true)]
    pub webdav_endpoint: Option<String>,

    /// Public URL the WebDAV images are served from
    #[arg(long, env = "WRITEAS_WEBDAV_PUBLISHED_URL", global = true)]
    pub webdav_published_url: Option<String>,

    /// Snap.as API endpoint
    #[arg(short = 's', long, global = true)]
    pub snapas_endpoint: Option<String>,

    /// Write.as API endpoint
    #[arg(short = 'w', long, global = true)]
    pub writeas_endpoint: Option<String>,

    /// Settings file [default: <root>/blogsync.toml when present]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Synchronize your blog (download, then upload)
    Sync,

    /// Push your local changes to the remote blog
    Upload,

    /// Pull remote changes to your local blog
    Download,
}

impl Commands {
    pub fn options(self) -> SyncOptions {
        match self {
            Commands::Sync => SyncOptions::both(),
            Commands::Upload => SyncOptions::upload_only(),
            Commands::Download => SyncOptions::download_only(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_short_flags() {
        let cli = Cli::try_parse_from([
            "blogsync", "-a", "me", "-l", "user", "-p", "secret", "-t", "webdav", "-i", "dav",
            "-v", "davpass", "upload",
        ])
        .unwrap();

        assert_eq!(cli.alias.as_deref(), Some("me"));
        assert_eq!(cli.image_hosting_type, Some(HostingType::Webdav));
        assert_eq!(cli.image_password.as_deref(), Some("davpass"));
        assert_eq!(cli.command, Commands::Upload);
        assert!(!cli.verbose);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["blogsync", "download", "--verbose", "-r", "/blog"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.root, Some(PathBuf::from("/blog")));
    }

    #[test]
    fn rejects_unknown_hosting_type() {
        assert!(Cli::try_parse_from(["blogsync", "-t", "ftp", "sync"]).is_err());
    }

    #[test]
    fn commands_map_to_directions() {
        assert_eq!(Commands::Sync.options(), SyncOptions::both());
        assert_eq!(Commands::Upload.options(), SyncOptions::upload_only());
        assert_eq!(Commands::Download.options(), SyncOptions::download_only());
    }
}
