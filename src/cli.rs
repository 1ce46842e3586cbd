use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_PKGNAME: &str = "aura-find";

#[derive(Parser, Debug)]
#[command(
    name = "aura-find",
    version,
    about = "Find application alternatives in the Arch repos, the AUR and the offline wiki index"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Offline index file (overrides config and default locations)"
    )]
    pub db: Option<PathBuf>,
    #[arg(long, global = true, help = "Log debug events to stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        #[arg(long, help = "Only search the offline index")]
        offline: bool,
        #[arg(long, help = "Fetch a favicon for every hit")]
        icons: bool,
    },
    Command {
        name: String,
        #[arg(long)]
        aur: bool,
    },
    Installed {
        name: String,
    },
    Install {
        name: String,
        #[arg(long)]
        aur: bool,
        #[arg(long, help = "Read the sudo password from the first line of stdin")]
        password_stdin: bool,
    },
    Uninstall {
        name: String,
        #[arg(long, help = "Read the sudo password from the first line of stdin")]
        password_stdin: bool,
    },
    Icons {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    Stage {
        #[arg(long)]
        pkgdir: PathBuf,
        #[arg(long, default_value = DEFAULT_PKGNAME)]
        pkgname: String,
        #[arg(long, default_value = ".")]
        srcdir: PathBuf,
        #[arg(long, default_value = "gui.py")]
        script: String,
        #[arg(long, default_value = "real_db.json")]
        index: String,
        #[arg(long, help = "Desktop entry file name [default: <pkgname>.desktop]")]
        desktop: Option<String>,
        #[arg(long, default_value = "python")]
        interpreter: String,
        #[arg(long = "sha256", value_name = "FILE=HEX|SKIP")]
        checksums: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    Build {
        #[arg(long)]
        wiki_dir: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Status,
}
