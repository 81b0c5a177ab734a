use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Pack directories into ZIP archives or disk images, and extract them again.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Opt {
    #[command(subcommand)]
    command: Command,

    /// Increase the log level, can be repeated
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Pack files or directories next to themselves
    Pack(commands::pack::Opt),
    /// Extract a ZIP archive
    Extract(commands::extract::Opt),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();

    let default_filter = match opt.verbose {
        0 => "rattler_pack=info",
        1 => "rattler_pack=debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match opt.command {
        Command::Pack(opt) => commands::pack::pack(opt).await,
        Command::Extract(opt) => commands::extract::extract(opt).await,
    }
}
