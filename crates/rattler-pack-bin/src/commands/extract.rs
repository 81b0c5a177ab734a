use rattler_pack::ArchiverBuilder;
use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
pub struct Opt {
    /// The ZIP archive to extract
    archive: PathBuf,

    /// The directory to extract into (default: next to the archive)
    destination: Option<PathBuf>,

    /// Do not log progress messages
    #[arg(long)]
    silent: bool,
}

pub async fn extract(opt: Opt) -> anyhow::Result<()> {
    let archiver = ArchiverBuilder::new().with_silent(opt.silent).build();

    let extracted = tokio::task::spawn_blocking(move || {
        archiver.extract(&opt.archive, opt.destination.as_deref())
    })
    .await?
    .map_err(|err| anyhow::anyhow!("{err} (code {})", err.code()))?;

    extracted.completion.wait().await?;
    println!("{}", extracted.destination.display());
    Ok(())
}
