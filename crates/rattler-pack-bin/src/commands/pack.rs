use rattler_pack::{ArchiverBuilder, DiskImagePreference, ExecutionMode, IndicatifProgressReporter};
use regex::Regex;
use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
pub struct Opt {
    /// Files or directories to pack
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// When to create a disk image instead of a ZIP archive (macOS only):
    /// `always`, `never`, or a pattern matched against the path
    #[arg(long, value_name = "WHEN", value_parser = parse_disk_image_preference)]
    disk_image: Option<DiskImagePreference>,

    /// The hdiutil image format
    #[arg(long, default_value = "UDZO")]
    subformat: String,

    /// Store directories with their own name as prefix inside the archive
    #[arg(long)]
    keep_container_dir: bool,

    /// Maximum bytes of tool output accepted per stream
    #[arg(long, value_name = "BYTES")]
    max_output_buffer: Option<usize>,

    /// Start all tools in the background and wait for them together
    #[arg(long)]
    background: bool,

    /// Do not log progress messages
    #[arg(long)]
    silent: bool,

    /// Show a progress bar
    #[arg(long)]
    progress: bool,
}

fn parse_disk_image_preference(value: &str) -> Result<DiskImagePreference, regex::Error> {
    Ok(match value {
        "always" => DiskImagePreference::Always,
        "never" => DiskImagePreference::Never,
        pattern => DiskImagePreference::MatchesPattern(Regex::new(pattern)?),
    })
}

pub async fn pack(opt: Opt) -> anyhow::Result<()> {
    let mut builder = ArchiverBuilder::new()
        .with_disk_image_subformat(opt.subformat)
        .with_skip_container_directory(!opt.keep_container_dir)
        .with_silent(opt.silent)
        .with_execution_mode(if opt.background {
            ExecutionMode::Background
        } else {
            ExecutionMode::Blocking
        });
    if let Some(preference) = opt.disk_image {
        builder = builder.with_disk_image(preference);
    }
    if let Some(size) = opt.max_output_buffer {
        builder = builder.with_max_output_buffer_size(size);
    }

    // Packing blocks on the tools, keep it off the async workers.
    let paths = opt.paths.clone();
    let show_progress = opt.progress;
    let results = tokio::task::spawn_blocking(move || {
        if show_progress {
            builder
                .with_progress_reporter(IndicatifProgressReporter::with_default_style())
                .build()
                .pack_many(&paths)
        } else {
            builder.build().pack_many(&paths)
        }
    })
    .await?;

    // Failures are logged by the archiver, only count them here.
    let mut failures = 0usize;
    let mut pending = Vec::new();
    for result in results {
        match result {
            Ok(packed) => pending.push(async move {
                let outcome = packed.completion.wait().await;
                (packed.archive, outcome)
            }),
            Err(_) => failures += 1,
        }
    }

    for (archive, outcome) in futures::future::join_all(pending).await {
        match outcome {
            Ok(_) => println!("{}", archive.display()),
            Err(_) => failures += 1,
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} paths could not be packed", opt.paths.len());
    }
    Ok(())
}
