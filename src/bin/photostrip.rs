use std::{
    io::{Read as _, Write as _},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "photostrip", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a strip request and print the JSON response.
    Render(RenderArgs),
    /// Print the JSON layout of a uniform grid.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Request JSON file, or `-` for stdin.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Also write the encoded image to this path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Base directory for relative photo paths. Defaults to the request file's directory.
    #[arg(long)]
    photo_root: Option<PathBuf>,

    /// Decode worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Include the failed stage and error chain in failure responses.
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Number of rows (1..=6).
    #[arg(long)]
    rows: u32,

    /// Number of columns (1..=6).
    #[arg(long)]
    cols: u32,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Layout(args) => cmd_layout(args).map(|()| true),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("PHOTOSTRIP_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns `Ok(false)` when the run produced a failure response.
///
/// Requests that do not parse still get a failure response on stdout.
fn cmd_render(args: RenderArgs) -> anyhow::Result<bool> {
    let text = read_request(&args.in_path)?;

    let mut config = photostrip::EngineConfig::from_env();
    config.font_dirs.extend(args.font_dirs);
    if let Some(n) = args.threads {
        config.threads = Some(n);
    }
    config.debug |= args.debug;
    if let Some(root) = args.photo_root {
        config.photo_root = Some(root);
    } else if config.photo_root.is_none() && args.in_path != Path::new("-") {
        config.photo_root = Some(
            args.in_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf(),
        );
    }
    let debug = config.debug;
    let rejected = |error| {
        photostrip::RunFailure {
            stage: photostrip::Stage::Pending,
            error,
        }
        .to_response(debug)
    };

    let prepared = photostrip::StripRequest::from_json(&text).and_then(|request| {
        photostrip::StripEngine::new(config).map(|engine| (request, engine))
    });
    let (response, ok) = match prepared {
        Err(e) => (rejected(e), false),
        Ok((request, engine)) => match engine.run(&request) {
            Ok(output) => {
                if let Some(out) = &args.out {
                    write_output(out, &output.encoded.bytes)?;
                }
                (output.to_response(), true)
            }
            Err(failure) => (failure.to_response(debug), false),
        },
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", response.to_json()?).context("write response")?;
    Ok(ok)
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let layout = photostrip::Layout::grid(args.rows, args.cols);
    let json = serde_json::to_string(&layout).context("serialize layout")?;
    println!("{json}");
    Ok(())
}

fn read_request(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read request from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("read request '{}'", path.display()))
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write image '{}'", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote strip");
    Ok(())
}
