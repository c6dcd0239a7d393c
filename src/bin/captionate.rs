use std::io::Read as _;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use captionate::{
    BlockFace, CaptionError, Editor, ExportFormat, FaceProvider, FontBook, ImageMime, StyleConfig,
    StylePatch, StyleUpdate,
};

#[derive(Parser, Debug)]
#[command(name = "captionate", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Caption a single image and write the result.
    Render(RenderArgs),
    /// Drive an editing session from a line-oriented script.
    Edit(EditArgs),
    /// Print the built-in presets and the default style as JSON.
    Presets,
    /// Serve static files over HTTP.
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct FontArgs {
    /// Extra font file to make available (repeatable).
    #[arg(long = "font-file")]
    font_files: Vec<PathBuf>,

    /// Draw text as solid blocks instead of resolving fonts.
    #[arg(long)]
    block_font: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input image (JPG, PNG, GIF or WebP).
    #[arg(long)]
    image: PathBuf,

    /// Output path; defaults to `captioned_image.<ext>`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Caption text; `\n` forces a line break.
    #[arg(long)]
    caption: Option<String>,

    /// JSON file with style fields to override.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Built-in preset applied before `--style` and `--set`.
    #[arg(long)]
    preset: Option<String>,

    /// Single style field, as `key=value` (repeatable).
    #[arg(long = "set", value_name = "KEY=VALUE")]
    sets: Vec<String>,

    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// JPEG quality in [0, 1].
    #[arg(long)]
    quality: Option<f32>,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Parser, Debug)]
struct EditArgs {
    /// Script file; reads stdin when omitted.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Directory that relative `load` and `save` paths are resolved against.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Directory to serve.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = captionate::serve::DEFAULT_PORT)]
    port: u16,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
}

impl From<FormatChoice> for ExportFormat {
    fn from(c: FormatChoice) -> Self {
        match c {
            FormatChoice::Png => Self::Png,
            FormatChoice::Jpeg => Self::Jpeg,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    captionate::logging::init(&cli.log_level, cli.log_json);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Edit(args) => cmd_edit(args),
        Command::Presets => cmd_presets(),
        Command::Serve(args) => cmd_serve(args),
    }
}

fn make_fonts(args: &FontArgs) -> anyhow::Result<Box<dyn FaceProvider>> {
    if args.block_font {
        return Ok(Box::new(BlockFace::default()));
    }
    let mut book = FontBook::with_system_fonts();
    for path in &args.font_files {
        book.load_font_file(path)?;
    }
    if book.is_empty() {
        tracing::warn!("no fonts found; drawing text as blocks");
        return Ok(Box::new(BlockFace::default()));
    }
    Ok(Box::new(book))
}

fn read_image(path: &Path) -> anyhow::Result<(Vec<u8>, ImageMime)> {
    let mime = ImageMime::from_path(path)?;
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    Ok((bytes, mime))
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn parse_set(raw: &str) -> anyhow::Result<StyleUpdate> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    Ok(StyleUpdate::parse(key, value)?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut style = StyleConfig::default();
    if let Some(name) = &args.preset {
        style.apply_patch(&captionate::preset(name)?.patch)?;
    }
    if let Some(path) = &args.style {
        style.apply_patch(&StylePatch::from_path(path)?)?;
    }
    for raw in &args.sets {
        style.apply(parse_set(raw)?)?;
    }
    if let Some(text) = &args.caption {
        style.apply(StyleUpdate::CaptionText(text.replace("\\n", "\n")))?;
    }
    if let Some(format) = args.format {
        style.apply(StyleUpdate::ExportFormat(format.into()))?;
    }
    if let Some(quality) = args.quality {
        style.apply(StyleUpdate::ExportQuality(quality))?;
    }

    let (bytes, mime) = read_image(&args.image)?;
    let image = captionate::decode_image(&bytes)
        .with_context(|| format!("decode {} '{}'", mime.as_str(), args.image.display()))?;

    let mut fonts = make_fonts(&args.fonts)?;
    let rendered = captionate::render(&image, &style, fonts.as_mut())?;
    tracing::info!(
        lines = rendered.layout.line_count(),
        width = rendered.surface.width(),
        height = rendered.surface.height(),
        "rendered caption"
    );

    let encoded = captionate::export(&rendered.surface, style.export_format, style.export_quality)?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(style.export_format.file_name()));
    write_output(&out, &encoded)
}

fn cmd_edit(args: EditArgs) -> anyhow::Result<()> {
    let script = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read script '{}'", path.display()))?,
        None => {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .context("read script from stdin")?;
            s
        }
    };

    let mut editor = Editor::new(make_fonts(&args.fonts)?)?;
    let mut clock = Instant::now();

    for (idx, raw) in script.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let result = run_edit_command(&mut editor, &mut clock, &args.dir, cmd, rest);
        match result {
            Ok(()) => {}
            Err(err) => match err.downcast_ref::<CaptionError>() {
                Some(e) if e.is_user_facing() => eprintln!("line {}: {e}", idx + 1),
                _ => return Err(err.context(format!("script line {}", idx + 1))),
            },
        }
    }
    editor.flush_pending()?;
    Ok(())
}

fn run_edit_command(
    editor: &mut Editor,
    clock: &mut Instant,
    dir: &Path,
    cmd: &str,
    rest: &str,
) -> anyhow::Result<()> {
    match cmd {
        "load" => {
            let (bytes, mime) = read_image(&dir.join(rest))?;
            editor.upload(&bytes, mime.as_str())?;
        }
        "set" => {
            let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            editor.update(StyleUpdate::parse(key, value)?)?;
        }
        "caption" => editor.update_caption_debounced(rest.replace("\\n", "\n"), *clock),
        "wait" => {
            let ms: u64 = rest
                .parse()
                .with_context(|| format!("wait expects milliseconds, got '{rest}'"))?;
            *clock += Duration::from_millis(ms);
            editor.tick(*clock)?;
        }
        "preset" => editor.apply_preset(rest)?,
        "render" => {
            editor.flush_pending()?;
            editor.render()?;
        }
        "save" => {
            editor.flush_pending()?;
            let download = editor.download()?;
            let out = if rest.is_empty() {
                dir.join(&download.file_name)
            } else {
                dir.join(rest)
            };
            write_output(&out, &download.bytes)?;
        }
        "reset" => editor.reset(),
        other => anyhow::bail!("unknown command '{other}'"),
    }
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    let presets: Vec<serde_json::Value> = captionate::presets()
        .into_iter()
        .map(|p| serde_json::json!({ "name": p.name, "patch": p.patch }))
        .collect();
    let doc = serde_json::json!({
        "default": StyleConfig::default(),
        "presets": presets,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address '{}:{}'", args.host, args.port))?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;
    runtime.block_on(captionate::serve::run(args.root, addr))
}
