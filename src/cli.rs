// ============================================================================
// GridPaint CLI: headless replay of recorded input scripts
// ============================================================================
//
// Usage examples:
//   gridpaint --replay strokes.txt                       (numbered file in export_dir)
//   gridpaint --replay strokes.txt -o out.png
//   gridpaint --replay strokes.txt -o out.jpg --export-width 960 --export-height 640
//
// Script format, one command per line (`#` starts a comment):
//   tool pencil|eraser|pipette|line|rectangle|ellipse|arc
//   color R G B [A]
//   down X Y / move X Y / up          (window coordinates)
//   shift on|off
//   zoom in|out
//   resize W H
//   undo
//   clear
//
// No window is opened. The script runs synchronously against a fresh session.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use eframe::egui::Pos2;
use image::Rgba;

use crate::compositor::{self, SHEET};
use crate::components::tools::Tool;
use crate::io::{self, ExportError, ExportFormat};
use crate::ops::canvas_ops::ZoomDirection;
use crate::session::{InputEvent, Session};
use crate::settings::AppSettings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// GridPaint headless replay.
///
/// Runs a script of input events against a fresh canvas and exports the result.
#[derive(Parser, Debug)]
#[command(
    name = "gridpaint",
    about = "GridPaint headless input replay",
    long_about = "Replay a text script of pointer, tool and zoom events against a\n\
                  fresh canvas without opening the GUI, then export the drawing.\n\n\
                  Example:\n  \
                  gridpaint --replay strokes.txt -o drawing.png"
)]
pub struct CliArgs {
    /// Script of input events to replay.
    #[arg(long, value_name = "FILE")]
    pub replay: PathBuf,

    /// Output file path. When omitted, the next free numbered file in the
    /// configured export directory is used.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format: png or jpeg. Inferred from --output's extension when
    /// omitted, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Export width in pixels (defaults to the configured export width).
    #[arg(long, value_name = "PX")]
    pub export_width: Option<u32>,

    /// Export height in pixels (defaults to the configured export height).
    #[arg(long, value_name = "PX")]
    pub export_height: Option<u32>,

    /// Print each replayed command and timing information.
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a session log like the GUI does.
    #[arg(long)]
    pub log: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        Self::is_cli_args(std::env::args())
    }

    /// Matches both `--replay FILE` and `--replay=FILE`.
    pub fn is_cli_args<I: IntoIterator<Item = String>>(args: I) -> bool {
        args.into_iter().any(|a| a == "--replay" || a.starts_with("--replay="))
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ReplayError {
    Io(std::io::Error),
    Parse { line: usize, message: String },
    Export(ExportError),
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::Io(e) => write!(f, "I/O error: {}", e),
            ReplayError::Parse { line, message } => write!(f, "line {}: {}", line, message),
            ReplayError::Export(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<std::io::Error> for ReplayError {
    fn from(e: std::io::Error) -> Self {
        ReplayError::Io(e)
    }
}

impl From<ExportError> for ReplayError {
    fn from(e: ExportError) -> Self {
        ReplayError::Export(e)
    }
}

// ============================================================================
// Script parsing
// ============================================================================

/// One parsed script line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Event(InputEvent),
    Shift(bool),
}

/// Parse a whole script.  Blank lines and `#` comments are skipped; the
/// first malformed line aborts with its 1-based line number.
pub fn parse_script(source: &str) -> Result<Vec<Command>, ReplayError> {
    let mut commands = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let command =
            parse_line(line).map_err(|message| ReplayError::Parse { line: idx + 1, message })?;
        commands.push(command);
    }
    Ok(commands)
}

fn parse_line(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let keyword = words.next().unwrap_or("").to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    let command = match keyword.as_str() {
        "tool" => {
            let name = single(&args)?;
            let tool = Tool::from_name(name).ok_or_else(|| format!("unknown tool '{}'", name))?;
            Command::Event(InputEvent::SelectTool(tool))
        }
        "color" => {
            if args.len() != 3 && args.len() != 4 {
                return Err("color expects 3 or 4 components".to_string());
            }
            let mut rgba = [255u8; 4];
            for (slot, word) in rgba.iter_mut().zip(&args) {
                *slot = word
                    .parse()
                    .map_err(|_| format!("invalid color component '{}'", word))?;
            }
            Command::Event(InputEvent::SetColor(Rgba(rgba)))
        }
        "down" => Command::Event(InputEvent::PointerDown { pos: point(&args)? }),
        "move" => Command::Event(InputEvent::PointerMove { pos: point(&args)? }),
        "up" => {
            no_args(&args)?;
            Command::Event(InputEvent::PointerUp { pos: Pos2::ZERO })
        }
        "shift" => match single(&args)? {
            "on" => Command::Shift(true),
            "off" => Command::Shift(false),
            other => return Err(format!("shift expects on/off, got '{}'", other)),
        },
        "zoom" => match single(&args)? {
            "in" => Command::Event(InputEvent::Zoom(ZoomDirection::In)),
            "out" => Command::Event(InputEvent::Zoom(ZoomDirection::Out)),
            other => return Err(format!("zoom expects in/out, got '{}'", other)),
        },
        "resize" => {
            let [width, height] = numbers::<u32>(&args)?;
            if width == 0 || height == 0 {
                return Err("window size must be non-zero".to_string());
            }
            Command::Event(InputEvent::Resize { width, height })
        }
        "undo" => {
            no_args(&args)?;
            Command::Event(InputEvent::Undo)
        }
        "clear" => {
            no_args(&args)?;
            Command::Event(InputEvent::Clear)
        }
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(command)
}

fn single<'a>(args: &[&'a str]) -> Result<&'a str, String> {
    match args {
        [one] => Ok(*one),
        _ => Err(format!("expected one argument, got {}", args.len())),
    }
}

fn no_args(args: &[&str]) -> Result<(), String> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(format!("unexpected arguments: {}", args.join(" ")))
    }
}

fn numbers<T: std::str::FromStr>(args: &[&str]) -> Result<[T; 2], String> {
    let [a, b] = args else {
        return Err(format!("expected two numbers, got {} arguments", args.len()));
    };
    let parse = |w: &str| w.parse::<T>().map_err(|_| format!("invalid number '{}'", w));
    Ok([parse(*a)?, parse(*b)?])
}

fn point(args: &[&str]) -> Result<Pos2, String> {
    let [x, y] = numbers::<f32>(args)?;
    Ok(Pos2::new(x, y))
}

// ============================================================================
// Replay
// ============================================================================

/// Drive `session` through `commands` in order.
pub fn replay(session: &mut Session, commands: &[Command], verbose: bool) {
    for command in commands {
        if verbose {
            println!("  {:?}", command);
        }
        match command {
            Command::Event(event) => session.handle(event.clone()),
            Command::Shift(on) => session.set_modifiers(*on),
        }
    }
}

/// Run the replay and return an OS exit code.
/// `0` = exported, `1` = the script or the export failed.
pub fn run(args: CliArgs) -> ExitCode {
    if args.log {
        crate::logger::init();
    }
    let start = Instant::now();
    match run_replay(&args) {
        Ok(path) => {
            if args.verbose {
                println!(
                    "  → {} ({:.0}ms)",
                    path.display(),
                    start.elapsed().as_secs_f64() * 1000.0
                );
            } else {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            log_err!("Replay of {} failed: {}", args.replay.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn run_replay(args: &CliArgs) -> Result<PathBuf, ReplayError> {
    let source = std::fs::read_to_string(&args.replay)?;
    let commands = parse_script(&source)?;

    let mut settings = AppSettings::load();
    if let Some(w) = args.export_width {
        settings.export_width = w.max(1);
    }
    if let Some(h) = args.export_height {
        settings.export_height = h.max(1);
    }
    let format = parse_format(args.format.as_deref(), args.output.as_deref());

    let mut session = Session::new(settings);
    replay(&mut session, &commands, args.verbose);
    if args.verbose {
        println!("  {} layers after {} commands", session.layers().len(), commands.len());
    }

    match &args.output {
        Some(path) => {
            let settings = &session.settings;
            let image = compositor::flatten(
                session.layers().layers(),
                settings.export_width,
                settings.export_height,
                format.is_opaque().then_some(SHEET),
                settings.resample_filter,
            );
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            io::encode_and_write(&image, path, format, settings.jpeg_quality)?;
            Ok(path.clone())
        }
        None => Ok(session.export(format)?),
    }
}

/// Choose the [`ExportFormat`] from the `--format` string or infer it from the
/// output file extension. Defaults to PNG when neither is known.
fn parse_format(format_arg: Option<&str>, output: Option<&std::path::Path>) -> ExportFormat {
    if let Some(format) = format_arg.and_then(ExportFormat::from_name) {
        return format;
    }
    output
        .and_then(|out| out.extension())
        .and_then(|e| e.to_str())
        .and_then(ExportFormat::from_name)
        .unwrap_or(ExportFormat::Png)
}
