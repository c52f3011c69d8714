use clap::{crate_name, crate_version, value_parser, Arg, ArgAction, Command};
use framegif::progress::{ConsoleReporter, NoProgress, ProgressReporter};
use framegif::{Repeat, Settings, DEFAULT_DURATION_MS};

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::ExitCode;

pub type BinResult<T, E = Box<dyn std::error::Error + Send + Sync>> = Result<T, E>;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match bin_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            if let Some(e) = e.source() {
                eprintln!("error: {}", e);
            }
            ExitCode::FAILURE
        },
    }
}

fn cli() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about("Makes a looping animated GIF out of frame_*.png files")
        .arg(Arg::new("FRAMES_DIR")
            .help("Directory with frame_0.png, frame_1.png, …")
            .value_parser(value_parser!(OsString)))
        .arg(Arg::new("OUTPUT")
            .help("Destination file to write to; \"-\" means stdout [default: FRAMES_DIR.gif]")
            .value_name("output.gif")
            .value_parser(value_parser!(OsString)))
        .arg(Arg::new("DURATION")
            .help("How long each frame is shown, in milliseconds")
            .value_name("duration_ms")
            .allow_negative_numbers(true))
        .arg(Arg::new("repeat")
            .long("repeat")
            .help("Number of times the animation is repeated (-1 none, 0 forever or <value> repetitions)")
            .value_name("num")
            .allow_negative_numbers(true)
            .default_value("0"))
        .arg(Arg::new("quality")
            .long("quality")
            .short('Q')
            .help("Palette quality; lower may give a smaller file")
            .value_name("1-100")
            .default_value("100"))
        .arg(Arg::new("quiet")
            .long("quiet")
            .short('q')
            .action(ArgAction::SetTrue)
            .help("Do not display anything on standard output"))
}

fn bin_main() -> BinResult<ExitCode> {
    let matches = cli().get_matches_from(wild::args_os());

    let Some(frames_dir) = matches.get_one::<OsString>("FRAMES_DIR") else {
        println!("Usage: {} <frames_directory> [output.gif] [duration_ms]", crate_name!());
        return Ok(ExitCode::FAILURE);
    };
    let frames_dir = Path::new(frames_dir);

    let default_output;
    let output_path = match matches.get_one::<OsString>("OUTPUT") {
        Some(path) => DestPath::new(path),
        None => {
            default_output = framegif::default_output_path(frames_dir);
            DestPath::Path(&default_output)
        },
    };

    let settings = Settings {
        duration_ms: parse_duration(matches.get_one::<String>("DURATION").map(String::as_str))?,
        repeat: parse_repeat(matches.get_one::<String>("repeat").ok_or("Missing repeat")?)?,
        quality: parse_quality(matches.get_one::<String>("quality").ok_or("Missing quality")?)?,
    };
    let quiet = matches.get_flag("quiet") || output_path == DestPath::Stdout;
    log::debug!("{} → {}, {:?}", frames_dir.display(), output_path, settings);

    let mut console;
    let mut nopb = NoProgress {};
    let progress: &mut dyn ProgressReporter = if quiet {
        &mut nopb
    } else {
        console = ConsoleReporter::stdout();
        &mut console
    };

    let res = match output_path {
        DestPath::Path(path) => framegif::create_gif(frames_dir, path, &settings, progress),
        DestPath::Stdout => write_to_stdout(frames_dir, &settings, progress),
    };

    match res {
        Ok(_) => {
            progress.done(&format!("GIF saved to: {}", output_path));
            if !quiet {
                println!("Success!");
            }
            Ok(ExitCode::SUCCESS)
        },
        Err(e @ framegif::Error::NoFrames(_)) => {
            if quiet {
                eprintln!("error: {}", e);
            } else {
                println!("Error: {}", e);
                println!("Failed to create GIF");
            }
            Ok(ExitCode::FAILURE)
        },
        Err(e) => Err(e.into()),
    }
}

fn write_to_stdout(frames_dir: &Path, settings: &Settings, progress: &mut dyn ProgressReporter) -> framegif::GifResult<usize> {
    let frames = framegif::load_frames(frames_dir, progress)?;
    framegif::Writer::new(*settings).write(frames, io::BufWriter::new(io::stdout().lock()), progress)
}

fn parse_duration(s: Option<&str>) -> BinResult<u32> {
    let Some(s) = s else {
        return Ok(DEFAULT_DURATION_MS);
    };
    match s.trim().parse::<u32>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(format!("Duration must be a positive whole number of milliseconds, not \"{}\"", s).into()),
    }
}

fn parse_repeat(s: &str) -> BinResult<Repeat> {
    let repeat: i32 = s.trim().parse().map_err(|_| "Invalid repeat count")?;
    Ok(match repeat {
        -1 => Repeat::Finite(0),
        0 => Repeat::Infinite,
        n => Repeat::Finite(u16::try_from(n).map_err(|_| "Repeat count must be between -1 and 65535")?),
    })
}

fn parse_quality(s: &str) -> BinResult<u8> {
    match s.trim().parse::<u8>() {
        Ok(q @ 1..=100) => Ok(q),
        _ => Err("Quality must be between 1 and 100".into()),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum DestPath<'a> {
    Path(&'a Path),
    Stdout,
}

impl<'a> DestPath<'a> {
    pub fn new(path: &'a OsStr) -> Self {
        if path == "-" {
            Self::Stdout
        } else {
            Self::Path(Path::new(path))
        }
    }
}

impl fmt::Display for DestPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Path(path) => path.display().fmt(f),
            Self::Stdout => f.write_str("stdout"),
        }
    }
}
