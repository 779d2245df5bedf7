use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use vcs_atari2600::bankswitch::{self, SchemeCatalog};
use vcs_atari2600::config::ConsoleFormat;
use vcs_atari2600::{open_session, SessionConfig};
use vcs_core::logging::{LogConfig, LogLevel};
use vcs_core::{ConsoleEngine, DisplayFormat};

#[derive(Parser)]
#[command(name = "vcs", about = "Headless Atari 2600 session driver")]
struct Args {
    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every known bankswitch scheme
    Schemes {
        /// Print the catalog as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show which scheme a file name (or explicit token) resolves to
    Resolve {
        name: String,

        /// Explicit scheme token, e.g. "F8SC" or "DPC+"
        #[arg(long)]
        scheme: Option<String>,
    },

    /// Print the effective session config as JSON
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a ROM for a number of frames
    Run {
        rom: PathBuf,

        #[arg(long, default_value_t = 5)]
        frames: u32,

        /// Session config file (JSON); missing or invalid files use defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Console format: auto, ntsc, pal, secam, ntsc50, pal60, secam60
        #[arg(long)]
        format: Option<String>,

        /// Explicit bankswitch scheme token
        #[arg(long)]
        scheme: Option<String>,

        /// Write a snapshot here after the last frame
        #[arg(long)]
        save: Option<PathBuf>,

        /// Restore this snapshot before the first frame
        #[arg(long)]
        load: Option<PathBuf>,

        /// Suppress per-frame output
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = parse_log_level(&args.log_level)?;
    LogConfig::global().set_global_level(level);
    env_logger::Builder::new()
        .filter_level(level.level_filter())
        .parse_default_env()
        .init();

    match args.command {
        Command::Schemes { json } => list_schemes(json),
        Command::Resolve { name, scheme } => {
            resolve(&name, scheme.as_deref());
            Ok(())
        }
        Command::Config { config } => {
            let config = load_config(config.as_deref());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Run {
            rom,
            frames,
            config,
            format,
            scheme,
            save,
            load,
            quiet,
        } => {
            let mut config = load_config(config.as_deref());
            if let Some(format) = format {
                config.format = parse_format(&format)?;
            }
            if let Some(scheme) = scheme {
                config.bankswitch = scheme;
            }
            run(&rom, frames, config, save.as_deref(), load.as_deref(), quiet)
        }
    }
}

fn load_config(path: Option<&Path>) -> SessionConfig {
    path.map(SessionConfig::load).unwrap_or_default()
}

fn parse_log_level(text: &str) -> Result<LogLevel> {
    match LogLevel::from_str(text) {
        Some(level) => Ok(level),
        None => bail!("unknown log level '{}'", text),
    }
}

fn parse_format(text: &str) -> Result<ConsoleFormat> {
    if text.eq_ignore_ascii_case("auto") {
        return Ok(ConsoleFormat::Auto);
    }
    let format: DisplayFormat = text.parse()?;
    Ok(format.into())
}

fn list_schemes(json: bool) -> Result<()> {
    let catalog = SchemeCatalog::global();
    if json {
        let entries: Vec<_> = catalog
            .descriptors()
            .iter()
            .map(|d| {
                serde_json::json!({
                    "token": d.token,
                    "description": d.description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for descriptor in catalog.descriptors() {
        let extensions: Vec<&str> = catalog
            .extensions()
            .into_iter()
            .filter(|(_, id)| *id == descriptor.id)
            .map(|(ext, _)| ext)
            .collect();
        println!(
            "{:<8} {:<32} {}",
            descriptor.token,
            descriptor.description,
            extensions.join(" ")
        );
    }
    Ok(())
}

fn resolve(name: &str, scheme: Option<&str>) {
    let id = bankswitch::resolve(name, scheme);
    match bankswitch::recognized_extension(name) {
        Some(ext) => println!("{} -> {} ({}), extension '{}'", name, id, id.description(), ext),
        None => println!("{} -> {} ({}), extension not recognized", name, id, id.description()),
    }
}

fn run(
    rom_path: &Path,
    frames: u32,
    config: SessionConfig,
    save: Option<&Path>,
    load: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let rom = fs::read(rom_path).with_context(|| format!("reading {}", rom_path.display()))?;
    let name = rom_path.to_string_lossy();
    let mut session = open_session(&name, rom, config)?;

    if let Some(path) = load {
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        session
            .load_snapshot(&data)
            .with_context(|| format!("loading snapshot {}", path.display()))?;
        log::info!("Restored snapshot from {}", path.display());
    }

    if !quiet {
        let info = session.engine().debug_info();
        println!(
            "{}: {} bytes, scheme {}, {} bank(s), {}, aspect {:.3}",
            name,
            info.rom_size,
            info.banking_scheme,
            info.bank_count,
            session.engine().display_format().name(),
            session.video_aspect()
        );
    }

    for frame in 1..=frames {
        let report = session.run_frame();
        if let Some((width, height)) = session.take_resize() {
            log::info!("Render size {}x{}", width, height);
        }
        if !quiet {
            println!(
                "Frame {}: video_ready={} audio_samples={}",
                frame, report.video_ready, report.audio_samples
            );
        }
    }

    if let Some(path) = save {
        let size = session.snapshot_size()?;
        let mut buf = vec![0u8; size];
        let written = session.save_snapshot(&mut buf)?;
        if written != size {
            bail!("snapshot size changed while saving ({} != {})", written, size);
        }
        fs::write(path, &buf).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote {} byte snapshot to {}", size, path.display());
    }

    let engine = session.teardown();
    log::debug!("Ran {} frames", engine.frames());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_defaults_to_warn() {
        let args = Args::try_parse_from(["vcs", "schemes"]).unwrap();
        assert_eq!(parse_log_level(&args.log_level).unwrap(), LogLevel::Warn);
    }

    #[test]
    fn log_level_accepted_after_subcommand() {
        let args = Args::try_parse_from(["vcs", "config", "--log-level", "debug"]).unwrap();
        assert_eq!(parse_log_level(&args.log_level).unwrap(), LogLevel::Debug);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn format_names_parse() {
        assert_eq!(parse_format("auto").unwrap(), ConsoleFormat::Auto);
        assert_eq!(parse_format("pal60").unwrap(), ConsoleFormat::Pal60);
        assert!(parse_format("vhs").is_err());
    }
}
