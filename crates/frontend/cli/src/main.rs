use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use emu_core::input::{DipSelection, InputPorts};
use emu_core::logging::{LogCategory, LogConfig, LogLevel};
use emu_core::rom::{AuditStatus, DirectorySource};
use emu_redalert::games::{self, GameDriver, GameFlags};
use emu_redalert::inputs::DIP_PORT;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "redalert", version, about = "Red Alert / Demoneye-X driver tools")]
struct Cli {
    /// Level for all emulator log categories (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Per-category override, e.g. --log irq=trace
    #[arg(long = "log", global = true, value_name = "CATEGORY=LEVEL")]
    log_overrides: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List supported games
    List,
    /// Show machine configuration, memory map, input ports and ROMs
    Info {
        game: String,
        /// Print machine-readable JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show DIP switches and the resulting port value
    Dips {
        game: String,
        /// Load DIP settings from this JSON file
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Change a switch, e.g. --set "Lives=5"
        #[arg(long = "set", value_name = "DIP=SETTING")]
        changes: Vec<String>,
        /// Write the resulting settings back as JSON
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Audit a ROM directory against the game's ROM set
    Verify {
        game: String,
        dir: PathBuf,
        /// Also build the memory regions and report load warnings
        #[arg(long, default_value_t = false)]
        load: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("error: {e:#}");
        return ExitCode::from(2);
    }

    let result = run(cli.command);

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::List => list().map(|_| true),
        Commands::Info { game, json } => info(find(&game)?, json).map(|_| true),
        Commands::Dips {
            game,
            settings,
            changes,
            save,
        } => dips(find(&game)?, settings.as_deref(), &changes, save.as_deref()).map(|_| true),
        Commands::Verify { game, dir, load } => verify(find(&game)?, &dir, load),
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = LogLevel::from_str(&cli.log_level)
        .with_context(|| format!("unknown log level {:?}", cli.log_level))?;
    let config = LogConfig::global();
    config.set_global_level(level);
    config.set_level(LogCategory::Rom, level.max(LogLevel::Warn));

    for entry in &cli.log_overrides {
        let (category, level) = parse_override(entry)?;
        config.set_level(category, level);
    }

    // The emulator decides what to emit; env_logger only needs to pass it through.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("emu=trace"))
        .init();
    Ok(())
}

fn parse_override(entry: &str) -> Result<(LogCategory, LogLevel)> {
    let Some((category, level)) = entry.split_once('=') else {
        bail!("expected CATEGORY=LEVEL, got {entry:?}");
    };
    let category =
        LogCategory::from_name(category).with_context(|| format!("unknown category {category:?}"))?;
    let level = LogLevel::from_str(level).with_context(|| format!("unknown log level {level:?}"))?;
    Ok((category, level))
}

fn find(name: &str) -> Result<&'static GameDriver> {
    match games::find_game(name) {
        Some(game) => Ok(game),
        None => bail!(
            "unknown game {name:?} (supported: {})",
            games::GAMES.iter().map(|g| g.name).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn status(game: &GameDriver) -> &'static str {
    if game.flags.contains(GameFlags::NOT_WORKING) {
        "not working"
    } else if game.flags.intersects(GameFlags::IMPERFECT_SOUND | GameFlags::IMPERFECT_GRAPHICS) {
        "imperfect"
    } else {
        "good"
    }
}

fn list() -> Result<()> {
    for game in games::GAMES {
        println!(
            "{:<10} {} ({} {}) [{}]",
            game.name,
            game.description,
            game.year,
            game.manufacturer,
            status(game)
        );
    }
    Ok(())
}

fn info(game: &'static GameDriver, json: bool) -> Result<()> {
    if json {
        let flags: Vec<&str> = game.flags.iter_names().map(|(name, _)| name).collect();
        let doc = serde_json::json!({
            "name": game.name,
            "description": game.description,
            "year": game.year,
            "manufacturer": game.manufacturer,
            "rotation": game.rotation,
            "flags": flags,
            "machine": game.machine,
            "memory_map": game.memory_map,
            "input_ports": game.input_ports,
            "roms": game.roms,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let m = game.machine;
    println!("{} - {} ({} {})", game.name, game.description, game.year, game.manufacturer);
    println!("Status:  {}", status(game));
    println!("CPU:     {} @ {} Hz", m.cpu.kind, m.cpu.clock_hz);
    println!(
        "Screen:  {} Hz, {}x{} total, visible {}..={} x {}..={}, {:?}",
        m.screen.refresh_hz,
        m.screen.total_width,
        m.screen.total_lines,
        m.screen.visible_x.0,
        m.screen.visible_x.1,
        m.screen.visible_y.0,
        m.screen.visible_y.1,
        game.rotation
    );
    println!("Video:   {:?} ({:#x} bytes character RAM)", m.video, m.video.charmap_size());
    println!("Sound:   {}", m.audio.description());

    println!("\nMemory map:");
    for range in game.memory_map {
        let mut line = format!(
            "  {:04X}-{:04X} {:>5} mirror {:04X}  read {:<28} write {:<28}",
            range.start,
            range.end,
            range.size(),
            range.mirror,
            format!("{:?}", range.read),
            format!("{:?}", range.write)
        );
        if let Some(note) = range.note {
            line.push_str(note);
        }
        println!("{}", line.trim_end());
    }

    println!("\nInput ports:");
    for port in game.input_ports {
        println!("  {}", port.tag);
        for bit in port.bits {
            let note = bit.note.map(|n| format!(" ({n})")).unwrap_or_default();
            println!(
                "    {:#04x} {:?} {} {:?}{}",
                bit.mask,
                bit.player,
                bit.kind.name(),
                bit.polarity,
                note
            );
        }
        for dip in port.dips {
            println!("    DIP {:#04x} {}", dip.mask, port.dip_key(dip));
        }
    }

    println!("\nROMs:");
    for region in game.roms.regions {
        let note = region.note.map(|n| format!(" ({n})")).unwrap_or_default();
        println!("  {} {:#x} bytes{}", region.tag, region.size, note);
        for e in region.entries {
            println!(
                "    {:<14} {:#06x} {:#06x} crc {:08x} sha1 {}",
                e.name, e.offset, e.length, e.crc, e.sha1
            );
        }
    }
    Ok(())
}

fn dips(
    game: &'static GameDriver,
    settings: Option<&Path>,
    changes: &[String],
    save: Option<&Path>,
) -> Result<()> {
    let mut ports = InputPorts::new(game.input_ports);
    if let Some(path) = settings {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let selection: DipSelection =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        ports.apply(&selection)?;
    }
    for change in changes {
        let Some((dip, label)) = change.split_once('=') else {
            bail!("expected DIP=SETTING, got {change:?}");
        };
        ports.set_dip(DIP_PORT, dip.trim(), label.trim())?;
    }

    for port in ports.defs().iter().filter(|p| !p.dips.is_empty()) {
        println!("Port {}", port.tag);
        for dip in port.dips {
            let key = port.dip_key(dip);
            let current = ports.dip(port.tag, &key).map(|s| s.label).unwrap_or("?");
            let location = dip.location.map(|l| format!(" [{l}]")).unwrap_or_default();
            println!("  {key}{location}: {current}");
            for setting in dip.settings {
                let marker = if setting.label == current { '*' } else { ' ' };
                println!("    {marker} {:#04x} {}", setting.value, setting.label);
            }
        }
        if let Some(value) = ports.read(port.tag) {
            println!("  value: {value:#04x}");
        }
    }

    if let Some(path) = save {
        let text = serde_json::to_string_pretty(&ports.selection())?;
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        log::info!("saved DIP settings to {}", path.display());
    }
    Ok(())
}

/// Returns false when the set is not playable (missing files or wrong sizes).
fn verify(game: &'static GameDriver, dir: &Path, load: bool) -> Result<bool> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    let source = DirectorySource::new(dir);
    let report = game.roms.audit(&source)?;
    for entry in &report.entries {
        let status = match &entry.status {
            AuditStatus::Good => "OK".to_string(),
            AuditStatus::Missing => "NOT FOUND".to_string(),
            AuditStatus::WrongLength(len) => format!("WRONG LENGTH ({len:#x})"),
            AuditStatus::BadChecksum(hash) => {
                format!("BAD CHECKSUM (crc {:08x} sha1 {})", hash.crc, hash.sha1)
            }
        };
        println!("{:<9} {:<14} {}", entry.region, entry.name, status);
    }

    let verdict = if report.is_perfect() {
        "good"
    } else if report.is_playable() {
        "best available"
    } else {
        "incorrect"
    };
    println!("romset {} in {} is {}", game.name, source.root().display(), verdict);

    if load && report.is_playable() {
        let loaded = game.roms.load(&source)?;
        for warning in &loaded.diagnostics {
            println!("warning: {warning}");
        }
        let mut tags: Vec<_> = loaded.regions.iter().collect();
        tags.sort_by_key(|(tag, _)| **tag);
        for (tag, bytes) in tags {
            println!("region {tag}: {:#x} bytes", bytes.len());
        }
    }
    Ok(report.is_playable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_redalert::games::REDALERT;

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("irq=trace").unwrap(),
            (LogCategory::Interrupts, LogLevel::Trace)
        );
        assert!(parse_override("irq").is_err());
        assert!(parse_override("gpu=info").is_err());
        assert!(parse_override("rom=loud").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["redalert", "info", "demoneye", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Info { json: true, .. }));

        let cli = Cli::try_parse_from([
            "redalert", "dips", "redalert", "--set", "Lives=5", "--set", "Coinage=Free Play",
        ])
        .unwrap();
        match cli.command {
            Commands::Dips { changes, .. } => assert_eq!(changes.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Cli::try_parse_from(["redalert", "verify", "redalert"]).is_err());
    }

    #[test]
    fn test_find_unknown_game() {
        assert!(find("redalert").is_ok());
        let err = find("zaxxon").unwrap_err().to_string();
        assert!(err.contains("redalert, demoneye"));
    }

    #[test]
    fn test_verify_empty_directory_is_not_playable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!verify(&REDALERT, dir.path(), false).unwrap());
    }

    #[test]
    fn test_verify_right_sized_files_are_playable() {
        let dir = tempfile::tempdir().unwrap();
        for (_, entry) in REDALERT.roms.entries() {
            fs::write(dir.path().join(entry.name), vec![0u8; entry.length as usize]).unwrap();
        }
        assert!(verify(&REDALERT, dir.path(), true).unwrap());
    }

    #[test]
    fn test_dips_settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dips.json");
        dips(&REDALERT, None, &["Lives=6".to_string()], Some(&path)).unwrap();

        let saved: DipSelection = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.get(DIP_PORT, "Lives"), Some("6"));

        dips(&REDALERT, Some(&path), &[], None).unwrap();
        assert!(dips(&REDALERT, None, &["Lives".to_string()], None).is_err());
        assert!(dips(&REDALERT, None, &["Lives=99".to_string()], None).is_err());
    }
}
