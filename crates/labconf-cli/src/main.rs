//! `labconf` command-line tool

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use labconf_codec::model::{ChannelEntity, ChannelLibrary};
use labconf_codec::TypeRegistry;
use labconf_migrate::{migrate_all_with, BatchConfig, BatchOptions, Level, TerminalResolver};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("labconf")
        .version(labconf_migrate::VERSION)
        .about("Migrate instrument, channel, sweep and filter libraries to the current schema")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit diagnostics as JSON lines"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Upgrade library files in place")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with_all(["instruments", "channels", "sweeps", "measurements"])
                        .help("TOML file naming the library files"),
                )
                .arg(path_arg("instruments", "Instrument library file"))
                .arg(path_arg("channels", "Channel library file"))
                .arg(path_arg("sweeps", "Sweep library file"))
                .arg(path_arg("measurements", "Measurement filter library file"))
                .arg(
                    Arg::new("keep-going")
                        .long("keep-going")
                        .action(ArgAction::SetTrue)
                        .help("Continue with the next library after a fatal error"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Decode a channel library and list its entities")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Channel library file"),
                ),
        )
}

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn batch_config(args: &ArgMatches) -> anyhow::Result<BatchConfig> {
    if let Some(path) = args.get_one::<PathBuf>("config") {
        return BatchConfig::load(path).with_context(|| format!("loading {}", path.display()));
    }

    let mut config = BatchConfig::new();
    if let Some(path) = args.get_one::<PathBuf>("instruments") {
        config = config.with_instrument_lib(path);
    }
    if let Some(path) = args.get_one::<PathBuf>("channels") {
        config = config.with_channel_lib(path);
    }
    if let Some(path) = args.get_one::<PathBuf>("sweeps") {
        config = config.with_sweep_lib(path);
    }
    if let Some(path) = args.get_one::<PathBuf>("measurements") {
        config = config.with_measurement_lib(path);
    }
    if config.families().is_empty() {
        bail!(
            "no library files given; use --config or one of \
             --instruments/--channels/--sweeps/--measurements"
        );
    }
    Ok(config)
}

fn run_migrate(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = batch_config(args)?;
    let options = BatchOptions::new().with_keep_going(args.get_flag("keep-going"));
    let mut resolver = TerminalResolver::stdio();

    let report = migrate_all_with(&config, options, &mut resolver)?;
    for entry in report.log.entries() {
        match entry.level {
            Level::Info => println!("{entry}"),
            Level::Warn => println!("warning: {entry}"),
            Level::Error => println!("error: {entry}"),
        }
    }
    for path in &report.written {
        println!("updated {}", path.display());
    }
    for halted in &report.failures {
        eprintln!("error: {halted}");
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_inspect(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let Some(path) = args.get_one::<PathBuf>("file") else {
        bail!("missing channel library file");
    };
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let library = ChannelLibrary::from_slice(&bytes, &TypeRegistry::builtin())
        .with_context(|| format!("decoding {}", path.display()))?;

    println!("{} (version {})", path.display(), library.version);
    for (name, entity) in &library.channels {
        let detail = match entity {
            ChannelEntity::Qubit(q) => {
                format!("physChan={} frequency={}", q.phys_chan, q.frequency)
            }
            ChannelEntity::Measurement(m) => format!(
                "physChan={} frequency={} trigChan={}",
                m.phys_chan, m.frequency, m.trig_chan
            ),
            ChannelEntity::Quadrature(_) | ChannelEntity::Marker(_) => format!(
                "AWG={} translator={}",
                entity.awg().unwrap_or("-"),
                entity.translator().unwrap_or("-")
            ),
        };
        println!("  {name:<20} {:<26} {detail}", entity.class_name());
    }

    let dangling = library.dangling_references();
    for (logical, physical) in &dangling {
        println!("warning: {logical} references missing physical channel {physical}");
    }
    for name in library.untranslated() {
        println!("warning: {name} has no translator");
    }

    Ok(if dangling.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let result = match matches.subcommand() {
        Some(("migrate", args)) => run_migrate(args),
        Some(("inspect", args)) => run_inspect(args),
        _ => unreachable!("subcommand required"),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "labconf failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn explicit_paths_build_config() {
        let matches = cli()
            .try_get_matches_from(["labconf", "migrate", "--sweeps", "Sweeps.json", "--keep-going"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let config = batch_config(args).unwrap();
        assert_eq!(config.sweep_lib_file, Some(PathBuf::from("Sweeps.json")));
        assert!(args.get_flag("keep-going"));
    }

    #[test]
    fn config_conflicts_with_paths() {
        let err = cli()
            .try_get_matches_from([
                "labconf", "migrate", "--config", "a.toml", "--sweeps", "s.json",
            ])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn migrate_requires_some_file() {
        let matches = cli().try_get_matches_from(["labconf", "migrate"]).unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert!(batch_config(args).is_err());
    }
}
