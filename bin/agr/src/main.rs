use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use automata::prelude::*;
use automata_learning::prelude::*;
use owo_colors::OwoColorize;

use tracing::{debug, info, trace, warn};
use tracing_subscriber::{filter, prelude::*};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

fn cli() -> clap::Command {
    Command::new("agr")
        .about("Assume-guarantee verification of a property over components given as DFAs")
        .after_help(
            "Sample specifications live in bin/agr/data, e.g.\n  \
             agr -c data/even_a.json -c data/even_b.json -p data/even_both.json",
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .arg(
            Arg::new("component")
                .long("component")
                .short('c')
                .help("JSON specification of a component, may be given multiple times")
                .required(true)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("property")
                .long("property")
                .short('p')
                .help("JSON specification of the property")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("search-depth")
                .long("search-depth")
                .help("maximal length of words inspected by equivalence queries")
                .default_value("6")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("max-length")
                .long("max-length")
                .help("maximal length of words enumerated by fidelity and property checks")
                .default_value("6")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .short('s')
                .help("one of baseline, reuse, selective, minimise, adaptive, merging")
                .default_value("baseline"),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .help("probability with which the selective strategy poses a membership query")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("seed for the random decisions of the selective strategy")
                .default_value("0")
                .value_parser(value_parser!(u64)),
        )
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches
        .try_get_one::<String>("verbosity")
        .ok()
        .flatten()
        .map(|m| m.as_str())
    {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        Some("info") => filter::LevelFilter::INFO,
        _ => filter::LevelFilter::WARN,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn read_spec(path: &Path) -> anyhow::Result<AutomatonSpec> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("could not open specification {}", path.display()))?;
    let spec = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("could not parse specification {}", path.display()))?;
    debug!("read specification from {}", path.display());
    Ok(spec)
}

fn strategy(matches: &ArgMatches) -> anyhow::Result<StrategyKind> {
    let name = matches
        .get_one::<String>("strategy")
        .map(String::as_str)
        .unwrap_or("baseline");
    let seed = matches.get_one::<u64>("seed").copied().unwrap_or_default();
    let kind: StrategyKind = name.parse()?;

    match (kind, matches.get_one::<f64>("threshold").copied()) {
        (StrategyKind::Selective { .. }, Some(threshold)) => {
            if !(0.0..=1.0).contains(&threshold) {
                bail!("threshold {threshold} is not in [0, 1]");
            }
            Ok(StrategyKind::Selective { threshold, seed })
        }
        (kind, Some(_)) => {
            warn!("--threshold has no effect on the {kind} strategy");
            Ok(kind)
        }
        (kind, None) => Ok(kind.with_seed(seed)),
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<Report> {
    let components = matches
        .get_many::<PathBuf>("component")
        .into_iter()
        .flatten()
        .map(|path| read_spec(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let property = read_spec(
        matches
            .get_one::<PathBuf>("property")
            .context("no property given")?,
    )?;

    let config = AgConfig {
        search_depth: matches
            .get_one::<usize>("search-depth")
            .copied()
            .unwrap_or_default(),
        max_length: matches
            .get_one::<usize>("max-length")
            .copied()
            .unwrap_or_default(),
    };
    let kind = strategy(matches)?;
    info!(
        "verifying {} components with {kind} strategy, search depth {} and max length {}",
        components.len(),
        config.search_depth,
        config.max_length
    );

    let mut ag = AssumeGuarantee::from_specs(&components, &property, config)
        .context("invalid automaton specification")?
        .with_strategy(kind);
    debug!("session alphabet is {}", ag.alphabet().show());

    Ok(ag.verify_with_combined_assumptions())
}

pub fn main() {
    let matches = cli().get_matches();

    setup_logging(&matches);

    let report = match run(&matches) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red());
            std::process::exit(2);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("{} could not serialize report: {err}", "error:".red());
            std::process::exit(2);
        }
    }

    match &report.failure {
        None if report.property_holds => eprintln!("{}", "property holds".green()),
        Some(failure) => eprintln!("{} {failure}", "property violated:".red()),
        None => eprintln!("{}", "property violated".red()),
    }

    if !report.property_holds {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{cli, run, strategy};
    use automata_learning::prelude::{Failure, StrategyKind};

    const EVEN_A: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/even_a.json");
    const EVEN_B: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/even_b.json");
    const EVEN_BOTH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/even_both.json");

    #[test]
    fn cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn threshold_configures_selective_strategy() {
        let matches = cli().get_matches_from([
            "agr",
            "--component",
            "a.json",
            "--property",
            "p.json",
            "--strategy",
            "selective",
            "--threshold",
            "0.25",
            "--seed",
            "9",
        ]);
        assert_eq!(
            strategy(&matches).unwrap(),
            StrategyKind::Selective {
                threshold: 0.25,
                seed: 9
            }
        );
    }

    #[test]
    fn unknown_strategy_is_an_error() {
        let matches = cli().get_matches_from([
            "agr",
            "-c",
            "a.json",
            "-p",
            "p.json",
            "--strategy",
            "quantum",
        ]);
        assert!(strategy(&matches).is_err());
    }

    #[test_log::test]
    fn sample_components_satisfy_conjunction() {
        for name in ["baseline", "reuse", "adaptive", "merging"] {
            let matches = cli().get_matches_from([
                "agr", "-c", EVEN_A, "-c", EVEN_B, "-p", EVEN_BOTH, "-s", name,
            ]);
            let report = run(&matches).unwrap();
            assert!(report.property_holds, "{name} strategy reported a violation");
            assert!(report.failure.is_none());
            assert!(report.membership_queries > 0);
        }
    }

    #[test_log::test]
    fn single_sample_component_violates_conjunction() {
        let matches = cli().get_matches_from(["agr", "-c", EVEN_A, "-p", EVEN_BOTH]);
        let report = run(&matches).unwrap();
        assert!(!report.property_holds);
        assert!(matches!(report.failure, Some(Failure::Property(_))));
    }

    #[test]
    fn missing_specification_is_an_error() {
        let matches = cli().get_matches_from(["agr", "-c", "does/not/exist.json", "-p", EVEN_BOTH]);
        assert!(run(&matches).is_err());
    }
}
