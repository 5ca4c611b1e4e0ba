//! Parsing command-line arguments.

use crate::output::Format;
use anyhow::{bail, Context, Result};
use clap::{crate_authors, crate_description, crate_name, crate_version};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use drifter_lib::{Config, Symmetry};
use std::{fs, path::Path};
use tracing_subscriber::filter::LevelFilter;

/// A struct to store the parse results.
#[derive(Clone, Debug)]
pub(crate) struct Args {
    pub(crate) config: Config,
    pub(crate) all: bool,
    /// Stops after this many outcomes.
    pub(crate) limit: Option<usize>,
    pub(crate) format: Format,
    /// Number of steps between two progress reports.
    pub(crate) step: u64,
    pub(crate) level: LevelFilter,
}

/// Parses a size bound, where `none` means no bound.
fn parse_bound(s: &str) -> Result<Option<u32>, String> {
    match s {
        "none" => Ok(None),
        _ => s.parse().map(Some).map_err(|e| format!("{}", e)),
    }
}

/// Parses `INDEX=VALUE`.
fn parse_var(s: &str) -> Result<(usize, i32), String> {
    let (index, value) = s
        .split_once('=')
        .ok_or_else(|| String::from("expected INDEX=VALUE"))?;
    let index = index.trim().parse().map_err(|e| format!("index: {}", e))?;
    let value = value.trim().parse().map_err(|e| format!("value: {}", e))?;
    Ok((index, value))
}

fn parse_symmetry(s: &str) -> Result<Symmetry, String> {
    s.parse()
}

pub(crate) fn command() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .long_about(
            "Searches for drifters in Life-like cellular automata\n\
             \n\
             A drifter is a pattern that evolves inside a still-life background. \n\
             The background is decided during the search: every unknown cell is \n\
             chosen when the evolution first needs it.\n\
             \n\
             The configuration is read from a TOML, YAML or JSON file, chosen by \n\
             its extension. Options given on the command line override it.\n",
        )
        .arg(
            Arg::new("CONFIG")
                .help("Configuration file (.toml, .yaml, .yml or .json)")
                .index(1),
        )
        .arg(
            Arg::new("HEIGHT")
                .help("Height of the world, including the dead border")
                .long("height")
                .value_parser(value_parser!(i32)),
        )
        .arg(
            Arg::new("WIDTH")
                .help("Width of the world, including the dead border")
                .long("width")
                .value_parser(value_parser!(i32)),
        )
        .arg(
            Arg::new("RULE")
                .help("Rule of the cellular automaton")
                .long_help(
                    "Rule of the cellular automaton\n\
                     Supports Life-like rules without B0.\n",
                )
                .short('r')
                .long("rule"),
        )
        .arg(
            Arg::new("SYMMETRY")
                .help("Symmetry of the background")
                .long_help(
                    "Symmetry of the background\n\
                     You may need to add quotation marks for some of the symmetries.\n\
                     The usages of these symmetries are the same as Oscar Cunningham's \
                     Logic Life Search.\n\
                     See [https://conwaylife.com/wiki/Symmetry] \n",
                )
                .short('s')
                .long("symmetry")
                .value_parser(parse_symmetry),
        )
        .arg(
            Arg::new("DAYNIGHT")
                .help("Images under the symmetry take the opposite state")
                .long("day-night")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("SEED")
                .help("Seed of the random number generator")
                .long("seed")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("PROBABILITY")
                .help("Probability, in percent, of choosing an alive cell")
                .short('p')
                .long("probability")
                .value_parser(value_parser!(u32).range(0..=100)),
        )
        .arg(
            Arg::new("MAXCHANGES")
                .help("Max number of changes in a generation (`none` for no bound)")
                .short('m')
                .long("max-changes")
                .value_parser(parse_bound),
        )
        .arg(
            Arg::new("MAXWIDTH")
                .help("Max width of the changes (`none` for no bound)")
                .long("max-width")
                .value_parser(parse_bound),
        )
        .arg(
            Arg::new("MAXHEIGHT")
                .help("Max height of the changes (`none` for no bound)")
                .long("max-height")
                .value_parser(parse_bound),
        )
        .arg(
            Arg::new("MAXGEN")
                .help("A branch ends at this generation")
                .short('g')
                .long("max-gen")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("VAR")
                .help("Sets a bound by its variable index, as INDEX=VALUE")
                .long("var")
                .allow_negative_numbers(true)
                .action(ArgAction::Append)
                .value_parser(parse_var),
        )
        .arg(
            Arg::new("SKIPSTABLE")
                .help("Does not report stable outcomes")
                .long("skip-stable")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("SKIPFIZZLE")
                .help("Does not report outcomes that die out")
                .long("skip-fizzle")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ALL")
                .help("Prints all possible outcomes instead of only the first one")
                .short('a')
                .long("all")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("LIMIT")
                .help("Stops after this many outcomes")
                .short('n')
                .long("limit")
                .value_parser(value_parser!(usize))
                .conflicts_with("ALL"),
        )
        .arg(
            Arg::new("FORMAT")
                .help("Output format")
                .short('f')
                .long("format")
                .value_parser(["text", "json", "yaml"])
                .default_value("text"),
        )
        .arg(
            Arg::new("STEP")
                .help("Number of search steps between two progress reports")
                .long("step")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("1000000"),
        )
        .arg(
            Arg::new("VERBOSE")
                .help("More logs; repeat for even more")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count),
        )
}

/// Reads a configuration file, in the format given by its extension.
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&text, path.extension().and_then(|e| e.to_str()))
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn parse_config(text: &str, extension: Option<&str>) -> Result<Config> {
    let config = match extension {
        Some("toml") => toml::from_str(text)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(text)?,
        Some("json") => serde_json::from_str(text)?,
        Some(other) => bail!("unknown config format: {}", other),
        None => bail!("config file has no extension"),
    };
    Ok(config)
}

impl Args {
    /// Parses the command-line arguments.
    pub(crate) fn parse() -> Result<Self> {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<String>("CONFIG") {
            Some(path) => load_config(Path::new(path))?,
            None => Config::default(),
        };

        if let Some(&height) = matches.get_one::<i32>("HEIGHT") {
            config.height = height;
        }
        if let Some(&width) = matches.get_one::<i32>("WIDTH") {
            config.width = width;
        }
        if let Some(rule) = matches.get_one::<String>("RULE") {
            config.rule_string = rule.clone();
        }
        if let Some(&symmetry) = matches.get_one::<Symmetry>("SYMMETRY") {
            config.symmetry = symmetry;
        }
        if matches.get_flag("DAYNIGHT") {
            config.day_night = true;
        }
        if let Some(&seed) = matches.get_one::<u64>("SEED") {
            config.seed = seed;
        }
        if let Some(&probability) = matches.get_one::<u32>("PROBABILITY") {
            config.probability = probability;
        }
        if let Some(&max) = matches.get_one::<Option<u32>>("MAXCHANGES") {
            config.max_change_count = max;
        }
        if let Some(&max) = matches.get_one::<Option<u32>>("MAXWIDTH") {
            config.max_width = max;
        }
        if let Some(&max) = matches.get_one::<Option<u32>>("MAXHEIGHT") {
            config.max_height = max;
        }
        if let Some(&max_gen) = matches.get_one::<u32>("MAXGEN") {
            config.max_gen = max_gen;
        }
        if let Some(vars) = matches.get_many::<(usize, i32)>("VAR") {
            for &(index, value) in vars {
                config = config
                    .set_var(index, value)
                    .with_context(|| format!("Failed to set variable {}", index))?;
            }
        }
        if matches.get_flag("SKIPSTABLE") {
            config.skip_stable = true;
        }
        if matches.get_flag("SKIPFIZZLE") {
            config.skip_fizzle = true;
        }

        let format = match matches.get_one::<String>("FORMAT").map(String::as_str) {
            Some("json") => Format::Json,
            Some("yaml") => Format::Yaml,
            _ => Format::Text,
        };
        let level = match matches.get_count("VERBOSE") {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };

        Ok(Args {
            config,
            all: matches.get_flag("ALL"),
            limit: matches.get_one::<usize>("LIMIT").copied(),
            format,
            step: matches.get_one::<u64>("STEP").copied().unwrap_or(1_000_000),
            level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        let matches = command().try_get_matches_from(args)?;
        Args::from_matches(&matches)
    }

    #[test]
    fn defaults() -> Result<()> {
        let args = parse(&["drifter"])?;
        assert_eq!(args.config, Config::default());
        assert!(!args.all);
        assert_eq!(args.format, Format::Text);
        assert_eq!(args.level, LevelFilter::WARN);
        Ok(())
    }

    #[test]
    fn overrides() -> Result<()> {
        let args = parse(&[
            "drifter",
            "--height",
            "20",
            "--width",
            "30",
            "-s",
            "D2-",
            "-m",
            "none",
            "--max-width",
            "5",
            "--var",
            "104=-3",
            "--var",
            "127=1",
            "-vv",
            "-f",
            "json",
        ])?;
        let config = &args.config;
        assert_eq!((config.height, config.width), (20, 30));
        assert_eq!(config.symmetry, Symmetry::D2Row);
        assert_eq!(config.max_change_count, None);
        assert_eq!(config.max_width, Some(5));
        assert_eq!(config.bounds.drifts.len(), 1);
        assert_eq!(config.bounds.drifts[0].offset, -3);
        assert!(config.uncount_known);
        assert_eq!(args.level, LevelFilter::DEBUG);
        assert_eq!(args.format, Format::Json);
        Ok(())
    }

    #[test]
    fn bad_args() {
        assert!(parse(&["drifter", "--var", "104"]).is_err());
        assert!(parse(&["drifter", "--var", "99=1"]).is_err());
        assert!(parse(&["drifter", "-p", "101"]).is_err());
        assert!(parse(&["drifter", "-s", "D3"]).is_err());
        assert!(parse(&["drifter", "--all", "-n", "3"]).is_err());
    }

    #[test]
    fn zero_bounds() -> Result<()> {
        let args = parse(&["drifter", "-m", "0", "--max-width", "0", "--max-height", "none"])?;
        assert_eq!(args.config.max_change_count, Some(0));
        assert_eq!(args.config.max_width, Some(0));
        assert_eq!(args.config.max_height, None);
        Ok(())
    }

    #[test]
    fn config_formats() -> Result<()> {
        let toml = "height = 20\nsymmetry = \"C2\"\n\n[bounds]\nmax_new_changes = 2\n";
        let config = parse_config(toml, Some("toml"))?;
        assert_eq!(config.height, 20);
        assert_eq!(config.symmetry, Symmetry::C2);
        assert_eq!(config.bounds.max_new_changes, 2);

        let yaml = "width: 15\nmax_change_count: null\npatterns:\n  - row: 4\n    col: 4\n    text: \"1\"\n";
        let config = parse_config(yaml, Some("yml"))?;
        assert_eq!(config.width, 15);
        assert_eq!(config.max_change_count, None);
        assert_eq!(config.patterns.len(), 1);

        let config = parse_config(r#"{"seed": 7}"#, Some("json"))?;
        assert_eq!(config.seed, 7);

        assert!(parse_config("", Some("ini")).is_err());
        assert!(parse_config("", None).is_err());
        Ok(())
    }
}
