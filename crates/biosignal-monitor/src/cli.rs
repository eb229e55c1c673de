use biosignal_core::MonitoringDomain;
use chrono::{DateTime, Utc};
use clap::{value_parser, Arg, ArgAction, Command};
use measurement_store::Setting;
use std::path::PathBuf;

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|t| t.with_timezone(&Utc))
}

fn domain_arg(required: bool) -> Arg {
    Arg::new("domain")
        .long("domain")
        .short('d')
        .required(required)
        .value_name("DOMAIN")
        .value_parser(|s: &str| s.parse::<MonitoringDomain>())
        .help("sound, cardiac, respiratory, tremor, gait or speech")
}

fn samples_arg() -> Arg {
    Arg::new("samples")
        .long("samples")
        .short('n')
        .value_name("N")
        .default_value("10")
        .value_parser(value_parser!(u64).range(1..))
        .help("Measurements to take before stopping")
}

fn seed_arg() -> Arg {
    Arg::new("seed")
        .long("seed")
        .value_name("SEED")
        .value_parser(value_parser!(u64))
        .help("Seed for the simulated sources")
}

pub fn build_cli() -> Command {
    Command::new("biosignal-monitor")
        .about("Headless biosignal monitor: sessions, saved measurements and preferences")
        .version(clap::crate_version!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the storage namespace file"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Path to a MonitorConfig JSON file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON on stderr"),
        )
        .subcommand(
            Command::new("monitor")
                .about("Run one session and print each measurement as a JSON line")
                .arg(domain_arg(true))
                .arg(samples_arg())
                .arg(seed_arg())
                .arg(
                    Arg::new("save")
                        .long("save")
                        .action(ArgAction::SetTrue)
                        .help("Save the last measurement"),
                )
                .arg(
                    Arg::new("lat")
                        .long("lat")
                        .value_name("DEGREES")
                        .allow_negative_numbers(true)
                        .requires("lon")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("lon")
                        .long("lon")
                        .value_name("DEGREES")
                        .allow_negative_numbers(true)
                        .requires("lat")
                        .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("Print saved measurements")
                .arg(domain_arg(false))
                .arg(
                    Arg::new("min")
                        .long("min")
                        .value_name("VALUE")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Minimum primary value; applies to --domain, sound by default"),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_name("RFC3339")
                        .requires("to")
                        .value_parser(parse_timestamp),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .value_name("RFC3339")
                        .requires("from")
                        .value_parser(parse_timestamp),
                ),
        )
        .subcommand(Command::new("summary").about("Counts, loudest sound record and category groups"))
        .subcommand(Command::new("clear").about("Delete every saved measurement"))
        .subcommand(
            Command::new("onboarding")
                .about("Show or change the onboarding flag")
                .arg(
                    Arg::new("complete")
                        .long("complete")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("reset"),
                )
                .arg(Arg::new("reset").long("reset").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("settings").about("Show or toggle settings").arg(
                Arg::new("toggle")
                    .long("toggle")
                    .value_name("NAME")
                    .value_parser(|s: &str| s.parse::<Setting>())
                    .help("darkMode, notifications, dataSync or location"),
            ),
        )
        .subcommand(
            Command::new("metrics")
                .about("Run a session and print Prometheus exposition text")
                .arg(domain_arg(true))
                .arg(samples_arg())
                .arg(seed_arg()),
        )
}
