use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("hostmap")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("hostmap")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl the web breadth-first from the seed set, recording cross-host \
                resource dependencies into the host graph.",
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Path to a JSON crawl configuration file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(-s --"seed" <URL>)
                        .required(false)
                        .help("Seed URL to start from (repeatable; overrides config seeds)")
                        .value_parser(clap::value_parser!(Url))
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-d --"database" <PATH>)
                        .required(false)
                        .help("Location of the host graph database")
                        .default_value("~/.local/share/hostmap/hostmap.db"),
                )
                .arg(
                    arg!(--"state-dir" <PATH>)
                        .required(false)
                        .help("Directory for crawl checkpoints (frontier, filter, quotas)")
                        .default_value("~/.local/share/hostmap/state"),
                )
                .arg(
                    arg!(-b --"batch-size" <PAGES>)
                        .required(false)
                        .help("Commit the graph and checkpoint every this many processed pages")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-m --"max-per-domain" <COUNT>)
                        .required(false)
                        .help("Maximum frontier links admitted per root domain")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request fetch timeout in seconds")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            command!("stats")
                .about("Print host and edge counts from an existing host graph database")
                .arg(
                    arg!(-d --"database" <PATH>)
                        .required(false)
                        .help("Location of the host graph database")
                        .default_value("~/.local/share/hostmap/hostmap.db"),
                )
                .arg(
                    arg!(-n --"top" <COUNT>)
                        .required(false)
                        .help("How many most-referenced target hosts to list")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("15"),
                ),
        )
}
