use clap::{Arg, ArgAction, Command};

pub fn watch_command() -> Command {
    Command::new("watch")
        .about("Follow the working-tree status of one or more workspaces")
        .long_about("Subscribes to every given workspace and prints each snapshot as it is published. Filesystem changes trigger an immediate refresh unless --no-watch is given. Stop with Ctrl-C.")
        .arg(
            Arg::new("paths")
                .help("Workspace roots to follow")
                .required(true)
                .num_args(1..)
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .value_name("MS")
                .help("Poll interval in milliseconds (default from config)")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("passive")
                .long("passive")
                .help("Fetch once and follow, without driving polling")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print one JSON snapshot per line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-watch")
                .long("no-watch")
                .help("Do not refresh on filesystem changes")
                .action(ArgAction::SetTrue),
        )
}
