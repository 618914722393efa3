use clap::{Arg, ArgAction, Command};

pub fn status_command() -> Command {
    Command::new("status")
        .about("Fetch the working-tree status of a workspace once")
        .arg(
            Arg::new("path")
                .help("Workspace root (a git repository)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Output the snapshot in JSON format")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-diff")
                .long("no-diff")
                .help("Skip per-file patch text")
                .action(ArgAction::SetTrue),
        )
}
