use clap::{Arg, ArgAction, Command};

pub fn root_command() -> Command {
    Command::new("wtstatus")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Show and follow the working-tree status of git workspaces")
        .long_about("wtstatus keeps one shared status cache per workspace path. Every viewer of the same path shares a single in-flight git query, and polling runs at the fastest interval any active viewer asked for.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Use this config file instead of ./.wtstatus/config.toml")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}
