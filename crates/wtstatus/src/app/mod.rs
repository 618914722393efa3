mod global;
mod status;
mod watch;

#[cfg(test)]
mod tests;

use clap::Command;

pub fn build_cli() -> Command {
    global::root_command()
        .subcommand(status::status_command())
        .subcommand(watch::watch_command())
}
