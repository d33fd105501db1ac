use clap::{Arg, Command};
use std::error::Error;
use std::io::Write;
use std::io::{stdin, stdout};

use crate::action::Action;
use crate::app::App;

const ARGS: &str = "args";

pub fn main(app: &App, actions: &[Action]) -> Result<(), Box<dyn Error>> {
    loop {
        let Some(line) = readline()? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(app, actions, line) {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(stdout(), "{err}")?;
                stdout().flush()?;
            }
        }
    }

    Ok(())
}

fn respond(app: &App, actions: &[Action], line: &str) -> Result<bool, Box<dyn Error>> {
    let args = shlex::split(line).ok_or("error: Invalid quoting")?;
    let matches = cli(actions).try_get_matches_from(args)?;
    match matches.subcommand() {
        Some(("ping", _matches)) => {
            writeln!(stdout(), "Pong")?;
            stdout().flush()?;
        }
        Some(("quit", _matches)) => {
            writeln!(stdout(), "Exiting ...")?;
            stdout().flush()?;
            return Ok(true);
        }
        Some((name, matches)) => {
            let action = actions
                .iter()
                .find(|action| action.cmd == name)
                .ok_or("error: Invalid command")?;
            let values = matches
                .try_get_many::<String>(ARGS)
                .ok()
                .flatten()
                .map(|values| values.cloned().collect::<Vec<_>>())
                .unwrap_or_default();
            let output = action.invoke(app, &values)?;
            writeln!(stdout(), "{output}")?;
            stdout().flush()?;
        }
        None => unreachable!("subcommand required"),
    }

    Ok(false)
}

fn cli(actions: &[Action]) -> Command {
    // strip out usage
    const PARSER_TEMPLATE: &str = "\
        {all-args}
    ";
    // strip out name/version
    const COMMAND_TEMPLATE: &str = "\
        {about-with-newline}\n\
        {usage-heading}\n    {usage}\n\
        \n\
        {all-args}{after-help}\
    ";

    let mut cmd = Command::new("repl")
        .multicall(true)
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand_value_name("COMMAND")
        .subcommand_help_heading("COMMANDS")
        .help_template(PARSER_TEMPLATE)
        .subcommand(
            Command::new("ping")
                .about("Get a response")
                .help_template(COMMAND_TEMPLATE),
        )
        .subcommand(
            Command::new("quit")
                .alias("exit")
                .alias("q")
                .alias(":q")
                .about("Quit the REPL")
                .help_template(COMMAND_TEMPLATE),
        );

    for action in actions.iter() {
        let mut sub = Command::new(action.cmd)
            .about(action.desc)
            .help_template(COMMAND_TEMPLATE);
        if let Some(arg) = action.arg {
            sub = sub.arg(
                Arg::new(ARGS)
                    .value_name(arg)
                    .num_args(1..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true),
            );
        }
        cmd = cmd.subcommand(sub);
    }

    cmd
}

/// `None` once stdin is closed.
fn readline() -> Result<Option<String>, Box<dyn Error>> {
    write!(stdout(), "> ")?;
    stdout().flush()?;
    let mut buffer = String::new();
    if stdin().read_line(&mut buffer)? == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}
