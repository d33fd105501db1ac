use std::error::Error;
use std::io::Write;
use std::path::Path;

use clap::{Arg, Command};
use dotenv::dotenv;

use draft_advisor::config::AdvisorConfig;

use crate::context::{LAST_DATASET_KEY, LAST_EVENTS_KEY};

mod action;
mod app;
mod cli;
mod context;

fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    init_logger();

    let matches = command().get_matches();
    let context = context::create_context()?;
    let config = AdvisorConfig::load(Some(context.config_path.as_path()))?;

    let dataset_arg = matches.get_one::<String>("dataset").cloned();
    // reopen the previous session when started without arguments
    let resumed = dataset_arg.is_none();
    let dataset = dataset_arg
        .or_else(|| context.read_data(LAST_DATASET_KEY))
        .ok_or("usage: draft-advisor <dataset.json> [events.jsonl]")?;

    let app = app::App::open(Path::new(&dataset), config)?;
    context.write_data(LAST_DATASET_KEY, &dataset)?;

    let events = matches
        .get_one::<String>("events")
        .cloned()
        .or_else(|| resumed.then(|| context.read_data(LAST_EVENTS_KEY)).flatten());
    if let Some(events) = events {
        println!("{}", app.replay_file(Path::new(&events))?);
        context.write_data(LAST_EVENTS_KEY, &events)?;
    }

    cli::main(&app, &app::actions())
}

fn command() -> Command {
    Command::new("draft-advisor")
        .about("Pick advice and deck suggestions for limited drafts")
        .arg(Arg::new("dataset").value_name("DATASET"))
        .arg(Arg::new("events").value_name("EVENTS"))
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(buf, "{} {:<5} {}", utc_now(), record.level(), record.args())
        })
        .init();
}

fn utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
