use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use clap::{CommandFactory, Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use rustyline::{error::ReadlineError, DefaultEditor};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

mod session;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[arg(long, value_name = "IP", env = "HEOS_HOST", global = true)]
    host: Option<String>,

    #[arg(long, env = "HEOS_PORT", default_value_t = session::DEFAULT_PORT, global = true)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    GenerateCompletions,
    /// Decode a raw response from FILE, or stdin when omitted
    Decode { file: Option<PathBuf> },
    /// Send a command such as `player/get_players` and print the reply
    #[command(alias("heos"))]
    Send { command: String },
    GetPlayerId,
    #[command(alias("url"))]
    PlayUrl {
        #[arg(long)]
        pid: Option<i64>,
        url: String,
    },
    /// Interactive prompt sending one command per line
    Shell,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn decode_input(file: Option<PathBuf>) -> Result<()> {
    let raw = match file {
        Some(path) => fs::read(path)?,
        None => {
            let mut raw = Vec::new();
            io::stdin().read_to_end(&mut raw)?;
            raw
        }
    };
    print_json(&heos_decode::decode(&raw)?)
}

fn shell(session: &mut Session) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("heos> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;
                match session.exchange(line) {
                    Ok(response) => print_json(&response)?,
                    Err(err) => eprintln!("{err:?}"),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(()),
            Err(err) => return Err(err.into()),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();
    let connect = || -> Result<Session> {
        let host = cli
            .host
            .clone()
            .ok_or_else(|| eyre!("--host or HEOS_HOST is required for this command"))?;
        Ok(Session::new(host, cli.port))
    };
    match cli.command {
        Command::GenerateCompletions => {
            clap_complete::generate(
                clap_complete::shells::Zsh,
                &mut Cli::command(),
                "heos-decode",
                &mut io::stdout(),
            );
        }
        Command::Decode { ref file } => {
            decode_input(file.clone())?;
        }
        Command::Send { ref command } => {
            print_json(&connect()?.exchange(command)?)?;
        }
        Command::GetPlayerId => {
            println!("{}", connect()?.first_player_id()?);
        }
        Command::PlayUrl { pid, ref url } => {
            connect()?.play_url(pid, url)?;
        }
        Command::Shell => {
            shell(&mut connect()?)?;
        }
    }
    Ok(())
}
