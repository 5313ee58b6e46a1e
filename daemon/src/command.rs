/// Line commands read from stdin, standing in for the dashboard's UI events.
use std::io::BufRead;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tracing::error;

use crate::event::DashboardEvent;

pub const HELP: &str = "\
commands:
  search <query>        filter the catalog (blank query hides results)
  add <catalog-id>      add a catalog game to your list
  remove <uid>          remove a game that is not running
  select <uid>          show controls for a game
  install <uid> <exe>   install a dummy executable
  run <uid> <exe>       start an installed executable
  stop <uid> <exe>      stop a running executable
  rpc <uid>             connect or disconnect Discord RPC
  list                  show the game list and controls
  stats                 show counters
  quit                  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Add(String),
    Remove(String),
    Select(String),
    Install { uid: String, executable: String },
    Run { uid: String, executable: String },
    Stop { uid: String, executable: String },
    ToggleRpc(String),
    List,
    Stats,
    Help,
    Quit,
}

/// Splits off the first whitespace-delimited word.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], &s[i..]),
        None => (s, ""),
    }
}

fn one_arg(verb: &str, rest: &str) -> Result<String> {
    let arg = rest.trim();
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        bail!("usage: {verb} <id>");
    }
    Ok(arg.to_string())
}

/// `<uid> <exe>` where the executable name may contain spaces.
fn uid_and_exe(verb: &str, rest: &str) -> Result<(String, String)> {
    let (uid, exe) = split_word(rest);
    let exe = exe.trim();
    if uid.is_empty() || exe.is_empty() {
        bail!("usage: {verb} <uid> <exe>");
    }
    Ok((uid.to_string(), exe.to_string()))
}

impl Command {
    pub fn parse(line: &str) -> Result<Command> {
        let (verb, rest) = split_word(line);
        let command = match verb.to_lowercase().as_str() {
            // The query keeps its inner and trailing spaces; only the
            // separator after the verb is dropped.
            "search" => Command::Search(rest.strip_prefix(' ').unwrap_or(rest).to_string()),
            "add" => Command::Add(one_arg(verb, rest)?),
            "remove" => Command::Remove(one_arg(verb, rest)?),
            "select" => Command::Select(one_arg(verb, rest)?),
            "rpc" => Command::ToggleRpc(one_arg(verb, rest)?),
            "install" => {
                let (uid, executable) = uid_and_exe(verb, rest)?;
                Command::Install { uid, executable }
            }
            "run" => {
                let (uid, executable) = uid_and_exe(verb, rest)?;
                Command::Run { uid, executable }
            }
            "stop" => {
                let (uid, executable) = uid_and_exe(verb, rest)?;
                Command::Stop { uid, executable }
            }
            "list" | "ls" => Command::List,
            "stats" => Command::Stats,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(command)
    }
}

/// Reads lines from `reader` until EOF, forwarding each parsed command.
/// Sends `InputClosed` at EOF or on a read error.
///
/// Blocks the calling thread, so run it on a dedicated `std::thread`: a
/// blocked read there does not hold up runtime shutdown.
pub fn forward_commands(reader: impl BufRead, tx: &mpsc::Sender<DashboardEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("[input] Failed to read stdin: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Ok(command) => {
                if tx.blocking_send(DashboardEvent::Command(command)).is_err() {
                    return;
                }
            }
            Err(e) => println!("{e}"),
        }
    }
    let _ = tx.blocking_send(DashboardEvent::InputClosed);
}
