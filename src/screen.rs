use log::debug;

use voting_session::*;

use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::screen::config_reader::*;

#[derive(Debug, Snafu)]
pub enum BoothError {
    #[snafu(display("Error opening election file {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing election file {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error reading from the terminal"))]
    ReadingInput { source: std::io::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type BoothResult<T> = Result<T, BoothError>;

pub mod config_reader {
    use crate::screen::*;

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct BoothCandidate {
        pub id: String,
        pub name: String,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct BoothConfig {
        #[serde(rename = "contestName")]
        pub contest_name: String,
        #[serde(rename = "contestLines")]
        pub contest_lines: Option<Vec<String>>,
        #[serde(rename = "countdownSeconds")]
        pub countdown_seconds: Option<u32>,
        pub candidates: Vec<BoothCandidate>,
    }

    impl BoothConfig {
        /// The election wired into the booth when no description is given.
        pub fn default_election() -> BoothConfig {
            BoothConfig {
                contest_name: "PEMILIHAN KETUA HIMPUNAN".to_string(),
                contest_lines: Some(vec![
                    "Fakultas Sains dan Matematika".to_string(),
                    "Program Studi Informatika 2025/2026".to_string(),
                ]),
                countdown_seconds: Some(DEFAULT_COUNTDOWN_SECONDS),
                candidates: vec![
                    BoothCandidate {
                        id: "c1".to_string(),
                        name: "CALON 1: ARYA DWI NUGRAHA".to_string(),
                    },
                    BoothCandidate {
                        id: "c2".to_string(),
                        name: "CALON 2: RIFQI BANTEEKA".to_string(),
                    },
                ],
            }
        }
    }

    pub fn read_config(path: &str) -> BoothResult<BoothConfig> {
        let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
        debug!("read content: {:?}", contents);
        let config: BoothConfig =
            serde_json::from_str(contents.as_str()).context(ParsingConfigSnafu { path })?;
        Ok(config)
    }
}

// All the commands that can be typed on the booth screen.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Command {
    SetField(VoterField, String),
    Pick(String),
    Submit,
    Reset,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  name <value>      fill in the voter name
  id <value>        fill in the voter id
  faculty <value>   fill in the faculty
  program <value>   fill in the study program
  pick <id>         select a candidate by id
  submit            cast the vote (asks for confirmation)
  reset             clear the form, keep the tally
  show              redraw the screen
  help              show this text
  quit              leave the booth";

/// Parses one input line. Field commands take the rest of the line as the
/// value (an empty rest clears the field).
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (trimmed, ""),
    };
    match (head, rest) {
        ("name", v) => Some(Command::SetField(VoterField::Name, v.to_string())),
        ("id", v) => Some(Command::SetField(VoterField::Id, v.to_string())),
        ("faculty", v) => Some(Command::SetField(VoterField::Faculty, v.to_string())),
        ("program", v) => Some(Command::SetField(VoterField::Program, v.to_string())),
        ("pick", v) if !v.is_empty() => Some(Command::Pick(v.to_string())),
        ("submit", "") => Some(Command::Submit),
        ("reset", "") => Some(Command::Reset),
        ("show", "") => Some(Command::Show),
        ("help", "") => Some(Command::Help),
        ("quit" | "exit", "") => Some(Command::Quit),
        _ => None,
    }
}

/// Confirmation prompt over the terminal: prints the message and reads one
/// line. Anything but an explicit yes declines.
pub struct TerminalPrompt;

impl ConfirmVote for TerminalPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

/// The single booth screen: one session plus the contest header.
pub struct Screen {
    session: VotingSession,
    contest_name: String,
    contest_lines: Vec<String>,
}

impl Screen {
    pub fn new(config: &BoothConfig) -> BoothResult<Screen> {
        let candidates: Vec<Candidate> = config
            .candidates
            .iter()
            .map(|c| Candidate {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .collect();
        let countdown = config.countdown_seconds.unwrap_or(DEFAULT_COUNTDOWN_SECONDS);
        let session = match VotingSession::new(&candidates, countdown) {
            Ok(s) => s,
            Err(e) => whatever!("Invalid election description: {}", e),
        };
        Ok(Screen {
            session,
            contest_name: config.contest_name.clone(),
            contest_lines: config.contest_lines.clone().unwrap_or_default(),
        })
    }

    /// The whole screen as text: banner, timer, form, candidate cards and the
    /// submit label. Per-candidate counts only show once the vote is cast.
    pub fn render(&self) -> String {
        let state = self.session.state();
        let tally = self.session.tally();
        let mut out = String::new();
        let rule = "=".repeat(60);

        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!("  {}\n", self.contest_name));
        for line in self.contest_lines.iter() {
            out.push_str(&format!("  {}\n", line));
        }
        out.push_str(&format!(
            "  time left {:02}s\n",
            state.remaining_seconds
        ));
        out.push_str(&rule);
        out.push('\n');

        for field in VoterField::ALL {
            out.push_str(&format!(
                "  {:<8}: {}\n",
                field.to_string(),
                state.voter.field(field)
            ));
        }
        out.push('\n');
        out.push_str("  Pick your favorite candidate!\n");
        for (candidate, (_, count)) in self.session.candidates().iter().zip(tally.iter()) {
            let mark = if state.selected_candidate.as_deref() == Some(candidate.id.as_str()) {
                "(x)"
            } else {
                "( )"
            };
            out.push_str(&format!("   {} {}  {}", mark, candidate.id, candidate.name));
            if state.has_voted {
                out.push_str(&format!("  votes: {}", count));
            }
            out.push('\n');
        }
        out.push('\n');

        let label = if state.has_voted {
            "ALREADY VOTED"
        } else if self.session.can_submit() {
            "SUBMIT YOUR CHOICE"
        } else {
            "FILL IN YOUR DETAILS & PICK A CANDIDATE"
        };
        out.push_str(&format!("  [ {} ]\n", label));
        out
    }

    /// Applies one command and returns the notice to display, if any.
    pub fn dispatch(&mut self, cmd: Command, prompt: &mut dyn ConfirmVote) -> Option<String> {
        match cmd {
            Command::SetField(field, value) => {
                self.session.update_field(field, &value);
                None
            }
            Command::Pick(id) => match self.session.select_candidate(&id) {
                Ok(()) => None,
                Err(e) => Some(format!("[Info] {}", e)),
            },
            Command::Submit => match self.session.submit_with(prompt) {
                Ok(SubmitOutcome::Recorded(receipt)) => {
                    Some(format!("[Thank you!] {}", receipt.message()))
                }
                // A declined confirmation is a normal cancellation, no notice.
                Ok(SubmitOutcome::Declined) => None,
                Err(e @ SessionErrors::IncompleteSubmission(_)) => {
                    Some(format!("[Complete the form first] {}", e))
                }
                Err(e) => Some(format!("[Info] {}", e)),
            },
            Command::Reset => {
                self.session.reset();
                None
            }
            Command::Show => None,
            Command::Help => Some(HELP.to_string()),
            // Quit is handled by the input loop.
            Command::Quit => None,
        }
    }
}

/// The interactive loop: render, read a line, advance the countdown by the
/// elapsed wall-clock time, dispatch.
pub fn run_booth(config: &BoothConfig) -> BoothResult<()> {
    let mut screen = Screen::new(config)?;
    let mut prompt = TerminalPrompt;
    let mut last_tick = Instant::now();

    println!("{}", screen.render());
    println!("type 'help' for the commands");
    print!("> ");
    let _ = io::stdout().flush();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context(ReadingInputSnafu)?;

        // The countdown runs on wall-clock time between commands.
        let elapsed = last_tick.elapsed().as_secs();
        for _ in 0..elapsed {
            screen.session.tick();
        }
        last_tick += Duration::from_secs(elapsed);

        match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(cmd) => {
                if let Some(notice) = screen.dispatch(cmd, &mut prompt) {
                    println!("{}", notice);
                }
                println!("{}", screen.render());
            }
            None if line.trim().is_empty() => {}
            None => println!("unknown command, type 'help'"),
        }
        print!("> ");
        let _ = io::stdout().flush();
    }
    Ok(())
}
