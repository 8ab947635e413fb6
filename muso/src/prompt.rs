//! Operator interaction ports
//!
//! The resolution flow needs a handful of human decisions: an artist hint,
//! a release pick, a yes/no confirmation, a manually supplied identifier.
//! Those decision points are traits so the core logic stays testable; the
//! binary wires in the line-based console implementation.

use std::io::{self, BufRead, Write};

use muso_common::Mbid;
use tracing::error;

/// One release option presented when a recording appears on several
/// releases.
#[derive(Debug, Clone)]
pub struct ReleaseChoice {
    pub id: Mbid,
    pub title: String,
    pub date: Option<String>,
}

/// Picks which release to use when the catalog offers more than one.
pub trait ReleasePicker {
    /// Returns an index into `choices`. `choices` is never empty.
    fn pick_release(&self, recording_title: &str, choices: &[ReleaseChoice]) -> usize;
}

/// Full operator interface for the resolution flow.
pub trait Prompter: ReleasePicker {
    /// Artist hint to narrow the free-text search; `None` searches on the
    /// file stem alone.
    fn artist_hint(&self, file_stem: &str) -> Option<String>;

    /// Confirm an automatically matched recording.
    fn confirm_match(&self, artist: &str, title: &str) -> bool;

    /// Ask for a manually supplied recording identifier; `None` means the
    /// operator chose to skip this file.
    fn manual_recording_id(&self, file_name: &str) -> Option<Mbid>;
}

/// Line-based prompts over stdin/stdout.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl ConsolePrompter {
    fn read_line(prompt: &str) -> io::Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl ReleasePicker for ConsolePrompter {
    fn pick_release(&self, recording_title: &str, choices: &[ReleaseChoice]) -> usize {
        println!("\"{}\" appears on {} releases:", recording_title, choices.len());
        for (i, choice) in choices.iter().enumerate() {
            println!(
                "  {}. {} ({}) [{}]",
                i + 1,
                choice.title,
                choice.date.as_deref().unwrap_or("unknown date"),
                choice.id
            );
        }

        loop {
            let input = match Self::read_line(&format!("Select release (1-{}): ", choices.len())) {
                Ok(input) => input,
                Err(_) => return 0,
            };
            match input.parse::<usize>() {
                Ok(n) if n >= 1 && n <= choices.len() => return n - 1,
                _ => println!("Enter a number between 1 and {}.", choices.len()),
            }
        }
    }
}

impl Prompter for ConsolePrompter {
    fn artist_hint(&self, file_stem: &str) -> Option<String> {
        let input =
            Self::read_line(&format!("Artist for \"{}\" (blank to skip): ", file_stem)).ok()?;
        if input.is_empty() {
            None
        } else {
            Some(input)
        }
    }

    fn confirm_match(&self, artist: &str, title: &str) -> bool {
        match Self::read_line(&format!("Found: {} - {}. Is this correct? (y/n): ", artist, title)) {
            Ok(answer) => matches!(answer.to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn manual_recording_id(&self, file_name: &str) -> Option<Mbid> {
        loop {
            let input = Self::read_line(&format!(
                "Could not resolve {}. Enter a recording ID or 's' to skip: ",
                file_name
            ))
            .ok()?;

            if input.eq_ignore_ascii_case("s") {
                return None;
            }
            match Mbid::parse(&input) {
                Ok(mbid) => return Some(mbid),
                Err(reason) => error!(%reason, "invalid recording identifier"),
            }
        }
    }
}
