use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use viewer_logging::{viewer_debug, viewer_warn};

/// Commands typed by the user on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput {
    Finish,
    Quit,
}

pub fn parse_line(line: &str) -> Option<UserInput> {
    match line.trim().to_ascii_lowercase().as_str() {
        "finish" | "f" => Some(UserInput::Finish),
        "quit" | "q" | "exit" => Some(UserInput::Quit),
        _ => None,
    }
}

/// Reads stdin on its own thread. End of input only stops the reader.
pub fn spawn_stdin_reader(tx: mpsc::Sender<UserInput>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Some(input) => {
                    if tx.send(input).is_err() {
                        break;
                    }
                }
                None => viewer_warn!("Unknown command {:?}; use `finish` or `quit`", line.trim()),
            }
        }
        viewer_debug!("stdin closed");
    });
}

#[cfg(test)]
mod tests {
    use super::{parse_line, UserInput};

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!(parse_line(" Finish \n"), Some(UserInput::Finish));
        assert_eq!(parse_line("q"), Some(UserInput::Quit));
        assert_eq!(parse_line("reload"), None);
    }
}
