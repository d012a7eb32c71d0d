//! Bridge to an external fuzzy-picker process.
//!
//! The picker reads one candidate name per stdin line and prints the
//! chosen names back on stdout; everything else about it is its own
//! business.

use std::io::{self, Write as _};
use std::process::{Command, Stdio};

/// Runs `command` over the candidate names and returns the picked ones.
pub fn pick_names(command: &str, names: &[String]) -> io::Result<Vec<String>> {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty picker command",
        ));
    };

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        for name in names {
            writeln!(stdin, "{name}")?;
        }
    }

    let output = child.wait_with_output()?;
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
