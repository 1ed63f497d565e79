//! User interaction operations (pause before exit).

use anyhow::Result;

use super::RealRuntime;

use std::io::{self, BufRead, IsTerminal, Write};

/// Core, testable implementation that reads from any BufRead and writes to any Write.
/// Returns once a line (or EOF) has been read.
pub(crate) fn pause_with_io<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    write!(output, "{} ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

impl RealRuntime {
    pub(crate) fn is_interactive_impl(&self) -> bool {
        io::stdin().is_terminal()
    }

    pub(crate) fn pause_impl(&self, prompt: &str) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        pause_with_io(prompt, &mut stdin_lock, &mut stdout)
    }
}
