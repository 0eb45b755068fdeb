//! Line-oriented calculator shell.
//!
//! The loop is generic over [`BufRead`] and [`Write`] so tests can drive it
//! with in-memory buffers. Commands and operation names are matched
//! case-insensitively after trimming. Validation and computation failures
//! are reported and the loop continues; only I/O failures on the streams
//! end the session early.

use std::io::{BufRead, Write};

use tally_core::{CalcError, Result, format_decimal};
use tally_engine::Calculator;

use crate::help;

/// Runs the shell until `exit`, `quit`, or end of input.
pub fn run<R: BufRead, W: Write>(calc: &mut Calculator, mut input: R, mut out: W) -> Result<()> {
    writeln!(out, "tally ready. Type 'help' for available commands.")?;
    loop {
        write!(out, "\n> ")?;
        out.flush()?;
        let Some(line) = read_line(&mut input)? else {
            writeln!(out, "\nInput terminated. Exiting...")?;
            save_on_exit(calc, &mut out)?;
            return Ok(());
        };
        let command = line.trim().to_lowercase();
        if command.is_empty() {
            continue;
        }
        match command.as_str() {
            "help" => {
                write!(out, "{}", help::render(calc.registry()))?;
            }
            "history" => show_history(calc, &mut out)?,
            "clear" => {
                calc.clear();
                writeln!(out, "History cleared.")?;
            }
            "undo" => {
                if calc.undo() {
                    writeln!(out, "Operation undone.")?;
                } else {
                    writeln!(out, "Nothing to undo.")?;
                }
            }
            "redo" => {
                if calc.redo() {
                    writeln!(out, "Operation redone.")?;
                } else {
                    writeln!(out, "Nothing to redo.")?;
                }
            }
            "save" => match calc.save_history() {
                Ok(()) => writeln!(out, "History saved successfully.")?,
                Err(e) => writeln!(out, "Error saving history: {e}")?,
            },
            "load" => match calc.load_history() {
                Ok(()) => writeln!(out, "History loaded successfully.")?,
                Err(e) => writeln!(out, "Error loading history: {e}")?,
            },
            "exit" | "quit" => {
                save_on_exit(calc, &mut out)?;
                writeln!(out, "Goodbye!")?;
                return Ok(());
            }
            name if calc.is_operation(name) => run_operation(calc, name, &mut input, &mut out)?,
            other => {
                writeln!(
                    out,
                    "Unknown command: '{other}'. Type 'help' for available commands."
                )?;
            }
        }
    }
}

/// Prompts for both operands, then performs the operation. Entering
/// `cancel` at either prompt abandons the operation without touching
/// history.
fn run_operation<R: BufRead, W: Write>(
    calc: &mut Calculator,
    name: &str,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "\nEnter numbers (or 'cancel' to abort):")?;
    let Some(a) = prompt_operand(input, out, "First number: ")? else {
        writeln!(out, "Operation cancelled.")?;
        return Ok(());
    };
    let Some(b) = prompt_operand(input, out, "Second number: ")? else {
        writeln!(out, "Operation cancelled.")?;
        return Ok(());
    };
    match calc.perform(name, &a, &b) {
        Ok(result) => writeln!(out, "\nResult: {}", format_decimal(result))?,
        Err(e @ (CalcError::Validation { .. } | CalcError::Computation { .. })) => {
            writeln!(out, "Error: {e}")?;
        }
        Err(e) => writeln!(out, "Unexpected error: {e}")?,
    }
    Ok(())
}

/// Returns `None` on `cancel` or end of input.
fn prompt_operand<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let Some(line) = read_line(input)? else {
        return Ok(None);
    };
    let value = line.trim().to_string();
    if value.eq_ignore_ascii_case("cancel") {
        return Ok(None);
    }
    Ok(Some(value))
}

fn show_history<W: Write>(calc: &Calculator, out: &mut W) -> Result<()> {
    let entries = calc.show_history();
    if entries.is_empty() {
        writeln!(out, "No calculations in history.")?;
        return Ok(());
    }
    writeln!(out, "\nCalculation History:")?;
    for (index, entry) in entries.iter().enumerate() {
        writeln!(out, "{}. {entry}", index + 1)?;
    }
    Ok(())
}

/// Best effort: a failed save must not block leaving the shell.
fn save_on_exit<W: Write>(calc: &Calculator, out: &mut W) -> Result<()> {
    match calc.save_history() {
        Ok(()) => writeln!(out, "History saved successfully.")?,
        Err(e) => writeln!(out, "Warning: could not save history: {e}")?,
    }
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
