//! Help text assembly.
//!
//! The help screen is built by a fixed pipeline of section renderers, each
//! taking the text so far and appending its own block. The operations
//! section reads the live registry, so operations registered at runtime
//! show up without any change here.

use std::fmt::Write;

use tally_core::OpRegistry;

type Section = fn(String, &OpRegistry) -> String;

const SECTIONS: &[Section] = &[header, commands, operations, examples];

/// Renders the full help screen for the current registry state.
#[must_use]
pub fn render(registry: &OpRegistry) -> String {
    SECTIONS
        .iter()
        .fold(String::new(), |text, section| section(text, registry))
}

fn header(mut text: String, _registry: &OpRegistry) -> String {
    text.push_str("tally - interactive decimal calculator\n");
    text
}

fn commands(mut text: String, _registry: &OpRegistry) -> String {
    text.push_str(
        "\nCommands:\n\
         \x20 help      Show this screen\n\
         \x20 history   List recorded calculations\n\
         \x20 clear     Clear history and undo/redo stacks\n\
         \x20 undo      Revert the last history change\n\
         \x20 redo      Reapply the last undone change\n\
         \x20 save      Write history to disk\n\
         \x20 load      Reload history from disk\n\
         \x20 exit      Save history and quit\n",
    );
    text
}

fn operations(mut text: String, registry: &OpRegistry) -> String {
    text.push_str("\nOperations:\n");
    let names = registry.names();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0);
    for name in &names {
        let display = registry
            .resolve(name)
            .map(|op| op.name())
            .unwrap_or_default();
        let _ = writeln!(text, "  {name:<width$}  {display}");
    }
    text
}

fn examples(mut text: String, _registry: &OpRegistry) -> String {
    text.push_str(
        "\nType an operation name, then the two operands when prompted.\n\
         Enter 'cancel' at an operand prompt to abort the operation.\n",
    );
    text
}
