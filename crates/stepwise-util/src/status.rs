//! Cargo-style status lines on stderr.

use std::io::Write;

use console::Style;

fn write_status(style: Style, label: &str, message: &str) {
    let _ = writeln!(
        std::io::stderr(),
        "{:>12} {message}",
        style.bold().apply_to(label),
    );
}

/// Print a status line for a completed action: `     Checked shop`
///
/// The `label` is right-aligned to 12 columns in bold green.
pub fn status(label: &str, message: &str) {
    write_status(Style::new().green(), label, message);
}

/// Like [`status`] but bold cyan, for summaries that report rather than act.
pub fn status_info(label: &str, message: &str) {
    write_status(Style::new().cyan(), label, message);
}

/// Bold yellow label, for results the user should look at.
pub fn status_warn(label: &str, message: &str) {
    write_status(Style::new().yellow(), label, message);
}
