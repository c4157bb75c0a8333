use miette::Report;

use quarry_lang_driver::{DEFAULT_REPORT_WIDTH, render_reports_io};
use quarry_lang_printer::ColorChoice;

/// The width of the terminal, if stderr is one.
pub fn width() -> usize {
    termsize::get().map(|size| size.cols as usize).unwrap_or(DEFAULT_REPORT_WIDTH)
}

/// Render `reports` to stderr.
pub fn report(reports: &[Report], colorize: ColorChoice) {
    let stderr = std::io::stderr();
    let mut stderr = stderr.lock();
    if let Err(err) = render_reports_io(&mut stderr, reports, colorize, width()) {
        eprintln!("Failed to render errors: {err}");
    }
}
