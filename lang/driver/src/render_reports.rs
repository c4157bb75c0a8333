use miette::{GraphicalReportHandler, GraphicalTheme, Report};

use quarry_lang_printer::ColorChoice;

/// Terminal width used for rendering diagnostics when none is given.
pub const DEFAULT_REPORT_WIDTH: usize = 200;

fn handler(colorize: ColorChoice, width: usize) -> GraphicalReportHandler {
    let theme = match colorize {
        ColorChoice::Always | ColorChoice::AlwaysAnsi => GraphicalTheme::unicode(),
        ColorChoice::Auto => GraphicalTheme::default(),
        ColorChoice::Never => GraphicalTheme::unicode_nocolor(),
    };
    GraphicalReportHandler::new_themed(theme).with_width(width)
}

/// Render `reports` one after another, separated by an empty line.
pub fn render_reports<O>(
    output: &mut O,
    reports: &[Report],
    colorize: ColorChoice,
    width: usize,
) -> std::fmt::Result
where
    O: std::fmt::Write,
{
    let handler = handler(colorize, width);
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(output)?;
        }
        handler.render_report(output, report.as_ref())?;
    }
    Ok(())
}

pub fn render_reports_to_string(reports: &[Report], colorize: ColorChoice) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail
    let _ = render_reports(&mut output, reports, colorize, DEFAULT_REPORT_WIDTH);
    output
}

pub fn render_reports_io<O>(
    output: &mut O,
    reports: &[Report],
    colorize: ColorChoice,
    width: usize,
) -> std::io::Result<()>
where
    O: std::io::Write,
{
    let mut rendered = String::new();
    render_reports(&mut rendered, reports, colorize, width).map_err(std::io::Error::other)?;
    output.write_all(rendered.as_bytes())
}
