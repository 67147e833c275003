//! Terminal UI.

use console::Term;
use std::io::Write;

use crate::runner::LogLine;

use super::{OutputMode, RunProgressBar, StepflowTheme, UserInterface};

/// Terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: StepflowTheme,
    mode: OutputMode,
    progress: Option<RunProgressBar>,
}

impl TerminalUI {
    /// Create a new terminal UI, picking colors from the environment.
    pub fn new(mode: OutputMode) -> Self {
        Self::with_theme(mode, StepflowTheme::detect())
    }

    /// Create a terminal UI with an explicit theme.
    pub fn with_theme(mode: OutputMode, theme: StepflowTheme) -> Self {
        Self {
            term: Term::stdout(),
            theme,
            mode,
            progress: None,
        }
    }

    fn write_line(&mut self, line: &str) {
        match &self.progress {
            Some(bar) if !bar.is_hidden() => bar.println(line),
            _ => {
                writeln!(self.term, "{}", line).ok();
            }
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            self.write_line(msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            let line = self.theme.format_success(msg);
            self.write_line(&line);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            let line = self.theme.format_warning(msg);
            self.write_line(&line);
        }
    }

    fn error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        Term::stderr().write_line(&line).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn log_line(&mut self, line: &LogLine) {
        if self.mode.shows_log() {
            let styled = self.theme.format_log_line(&line.formatted(), line.level);
            self.write_line(&styled);
        }
    }

    fn output(&mut self, text: &str) {
        writeln!(self.term, "{}", text).ok();
    }

    fn start_progress(&mut self, total: usize) -> RunProgressBar {
        let bar = if self.mode.shows_progress() && self.term.is_term() {
            RunProgressBar::new(total)
        } else {
            RunProgressBar::hidden()
        };
        self.progress = Some(bar.clone());
        bar
    }

    fn finish_progress(&mut self) {
        if let Some(bar) = self.progress.take() {
            bar.finish();
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }
}

/// Create the UI for the current environment.
///
/// `no_color` forces the plain theme.
pub fn create_ui(mode: OutputMode, no_color: bool) -> Box<dyn UserInterface> {
    let theme = if no_color {
        StepflowTheme::plain()
    } else {
        StepflowTheme::detect()
    };
    Box::new(TerminalUI::with_theme(mode, theme))
}
