/// Unwraps a prompt answer. Esc returns `$back` (default: leave the panel),
/// Ctrl-C returns `$quit`; any other prompt failure is propagated.
macro_rules! ask {
    ($prompt:expr) => {
        ask!(
            $prompt,
            $crate::adapters::ui::tui::PanelExit::Done,
            $crate::adapters::ui::tui::PanelExit::Quit
        )
    };
    ($prompt:expr, $back:expr, $quit:expr) => {
        match $crate::adapters::ui::tui::answer($prompt)? {
            $crate::adapters::ui::tui::Answer::Given(value) => value,
            $crate::adapters::ui::tui::Answer::Back => return Ok($back),
            $crate::adapters::ui::tui::Answer::Quit => return Ok($quit),
        }
    };
}

/// Unwraps a portal call inside a panel. Failures end the panel with an
/// inline message, or with a forced logout when the session is dead.
macro_rules! attempt {
    ($result:expr, $fallback:expr) => {
        match $result {
            Ok(value) => value,
            Err(err) => return Ok($crate::adapters::ui::tui::report(err, $fallback)),
        }
    };
}

pub mod admin_panels;
pub mod banner;
pub mod format;
pub mod progress;
pub mod tui;
pub mod user_panels;

/// Prints the welcome banner and applies the theme for all subsequent inquire prompts.
/// Call once at startup (e.g. in main after tracing init).
pub fn init_ui() {
    banner::print_welcome();
    tui::apply_theme();
}
