//! Full-screen error display.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

/// Displays a human-readable error message on its own screen, dismissed by
/// any key press. Used when the recording UI itself cannot come up or has
/// already been torn down.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates the error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen { terminal })
    }

    /// Shows the message centered on a red background and blocks until a key
    /// is pressed.
    ///
    /// # Errors
    /// - If terminal rendering fails
    /// - If event polling fails
    pub fn show_error(&mut self, message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                let style = Style::default()
                    .fg(Color::Rgb(255, 255, 255))
                    .bg(Color::Rgb(183, 28, 28));
                frame.render_widget(Block::default().style(style), area);

                let text_width = (area.width * 80) / 100;
                let body = Rect {
                    x: area.x + area.width / 10,
                    y: area.y + area.height / 2,
                    width: text_width,
                    height: area.height / 2,
                };
                let paragraph = Paragraph::new(Text::from(vec![
                    Line::from(Span::styled(message.to_string(), style)),
                    Line::from(""),
                    Line::from(Span::styled("Press any key to close", style)),
                ]))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, body);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
