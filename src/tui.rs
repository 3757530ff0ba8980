use std::io;
use std::time::Duration;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Alignment;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::confirm::ConfirmationService;
use crate::error::ScanError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

// Drawn on stderr; stdin carries scan lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

enum Dialog<'a> {
    Confirm(&'a str),
    Error(&'a str),
}

enum Answer {
    Yes,
    No,
    Dismissed,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }

    fn show(&self, dialog: Dialog<'_>) -> Result<Answer, ScanError> {
        let mut screen = io::stderr();
        enable_raw_mode().map_err(terminal_error)?;
        screen.execute(EnterAlternateScreen).map_err(terminal_error)?;

        let result = self.run_dialog(&dialog);

        disable_raw_mode().map_err(terminal_error)?;
        screen.execute(LeaveAlternateScreen).map_err(terminal_error)?;
        result
    }

    fn run_dialog(&self, dialog: &Dialog<'_>) -> Result<Answer, ScanError> {
        let backend = CrosstermBackend::new(io::stderr());
        let mut terminal = Terminal::new(backend).map_err(terminal_error)?;

        let (title, message, hint, color) = match dialog {
            Dialog::Confirm(prompt) => (
                "Confirm",
                *prompt,
                "Press y to confirm, n to cancel.",
                Color::Yellow,
            ),
            Dialog::Error(message) => ("Error", *message, "Press any key to continue.", Color::Red),
        };

        loop {
            terminal
                .draw(|frame| {
                    let block = Block::default()
                        .borders(Borders::ALL)
                        .title(title)
                        .border_style(Style::default().fg(color));
                    let mut lines: Vec<Line> = message.lines().map(Line::from).collect();
                    lines.push(Line::from(""));
                    lines.push(Line::from(hint));
                    let text = Paragraph::new(lines)
                        .alignment(Alignment::Center)
                        .wrap(Wrap { trim: true })
                        .block(block);
                    frame.render_widget(text, frame.area());
                })
                .map_err(terminal_error)?;

            if !event::poll(POLL_INTERVAL).map_err(terminal_error)? {
                continue;
            }
            let Event::Key(key) = event::read().map_err(terminal_error)? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match dialog {
                Dialog::Error(_) => return Ok(Answer::Dismissed),
                Dialog::Confirm(_) => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(Answer::Yes),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        return Ok(Answer::No);
                    }
                    _ => {}
                },
            }
        }
    }
}

impl ConfirmationService for TerminalPrompter {
    fn confirm(&self, prompt: &str) -> Result<bool, ScanError> {
        Ok(matches!(self.show(Dialog::Confirm(prompt))?, Answer::Yes))
    }

    fn notify_error(&self, message: &str) -> Result<(), ScanError> {
        self.show(Dialog::Error(message))?;
        Ok(())
    }
}

fn terminal_error(err: io::Error) -> ScanError {
    ScanError::Terminal(err.to_string())
}
