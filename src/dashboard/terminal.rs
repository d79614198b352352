use ratatui::{
    backend::{Backend, CrosstermBackend},
    crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen},
    },
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io::{self, Stdout};

use super::{DashboardView, Renderer};
use crate::error::MonitorError;

/// Full-screen dashboard on the alternate screen, restored on drop.
pub struct TerminalDashboard<B: Backend = CrosstermBackend<Stdout>> {
    terminal: Terminal<B>,
    alternate_screen: bool,
}

impl TerminalDashboard {
    pub fn enter() -> Result<Self, MonitorError> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(Self {
            terminal,
            alternate_screen: true,
        })
    }
}

impl<B: Backend> TerminalDashboard<B> {
    pub fn with_backend(backend: B) -> Result<Self, MonitorError> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            alternate_screen: false,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }
}

impl<B: Backend> Renderer for TerminalDashboard<B> {
    fn render(&mut self, view: &DashboardView) -> Result<(), MonitorError> {
        self.terminal.draw(|frame| draw(frame, view))?;
        Ok(())
    }
}

impl<B: Backend> Drop for TerminalDashboard<B> {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
        let _ = self.terminal.show_cursor();
    }
}

fn draw(frame: &mut Frame, view: &DashboardView) {
    let [main, progress, footer] = Layout::vertical([
        Constraint::Min(11),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(frame.size());

    let key_style = Style::default().fg(Color::Cyan);
    let value_style = Style::default().fg(Color::Green);
    let rows = view.rows().into_iter().map(|(key, value)| {
        Row::new(vec![
            Cell::from(key).style(key_style),
            Cell::from(value).style(value_style),
        ])
    });
    let table = Table::new(rows, [Constraint::Length(28), Constraint::Min(10)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("leader schedule information · {}", view.identity)),
    );
    frame.render_widget(table, main);

    let (ratio, label) = match view.progress() {
        Some(fraction) => (fraction, format!("{:>3.0}%", fraction * 100.0)),
        None => (0.0, "--".to_string()),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("next slot"))
        .gauge_style(Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, progress);

    let hint = Paragraph::new("press ctrl+c to exit")
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(hint, footer);
}
