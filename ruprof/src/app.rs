//! Interactive viewer: input handling, paging through charts, and drawing.

use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::time::sleep;

use crate::plot::ChartSpec;
use crate::ui::{chart::draw_chart, header::draw_header};

pub struct App {
    charts: Vec<ChartSpec>,
    source: String,
    current: usize,
    should_quit: bool,
}

impl App {
    pub fn new(charts: Vec<ChartSpec>, source: impl Into<String>) -> Self {
        Self {
            charts,
            source: source.into(),
            current: 0,
            should_quit: false,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, code: KeyCode) {
        let last = self.charts.len().saturating_sub(1);
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Right
            | KeyCode::Down
            | KeyCode::PageDown
            | KeyCode::Char('l')
            | KeyCode::Char(' ') => {
                self.current = (self.current + 1).min(last);
            }
            KeyCode::Left | KeyCode::Up | KeyCode::PageUp | KeyCode::Char('h') => {
                self.current = self.current.saturating_sub(1);
            }
            KeyCode::Home => self.current = 0,
            KeyCode::End => self.current = last,
            _ => {}
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press {
                        self.handle_key(k.code);
                    }
                }
            }
            if self.should_quit {
                break;
            }

            terminal.draw(|f| self.draw(f))?;

            sleep(Duration::from_millis(50)).await;
        }
        Ok(())
    }

    pub fn draw(&self, f: &mut Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(5)])
            .split(f.area());

        draw_header(f, rows[0], &self.source, self.current, self.charts.len());
        if let Some(spec) = self.charts.get(self.current) {
            draw_chart(spec, rows[1], f.buffer_mut());
        }
    }
}
