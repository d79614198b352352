use std::io::{self, Stdout, Write};

use super::{DashboardView, Renderer};
use crate::error::MonitorError;

/// Line-oriented output for pipes, logs and dumb terminals.
pub struct PlainRenderer<W: Write> {
    out: W,
}

impl PlainRenderer<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for PlainRenderer<W> {
    fn render(&mut self, view: &DashboardView) -> Result<(), MonitorError> {
        writeln!(
            self.out,
            "[{}] {}",
            view.observed_at.format("%Y-%m-%d %H:%M:%S"),
            view.identity
        )?;
        for (key, value) in view.rows() {
            writeln!(self.out, "  {:<28} {}", key, value)?;
        }
        let progress = match view.progress() {
            Some(fraction) => format!("{:.0}%", fraction * 100.0),
            None => "--".to_string(),
        };
        writeln!(self.out, "  {:<28} {}", "progress", progress)?;
        self.out.flush()?;
        Ok(())
    }
}
