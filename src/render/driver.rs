//! Crossterm terminal output backend.
//!
//! The `Driver` wraps a buffered stdout writer. It owns the terminal modes
//! (alternate screen, raw mode, cursor visibility) and repaints whole frames
//! of [`Line`]s; the views are small enough that diffing is not worth it.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor, execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use super::text::Line;

/// Terminal output backend using crossterm.
///
/// Does not touch terminal modes on creation; call [`enter`](Self::enter)
/// and [`leave`](Self::leave) explicitly.
pub struct Driver {
    writer: BufWriter<Stdout>,
    active: bool,
}

impl Driver {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(io::stdout()),
            active: false,
        })
    }

    /// Enter the alternate screen, enable raw mode and hide the cursor.
    pub fn enter(&mut self) -> io::Result<()> {
        execute!(self.writer, EnterAlternateScreen, cursor::Hide)?;
        terminal::enable_raw_mode()?;
        self.active = true;
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        terminal::disable_raw_mode()?;
        execute!(self.writer, cursor::Show, LeaveAlternateScreen)?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Repaint the screen: `lines` from the top, `status` dimmed on the last row.
    pub fn draw(&mut self, lines: &[Line], status: &str) -> io::Result<()> {
        let (_, rows) = Self::terminal_size()?;
        queue!(self.writer, Clear(ClearType::All))?;

        let body_rows = usize::from(rows.saturating_sub(1));
        for (row, line) in lines.iter().take(body_rows).enumerate() {
            // `take(body_rows)` keeps `row` below `rows`, which is a u16.
            queue!(self.writer, cursor::MoveTo(0, row as u16))?;
            if line.heading {
                queue!(
                    self.writer,
                    SetAttribute(Attribute::Bold),
                    Print(&line.text),
                    SetAttribute(Attribute::Reset)
                )?;
            } else {
                queue!(self.writer, Print(&line.text))?;
            }
        }

        if rows > 0 {
            queue!(
                self.writer,
                cursor::MoveTo(0, rows - 1),
                SetAttribute(Attribute::Dim),
                Print(status),
                SetAttribute(Attribute::Reset)
            )?;
        }
        self.writer.flush()
    }

    /// Terminal size (columns, rows).
    pub fn terminal_size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
