//! Raw-mode terminal session built on crossterm.

use std::io::{self, Stdout, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::{cursor, execute, queue, terminal};

use crate::navigation::Key;
use crate::render::markup::{self, Style};
use crate::render::{Frame, Viewport};

/// Current terminal size, or `None` when stdout is not a terminal.
pub fn size() -> Option<Viewport> {
    terminal::size()
        .ok()
        .filter(|&(w, h)| w > 0 && h > 0)
        .map(|(w, h)| Viewport::new(w as usize, h as usize))
}

/// Owns raw mode and the alternate screen. Dropping it restores the
/// terminal, including while a panic unwinds.
pub struct Session {
    out: Stdout,
}

impl Session {
    pub fn start() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, terminal::EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        tracing::debug!("terminal session started");
        Ok(Self { out })
    }

    pub fn viewport(&self) -> Viewport {
        size().unwrap_or(Viewport::FALLBACK)
    }

    pub fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        let base = Style {
            fg: Some(frame.foreground),
            bg: Some(frame.background),
            ..Style::default()
        };
        queue!(self.out, cursor::MoveTo(0, 0))?;
        for (row, line) in frame.lines.iter().enumerate() {
            queue!(self.out, cursor::MoveTo(0, row as u16))?;
            for (text, style) in markup::spans(line, base) {
                apply_style(&mut self.out, style)?;
                queue!(self.out, Print(text))?;
            }
        }
        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor)?;
        self.out.flush()
    }

    /// Block until a key press or resize arrives.
    pub fn read_key(&mut self) -> io::Result<Key> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(key_from_event(key)),
                Event::Resize(..) => return Ok(Key::Resize),
                _ => {}
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            SetAttribute(Attribute::Reset),
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
        tracing::debug!("terminal restored");
    }
}

fn apply_style(out: &mut Stdout, style: Style) -> io::Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Reset),
        SetForegroundColor(style.fg.unwrap_or(Color::Reset)),
        SetBackgroundColor(style.bg.unwrap_or(Color::Reset)),
    )?;
    let attributes = [
        (style.bold, Attribute::Bold),
        (style.italic, Attribute::Italic),
        (style.dim, Attribute::Dim),
        (style.underline, Attribute::Underlined),
        (style.reverse, Attribute::Reverse),
    ];
    for (on, attribute) in attributes {
        if on {
            queue!(out, SetAttribute(attribute))?;
        }
    }
    Ok(())
}

/// Translate a crossterm key event into a backend-neutral [`Key`].
pub fn key_from_event(event: KeyEvent) -> Key {
    match event.code {
        KeyCode::Char('c') | KeyCode::Char('C')
            if event.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Key::CtrlC
        }
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::Esc => Key::Esc,
        _ => Key::Other,
    }
}
