//! Plain terminal rendering of the practice view.

use std::io::{self, Write};

use services::{PracticeState, PracticeView};

/// Prints a card once when it appears and rewrites the countdown line in place.
pub struct Renderer {
    json: bool,
    shown: Option<(usize, String)>,
    empty_shown: bool,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            shown: None,
            empty_shown: false,
        }
    }

    pub fn draw(&mut self, view: &PracticeView) -> io::Result<()> {
        let mut out = io::stdout().lock();
        self.draw_to(&mut out, view)?;
        out.flush()
    }

    pub fn finish(&mut self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        self.finish_to(&mut out)?;
        out.flush()
    }

    fn draw_to(&mut self, out: &mut impl Write, view: &PracticeView) -> io::Result<()> {
        if self.json {
            let line = serde_json::to_string(view).map_err(io::Error::other)?;
            return writeln!(out, "{line}");
        }

        let Some(progress) = view.progress else {
            self.shown = None;
            // The first view is the placeholder before any build lands.
            if view.empty_reason.is_some() && !self.empty_shown {
                writeln!(out, "\n{}", view.status_line())?;
                if let Some(hint) = view.empty_hint() {
                    writeln!(out, "{hint}")?;
                }
                self.empty_shown = true;
            }
            return Ok(());
        };
        self.empty_shown = false;

        if let Some(card) = &view.card {
            let key = (progress.current, card.source_id().to_string());
            if self.shown.as_ref() != Some(&key) {
                writeln!(out, "\n\n[{}/{}] {}", progress.current, progress.total, card.question())?;
                self.shown = Some(key);
            }
        }

        let hint = match view.state {
            PracticeState::Finished => "q = quit",
            _ if view.can_advance => "n = next",
            _ => "last card",
        };
        write!(out, "\r{:<60}", format!("{}  ({hint})", view.status_line()))
    }

    fn finish_to(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        writeln!(out)
    }
}
