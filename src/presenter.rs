// src/presenter.rs
use chrono::Local;
use std::io::{self, Write};
use std::time::Duration;

use crate::data_types::Selection;
use crate::style::{self, DisplayRecord};

/// Length of both the enter and the leave animation.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(500);

/// A resolved record ready to draw, keyed by its position in the rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub key: usize,
    pub display: DisplayRecord,
}

impl From<&Selection> for Frame {
    fn from(selection: &Selection) -> Self {
        Frame {
            key: selection.key,
            display: style::resolve(&selection.record),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Something appears where nothing was shown.
    Enter(Frame),
    /// The old entry leaves while the new one enters.
    Swap { leave: usize, enter: Frame },
    /// Same position, possibly new content; redrawn in place.
    Update(Frame),
    /// The shown entry leaves and nothing replaces it.
    Leave(usize),
    Blank,
}

impl Transition {
    /// How long the animation runs before the screen is settled.
    pub fn duration(&self) -> Duration {
        match self {
            Transition::Enter(_) | Transition::Swap { .. } | Transition::Leave(_) => {
                TRANSITION_DURATION
            }
            Transition::Update(_) | Transition::Blank => Duration::ZERO,
        }
    }
}

/// Remembers what is on screen so each new selection can be turned
/// into a transition.
#[derive(Debug, Default)]
pub struct Stage {
    current: Option<usize>,
}

impl Stage {
    pub fn new() -> Self {
        Stage::default()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn show(&mut self, selection: Option<&Selection>) -> Transition {
        let next = selection.map(Frame::from);
        let transition = match (self.current, next) {
            (None, None) => Transition::Blank,
            (None, Some(frame)) => Transition::Enter(frame),
            (Some(key), None) => Transition::Leave(key),
            (Some(key), Some(frame)) if key == frame.key => Transition::Update(frame),
            (Some(key), Some(frame)) => Transition::Swap {
                leave: key,
                enter: frame,
            },
        };

        self.current = selection.map(|s| s.key);
        transition
    }
}

pub trait Presenter {
    fn present(&mut self, transition: Transition);
}

/// Writes one line per transition.
pub struct TerminalPresenter<W: Write> {
    out: W,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        TerminalPresenter { out: io::stdout() }
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        TerminalPresenter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, frame: &Frame) -> io::Result<()> {
        let display = &frame.display;
        writeln!(
            self.out,
            "[{}] #{} {} | {}  (title {} on {}, text {} on {})",
            Local::now().format("%H:%M:%S"),
            frame.key,
            display.title,
            display.text,
            display.title_color,
            display.title_bg_color,
            display.color,
            display.background_color,
        )
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn present(&mut self, transition: Transition) {
        log::trace!("Transition over {:?}", transition.duration());
        let stamp = Local::now().format("%H:%M:%S");
        let result = match &transition {
            Transition::Enter(frame) | Transition::Update(frame) => self.line(frame),
            Transition::Swap { enter, .. } => self.line(enter),
            Transition::Leave(key) => writeln!(self.out, "[{stamp}] #{key} cleared"),
            Transition::Blank => Ok(()),
        };

        if let Err(e) = result.and_then(|_| self.out.flush()) {
            log::warn!("Could not write ticker line: {e}");
        }
    }
}
