// src/lib.rs
pub mod cloud_handler;
pub mod config;
pub mod data_types;
pub mod error;
pub mod presenter;
pub mod runtime;
pub mod style;
pub mod table;
pub mod ticker;

pub use cloud_handler::{CloudHandler, SheetSource};
pub use config::{ConfigWatcher, TickerConfig};
pub use data_types::{FetchRequest, RawGrid, Record, RotationState, Selection};
pub use error::{Result, TickerError};
pub use presenter::{Presenter, TerminalPresenter, Transition};
pub use runtime::{Runtime, RuntimeHandle};
pub use style::DisplayRecord;
pub use ticker::{Command, Message, Ticker, TimerKind};
