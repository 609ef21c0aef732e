// src/ticker.rs
//! The ticker core: two schedulers sharing one rotation state.
//!
//! Nothing in here touches a clock or the network. [`Ticker::update`] takes
//! a [`Message`] and answers with the [`Command`]s the runtime has to carry
//! out, so every timer start, cancel and publish can be checked in tests.

use std::mem;
use std::time::Duration;

use crate::config::TickerConfig;
use crate::data_types::{FetchRequest, RawGrid, RotationState, Selection};
use crate::error::TickerError;
use crate::table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Fetch,
    Rotate,
}

#[derive(Debug)]
pub enum Message {
    /// The host is ready; start fetching if there is a source.
    Mount,
    Reconfigure(TickerConfig),
    FetchTick,
    RotateTick,
    Fetched {
        generation: u64,
        result: Result<RawGrid, TickerError>,
    },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fetch(FetchRequest),
    StartTimer { timer: TimerKind, every: Duration },
    CancelTimer(TimerKind),
    Publish(Option<Selection>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Active { every: Duration },
}

/// Owns the repeating fetch timer.
#[derive(Debug)]
pub struct FetchScheduler {
    state: FetchState,
    generation: u64,
}

impl FetchScheduler {
    pub fn new() -> Self {
        FetchScheduler {
            state: FetchState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fetches right away and keeps fetching every `fetch_every()`.
    /// Without a usable source this is a no-op and the scheduler stays idle.
    pub fn start(&mut self, config: &TickerConfig, commands: &mut Vec<Command>) {
        if !config.has_source() {
            log::debug!("No sheet or key configured, not fetching");
            return;
        }

        self.generation += 1;
        let every = config.fetch_every();
        commands.push(Command::Fetch(self.request(config)));
        commands.push(Command::StartTimer {
            timer: TimerKind::Fetch,
            every,
        });
        self.state = FetchState::Active { every };
        log::info!("Fetching sheet {} every {:?}", config.source_id, every);
    }

    /// Cancels the timer. Results still in flight become stale.
    pub fn stop(&mut self, commands: &mut Vec<Command>) {
        self.generation += 1;
        if let FetchState::Active { .. } = self.state {
            commands.push(Command::CancelTimer(TimerKind::Fetch));
        }
        self.state = FetchState::Idle;
    }

    pub fn restart(&mut self, config: &TickerConfig, commands: &mut Vec<Command>) {
        self.stop(commands);
        self.start(config, commands);
    }

    /// Moves the running timer to a new period without fetching.
    pub fn reschedule(&mut self, every: Duration, commands: &mut Vec<Command>) {
        if let FetchState::Active { .. } = self.state {
            commands.push(Command::CancelTimer(TimerKind::Fetch));
            commands.push(Command::StartTimer {
                timer: TimerKind::Fetch,
                every,
            });
            self.state = FetchState::Active { every };
        }
    }

    pub fn tick(&mut self, config: &TickerConfig, commands: &mut Vec<Command>) {
        if let FetchState::Active { .. } = self.state {
            commands.push(Command::Fetch(self.request(config)));
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn request(&self, config: &TickerConfig) -> FetchRequest {
        FetchRequest {
            generation: self.generation,
            source_id: config.source_id.clone(),
            access_key: config.access_key.clone(),
        }
    }
}

impl Default for FetchScheduler {
    fn default() -> Self {
        FetchScheduler::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPhase {
    Stopped,
    Running { every: Duration },
}

/// Owns the repeating rotation timer.
#[derive(Debug)]
pub struct RotationScheduler {
    phase: RotationPhase,
}

impl RotationScheduler {
    pub fn new() -> Self {
        RotationScheduler {
            phase: RotationPhase::Stopped,
        }
    }

    pub fn phase(&self) -> RotationPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, RotationPhase::Running { .. })
    }

    pub fn start(&mut self, every: Duration, state: &mut RotationState, commands: &mut Vec<Command>) {
        self.tick(state, commands);
        commands.push(Command::StartTimer {
            timer: TimerKind::Rotate,
            every,
        });
        self.phase = RotationPhase::Running { every };
    }

    pub fn stop(&mut self, commands: &mut Vec<Command>) {
        if self.is_running() {
            commands.push(Command::CancelTimer(TimerKind::Rotate));
        }
        self.phase = RotationPhase::Stopped;
    }

    pub fn restart(&mut self, every: Duration, state: &mut RotationState, commands: &mut Vec<Command>) {
        self.stop(commands);
        self.start(every, state, commands);
    }

    pub fn tick(&mut self, state: &mut RotationState, commands: &mut Vec<Command>) {
        commands.push(Command::Publish(state.advance()));
    }
}

impl Default for RotationScheduler {
    fn default() -> Self {
        RotationScheduler::new()
    }
}

/// Lifecycle object tying configuration, both schedulers and the
/// rotation state together.
#[derive(Debug)]
pub struct Ticker {
    config: TickerConfig,
    fetch: FetchScheduler,
    rotation: RotationScheduler,
    state: RotationState,
    mounted: bool,
}

impl Ticker {
    pub fn new(config: TickerConfig) -> Self {
        Ticker {
            config,
            fetch: FetchScheduler::new(),
            rotation: RotationScheduler::new(),
            state: RotationState::new(),
            mounted: false,
        }
    }

    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch.state()
    }

    pub fn rotation_phase(&self) -> RotationPhase {
        self.rotation.phase()
    }

    pub fn rotation_state(&self) -> &RotationState {
        &self.state
    }

    pub fn update(&mut self, message: Message) -> Vec<Command> {
        let mut commands = Vec::new();

        match message {
            Message::Mount => {
                if !self.mounted {
                    self.mounted = true;
                    self.fetch.start(&self.config, &mut commands);
                }
            }
            Message::Reconfigure(config) => self.reconfigure(config, &mut commands),
            Message::FetchTick => self.fetch.tick(&self.config, &mut commands),
            Message::RotateTick => {
                if self.rotation.is_running() {
                    self.rotation.tick(&mut self.state, &mut commands);
                }
            }
            Message::Fetched { generation, result } => {
                self.apply_fetch(generation, result, &mut commands)
            }
            Message::Shutdown => {
                self.fetch.stop(&mut commands);
                self.rotation.stop(&mut commands);
                self.mounted = false;
                log::info!("Ticker stopped");
            }
        }

        commands
    }

    fn reconfigure(&mut self, config: TickerConfig, commands: &mut Vec<Command>) {
        let previous = mem::replace(&mut self.config, config);
        if !self.mounted {
            return;
        }

        if previous.source_differs(&self.config) {
            log::info!("Sheet or key changed, restarting fetch");
            self.fetch.stop(commands);
            self.rotation.stop(commands);
            self.fetch.start(&self.config, commands);
        } else if previous.fetch_every() != self.config.fetch_every() {
            self.fetch.reschedule(self.config.fetch_every(), commands);
        }

        if previous.rotate_every() != self.config.rotate_every() {
            log::info!("Rotating every {:?}", self.config.rotate_every());
            self.rotation
                .restart(self.config.rotate_every(), &mut self.state, commands);
        }
    }

    fn apply_fetch(
        &mut self,
        generation: u64,
        result: Result<RawGrid, TickerError>,
        commands: &mut Vec<Command>,
    ) {
        if !self.fetch.is_current(generation) {
            log::debug!("Discarding result of superseded fetch #{generation}");
            return;
        }

        let grid = match result {
            Ok(grid) => grid,
            Err(e) if e.is_remote() => {
                log::warn!("Fetch failed, keeping {} records: {e}", self.state.records().len());
                return;
            }
            Err(e) => {
                log::error!("Fetch failed: {e}");
                return;
            }
        };

        let records = table::to_ticker_records(&grid);
        log::debug!("Fetched {} rows, {} to show", grid.len().saturating_sub(1), records.len());
        self.state.replace_records(records);

        if !self.rotation.is_running() {
            self.rotation
                .start(self.config.rotate_every(), &mut self.state, commands);
        }
    }
}
