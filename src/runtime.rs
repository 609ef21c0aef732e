// src/runtime.rs
//! Drives a [`Ticker`] with real timers and a real [`SheetSource`].
//!
//! All state changes happen inside [`Runtime::run`]; timers and fetches are
//! separate tasks that only post messages back to it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::cloud_handler::SheetSource;
use crate::config::{TickerConfig, MAX_INTERVAL};
use crate::data_types::FetchRequest;
use crate::presenter::{Presenter, Stage};
use crate::ticker::{Command, Message, Ticker, TimerKind};

enum Event {
    Ticker(Message),
    Tick { timer: TimerKind, epoch: u64 },
}

/// Cloneable way in from the outside.
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl RuntimeHandle {
    /// Returns false once the runtime is gone.
    pub fn reconfigure(&self, config: TickerConfig) -> bool {
        self.tx.send(Event::Ticker(Message::Reconfigure(config))).is_ok()
    }

    pub fn shutdown(&self) -> bool {
        self.tx.send(Event::Ticker(Message::Shutdown)).is_ok()
    }
}

struct Timer {
    epoch: u64,
    task: JoinHandle<()>,
}

pub struct Runtime<P: Presenter> {
    ticker: Ticker,
    source: Arc<dyn SheetSource>,
    presenter: P,
    stage: Stage,
    timers: HashMap<TimerKind, Timer>,
    next_epoch: u64,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl<P: Presenter> Runtime<P> {
    pub fn new(config: TickerConfig, source: Arc<dyn SheetSource>, presenter: P) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Runtime {
            ticker: Ticker::new(config),
            source,
            presenter,
            stage: Stage::new(),
            timers: HashMap::new(),
            next_epoch: 0,
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            tx: self.tx.clone(),
        }
    }

    /// Mounts the ticker and processes messages until shutdown.
    /// Hands the presenter back so callers can inspect what was shown.
    pub async fn run(mut self) -> P {
        self.dispatch(Message::Mount);

        while let Some(event) = self.rx.recv().await {
            let message = match event {
                Event::Ticker(message) => message,
                Event::Tick { timer, epoch } => {
                    if !self.is_live(timer, epoch) {
                        log::trace!("Dropping tick from cancelled {timer:?} timer");
                        continue;
                    }
                    match timer {
                        TimerKind::Fetch => Message::FetchTick,
                        TimerKind::Rotate => Message::RotateTick,
                    }
                }
            };

            let shutdown = matches!(message, Message::Shutdown);
            self.dispatch(message);
            if shutdown {
                break;
            }
        }

        for (_, timer) in self.timers.drain() {
            timer.task.abort();
        }
        self.presenter
    }

    fn dispatch(&mut self, message: Message) {
        for command in self.ticker.update(message) {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Fetch(request) => self.spawn_fetch(request),
            Command::StartTimer { timer, every } => self.start_timer(timer, every),
            Command::CancelTimer(timer) => self.cancel_timer(timer),
            Command::Publish(selection) => {
                let transition = self.stage.show(selection.as_ref());
                self.presenter.present(transition);
            }
        }
    }

    fn spawn_fetch(&self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = source.fetch_grid(&request).await;
            let _ = tx.send(Event::Ticker(Message::Fetched {
                generation: request.generation,
                result,
            }));
        });
    }

    fn start_timer(&mut self, timer: TimerKind, every: Duration) {
        self.cancel_timer(timer);

        let every = if every > MAX_INTERVAL {
            log::warn!("{timer:?} period {every:?} is too long, using {MAX_INTERVAL:?}");
            MAX_INTERVAL
        } else {
            every
        };

        self.next_epoch += 1;
        let epoch = self.next_epoch;
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            // The immediate run already happened; first tick is one period out.
            let now = Instant::now();
            let start = now.checked_add(every).unwrap_or_else(|| {
                log::warn!("{timer:?} timer cannot start {every:?} from now, using {MAX_INTERVAL:?}");
                now + MAX_INTERVAL
            });
            let mut interval = time::interval_at(start, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Event::Tick { timer, epoch }).is_err() {
                    break;
                }
            }
        });

        log::debug!("{timer:?} timer #{epoch} every {every:?}");
        self.timers.insert(timer, Timer { epoch, task });
    }

    fn cancel_timer(&mut self, timer: TimerKind) {
        if let Some(old) = self.timers.remove(&timer) {
            old.task.abort();
            log::debug!("{timer:?} timer #{} cancelled", old.epoch);
        }
    }

    fn is_live(&self, timer: TimerKind, epoch: u64) -> bool {
        self.timers.get(&timer).map_or(false, |t| t.epoch == epoch)
    }
}
