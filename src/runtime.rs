//! Headless event loop
//!
//! Pairs a [`Scheduler`] with a [`MemoryHost`] and carries out the commands
//! the scheduler returns. Debounce timers run on short-lived threads that
//! post the due event back over a channel; everything else happens on the
//! caller's thread.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::event::{Cmd, Event};
use crate::host::MemoryHost;
use crate::scheduler::Scheduler;
use crate::syntax::SyntaxProvider;

pub struct Runtime<P> {
    scheduler: Scheduler<P>,
    host: MemoryHost,
    msg_tx: Sender<Event>,
    msg_rx: Receiver<Event>,
}

impl<P: SyntaxProvider> Runtime<P> {
    pub fn new(scheduler: Scheduler<P>, host: MemoryHost) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            scheduler,
            host,
            msg_tx,
            msg_rx,
        }
    }

    pub fn scheduler(&self) -> &Scheduler<P> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<P> {
        &mut self.scheduler
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut MemoryHost {
        &mut self.host
    }

    /// Deliver an event and carry out whatever it asks for
    ///
    /// Returns true if work was deferred to a timer.
    pub fn dispatch(&mut self, event: Event) -> bool {
        match self.scheduler.handle(&mut self.host, event) {
            Some(cmd) => {
                self.process_cmd(cmd);
                true
            }
            None => false,
        }
    }

    fn process_cmd(&self, cmd: Cmd) {
        match cmd {
            Cmd::ScheduleRefresh { delay, .. } => {
                let tx = self.msg_tx.clone();
                let due = cmd.due_event();
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    let _ = tx.send(due);
                });
            }
        }
    }

    /// Process timer events that already fired. Returns how many ran.
    pub fn process_async_messages(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.msg_rx.try_recv() {
            self.dispatch(event);
            processed += 1;
        }
        processed
    }

    /// Wait up to `timeout` for one timer event and process it
    pub fn wait_for_message(&mut self, timeout: Duration) -> bool {
        match self.msg_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.dispatch(event);
                true
            }
            Err(_) => false,
        }
    }
}
