//! Connection liveness. The controller calls `keepAlive` about once a
//! second; when it goes quiet the agent tears its page hooks down for good.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::effect::{Effect, TimerKind};

pub const KEEP_ALIVE_TIMEOUT: Duration = Duration::from_millis(3000);
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessEvent {
    KeepAlive,
    Poll,
}

#[derive(Debug)]
pub struct Liveness {
    last_keep_alive: Instant,
    running: bool,
}

impl Liveness {
    pub fn new(now: Instant) -> Self {
        Self {
            last_keep_alive: now,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn last_keep_alive(&self) -> Instant {
        self.last_keep_alive
    }

    /// Attach listeners and start polling.
    pub fn start(&mut self, now: Instant) -> Vec<Effect> {
        self.last_keep_alive = now;
        self.running = true;
        vec![
            Effect::AttachListeners,
            Effect::ScheduleEvery {
                kind: TimerKind::LivenessPoll,
                every: POLL_INTERVAL,
            },
        ]
    }

    /// Timing out is final: later keep-alives are ignored.
    pub fn handle(&mut self, event: LivenessEvent, now: Instant) -> Vec<Effect> {
        match event {
            LivenessEvent::KeepAlive if self.running => {
                self.last_keep_alive = now;
                Vec::new()
            }
            LivenessEvent::KeepAlive => {
                debug!("keep-alive after teardown ignored");
                Vec::new()
            }
            LivenessEvent::Poll if self.running && now > self.last_keep_alive + KEEP_ALIVE_TIMEOUT => {
                info!("keep-alive timed out");
                self.running = false;
                vec![
                    Effect::HideRemote,
                    Effect::DetachListeners,
                    Effect::Cancel(TimerKind::LivenessPoll),
                ]
            }
            LivenessEvent::Poll => {
                debug!("liveness ok");
                Vec::new()
            }
        }
    }
}
