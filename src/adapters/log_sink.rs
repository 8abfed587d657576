//! Event sink adapter that writes structured events to the log.

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use log::info;

pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("event: started"),
            AppEvent::ScheduleArmed { wait_secs, queued } => {
                info!("event: schedule armed ({wait_secs}s wait, {queued} patterns queued)");
            }
            AppEvent::ManualEntered => info!("event: manual drive entered"),
            AppEvent::ManualExited => info!("event: manual drive exited"),
            AppEvent::AutoplayStarted { resumed } => {
                info!("event: autoplay started (resumed={resumed})");
            }
            AppEvent::PatternExecuted { code, mode } => {
                info!("event: pattern {code} executed ({mode:?})");
            }
            AppEvent::SnackGiven => info!("event: snack given"),
            AppEvent::AutoplayCancelled => info!("event: autoplay cancelled"),
            AppEvent::AutoplayFinished => info!("event: autoplay finished"),
        }
    }
}
