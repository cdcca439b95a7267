//! Background task driving the focus detector and the reminder scheduler.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use super::{FocusDetector, FocusState, FocusTransition, ReminderScheduler, ResetTarget};
use crate::clock::Clock;
use crate::events::{Event, EventBus};
use crate::storage::Settings;

/// Messages accepted by a running [`WellnessService`].
#[derive(Debug, Clone)]
pub enum WellnessCommand {
    /// Keyboard/mouse activity observed now.
    Activity,
    Acknowledge(ResetTarget),
    SetEnabled(bool),
    /// Swap in a new settings record; timers keep running.
    ApplySettings(Box<Settings>),
}

/// Cloneable handle for talking to the service task.
#[derive(Debug, Clone)]
pub struct WellnessHandle {
    commands: mpsc::Sender<WellnessCommand>,
    focus: watch::Receiver<FocusState>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl WellnessHandle {
    /// Report user activity. Dropped silently if the service is gone.
    pub async fn activity(&self) {
        self.send(WellnessCommand::Activity).await;
    }

    pub async fn acknowledge(&self, target: ResetTarget) {
        self.send(WellnessCommand::Acknowledge(target)).await;
    }

    pub async fn set_enabled(&self, enabled: bool) {
        self.send(WellnessCommand::SetEnabled(enabled)).await;
    }

    pub async fn apply_settings(&self, settings: Settings) {
        self.send(WellnessCommand::ApplySettings(Box::new(settings))).await;
    }

    /// Latest focus state as last published by the service.
    pub fn focus(&self) -> FocusState {
        *self.focus.borrow()
    }

    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    async fn send(&self, command: WellnessCommand) {
        if self.commands.send(command).await.is_err() {
            debug!("wellness service stopped, command dropped");
        }
    }
}

pub struct WellnessService {
    clock: Arc<dyn Clock>,
    bus: EventBus,
    detector: FocusDetector,
    scheduler: ReminderScheduler,
    tick_period: StdDuration,
    commands: mpsc::Receiver<WellnessCommand>,
    focus: watch::Sender<FocusState>,
    shutdown: watch::Receiver<bool>,
}

impl WellnessService {
    pub const COMMAND_BUFFER: usize = 64;

    pub fn new(
        clock: Arc<dyn Clock>,
        bus: EventBus,
        detector: FocusDetector,
        scheduler: ReminderScheduler,
        tick_period: StdDuration,
    ) -> (Self, WellnessHandle) {
        let (command_tx, command_rx) = mpsc::channel(Self::COMMAND_BUFFER);
        let (focus_tx, focus_rx) = watch::channel(detector.state());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let service = Self {
            clock,
            bus,
            detector,
            scheduler,
            tick_period,
            commands: command_rx,
            focus: focus_tx,
            shutdown: shutdown_rx,
        };
        let handle = WellnessHandle {
            commands: command_tx,
            focus: focus_rx,
            shutdown: Arc::new(shutdown_tx),
        };
        (service, handle)
    }

    /// Run until shutdown is requested or every handle is dropped.
    pub async fn run(mut self) {
        let mut ticker = time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(tick_secs = self.tick_period.as_secs(), "wellness service started");

        loop {
            tokio::select! {
                _ = ticker.tick() => self.on_tick(),
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("wellness service stopped");
    }

    fn on_tick(&mut self) {
        let now = self.clock.now();
        if let Some(transition) = self.detector.poll(now) {
            self.publish_focus(transition);
        }
        for due in self.scheduler.tick(now, self.detector.is_active()) {
            self.bus.publish(Event::ReminderDue {
                category: due.category,
                at: due.at,
            });
        }
    }

    fn handle(&mut self, command: WellnessCommand) {
        let now = self.clock.now();
        match command {
            WellnessCommand::Activity => {
                if let Some(transition) = self.detector.record_activity(now) {
                    self.publish_focus(transition);
                } else {
                    self.focus.send_replace(self.detector.state());
                }
            }
            WellnessCommand::Acknowledge(target) => self.scheduler.acknowledge(target, now),
            WellnessCommand::SetEnabled(enabled) => self.scheduler.set_enabled(enabled),
            WellnessCommand::ApplySettings(settings) => self.scheduler.apply_settings(&settings),
        }
    }

    fn publish_focus(&mut self, transition: FocusTransition) {
        self.focus.send_replace(self.detector.state());
        self.bus.publish(Event::FocusStateChanged {
            active: transition.active,
            at: transition.at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CategorySettings;
    use crate::wellness::{FocusConfig, ReminderCategory};
    use chrono::{DateTime, Local, TimeZone};

    /// Wall clock that follows tokio's paused test time.
    struct PausedClock {
        base: DateTime<Local>,
        start: time::Instant,
    }

    impl Clock for PausedClock {
        fn now(&self) -> DateTime<Local> {
            let elapsed = chrono::Duration::from_std(self.start.elapsed()).unwrap();
            self.base + elapsed
        }
    }

    fn paused_clock() -> Arc<dyn Clock> {
        Arc::new(PausedClock {
            base: Local.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap(),
            start: time::Instant::now(),
        })
    }

    fn hydration_only(clock: &Arc<dyn Clock>, interval_minutes: u32) -> ReminderScheduler {
        let mut scheduler = ReminderScheduler::new(clock.now());
        for c in ReminderCategory::ALL {
            scheduler.configure(
                c,
                &CategorySettings {
                    enabled: c == ReminderCategory::Hydration,
                    interval_minutes,
                    suppress_during_focus: true,
                },
            );
        }
        scheduler
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_due_reminders() {
        let clock = paused_clock();
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let (service, handle) = WellnessService::new(
            clock.clone(),
            bus.clone(),
            FocusDetector::default(),
            hydration_only(&clock, 1),
            StdDuration::from_secs(10),
        );
        let task = tokio::spawn(service.run());

        match events.recv().await.unwrap() {
            Event::ReminderDue { category, at } => {
                assert_eq!(category, ReminderCategory::Hydration);
                assert!(at >= clock.now() - chrono::Duration::seconds(10));
            }
            other => panic!("unexpected event {other:?}"),
        }

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn applied_settings_reach_running_scheduler() {
        let clock = paused_clock();
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let (service, handle) = WellnessService::new(
            clock.clone(),
            bus.clone(),
            FocusDetector::default(),
            hydration_only(&clock, 600),
            StdDuration::from_secs(10),
        );
        let task = tokio::spawn(service.run());

        let mut settings = Settings::default();
        settings.hydration.interval_minutes = 1;
        settings.eye_care.enabled = false;
        settings.posture.enabled = false;
        handle.apply_settings(settings.clone()).await;

        match events.recv().await.unwrap() {
            Event::ReminderDue { category, .. } => assert_eq!(category, ReminderCategory::Hydration),
            other => panic!("unexpected event {other:?}"),
        }

        // Switching reminders off globally silences the next round.
        settings.reminders_enabled = false;
        handle.apply_settings(settings).await;
        let quiet = time::timeout(StdDuration::from_secs(300), events.recv()).await;
        assert!(quiet.is_err());

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn activity_pings_drive_focus_events() {
        let clock = paused_clock();
        let bus = EventBus::new(64);
        let mut events = bus.subscribe();
        let detector = FocusDetector::new(FocusConfig {
            focus_threshold: chrono::Duration::minutes(1),
            idle_gap: chrono::Duration::minutes(2),
        });
        let (service, handle) = WellnessService::new(
            clock.clone(),
            bus.clone(),
            detector,
            hydration_only(&clock, 600),
            StdDuration::from_secs(5),
        );
        let task = tokio::spawn(service.run());

        for _ in 0..=4 {
            handle.activity().await;
            time::sleep(StdDuration::from_secs(15)).await;
        }
        match events.recv().await.unwrap() {
            Event::FocusStateChanged { active, .. } => assert!(active),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(handle.focus().active);

        // Silence longer than the idle gap ends focus on a tick.
        match events.recv().await.unwrap() {
            Event::FocusStateChanged { active, .. } => assert!(!active),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(!handle.focus().active);

        drop(handle);
        task.await.unwrap();
    }
}
