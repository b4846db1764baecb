//! The light controllers and the event loop that drives them.
//!
//! - [`mode`]: the registry of curves ("Normal" white curve, color palettes)
//! - [`trip_points`]: per-day tables of anchored targets
//! - [`interpolate`]: locating "now" between anchors and interpolating
//! - [`scheduler`] and [`pending`]: timed follow-up tasks and their bookkeeping
//! - [`controller`]: [`RightLight`], one per light
//!
//! [`Core`] owns the clock, the timer queue, the driver and every light. It
//! is single-threaded: tasks are dispatched one at a time and each runs to
//! completion before the next.

pub mod context;
pub mod controller;
pub mod error;
pub mod interpolate;
pub mod mode;
pub mod pending;
pub mod scheduler;
pub mod trip_points;

pub use context::{LightContext, LightEnvironment, Timings};
pub use controller::{LightAttributes, LightStatus, RightLight, Transition, TurnOnRequest};
pub use error::ControllerError;
pub use scheduler::{ScheduledTask, Scheduler, TaskAction, TaskHandle, TimerQueue};

use anyhow::Result;
use chrono::{DateTime, Local};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration as StdDuration;

use crate::backend::LightDriver;
use crate::common::{constants::CHECK_INTERVAL_SECS, utils};
use crate::config::Config;
use crate::time_source::TimeSource;


/// Event loop over all configured lights.
pub struct Core {
    clock: Arc<dyn TimeSource>,
    timers: TimerQueue,
    driver: Box<dyn LightDriver>,
    env: Rc<LightEnvironment>,
    lights: Vec<RightLight>,
}

impl Core {
    pub fn new(
        clock: Arc<dyn TimeSource>,
        driver: Box<dyn LightDriver>,
        env: Rc<LightEnvironment>,
    ) -> Self {
        Self {
            timers: TimerQueue::new(Arc::clone(&clock)),
            clock,
            driver,
            env,
            lights: Vec::new(),
        }
    }

    /// Build a core with one controller per configured light.
    pub fn from_config(
        config: &Config,
        clock: Arc<dyn TimeSource>,
        driver: Box<dyn LightDriver>,
    ) -> Result<Self> {
        let env = Rc::new(LightEnvironment::from_config(config)?);
        let mut core = Self::new(clock, driver, env);
        for light in config.lights.iter().flatten() {
            core.add_light(&light.entity_id)?;
        }
        Ok(core)
    }

    /// Register a light. Entity ids must be unique.
    pub fn add_light(&mut self, entity_id: &str) -> Result<()> {
        if self.light(entity_id).is_some() {
            anyhow::bail!("Light '{entity_id}' is already registered");
        }
        self.lights
            .push(RightLight::new(entity_id, Rc::clone(&self.env)));
        Ok(())
    }

    pub fn light(&self, entity_id: &str) -> Option<&RightLight> {
        self.lights.iter().find(|light| light.entity_id() == entity_id)
    }

    pub fn entity_ids(&self) -> Vec<String> {
        self.lights
            .iter()
            .map(|light| light.entity_id().to_string())
            .collect()
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.driver_name()
    }

    pub fn clock(&self) -> &Arc<dyn TimeSource> {
        &self.clock
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn color_modes(&self) -> Vec<String> {
        self.env.modes.names()
    }

    pub fn turn_on(
        &mut self,
        entity_id: &str,
        request: TurnOnRequest,
    ) -> Result<Transition, ControllerError> {
        self.with_light(entity_id, |light, ctx| light.turn_on(ctx, request))
    }

    pub fn turn_on_specific(
        &mut self,
        entity_id: &str,
        attributes: LightAttributes,
    ) -> Result<(), ControllerError> {
        self.with_light(entity_id, |light, ctx| {
            light.turn_on_specific(ctx, attributes)
        })
    }

    pub fn disable(&mut self, entity_id: &str) -> Result<(), ControllerError> {
        self.with_light(entity_id, |light, ctx| {
            light.disable(ctx);
            Ok(())
        })
    }

    pub fn disable_and_turn_off(&mut self, entity_id: &str) -> Result<(), ControllerError> {
        self.with_light(entity_id, |light, ctx| light.disable_and_turn_off(ctx))
    }

    /// Disable every light, leaving no task scheduled.
    pub fn disable_all(&mut self) {
        for entity_id in self.entity_ids() {
            // Only unknown ids can fail, and these come from the registry
            let _ = self.disable(&entity_id);
        }
    }

    /// Run every task due at the clock's current time. Returns how many ran.
    ///
    /// A failing task is logged and dropped; it re-arms nothing.
    pub fn dispatch_due(&mut self) -> usize {
        let mut ran = 0;
        while let Some((handle, task)) = self.timers.pop_due(self.clock.now()) {
            ran += 1;
            let ScheduledTask { light, action } = task;
            let kind = action.kind();
            let result = self.with_light(&light, |controller, ctx| {
                controller.handle_scheduled(ctx, handle, action)
            });
            if let Err(e) = result {
                log_warning!("Scheduled {kind} for {light} failed: {e}");
            }
        }
        ran
    }

    /// Dispatch tasks until `running` clears, sleeping at most one check
    /// interval at a time.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        let check_interval = StdDuration::from_secs(CHECK_INTERVAL_SECS);

        while running.load(Ordering::SeqCst) && !self.clock.is_ended() {
            self.dispatch_due();

            let sleep = match self.timers.next_due() {
                Some(due) => utils::until(self.clock.now(), due).min(check_interval),
                None => check_interval,
            };
            if !sleep.is_zero() {
                self.clock.sleep(sleep);
            }
        }
        Ok(())
    }

    /// Dispatch every task due up to `end`, advancing the clock from task to task.
    ///
    /// Meant for simulated clocks, where sleeping is instant. Returns the
    /// number of tasks run.
    pub fn run_until(&mut self, end: DateTime<Local>) -> usize {
        let mut ran = 0;
        loop {
            ran += self.dispatch_due();

            let target = match self.timers.next_due() {
                Some(due) if due <= end => due,
                _ => end,
            };
            let now = self.clock.now();
            if now >= end || self.clock.is_ended() {
                break;
            }
            self.clock.sleep(utils::until(now, target));
            if self.clock.now() <= now && target > now {
                // The clock refused to move; nothing more can become due
                break;
            }
        }
        ran
    }

    fn with_light<T>(
        &mut self,
        entity_id: &str,
        op: impl FnOnce(&mut RightLight, &mut LightContext<'_>) -> Result<T, ControllerError>,
    ) -> Result<T, ControllerError> {
        let light = self
            .lights
            .iter_mut()
            .find(|light| light.entity_id() == entity_id)
            .ok_or_else(|| ControllerError::UnknownLight(entity_id.to_string()))?;

        let mut ctx = LightContext {
            clock: self.clock.as_ref(),
            scheduler: &mut self.timers,
            driver: self.driver.as_mut(),
        };
        op(light, &mut ctx)
    }
}
