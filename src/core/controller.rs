//! The per-light controller.
//!
//! A [`RightLight`] turns a mode request into a chain of transitions: an
//! immediate command towards the interpolated target, a commit that moves the
//! light to the next anchor's exact value over the remaining time, and a
//! recompute that re-enters [`RightLight::turn_on`] once that anchor has
//! passed. Every operation cancels the previous chain before doing anything
//! else, so at most one chain is in flight per light.

use chrono::NaiveDate;
use std::rc::Rc;
use std::time::Duration as StdDuration;

use super::context::{LightContext, LightEnvironment};
use super::error::ControllerError;
use super::interpolate::{Span, interpolate_color, interpolate_white, locate, to_kelvin, to_u8};
use super::pending::PendingQueue;
use super::scheduler::{ScheduledTask, Scheduler, TaskAction, TaskHandle};
use super::trip_points::{TripPointTable, TripTarget};
use crate::backend::{LightColor, LightCommand};
use crate::common::constants::*;
use crate::common::utils;
use crate::geo::DayBoundaries;

/// Arguments of [`RightLight::turn_on`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOnRequest {
    pub mode: String,
    /// Master brightness, 0-255.
    pub brightness: u32,
    /// Added on top of `brightness`; anything above 255 warms/cools the light instead.
    pub brightness_override: u32,
}

impl Default for TurnOnRequest {
    fn default() -> Self {
        Self {
            mode: NORMAL_MODE.to_string(),
            brightness: DEFAULT_BRIGHTNESS,
            brightness_override: DEFAULT_BRIGHTNESS_OVERRIDE,
        }
    }
}

impl TurnOnRequest {
    pub fn mode(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            ..Self::default()
        }
    }

    pub fn with_brightness(mut self, brightness: u32) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_override(mut self, brightness_override: u32) -> Self {
        self.brightness_override = brightness_override;
        self
    }
}

/// Caller-supplied absolute attributes for [`RightLight::turn_on_specific`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightAttributes {
    pub brightness: Option<u8>,
    pub color: Option<LightColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightStatus {
    Idle,
    Active,
}

/// Mutable per-light state. Only the owning controller touches it.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub mode: String,
    pub brightness: u32,
    pub brightness_override: u32,
    pub status: LightStatus,
    pub table: Option<TripPointTable>,
    pub pending: PendingQueue,
}

impl Default for ControllerState {
    fn default() -> Self {
        let request = TurnOnRequest::default();
        Self {
            mode: request.mode,
            brightness: request.brightness,
            brightness_override: request.brightness_override,
            status: LightStatus::Idle,
            table: None,
            pending: PendingQueue::default(),
        }
    }
}

impl ControllerState {
    /// Boundaries of the cached day, if any.
    pub fn day(&self) -> Option<&DayBoundaries> {
        self.table.as_ref().map(TripPointTable::day)
    }
}

/// Outcome of a successful `turn_on`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub span: Span,
    pub now: LightCommand,
    pub commit: LightCommand,
}

/// Controller of one light.
pub struct RightLight {
    entity_id: String,
    env: Rc<LightEnvironment>,
    state: ControllerState,
}

impl RightLight {
    pub fn new(entity_id: impl Into<String>, env: Rc<LightEnvironment>) -> Self {
        Self {
            entity_id: entity_id.into(),
            env,
            state: ControllerState::default(),
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Names of every configured mode.
    pub fn color_modes(&self) -> Vec<String> {
        self.env.modes.names()
    }

    /// Start (or restart) the transition chain for `request`.
    pub fn turn_on(
        &mut self,
        ctx: &mut LightContext<'_>,
        request: TurnOnRequest,
    ) -> Result<Transition, ControllerError> {
        self.cancel_pending(ctx.scheduler);

        if !self.env.modes.contains(&request.mode) {
            return Err(ControllerError::UnknownMode {
                mode: request.mode,
                available: self.color_modes(),
            });
        }

        self.state.mode = request.mode.clone();
        self.state.brightness = request.brightness;
        self.state.brightness_override = request.brightness_override;

        let now = ctx.clock.now();
        self.refresh_day(now.date_naive())?;

        let span = self
            .state
            .table
            .as_ref()
            .and_then(|table| table.points(&request.mode))
            .and_then(|points| locate(points, now))
            .ok_or_else(|| ControllerError::UnknownMode {
                mode: request.mode.clone(),
                available: self.color_modes(),
            })?;

        let (now_command, commit_command) = self.commands_for(&span, &request);

        log_debug!(
            "{}: {} [{} -> {}] ratio {:.3}, {}s to next anchor",
            self.entity_id,
            request.mode,
            span.prev.instant.format("%H:%M:%S"),
            span.next.instant.format("%H:%M:%S"),
            span.ratio,
            span.remaining.as_secs()
        );
        log_debug!("{}: now {now_command}, next {commit_command}", self.entity_id);

        self.send(ctx, &now_command)?;

        let commit_delay = utils::seconds(now_command.transition + self.env.timings.commit_delay);
        self.schedule(ctx.scheduler, commit_delay, TaskAction::Commit(commit_command.clone()));

        let recompute_delay = span.remaining + StdDuration::from_secs(RECOMPUTE_SLACK_SECS);
        self.schedule(ctx.scheduler, recompute_delay, TaskAction::Recompute(request));

        self.state.status = LightStatus::Active;
        Ok(Transition {
            span,
            now: now_command,
            commit: commit_command,
        })
    }

    /// Leave the curve and apply fixed attributes, sending them twice.
    ///
    /// The second send is scheduled even when the first one fails.
    pub fn turn_on_specific(
        &mut self,
        ctx: &mut LightContext<'_>,
        attributes: LightAttributes,
    ) -> Result<(), ControllerError> {
        self.disable(ctx);

        let command = LightCommand {
            entity_id: self.entity_id.clone(),
            brightness: Some(attributes.brightness.unwrap_or(u8::MAX)),
            color: attributes.color,
            transition: self.env.timings.specific_transition,
        };

        let sent = self.send(ctx, &command);
        self.schedule(
            ctx.scheduler,
            utils::seconds(self.env.timings.resend_delay),
            TaskAction::Resend(command),
        );
        sent
    }

    /// Stop following the curve. The light keeps its current state.
    pub fn disable(&mut self, ctx: &mut LightContext<'_>) {
        self.cancel_pending(ctx.scheduler);
    }

    /// Stop following the curve and turn the light off.
    pub fn disable_and_turn_off(&mut self, ctx: &mut LightContext<'_>) -> Result<(), ControllerError> {
        self.cancel_pending(ctx.scheduler);
        self.state.brightness = 0;

        let transition = self.env.timings.off_transition;
        ctx.driver
            .set_off(&self.entity_id, transition)
            .map_err(|e| self.driver_error(ctx, e))
    }

    /// Run a task this light scheduled earlier.
    pub fn handle_scheduled(
        &mut self,
        ctx: &mut LightContext<'_>,
        handle: TaskHandle,
        action: TaskAction,
    ) -> Result<(), ControllerError> {
        self.state.pending.remove(handle);
        log_debug!("{}: running {} {handle}", self.entity_id, action.kind());

        match action {
            TaskAction::Commit(command) | TaskAction::Resend(command) => self.send(ctx, &command),
            TaskAction::Recompute(request) => self.turn_on(ctx, request).map(|_| ()),
        }
    }

    /// Make sure the table matches `today`, rebuilding it when the date changed.
    ///
    /// If the solar provider fails, the previous day's table is re-anchored
    /// onto `today` and marked degraded; the provider is asked again on the
    /// next call.
    fn refresh_day(&mut self, today: NaiveDate) -> Result<(), ControllerError> {
        if let Some(table) = &self.state.table
            && table.date() == today
            && !table.is_degraded()
        {
            return Ok(());
        }

        let env = Rc::clone(&self.env);
        let unavailable = |reason: String| ControllerError::SolarUnavailable {
            date: today,
            reason,
        };

        let day = match env.daylight.boundaries(today) {
            Ok(day) => day,
            Err(e) => match self.state.day() {
                Some(previous) if previous.date == today => {
                    log_debug!("{}: sun times still unavailable for {today}: {e:#}", self.entity_id);
                    return Ok(());
                }
                Some(previous) => {
                    log_warning!(
                        "{}: sun times unavailable for {today}, reusing {}: {e:#}",
                        self.entity_id,
                        previous.date
                    );
                    previous
                        .shifted_to(today)
                        .map_err(|shift| unavailable(format!("{e:#}; {shift:#}")))?
                }
                None => {
                    log_error!("{}: sun times unavailable for {today}: {e:#}", self.entity_id);
                    return Err(unavailable(format!("{e:#}")));
                }
            },
        };

        let table = TripPointTable::build(&env.modes, &day, env.color_step_minutes)
            .map_err(|e| unavailable(format!("{e:#}")))?;
        self.state.table = Some(table);
        Ok(())
    }

    /// Immediate and commit commands for a span.
    fn commands_for(&self, span: &Span, request: &TurnOnRequest) -> (LightCommand, LightCommand) {
        let timings = &self.env.timings;
        let remaining = span.remaining.as_secs_f64();

        match (span.prev.target, span.next.target) {
            (
                TripTarget::White {
                    kelvin: ct_prev,
                    brightness_max: br_prev,
                },
                TripTarget::White {
                    kelvin: ct_next,
                    brightness_max: br_next,
                },
            ) => {
                let state = interpolate_white(
                    (ct_prev, br_prev),
                    (ct_next, br_next),
                    span.ratio,
                    request.brightness,
                    request.brightness_override,
                    &self.env.white,
                );
                (
                    LightCommand::new(&self.entity_id, timings.on_transition)
                        .with_brightness(to_u8(state.brightness))
                        .with_color(LightColor::Kelvin(to_kelvin(state.kelvin))),
                    LightCommand::new(&self.entity_id, remaining)
                        .with_brightness(to_u8(state.brightness_next))
                        .with_color(LightColor::Kelvin(to_kelvin(state.kelvin_next))),
                )
            }
            (prev, next) => {
                let (now, next) = interpolate_color(rgb(prev), rgb(next), span.ratio);
                (
                    LightCommand::new(&self.entity_id, timings.color_transition)
                        .with_brightness(u8::MAX)
                        .with_color(LightColor::Rgb(now)),
                    LightCommand::new(&self.entity_id, remaining)
                        .with_brightness(u8::MAX)
                        .with_color(LightColor::Rgb(next)),
                )
            }
        }
    }

    fn send(&mut self, ctx: &mut LightContext<'_>, command: &LightCommand) -> Result<(), ControllerError> {
        ctx.driver.set_on(command).map_err(|e| self.driver_error(ctx, e))
    }

    fn driver_error(&mut self, ctx: &LightContext<'_>, e: anyhow::Error) -> ControllerError {
        log_error!("{}: {} driver failed: {e:#}", self.entity_id, ctx.driver.driver_name());
        self.state.status = LightStatus::Idle;
        ControllerError::Driver {
            driver: ctx.driver.driver_name(),
            entity_id: self.entity_id.clone(),
            reason: format!("{e:#}"),
        }
    }

    fn schedule(&mut self, scheduler: &mut dyn Scheduler, delay: StdDuration, action: TaskAction) {
        let handle = scheduler.after(
            delay,
            ScheduledTask {
                light: self.entity_id.clone(),
                action,
            },
        );
        if let Some(evicted) = self.state.pending.push(handle) {
            log_debug!("{}: pending queue full, no longer tracking {evicted}", self.entity_id);
        }
    }

    fn cancel_pending(&mut self, scheduler: &mut dyn Scheduler) {
        for handle in self.state.pending.drain() {
            scheduler.cancel(handle);
        }
        self.state.status = LightStatus::Idle;
    }
}

/// Color of a target; white targets never reach this in a color curve.
fn rgb(target: TripTarget) -> [u8; 3] {
    match target {
        TripTarget::Color(rgb) => rgb,
        TripTarget::White { .. } => [u8::MAX; 3],
    }
}
