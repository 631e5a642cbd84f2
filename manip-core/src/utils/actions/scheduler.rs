//! In-flight action set.
//!
//! Actions are ticked once per loop in the order they were submitted and are
//! dropped as soon as they report `Complete` or `Failed`. A failing action is
//! logged and removed; it never stops the loop.
//!
//! Admission checks actuator leases. Under `ContentionPolicy::Reject` an
//! action whose lease overlaps a running action is refused. Under
//! `ContentionPolicy::Flag` it is admitted with a warning and whichever action
//! is ticked later in a loop wins the actuator.

use alloc::vec::Vec;

use super::{Action, ActionError, Lease, TickContext, TickResult};
use crate::utils::config::ContentionPolicy;
use crate::utils::hardware::{ActuatorId, Hardware};

/// Counts from one `Scheduler::tick`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub ticked: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    in_flight: Vec<Action>,
    policy: ContentionPolicy,
    rejected: u32,
}

impl Scheduler {
    pub fn new(policy: ContentionPolicy) -> Self {
        Self {
            in_flight: Vec::new(),
            policy,
            rejected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Total actions refused for contention since construction.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    /// First actuator in `lease` already held by an in-flight action.
    pub fn conflict(
        &self,
        lease: &Lease,
    ) -> Option<ActuatorId> {
        lease.iter().copied().find(|id| self.is_leased(*id))
    }

    pub fn is_leased(
        &self,
        id: ActuatorId,
    ) -> bool {
        self.in_flight.iter().any(|a| a.lease().contains(&id))
    }

    /// Add an action to the back of the in-flight set.
    pub fn submit(
        &mut self,
        action: Action,
    ) -> Result<(), ActionError> {
        if let Some(actuator) = self.conflict(&action.lease()) {
            match self.policy {
                ContentionPolicy::Reject => {
                    self.rejected = self.rejected.saturating_add(1);
                    tracing::debug!(
                        action = action.name(),
                        actuator = ?actuator,
                        "action rejected, actuator leased"
                    );
                    return Err(ActionError::Contention { actuator });
                }
                ContentionPolicy::Flag => {
                    tracing::warn!(
                        action = action.name(),
                        actuator = ?actuator,
                        "action shares a leased actuator, last write wins"
                    );
                }
            }
        }
        self.in_flight.push(action);
        Ok(())
    }

    /// Tick every in-flight action exactly once, in submission order.
    pub fn tick(
        &mut self,
        ctx: &mut TickContext<'_>,
    ) -> TickSummary {
        let mut summary = TickSummary::default();
        self.in_flight.retain_mut(|action| {
            summary.ticked += 1;
            match action.tick(ctx) {
                TickResult::Pending => true,
                TickResult::Complete => {
                    summary.completed += 1;
                    false
                }
                TickResult::Failed(error) => {
                    summary.failed += 1;
                    tracing::error!(action = action.name(), %error, "action failed");
                    false
                }
            }
        });
        summary
    }

    /// Cancel and drop every in-flight action, zeroing its actuators.
    pub fn cancel_all(
        &mut self,
        hw: &mut dyn Hardware,
    ) {
        for mut action in self.in_flight.drain(..) {
            tracing::info!(action = action.name(), "action cancelled");
            action.cancel(hw);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use embassy_time::Instant;

    use super::*;
    use crate::utils::{
        actions::InstantEffect,
        controllers::position::PositionMove,
        hardware::Motor,
        sim::SimHardware,
        telemetry::TelemetryLine,
    };

    fn lift_move(target: i32) -> Action {
        PositionMove::new(ActuatorId::LIFT, target, 0, 2000, 0.8).into()
    }

    #[test]
    fn rejects_overlapping_lease() {
        let mut s = Scheduler::new(ContentionPolicy::Reject);
        s.submit(lift_move(500)).unwrap();
        let err = s
            .submit(InstantEffect::new().set(ActuatorId::LiftLeft, 1.0).into())
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::Contention {
                actuator: ActuatorId::LiftLeft
            }
        );
        assert_eq!(s.len(), 1);
        assert_eq!(s.rejected(), 1);
        assert!(s
            .submit(InstantEffect::new().set(ActuatorId::Claw, 1.0).into())
            .is_ok());
    }

    #[test]
    fn flag_policy_admits_overlap() {
        let mut s = Scheduler::new(ContentionPolicy::Flag);
        s.submit(lift_move(500)).unwrap();
        s.submit(lift_move(600)).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.rejected(), 0);
    }

    #[test]
    fn failed_action_is_dropped_and_others_keep_running() {
        let mut hw = SimHardware::new();
        let mut lines: Vec<TelemetryLine> = Vec::new();
        let mut s = Scheduler::new(ContentionPolicy::Reject);
        s.submit(lift_move(-1)).unwrap();
        s.submit(InstantEffect::new().set(ActuatorId::Claw, 0.3).into())
            .unwrap();

        let mut ctx = TickContext::new(&mut hw, &mut lines, Instant::from_millis(0));
        let summary = s.tick(&mut ctx);
        assert_eq!(
            summary,
            TickSummary {
                ticked: 2,
                completed: 1,
                failed: 1
            }
        );
        assert!(s.is_empty());
        assert_eq!(hw.sim(ActuatorId::Claw).power(), 0.3);
        assert!(hw.sim(ActuatorId::LiftRight).power_writes().is_empty());
    }

    #[test]
    fn cancel_all_zeroes_leased_power() {
        let mut hw = SimHardware::new();
        let mut lines: Vec<TelemetryLine> = Vec::new();
        let mut s = Scheduler::new(ContentionPolicy::Reject);
        s.submit(lift_move(500)).unwrap();
        {
            let mut ctx = TickContext::new(&mut hw, &mut lines, Instant::from_millis(0));
            s.tick(&mut ctx);
        }
        assert_eq!(hw.sim(ActuatorId::LiftRight).power(), 0.8);

        s.cancel_all(&mut hw);
        assert!(s.is_empty());
        assert_eq!(hw.sim(ActuatorId::LiftRight).power(), 0.0);
        assert_eq!(hw.sim(ActuatorId::LiftLeft).power(), 0.0);
    }
}
