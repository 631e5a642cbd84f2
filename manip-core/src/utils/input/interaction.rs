//! Bindings from input conditions to actions.

use alloc::boxed::Box;

use super::buttons::{Control, InputState};
use crate::utils::actions::{Action, Lease};
use crate::utils::hardware::{ActuatorId, Hardware};

pub type Trigger = Box<dyn Fn(&InputState) -> bool>;
pub type Factory = Box<dyn Fn(&InputState, &mut dyn Hardware) -> Action>;

/// A trigger predicate paired with the action it starts.
///
/// Interactions hold no state of their own; the trigger reads the edge-tracked
/// `InputState` and the factory builds a fresh action every time it fires.
///
/// An interaction built with `yielding` is skipped outright, before its
/// factory runs, while an in-flight action holds any of the listed actuators.
/// Continuous controls use this to stand aside during a move instead of being
/// refused by the scheduler every tick.
pub struct Interaction {
    name: &'static str,
    trigger: Trigger,
    factory: Factory,
    yields_to: Lease,
}

impl Interaction {
    pub fn new(
        name: &'static str,
        trigger: impl Fn(&InputState) -> bool + 'static,
        factory: impl Fn(&InputState, &mut dyn Hardware) -> Action + 'static,
    ) -> Self {
        Self {
            name,
            trigger: Box::new(trigger),
            factory: Box::new(factory),
            yields_to: Lease::new(),
        }
    }

    /// Stand aside while any of `actuators` is leased. At most four are kept.
    pub fn yielding(
        mut self,
        actuators: &[ActuatorId],
    ) -> Self {
        self.yields_to = actuators.iter().copied().take(4).collect();
        self
    }

    pub fn yields_to(&self) -> &[ActuatorId] {
        &self.yields_to
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn triggered(
        &self,
        input: &InputState,
    ) -> bool {
        (self.trigger)(input)
    }

    pub fn instantiate(
        &self,
        input: &InputState,
        hw: &mut dyn Hardware,
    ) -> Action {
        (self.factory)(input, hw)
    }
}

impl core::fmt::Debug for Interaction {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("Interaction")
            .field("name", &self.name)
            .field("yields_to", &self.yields_to)
            .finish_non_exhaustive()
    }
}

/// Fires on the tick `control` goes down.
pub fn tapped(control: Control) -> impl Fn(&InputState) -> bool {
    move |input| input.tapped(control)
}

/// Fires every tick `control` is held.
pub fn pressed(control: Control) -> impl Fn(&InputState) -> bool {
    move |input| input.pressed(control)
}

/// Fires every tick, for continuous analog controls.
pub fn always() -> impl Fn(&InputState) -> bool {
    |_| true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{
        actions::InstantEffect,
        hardware::ActuatorId,
        input::buttons::{Button, GamepadSnapshot},
        sim::SimHardware,
    };

    #[test]
    fn trigger_helpers_follow_edges() {
        let x = Control::operator(Button::X);
        let on_tap = Interaction::new("tap", tapped(x), |_, _| InstantEffect::new().into());
        let on_hold = Interaction::new("hold", pressed(x), |_, _| InstantEffect::new().into());
        let every = Interaction::new("always", always(), |_, _| InstantEffect::new().into());

        let mut input = InputState::new();
        let down = GamepadSnapshot::default().with_button(Button::X);
        let up = GamepadSnapshot::default();

        input.update(&up, &down);
        assert!(on_tap.triggered(&input) && on_hold.triggered(&input));
        input.update(&up, &down);
        assert!(!on_tap.triggered(&input) && on_hold.triggered(&input));
        input.update(&up, &up);
        assert!(!on_tap.triggered(&input) && !on_hold.triggered(&input));
        assert!(every.triggered(&input));
    }

    #[test]
    fn factory_builds_fresh_actions() {
        let mut hw = SimHardware::new();
        let input = InputState::new();
        let claw = Interaction::new("claw", always(), |_, _| {
            InstantEffect::new().set(ActuatorId::Claw, 1.0).into()
        });
        let a = claw.instantiate(&input, &mut hw);
        let b = claw.instantiate(&input, &mut hw);
        assert_eq!(a, b);
        assert_eq!(claw.name(), "claw");
        assert!(claw.yields_to().is_empty());
    }

    #[test]
    fn yielding_records_actuators() {
        let stick = Interaction::new("stick", always(), |_, _| InstantEffect::new().into())
            .yielding(&ActuatorId::LIFT);
        assert_eq!(stick.yields_to(), &ActuatorId::LIFT);
    }
}
