//! Contact and Trigger Events
//!
//! Collision event reporting (begin/persist/end) and trigger enter/exit
//! events. Events are collected during `step()` and describe that step
//! only; the buffer is cleared at the start of the next step.
//!
//! The buffer is bounded. Once full, further events of the step are
//! counted in [`EventCollector::dropped`] and discarded; pair tracking
//! continues regardless so begin/end pairing stays correct.

use crate::math::{Fixed, Vec3Fix};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Contact lifecycle stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContactEventType {
    /// First step of contact
    Begin,
    /// Contact persists from the previous step
    Persist,
    /// Contact ended (bodies separated or one was destroyed)
    End,
}

/// Contact lifecycle event for a body pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactEvent {
    /// Lower body id
    pub body_a: u32,
    /// Higher body id
    pub body_b: u32,
    /// Begin, persist or end
    pub event_type: ContactEventType,
    /// Unit normal from `body_a` toward `body_b`
    pub normal: Vec3Fix,
    /// World-space contact point
    pub point: Vec3Fix,
    /// Overlap depth
    pub depth: Fixed,
    /// Relative velocity along the normal before resolution
    pub relative_velocity: Fixed,
}

/// A body entering or leaving a trigger volume
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerEvent {
    /// Trigger body id
    pub trigger_body: u32,
    /// Other body id
    pub other_body: u32,
    /// `true` on enter, `false` on exit
    pub entered: bool,
}

/// Collects physics events for one simulation step
#[derive(Clone, Debug)]
pub struct EventCollector {
    contact_events: Vec<ContactEvent>,
    trigger_events: Vec<TriggerEvent>,
    /// Active contact pairs of the previous step (sorted)
    prev_pairs: Vec<(u32, u32)>,
    /// Active contact pairs this step
    curr_pairs: Vec<(u32, u32)>,
    /// Active (trigger, other) overlaps of the previous step (sorted)
    prev_triggers: Vec<(u32, u32)>,
    /// Active (trigger, other) overlaps this step
    curr_triggers: Vec<(u32, u32)>,
    capacity: usize,
    dropped: usize,
}

impl EventCollector {
    /// Create a collector holding at most `capacity` events per step
    pub fn new(capacity: usize) -> Self {
        Self {
            contact_events: Vec::with_capacity(capacity.min(1024)),
            trigger_events: Vec::new(),
            prev_pairs: Vec::new(),
            curr_pairs: Vec::new(),
            prev_triggers: Vec::new(),
            curr_triggers: Vec::new(),
            capacity,
            dropped: 0,
        }
    }

    /// Start a step: this step's pairs become the previous step's pairs
    pub fn begin_frame(&mut self) {
        self.contact_events.clear();
        self.trigger_events.clear();
        self.dropped = 0;
        core::mem::swap(&mut self.prev_pairs, &mut self.curr_pairs);
        self.curr_pairs.clear();
        core::mem::swap(&mut self.prev_triggers, &mut self.curr_triggers);
        self.curr_triggers.clear();
        // Already sorted unless end_frame was skipped
        self.prev_pairs.sort_unstable();
        self.prev_triggers.sort_unstable();
    }

    #[inline]
    fn len(&self) -> usize {
        self.contact_events.len() + self.trigger_events.len()
    }

    fn push_contact(&mut self, event: ContactEvent) {
        if self.len() < self.capacity {
            self.contact_events.push(event);
        } else {
            self.dropped += 1;
        }
    }

    fn push_trigger(&mut self, event: TriggerEvent) {
        if self.len() < self.capacity {
            self.trigger_events.push(event);
        } else {
            self.dropped += 1;
        }
    }

    /// Record a contact; repeated reports of a pair within a step are ignored
    pub fn report_contact(
        &mut self,
        body_a: u32,
        body_b: u32,
        normal: Vec3Fix,
        point: Vec3Fix,
        depth: Fixed,
        relative_velocity: Fixed,
    ) {
        let pair = normalize_pair(body_a, body_b);
        if self.curr_pairs.contains(&pair) {
            return;
        }
        self.curr_pairs.push(pair);

        let event_type = if self.prev_pairs.binary_search(&pair).is_ok() {
            ContactEventType::Persist
        } else {
            ContactEventType::Begin
        };
        // Normal always points from the lower id
        let normal = if pair.0 == body_a { normal } else { -normal };

        self.push_contact(ContactEvent {
            body_a: pair.0,
            body_b: pair.1,
            event_type,
            normal,
            point,
            depth,
            relative_velocity,
        });
    }

    /// Record a trigger overlap; only the first step of an overlap emits an
    /// enter event
    pub fn report_trigger(&mut self, trigger_body: u32, other_body: u32) {
        let pair = (trigger_body, other_body);
        if self.curr_triggers.contains(&pair) {
            return;
        }
        self.curr_triggers.push(pair);

        if self.prev_triggers.binary_search(&pair).is_err() {
            self.push_trigger(TriggerEvent {
                trigger_body,
                other_body,
                entered: true,
            });
        }
    }

    /// Close the step: emit `End` and trigger-exit events, in ascending
    /// pair order, for every pair tracked last step but not this one.
    pub fn end_frame(&mut self) {
        self.curr_pairs.sort_unstable();
        self.curr_triggers.sort_unstable();

        for i in 0..self.prev_pairs.len() {
            let (a, b) = self.prev_pairs[i];
            if self.curr_pairs.binary_search(&(a, b)).is_err() {
                self.push_contact(ContactEvent {
                    body_a: a,
                    body_b: b,
                    event_type: ContactEventType::End,
                    normal: Vec3Fix::ZERO,
                    point: Vec3Fix::ZERO,
                    depth: Fixed::ZERO,
                    relative_velocity: Fixed::ZERO,
                });
            }
        }

        for i in 0..self.prev_triggers.len() {
            let (trigger_body, other_body) = self.prev_triggers[i];
            if self.curr_triggers.binary_search(&(trigger_body, other_body)).is_err() {
                self.push_trigger(TriggerEvent {
                    trigger_body,
                    other_body,
                    entered: false,
                });
            }
        }
    }

    /// Forget all tracked pairs and events
    pub fn clear(&mut self) {
        self.contact_events.clear();
        self.trigger_events.clear();
        self.prev_pairs.clear();
        self.curr_pairs.clear();
        self.prev_triggers.clear();
        self.curr_triggers.clear();
        self.dropped = 0;
    }

    /// Contact events of the last step
    #[inline]
    pub fn contact_events(&self) -> &[ContactEvent] {
        &self.contact_events
    }

    /// Trigger events of the last step
    #[inline]
    pub fn trigger_events(&self) -> &[TriggerEvent] {
        &self.trigger_events
    }

    /// Take this step's contact events
    #[inline]
    pub fn drain_contact_events(&mut self) -> Vec<ContactEvent> {
        core::mem::take(&mut self.contact_events)
    }

    /// Take this step's trigger events
    #[inline]
    pub fn drain_trigger_events(&mut self) -> Vec<TriggerEvent> {
        core::mem::take(&mut self.trigger_events)
    }

    /// Check if there are any events this step
    #[inline]
    pub fn has_events(&self) -> bool {
        !self.contact_events.is_empty() || !self.trigger_events.is_empty()
    }

    /// Events discarded this step because the buffer was full
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for EventCollector {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_EVENTS)
    }
}

/// Lower id first
#[inline]
fn normalize_pair(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
