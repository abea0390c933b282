//! Motion clip evaluation.
//!
//! An [`Animation`] wraps immutable [`AnimationData`] with the little state
//! playback needs: the time of the previous evaluation (for edge-triggered
//! user events) and the registered event callbacks.

use std::fmt;

use crate::blend::BlendMode;
use crate::data::{AnimationData, Curve};
use crate::ids::{AnimId, IdAllocator};
use crate::model::{GroupTarget, ModelBinding, ModelRuntime, ParameterGroups};
use crate::scratch::TouchedFlags;

/// Weights at or below this have no visible influence; evaluation is skipped.
pub const MIN_EFFECTIVE_WEIGHT: f32 = 0.01;

/// Default opacity a part is reset to on first touch within a frame.
pub const DEFAULT_PART_OPACITY: f32 = 1.0;

/// Callback invoked with a user event's payload.
pub type EventCallback = Box<dyn FnMut(&str)>;

/// Everything an evaluation pass writes into or reads from.
pub struct EvalTarget<'a> {
    pub model: &'a mut dyn ModelRuntime,
    pub binding: &'a ModelBinding,
    pub touched: &'a mut TouchedFlags,
    pub groups: Option<&'a ParameterGroups>,
}

/// Whether an event at `event_time` lies strictly inside the playhead's travel
/// from `time_back` to `time_forward`.
///
/// When the playhead did not move forward it is assumed to have wrapped at the
/// loop boundary, and the window becomes `(0, time_forward) ∪ (time_back,
/// duration)`. Both ends are exclusive.
pub fn is_event_triggered(event_time: f32, time_forward: f32, time_back: f32, duration: f32) -> bool {
    if time_forward > time_back {
        time_back < event_time && event_time < time_forward
    } else {
        (0.0 < event_time && event_time < time_forward)
            || (time_back < event_time && event_time < duration)
    }
}

/// Fold `time` into `[0, duration)` for looping clips. Negative time and
/// zero-length clips are left untouched.
#[inline]
pub fn fold_time(time: f32, duration: f32) -> f32 {
    if duration > 0.0 && time >= duration {
        time % duration
    } else {
        time
    }
}

pub struct Animation {
    data: AnimationData,
    last_evaluated_time: f32,
    callbacks: Vec<EventCallback>,
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("data", &self.data)
            .field("last_evaluated_time", &self.last_evaluated_time)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl Animation {
    pub fn new(data: AnimationData) -> Self {
        Self {
            data,
            last_evaluated_time: 0.0,
            callbacks: Vec::new(),
        }
    }

    #[inline]
    pub fn data(&self) -> &AnimationData {
        &self.data
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.data.duration
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.data.looping
    }

    #[inline]
    pub fn last_evaluated_time(&self) -> f32 {
        self.last_evaluated_time
    }

    /// Move the event cursor, e.g. after an external seek.
    pub fn set_last_evaluated_time(&mut self, time: f32) {
        self.last_evaluated_time = time;
    }

    /// Register a callback for user events. Callbacks run in registration order.
    pub fn on_event<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    pub fn clear_event_callbacks(&mut self) {
        self.callbacks.clear();
    }

    pub fn event_callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Evaluate the clip at `time` and blend the result into `target`.
    ///
    /// Parameters and parts touched for the first time this frame are reset to
    /// their default before blending, so stacked layers compose against the same
    /// baseline. Weights at or below [`MIN_EFFECTIVE_WEIGHT`] are a no-op.
    pub fn evaluate(
        &mut self,
        time: f32,
        weight: f32,
        blend: BlendMode,
        target: &mut EvalTarget<'_>,
    ) {
        if weight <= MIN_EFFECTIVE_WEIGHT {
            return;
        }
        let time = if self.data.looping {
            fold_time(time, self.data.duration)
        } else {
            time
        };
        let binding = target.binding;

        for curve in &self.data.parameter_curves {
            match binding.parameter_index(&curve.target_id) {
                Some(idx) => blend_parameter(target, idx, curve, time, weight, blend),
                None => log::trace!("parameter '{}' not in model; skipped", curve.target_id),
            }
        }

        for curve in &self.data.part_opacity_curves {
            match binding.part_index(&curve.target_id) {
                Some(idx) => blend_part(target, idx, curve, time, weight, blend),
                None => log::trace!("part '{}' not in model; skipped", curve.target_id),
            }
        }

        if let Some(groups) = target.groups {
            for curve in &self.data.model_curves {
                let group = match groups.get_group_by_id(&curve.target_id) {
                    Some(g) if g.target == GroupTarget::Parameter => g,
                    _ => continue,
                };
                for id in &group.ids {
                    if let Some(idx) = binding.parameter_index(id) {
                        blend_parameter(target, idx, curve, time, weight, blend);
                    }
                }
            }
        }

        self.dispatch_events(time);
        self.last_evaluated_time = time;
    }

    /// A playhead that did not move forward (paused, or a tick below the
    /// advance threshold) takes the wrap branch of [`is_event_triggered`] and
    /// fires every event except one sitting exactly on it.
    fn dispatch_events(&mut self, time: f32) {
        if self.callbacks.is_empty() {
            return;
        }
        let back = self.last_evaluated_time;
        let duration = self.data.duration;
        for event in &self.data.user_events {
            if is_event_triggered(event.time, time, back, duration) {
                for cb in self.callbacks.iter_mut() {
                    cb(&event.value);
                }
            }
        }
    }
}

fn blend_parameter(
    target: &mut EvalTarget<'_>,
    idx: usize,
    curve: &Curve,
    time: f32,
    weight: f32,
    blend: BlendMode,
) {
    let default = target.model.parameter_default_values().get(idx).copied();
    let first_touch = target.touched.touch_parameter(idx);
    let Some(slot) = target.model.parameter_values_mut().get_mut(idx) else {
        return;
    };
    if first_touch {
        if let Some(d) = default {
            *slot = d;
        }
    }
    *slot = blend.apply(*slot, curve.evaluate(time), curve.evaluate(0.0), weight);
}

fn blend_part(
    target: &mut EvalTarget<'_>,
    idx: usize,
    curve: &Curve,
    time: f32,
    weight: f32,
    blend: BlendMode,
) {
    let first_touch = target.touched.touch_part(idx);
    let Some(slot) = target.model.part_opacities_mut().get_mut(idx) else {
        return;
    };
    if first_touch {
        *slot = DEFAULT_PART_OPACITY;
    }
    *slot = blend.apply(*slot, curve.evaluate(time), curve.evaluate(0.0), weight);
}

/// Arena of loaded clips addressed by [`AnimId`].
#[derive(Default, Debug)]
pub struct AnimationLibrary {
    ids: IdAllocator,
    items: Vec<(AnimId, Animation)>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, data: AnimationData) -> AnimId {
        let id = self.ids.alloc_anim();
        self.items.push((id, Animation::new(data)));
        id
    }

    pub fn get(&self, id: AnimId) -> Option<&Animation> {
        self.items
            .iter()
            .find_map(|(a, anim)| if *a == id { Some(anim) } else { None })
    }

    pub fn get_mut(&mut self, id: AnimId) -> Option<&mut Animation> {
        self.items
            .iter_mut()
            .find_map(|(a, anim)| if *a == id { Some(anim) } else { None })
    }

    pub fn remove(&mut self, id: AnimId) -> Option<Animation> {
        let pos = self.items.iter().position(|(a, _)| *a == id)?;
        Some(self.items.remove(pos).1)
    }

    #[inline]
    pub fn contains(&self, id: AnimId) -> bool {
        self.items.iter().any(|(a, _)| *a == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = AnimId> + '_ {
        self.items.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
