//! Playback slots with crossfade.
//!
//! A layer plays one clip at a time and can fade towards a second ("goal")
//! clip. States: Idle → Playing → Crossfading → Playing.

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationLibrary, EvalTarget};
use crate::blend::{BlendMode, CrossfadeCurve};
use crate::ids::AnimId;

/// Per-layer settings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayerConfig {
    pub blend: BlendMode,
    pub weight: f32,
    pub crossfade: CrossfadeCurve,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            blend: BlendMode::Override,
            weight: 1.0,
            crossfade: CrossfadeCurve::Linear,
        }
    }
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LayerState {
    Idle,
    Playing,
    Crossfading,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationLayer {
    current: Option<AnimId>,
    current_time: f32,
    goal: Option<AnimId>,
    goal_time: f32,
    fade_elapsed: f32,
    fade_duration: f32,
    playing: bool,
    blend: BlendMode,
    crossfade: CrossfadeCurve,
    weight: f32,
}

impl Default for AnimationLayer {
    fn default() -> Self {
        Self::new(LayerConfig::default())
    }
}

impl AnimationLayer {
    pub fn new(cfg: LayerConfig) -> Self {
        Self {
            current: None,
            current_time: 0.0,
            goal: None,
            goal_time: 0.0,
            fade_elapsed: 0.0,
            fade_duration: 0.0,
            playing: false,
            blend: cfg.blend,
            crossfade: cfg.crossfade,
            weight: cfg.weight.max(0.0),
        }
    }

    /// Start `anim`. Without a current clip, or with a non-positive fade, the
    /// clip replaces the current one immediately (dropping any crossfade);
    /// otherwise it fades in over `fade_duration` seconds.
    pub fn play(&mut self, anim: AnimId, fade_duration: f32) {
        if self.current.is_none() || fade_duration <= 0.0 {
            self.current = Some(anim);
            self.current_time = 0.0;
            self.goal = None;
            self.playing = true;
        } else {
            self.goal = Some(anim);
            self.goal_time = 0.0;
            self.fade_elapsed = 0.0;
            self.fade_duration = fade_duration;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.current_time = 0.0;
    }

    /// Advance every clock by `dt` while playing. The goal and fade clocks run
    /// even without a crossfade; they are reset when one starts.
    pub fn advance(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        self.current_time += dt;
        self.goal_time += dt;
        self.fade_elapsed += dt;
    }

    /// Blend the active clip(s) into `target`, then promote the goal clip once
    /// the fade has run its course.
    pub fn evaluate_into(&mut self, library: &mut AnimationLibrary, target: &mut EvalTarget<'_>) {
        let Some(current) = self.current else {
            return;
        };
        let w = self.weight.min(1.0);

        match self.goal {
            Some(goal) => {
                let faded = w * self.crossfade.weight(self.fade_elapsed, self.fade_duration);
                if let Some(anim) = library.get_mut(current) {
                    anim.evaluate(self.current_time, faded, self.blend, target);
                }
                if let Some(anim) = library.get_mut(goal) {
                    anim.evaluate(self.goal_time, 1.0 - faded, self.blend, target);
                }
                if self.fade_elapsed > self.fade_duration {
                    log::debug!("crossfade complete; {:?} replaces {:?}", goal, current);
                    self.current = Some(goal);
                    self.current_time = self.goal_time;
                    self.goal = None;
                }
            }
            None => {
                if let Some(anim) = library.get_mut(current) {
                    anim.evaluate(self.current_time, w, self.blend, target);
                }
            }
        }
    }

    pub fn state(&self) -> LayerState {
        match (self.current, self.goal) {
            (None, _) => LayerState::Idle,
            (Some(_), None) => LayerState::Playing,
            (Some(_), Some(_)) => LayerState::Crossfading,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    pub fn current_animation(&self) -> Option<AnimId> {
        self.current
    }

    #[inline]
    pub fn goal_animation(&self) -> Option<AnimId> {
        self.goal
    }

    #[inline]
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    #[inline]
    pub fn goal_time(&self) -> f32 {
        self.goal_time
    }

    #[inline]
    pub fn fade_elapsed(&self) -> f32 {
        self.fade_elapsed
    }

    #[inline]
    pub fn fade_duration(&self) -> f32 {
        self.fade_duration
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight.max(0.0);
    }

    #[inline]
    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    #[inline]
    pub fn crossfade(&self) -> CrossfadeCurve {
        self.crossfade
    }

    pub fn set_crossfade(&mut self, crossfade: CrossfadeCurve) {
        self.crossfade = crossfade;
    }
}
