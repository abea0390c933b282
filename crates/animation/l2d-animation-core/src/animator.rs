//! Animator: owns the model target, the clip library and an ordered set of
//! named layers, and drives them once per frame.
//!
//! Methods:
//! - builder / from_config, load_animation / load_motion_json, add_layer,
//!   play / pause / resume / stop, apply_commands, tick (advance → evaluate)

use crate::animation::{Animation, AnimationLibrary, EvalTarget};
use crate::config::AnimatorConfig;
use crate::data::AnimationData;
use crate::error::{AnimationError, Result};
use crate::ids::AnimId;
use crate::inputs::AnimatorCommand;
use crate::layer::{AnimationLayer, LayerConfig};
use crate::model::{ModelBinding, ModelRuntime, ParameterGroups};
use crate::motion_json::parse_motion_json;
use crate::scratch::TouchedFlags;

/// Scaled deltas at or below this do not advance layer clocks.
pub const MIN_ADVANCE_DT: f32 = 0.001;

#[derive(Debug)]
struct NamedLayer {
    name: String,
    layer: AnimationLayer,
}

#[derive(Debug)]
pub struct Animator<M: ModelRuntime> {
    model: M,
    binding: ModelBinding,
    groups: Option<ParameterGroups>,
    library: AnimationLibrary,
    layers: Vec<NamedLayer>,
    time_scale: f32,
    touched: TouchedFlags,
}

impl<M: ModelRuntime> Animator<M> {
    /// Create an animator with no layers and a time scale of 1.
    pub fn new(model: M) -> Self {
        let binding = ModelBinding::new(&model);
        let touched = TouchedFlags::new(model.parameter_count(), model.part_count());
        Self {
            model,
            binding,
            groups: None,
            library: AnimationLibrary::new(),
            layers: Vec::new(),
            time_scale: 1.0,
            touched,
        }
    }

    pub fn builder(model: M) -> AnimatorBuilder<M> {
        AnimatorBuilder::new(model)
    }

    /// Create an animator and its layers from a config.
    pub fn from_config(model: M, cfg: &AnimatorConfig) -> Result<Self> {
        let mut animator = Self::new(model);
        animator.set_time_scale(cfg.time_scale);
        for layer in &cfg.layers {
            animator.add_layer(&layer.name, layer.config)?;
        }
        Ok(animator)
    }

    // ----- model -----

    #[inline]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the target. Call [`Animator::rebind`] if parameters or
    /// parts are added or reordered.
    #[inline]
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Rebuild the id → index maps from the model's current layout.
    pub fn rebind(&mut self) {
        self.binding = ModelBinding::new(&self.model);
    }

    pub fn set_parameter_groups(&mut self, groups: Option<ParameterGroups>) {
        self.groups = groups;
    }

    pub fn parameter_groups(&self) -> Option<&ParameterGroups> {
        self.groups.as_ref()
    }

    // ----- clips -----

    pub fn load_animation(&mut self, data: AnimationData) -> AnimId {
        self.library.insert(data)
    }

    /// Parse a motion3 document and load it.
    pub fn load_motion_json(&mut self, json: &str) -> Result<AnimId> {
        let data = parse_motion_json(json)?;
        Ok(self.load_animation(data))
    }

    pub fn animation(&self, id: AnimId) -> Option<&Animation> {
        self.library.get(id)
    }

    pub fn animation_mut(&mut self, id: AnimId) -> Option<&mut Animation> {
        self.library.get_mut(id)
    }

    pub fn library(&self) -> &AnimationLibrary {
        &self.library
    }

    /// Register a user-event callback on a loaded clip.
    pub fn on_event<F>(&mut self, id: AnimId, callback: F) -> Result<()>
    where
        F: FnMut(&str) + 'static,
    {
        let anim = self
            .library
            .get_mut(id)
            .ok_or(AnimationError::UnknownAnimation(id))?;
        anim.on_event(callback);
        Ok(())
    }

    // ----- layers -----

    /// Append a layer. Layers evaluate in the order they were added.
    pub fn add_layer(&mut self, name: &str, cfg: LayerConfig) -> Result<()> {
        if self.layers.iter().any(|l| l.name == name) {
            return Err(AnimationError::DuplicateLayer(name.to_string()));
        }
        log::debug!("adding layer '{name}' ({:?}, weight {})", cfg.blend, cfg.weight);
        self.layers.push(NamedLayer {
            name: name.to_string(),
            layer: AnimationLayer::new(cfg),
        });
        Ok(())
    }

    pub fn layer(&self, name: &str) -> Option<&AnimationLayer> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .map(|l| &l.layer)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut AnimationLayer> {
        self.layers
            .iter_mut()
            .find(|l| l.name == name)
            .map(|l| &mut l.layer)
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }

    fn require_layer(&mut self, name: &str) -> Result<&mut AnimationLayer> {
        self.layer_mut(name)
            .ok_or_else(|| AnimationError::UnknownLayer(name.to_string()))
    }

    // ----- playback -----

    pub fn play(&mut self, layer: &str, anim: AnimId, fade_duration: f32) -> Result<()> {
        if !self.library.contains(anim) {
            return Err(AnimationError::UnknownAnimation(anim));
        }
        self.require_layer(layer)?.play(anim, fade_duration);
        Ok(())
    }

    /// Play using the clip's authored fade-in time (zero when absent).
    pub fn play_with_clip_fade(&mut self, layer: &str, anim: AnimId) -> Result<()> {
        let fade = self
            .library
            .get(anim)
            .ok_or(AnimationError::UnknownAnimation(anim))?
            .data()
            .fade_in_time
            .unwrap_or(0.0);
        self.play(layer, anim, fade)
    }

    pub fn pause(&mut self, layer: &str) -> Result<()> {
        self.require_layer(layer)?.pause();
        Ok(())
    }

    pub fn resume(&mut self, layer: &str) -> Result<()> {
        self.require_layer(layer)?.resume();
        Ok(())
    }

    pub fn stop(&mut self, layer: &str) -> Result<()> {
        self.require_layer(layer)?.stop();
        Ok(())
    }

    pub fn set_layer_weight(&mut self, layer: &str, weight: f32) -> Result<()> {
        self.require_layer(layer)?.set_weight(weight);
        Ok(())
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the playback speed. Negative values freeze playback.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale.max(0.0);
    }

    pub fn apply_command(&mut self, cmd: AnimatorCommand) -> Result<()> {
        match cmd {
            AnimatorCommand::Play {
                layer,
                animation,
                fade_duration,
            } => match fade_duration {
                Some(fade) => self.play(&layer, animation, fade),
                None => self.play_with_clip_fade(&layer, animation),
            },
            AnimatorCommand::Pause { layer } => self.pause(&layer),
            AnimatorCommand::Resume { layer } => self.resume(&layer),
            AnimatorCommand::Stop { layer } => self.stop(&layer),
            AnimatorCommand::SetLayerWeight { layer, weight } => {
                self.set_layer_weight(&layer, weight)
            }
            AnimatorCommand::SetTimeScale { time_scale } => {
                self.set_time_scale(time_scale);
                Ok(())
            }
        }
    }

    /// Apply commands in order, stopping at the first failure.
    pub fn apply_commands<I>(&mut self, cmds: I) -> Result<()>
    where
        I: IntoIterator<Item = AnimatorCommand>,
    {
        for cmd in cmds {
            self.apply_command(cmd)?;
        }
        Ok(())
    }

    // ----- frame -----

    /// Step all layers by `dt` seconds and write their blended result into the
    /// model.
    ///
    /// Layers share one set of touched flags per tick, so the first layer to
    /// touch a slot resets it to its default and later layers blend on top.
    pub fn tick(&mut self, dt: f32) {
        let scaled = dt * self.time_scale.max(0.0);
        if scaled > MIN_ADVANCE_DT {
            for l in &mut self.layers {
                l.layer.advance(scaled);
            }
        }

        self.touched
            .begin_frame(self.model.parameter_count(), self.model.part_count());

        let mut target = EvalTarget {
            model: &mut self.model,
            binding: &self.binding,
            touched: &mut self.touched,
            groups: self.groups.as_ref(),
        };
        for l in &mut self.layers {
            l.layer.evaluate_into(&mut self.library, &mut target);
        }
    }
}

/// Step-by-step construction of an [`Animator`].
pub struct AnimatorBuilder<M: ModelRuntime> {
    model: M,
    cfg: AnimatorConfig,
    groups: Option<ParameterGroups>,
}

impl<M: ModelRuntime> AnimatorBuilder<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            cfg: AnimatorConfig::default(),
            groups: None,
        }
    }

    /// Replace the whole config (time scale and layers).
    pub fn config(mut self, cfg: AnimatorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn time_scale(mut self, time_scale: f32) -> Self {
        self.cfg.time_scale = time_scale;
        self
    }

    pub fn layer(mut self, name: &str, cfg: LayerConfig) -> Self {
        self.cfg.layers.push(crate::config::NamedLayerConfig {
            name: name.to_string(),
            config: cfg,
        });
        self
    }

    pub fn groups(mut self, groups: ParameterGroups) -> Self {
        self.groups = Some(groups);
        self
    }

    pub fn build(self) -> Result<Animator<M>> {
        let mut animator = Animator::from_config(self.model, &self.cfg)?;
        animator.set_parameter_groups(self.groups);
        Ok(animator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelState;

    #[test]
    fn negative_time_scale_is_clamped() {
        let animator = Animator::builder(ModelState::new())
            .time_scale(-2.0)
            .build()
            .unwrap();
        assert_eq!(animator.time_scale(), 0.0);
    }

    #[test]
    fn duplicate_layer_is_rejected() {
        let mut animator = Animator::new(ModelState::new());
        animator.add_layer("base", LayerConfig::default()).unwrap();
        let err = animator.add_layer("base", LayerConfig::default()).unwrap_err();
        assert_eq!(err, AnimationError::DuplicateLayer("base".into()));
    }

    #[test]
    fn unknown_layer_and_animation_errors() {
        let mut animator = Animator::new(ModelState::new());
        animator.add_layer("base", LayerConfig::default()).unwrap();
        assert_eq!(
            animator.play("base", AnimId(9), 0.0),
            Err(AnimationError::UnknownAnimation(AnimId(9)))
        );
        assert_eq!(
            animator.pause("face"),
            Err(AnimationError::UnknownLayer("face".into()))
        );
    }

    #[test]
    fn layers_keep_registration_order() {
        let animator = Animator::builder(ModelState::new())
            .layer("base", LayerConfig::default())
            .layer("face", LayerConfig::default())
            .layer("arms", LayerConfig::default())
            .build()
            .unwrap();
        let names: Vec<&str> = animator.layer_names().collect();
        assert_eq!(names, vec!["base", "face", "arms"]);
    }
}
