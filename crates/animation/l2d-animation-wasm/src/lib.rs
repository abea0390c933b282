use js_sys::{Function, JSON};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use l2d_animation_core::{
    AnimId, Animator, AnimatorCommand, AnimatorConfig, LayerConfig, ModelDesc, ModelRuntime,
    ModelState, ParameterGroups,
};

#[wasm_bindgen]
pub struct L2dAnimator {
    core: Animator<ModelState>,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Accept either a JSON string or a plain JS object and hand back JSON text for
/// the core parsers.
fn json_text(value: &JsValue, what: &str) -> Result<String, JsError> {
    if let Some(s) = value.as_string() {
        return Ok(s);
    }
    JSON::stringify(value)
        .map_err(|e| JsError::new(&format!("{what} stringify error: {:?}", e)))?
        .as_string()
        .ok_or_else(|| JsError::new(&format!("{what}: stringify produced non-string")))
}

#[wasm_bindgen]
impl L2dAnimator {
    /// Create an animator over an in-memory model.
    /// `model` is `{ parameters: [{ id, default, value? }], parts: [{ id, opacity? }] }`.
    /// `config` is optional: `{ time_scale, layers: [{ name, blend, weight, crossfade }] }`.
    /// Example:
    ///   new L2dAnimator(model, { layers: [{ name: "base" }] })
    #[wasm_bindgen(constructor)]
    pub fn new(model: JsValue, config: JsValue) -> Result<L2dAnimator, JsError> {
        console_error_panic_hook::set_once();

        if jsvalue_is_undefined_or_null(&model) {
            return Err(JsError::new("model description is null/undefined"));
        }
        let desc: ModelDesc =
            swb::from_value(model).map_err(|e| JsError::new(&format!("model error: {e}")))?;
        let cfg: AnimatorConfig = if jsvalue_is_undefined_or_null(&config) {
            AnimatorConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        let core = Animator::from_config(ModelState::from_desc(&desc), &cfg)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(L2dAnimator { core })
    }

    /// Load a motion3 document (object or JSON string). Returns an AnimId (u32).
    #[wasm_bindgen(js_name = load_motion)]
    pub fn load_motion(&mut self, motion: JsValue) -> Result<u32, JsError> {
        if jsvalue_is_undefined_or_null(&motion) {
            return Err(JsError::new("load_motion: motion is null/undefined"));
        }
        let text = json_text(&motion, "load_motion")?;
        let id: AnimId = self
            .core
            .load_motion_json(&text)
            .map_err(|e| JsError::new(&format!("load_motion: {e}")))?;
        Ok(id.0)
    }

    /// Install the `Groups` of a model settings document (object or JSON
    /// string). Pass null/undefined to clear them.
    #[wasm_bindgen(js_name = set_parameter_groups)]
    pub fn set_parameter_groups(&mut self, settings: JsValue) -> Result<(), JsError> {
        if jsvalue_is_undefined_or_null(&settings) {
            self.core.set_parameter_groups(None);
            return Ok(());
        }
        let text = json_text(&settings, "set_parameter_groups")?;
        let groups = ParameterGroups::from_model_settings_json(&text)
            .map_err(|e| JsError::new(&format!("set_parameter_groups: {e}")))?;
        self.core.set_parameter_groups(Some(groups));
        Ok(())
    }

    /// Append a layer. `cfg` is optional JSON matching LayerConfig.
    #[wasm_bindgen(js_name = add_layer)]
    pub fn add_layer(&mut self, name: String, cfg: JsValue) -> Result<(), JsError> {
        let cfg_rs: LayerConfig = if jsvalue_is_undefined_or_null(&cfg) {
            LayerConfig::default()
        } else {
            swb::from_value(cfg).map_err(|e| JsError::new(&format!("layer cfg error: {e}")))?
        };
        self.core
            .add_layer(&name, cfg_rs)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Play a loaded motion on a layer. Without `fade_duration` the motion's
    /// own FadeInTime is used.
    #[wasm_bindgen]
    pub fn play(
        &mut self,
        layer: String,
        anim_id: u32,
        fade_duration: Option<f32>,
    ) -> Result<(), JsError> {
        let anim = AnimId(anim_id);
        let res = match fade_duration {
            Some(fade) => self.core.play(&layer, anim, fade),
            None => self.core.play_with_clip_fade(&layer, anim),
        };
        res.map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn pause(&mut self, layer: String) -> Result<(), JsError> {
        self.core
            .pause(&layer)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn resume(&mut self, layer: String) -> Result<(), JsError> {
        self.core
            .resume(&layer)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn stop(&mut self, layer: String) -> Result<(), JsError> {
        self.core
            .stop(&layer)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(js_name = set_time_scale)]
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.core.set_time_scale(time_scale);
    }

    #[wasm_bindgen(js_name = time_scale)]
    pub fn time_scale(&self) -> f32 {
        self.core.time_scale()
    }

    /// Apply an array of commands, e.g.
    ///   [{ type: "play", layer: "base", animation: 0 }, { type: "set_time_scale", time_scale: 2 }]
    #[wasm_bindgen(js_name = apply_commands)]
    pub fn apply_commands(&mut self, commands: JsValue) -> Result<(), JsError> {
        if jsvalue_is_undefined_or_null(&commands) {
            return Ok(());
        }
        let cmds: Vec<AnimatorCommand> =
            swb::from_value(commands).map_err(|e| JsError::new(&format!("commands error: {e}")))?;
        self.core
            .apply_commands(cmds)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Register `callback(value: string)` for the user-data events of a motion.
    /// Exceptions thrown by the callback are reported with `console.warn` and
    /// do not stop the tick.
    #[wasm_bindgen(js_name = on_event)]
    pub fn on_event(&mut self, anim_id: u32, callback: Function) -> Result<(), JsError> {
        self.core
            .on_event(AnimId(anim_id), move |value| {
                if let Err(err) = callback.call1(&JsValue::UNDEFINED, &JsValue::from_str(value)) {
                    web_sys::console::warn_2(
                        &JsValue::from_str(&format!("l2d: event callback for '{value}' threw")),
                        &err,
                    );
                }
            })
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Step all layers by dt (seconds) and write the result into the model.
    #[wasm_bindgen]
    pub fn tick(&mut self, dt: f32) {
        self.core.tick(dt);
    }

    #[wasm_bindgen(js_name = parameter_ids)]
    pub fn parameter_ids(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.core.model().parameter_ids())
            .map_err(|e| JsError::new(&format!("parameter_ids error: {e}")))
    }

    /// Parameter values in model order (Float32Array).
    #[wasm_bindgen(js_name = parameter_values)]
    pub fn parameter_values(&self) -> Vec<f32> {
        self.core.model().parameter_values().to_vec()
    }

    #[wasm_bindgen(js_name = part_ids)]
    pub fn part_ids(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.core.model().part_ids())
            .map_err(|e| JsError::new(&format!("part_ids error: {e}")))
    }

    /// Part opacities in model order (Float32Array).
    #[wasm_bindgen(js_name = part_opacities)]
    pub fn part_opacities(&self) -> Vec<f32> {
        self.core.model().part_opacities().to_vec()
    }

    #[wasm_bindgen(js_name = parameter_value)]
    pub fn parameter_value(&self, id: String) -> Option<f32> {
        self.core.model().parameter(&id)
    }

    /// Overwrite a parameter between ticks. Returns false for unknown ids.
    #[wasm_bindgen(js_name = set_parameter_value)]
    pub fn set_parameter_value(&mut self, id: String, value: f32) -> bool {
        self.core.model_mut().set_parameter(&id, value)
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
