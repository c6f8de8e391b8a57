#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod motion;
pub mod parse;
pub mod pipeline;
pub mod render;
pub mod schedule;

use std::collections::BTreeMap;
use std::fmt;

use parse::{Palettes, SettingsDocument};
use pipeline::{Generation, Parameters, PipelineOptions};
use render::Viewport;
use serde::Serialize;
use time::OffsetDateTime;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    log::set_logger(&DEFAULT_LOGGER).expect("error initializing logger");
    log::set_max_level(LevelFilter::Debug);
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not initialize rayon thread pool: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwatchExport<'a> {
    index: usize,
    name: &'a str,
    colors: &'a [String],
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    parameters: Parameters,
    options: PipelineOptions,
    palettes: Palettes,
    last_generation: Option<Generation>,
    dirty: bool,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            parameters: Parameters::default(),
            options: PipelineOptions::default(),
            palettes: Palettes::default(),
            last_generation: None,
            dirty: true,
        }
    }

    /// Replace the current parameters with those of a settings document.
    #[wasm_bindgen]
    pub fn load_settings(&mut self, json: &str) -> Result<(), JsValue> {
        let parameters = parse::load_settings(json).map_err(to_js_error)?;
        self.parameters = parameters;
        self.mark_dirty();
        Ok(())
    }

    /// Settings document describing the current parameters.
    #[wasm_bindgen]
    pub fn export_settings(&self) -> Result<String, JsValue> {
        SettingsDocument::from_parameters(&self.parameters, OffsetDateTime::now_utc())
            .and_then(|document| document.to_json())
            .map_err(to_js_error)
    }

    /// Load a palette file and return its swatches.
    #[wasm_bindgen]
    pub fn load_palettes(&mut self, json: &str) -> Result<JsValue, JsValue> {
        self.palettes = Palettes::from_json(json).map_err(to_js_error)?;
        let swatches: Vec<SwatchExport<'_>> = self
            .palettes
            .swatches
            .iter()
            .enumerate()
            .map(|(index, swatch)| SwatchExport {
                index,
                name: &swatch.name,
                colors: &swatch.colors,
            })
            .collect();
        serde_wasm_bindgen::to_value(&swatches).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Replace the color schedule with the evenly spaced colors of a swatch.
    #[wasm_bindgen]
    pub fn apply_palette(&mut self, index: usize) -> Result<(), JsValue> {
        let schedule = self.palettes.schedule(index).map_err(to_js_error)?;
        self.parameters.set_schedule(schedule);
        self.mark_dirty();
        Ok(())
    }

    /// Set the number of points to generate. Requests above the maximum are
    /// clamped; the stored count is returned.
    #[wasm_bindgen]
    pub fn set_point_count(&mut self, count: u32) -> u32 {
        let count = motion::PointCount::clamped(count as usize);
        if count.was_clamped() {
            log::warn!(
                "point count {} exceeds the maximum, using {}",
                count.requested,
                count.effective
            );
        }
        self.parameters.point_count = count.effective;
        self.mark_dirty();
        // Bounded by MAX_POINTS.
        count.effective as u32
    }

    /// Set the drawing area points are scaled into.
    #[wasm_bindgen]
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(js_error("viewport size must be positive and finite"));
        }
        self.options.viewport = Some(Viewport::new(width, height));
        self.mark_dirty();
        Ok(())
    }

    /// Run the pipeline for the current parameters. Does nothing when nothing
    /// changed since the last run.
    #[wasm_bindgen]
    pub fn generate(&mut self) -> Result<(), JsValue> {
        if !self.dirty && self.last_generation.is_some() {
            return Ok(());
        }
        let generation = pipeline::generate(&self.parameters, &self.options).map_err(to_js_error)?;
        debug_log!(
            "generated {} points ({} primitives)",
            generation.diagnostics.point_count,
            generation.diagnostics.primitive_count
        );
        self.last_generation = Some(generation);
        self.dirty = false;
        Ok(())
    }

    /// Geometry of the last generation.
    #[wasm_bindgen]
    pub fn get_geometry(&self) -> Result<JsValue, JsValue> {
        let generation = self.current()?;
        serde_wasm_bindgen::to_value(&generation.geometry)
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Points of the last generation with their attached properties.
    #[wasm_bindgen]
    pub fn get_points(&self) -> Result<JsValue, JsValue> {
        let generation = self.current()?;
        serde_wasm_bindgen::to_value(&generation.points)
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Batch Bézier fit of the last generation's points.
    #[wasm_bindgen]
    pub fn get_fitted_curve(&self) -> Result<JsValue, JsValue> {
        let generation = self.current()?;
        let (segments, _) = generation.fitted_curve(&self.options.curve);
        serde_wasm_bindgen::to_value(&segments).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Loop length per scheduled property; `null` for schedules that do not loop.
    #[wasm_bindgen]
    pub fn get_loop_lengths(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.loop_lengths())
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Diagnostics of the last generation.
    #[wasm_bindgen]
    pub fn last_diagnostics(&self) -> Result<JsValue, JsValue> {
        let generation = self.current()?;
        serde_wasm_bindgen::to_value(&generation.diagnostics)
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// SVG document of the last generation.
    #[wasm_bindgen]
    pub fn export_svg(&self) -> Result<String, JsValue> {
        let generation = self.current()?;
        let viewport = self.options.viewport.unwrap_or_default();
        render::render_svg(&generation.geometry, &viewport).map_err(to_js_error)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Current parameters.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Result of the last [`Engine::generate`] call, if it is still current.
    #[must_use]
    pub fn generation(&self) -> Option<&Generation> {
        if self.dirty {
            None
        } else {
            self.last_generation.as_ref()
        }
    }

    fn loop_lengths(&self) -> BTreeMap<&'static str, Option<usize>> {
        let total = self.parameters.point_count;
        self.parameters
            .schedules
            .iter()
            .map(|schedule| (schedule.property.name(), schedule.loop_length(total)))
            .collect()
    }

    fn current(&self) -> Result<&Generation, JsValue> {
        self.generation()
            .ok_or_else(|| js_error("nothing generated yet; call generate() first"))
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
