use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

mod canvas;
mod driver;
pub mod engine;
pub mod error;
pub mod geometry;
mod logging;
pub mod surface;

use driver::Driver;
use engine::config::{EngineConfig, DEFAULT_PRESET};

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
}

/// Animated background bound to one canvas. A handle whose canvas could not
/// be drawn on is inert: it never animates and every method is a no-op.
#[wasm_bindgen]
pub struct Starfield {
    driver: Option<Driver>,
}

#[wasm_bindgen]
impl Starfield {
    pub fn attach(canvas: HtmlCanvasElement, preset: &str) -> Starfield {
        Self::launch(canvas, preset, None)
    }

    /// Like [`Starfield::attach`] with a fixed random seed.
    pub fn attach_seeded(canvas: HtmlCanvasElement, preset: &str, seed: u64) -> Starfield {
        Self::launch(canvas, preset, Some(seed))
    }

    pub fn is_running(&self) -> bool {
        self.driver.as_ref().map(Driver::is_running).unwrap_or(false)
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.with_driver(|driver| driver.resize(width, height));
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        self.with_driver(|driver| driver.pointer_move(x, y));
    }

    pub fn pointer_leave(&self) {
        self.with_driver(Driver::pointer_leave);
    }

    pub fn shutdown(&mut self) {
        if let Some(driver) = self.driver.as_mut() {
            driver.shutdown();
        }
    }

    pub fn snapshot_json(&self) -> String {
        self.driver
            .as_ref()
            .map(Driver::snapshot_json)
            .unwrap_or_else(|| "{}".to_string())
    }
}

impl Starfield {
    fn launch(canvas: HtmlCanvasElement, preset: &str, seed: Option<u64>) -> Starfield {
        let config = EngineConfig::preset(preset).unwrap_or_else(|err| {
            log::warn!("{}, using `{}`", err, DEFAULT_PRESET);
            EngineConfig::default()
        });

        match Driver::start(canvas, config, seed) {
            Ok(driver) => Starfield {
                driver: Some(driver),
            },
            Err(err) => {
                log::warn!("starfield disabled: {}", err);
                Starfield { driver: None }
            }
        }
    }

    fn with_driver(&self, f: impl FnOnce(&Driver)) {
        if let Some(driver) = self.driver.as_ref() {
            f(driver);
        }
    }
}

#[wasm_bindgen]
pub fn presets_json() -> String {
    engine::config::presets_json()
}
