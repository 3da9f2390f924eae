//! Browser bindings
//!
//! Exposes a session to JavaScript and drives it from
//! `requestAnimationFrame`. The page renders from the JSON snapshot and
//! forwards clicks and key presses to the command methods.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::driver::FrameDriver;
use crate::settings::Settings;
use crate::sim::{AbilityKind, Session};

#[wasm_bindgen]
pub struct WebSession {
    driver: Rc<RefCell<FrameDriver>>,
    frame_handle: Rc<RefCell<Option<i32>>>,
}

#[wasm_bindgen]
impl WebSession {
    /// Build a session from a JSON settings blob; empty means defaults
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> Result<WebSession, JsValue> {
        crate::init_logging();
        let settings = if settings_json.trim().is_empty() {
            Settings::default()
        } else {
            Settings::from_json(settings_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        Ok(Self {
            driver: Rc::new(RefCell::new(FrameDriver::new(Session::new(settings)))),
            frame_handle: Rc::new(RefCell::new(None)),
        })
    }

    /// Begin ticking on every animation frame
    pub fn start(&self) {
        self.driver.borrow_mut().start();
        request_frame(self.driver.clone(), self.frame_handle.clone());
    }

    /// Cancel the animation loop; no tick runs afterwards
    pub fn stop(&self) {
        self.driver.borrow_mut().stop();
        if let Some(handle) = self.frame_handle.borrow_mut().take()
            && let Some(window) = web_sys::window()
        {
            let _ = window.cancel_animation_frame(handle);
        }
    }

    pub fn set_move_target(&self, x: f32, y: f32) {
        self.driver
            .borrow_mut()
            .session_mut()
            .set_move_target(Vec2::new(x, y));
    }

    /// Fire an ability by name or key binding
    pub fn activate_ability(&self, name: &str) -> bool {
        self.driver.borrow_mut().session_mut().activate_named(name)
    }

    pub fn unlock_ability(&self, name: &str) -> bool {
        match AbilityKind::from_name(name) {
            Some(kind) => self.driver.borrow_mut().session_mut().unlock_ability(kind),
            None => false,
        }
    }

    pub fn start_wave(&self, wave: u32) -> bool {
        self.driver.borrow_mut().session_mut().start_wave(wave)
    }

    pub fn start_next_wave(&self) -> bool {
        self.driver.borrow_mut().session_mut().start_next_wave()
    }

    pub fn reset(&self) {
        self.driver.borrow_mut().session_mut().reset();
    }

    pub fn fps(&self) -> u32 {
        self.driver.borrow().fps()
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.driver
            .borrow()
            .session()
            .snapshot()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn drain_events_json(&self) -> Result<String, JsValue> {
        let events = self.driver.borrow_mut().session_mut().drain_events();
        serde_json::to_string(&events).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

fn request_frame(driver: Rc<RefCell<FrameDriver>>, handle: Rc<RefCell<Option<i32>>>) {
    let Some(window) = web_sys::window() else {
        log::warn!("No window; animation loop not started");
        return;
    };
    let next_handle = handle.clone();
    let closure = Closure::once(move |time: f64| {
        let running = driver.borrow_mut().frame(time);
        if running {
            request_frame(driver, next_handle);
        }
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => *handle.borrow_mut() = Some(id),
        Err(_) => log::warn!("requestAnimationFrame failed"),
    }
    closure.forget();
}
