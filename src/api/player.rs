//! `MidiPlayer`: the JavaScript-facing player
//!
//! Wraps [`Player`] and routes its note triggers into a [`WebSynth`]. The
//! synth is created on the first `play()`, which browsers only allow after a
//! user gesture; triggers produced before then are dropped.
//!
//! Typical host loop:
//!
//! ```text
//! const player = MidiPlayer.new();
//! fileInput.onchange = () => player.load_midi(fileInput.files[0]).catch(alert);
//! function frame(now) {
//!     player.tick(now - last);
//!     player.render(ctx, 0, 0, canvas.width, canvas.height);
//!     requestAnimationFrame(frame);
//! }
//! ```

use super::canvas::CanvasSurface;
use super::helpers::{deserialize, js_error, serialize};
use crate::audio::WebSynth;
use crate::config::PlayerConfig;
use crate::error::LoadOutcome;
use crate::player::Player;
use crate::transport::TickStatus;
use js_sys::{Promise, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{CanvasRenderingContext2d, File};

#[wasm_bindgen]
pub struct MidiPlayer {
    player: Player,
    synth: Option<WebSynth>,
}

impl MidiPlayer {
    fn from_config(config: PlayerConfig) -> Self {
        Self { player: Player::new(config), synth: None }
    }

    fn ensure_synth(&mut self) -> Result<&mut WebSynth, JsValue> {
        if self.synth.is_none() {
            let synth = WebSynth::new(self.player.config().synth.clone(), self.player.volume())?;
            self.synth = Some(synth);
        }
        match self.synth.as_mut() {
            Some(synth) => {
                // Resolves asynchronously; a rejected resume just leaves the context suspended
                let _ = synth.resume()?;
                Ok(synth)
            }
            None => Err(JsValue::from_str("synth unavailable")),
        }
    }

    /// Hand pending triggers to the synth.
    fn flush(&mut self) -> Result<(), JsValue> {
        let triggers = self.player.take_triggers();
        match self.synth.as_mut() {
            Some(synth) => synth.apply(&triggers),
            None => Ok(()),
        }
    }
}

#[wasm_bindgen]
impl MidiPlayer {
    pub fn new() -> MidiPlayer {
        Self::from_config(PlayerConfig::default())
    }

    /// Build a player from a (possibly partial) config object.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<MidiPlayer, JsValue> {
        let config: PlayerConfig = if config.is_undefined() || config.is_null() {
            PlayerConfig::default()
        } else {
            deserialize(config, "invalid player config")?
        };
        Ok(Self::from_config(config))
    }

    /// Read `file` and load it. Resolves to `"committed"` or `"superseded"`;
    /// rejects with a message when the file cannot be read or parsed.
    pub fn load_midi(&self, file: File) -> Promise {
        let source = async move {
            let buffer = JsFuture::from(file.array_buffer()).await?;
            Ok::<_, JsValue>(Uint8Array::new(&buffer).to_vec())
        };
        let load = self.player.load(source);
        future_to_promise(async move {
            let outcome = load.await?;
            Ok(JsValue::from_str(match outcome {
                LoadOutcome::Committed => "committed",
                LoadOutcome::Superseded => "superseded",
            }))
        })
    }

    /// Load bytes already in memory.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.player.load_bytes(bytes)?;
        self.flush()
    }

    pub fn ready(&self) -> bool {
        self.player.ready()
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn play(&mut self) -> Result<(), JsValue> {
        if !self.player.ready() {
            log::warn!("play() ignored: no playable score loaded");
            return Ok(());
        }
        self.ensure_synth()?;
        self.player.play();
        self.flush()
    }

    pub fn stop(&mut self) -> Result<(), JsValue> {
        self.player.stop();
        self.flush()
    }

    /// Advance by `delta_ms` milliseconds. Returns true once the end of the
    /// score has been reached.
    pub fn tick(&mut self, delta_ms: f64) -> Result<bool, JsValue> {
        let status = self.player.tick(delta_ms / 1000.0);
        self.flush()?;
        Ok(status == TickStatus::Finished)
    }

    pub fn seek_time(&mut self, time: f64, clear_sounds: bool) -> Result<(), JsValue> {
        self.player.seek_time(time, clear_sounds);
        self.flush()
    }

    pub fn seek_bar(&mut self, bar: usize, clear_sounds: bool) -> Result<(), JsValue> {
        self.player.seek_bar(bar, clear_sounds);
        self.flush()
    }

    pub fn skip(&mut self, delta_seconds: f64) -> Result<(), JsValue> {
        self.player.skip(delta_seconds);
        self.flush()
    }

    pub fn set_loop_bars(&mut self, start_bar: usize, end_bar: usize) {
        self.player.set_loop_bars(start_bar, end_bar);
    }

    pub fn clear_loop(&mut self) {
        self.player.clear_loop();
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.player.set_volume(volume);
        if let Some(synth) = &self.synth {
            synth.set_volume(self.player.volume());
        }
    }

    pub fn volume(&self) -> f32 {
        self.player.volume()
    }

    pub fn set_display_range(&mut self, seconds: f64) {
        self.player.set_display_range(seconds);
    }

    pub fn current_time(&self) -> f64 {
        self.player.current_time()
    }

    pub fn duration(&self) -> f64 {
        self.player.duration()
    }

    pub fn current_bar(&self) -> usize {
        self.player.current_bar()
    }

    pub fn num_bars(&self) -> usize {
        self.player.num_bars()
    }

    pub fn render(&self, ctx: &CanvasRenderingContext2d, x: f64, y: f64, width: f64, height: f64) -> Result<(), JsValue> {
        let mut surface = CanvasSurface::new(ctx);
        self.player.render(&mut surface, x, y, width, height)
    }

    /// Draw calls for one frame as a JS array, for hosts that rasterise themselves.
    pub fn render_display_list(&self, x: f64, y: f64, width: f64, height: f64) -> Result<JsValue, JsValue> {
        serialize(&self.player.render_display_list(x, y, width, height), "display list")
    }

    pub fn render_display_list_json(&self, x: f64, y: f64, width: f64, height: f64) -> Result<String, JsValue> {
        self.player
            .render_display_list(x, y, width, height)
            .to_json()
            .map_err(|e| js_error("display list", e))
    }
}

impl Default for MidiPlayer {
    fn default() -> Self {
        Self::new()
    }
}
