//! WASM build test
//!
//! Exercises the JavaScript-facing player in a browser. Run with
//! `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

mod common;

use common::{parallel, TrackBuilder};
use piano_roll_wasm::api::MidiPlayer;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn two_track_file() -> Vec<u8> {
    parallel(vec![
        TrackBuilder::new().beats(60, 0, 4).beats(62, 4, 4).beats(64, 8, 3),
        TrackBuilder::new().beats(36, 0, 8).beats(43, 8, 2),
    ])
}

#[wasm_bindgen_test]
fn test_player_creation() {
    let player = MidiPlayer::new();
    assert!(!player.ready());
    assert_eq!(player.num_bars(), 0);
    assert_eq!(player.volume(), 1.0);
}

#[wasm_bindgen_test]
fn test_with_config_accepts_partial_object() {
    let config = js_sys::JSON::parse(r#"{"volume":0.5,"render":{"minKey":36}}"#).unwrap();
    let player = MidiPlayer::with_config(config).unwrap();
    assert_eq!(player.volume(), 0.5);

    let bad = js_sys::JSON::parse(r#"{"volume":"loud"}"#).unwrap();
    assert!(MidiPlayer::with_config(bad).is_err());
}

#[wasm_bindgen_test]
fn test_tick_takes_milliseconds() {
    let mut player = MidiPlayer::new();
    player.load_bytes(&two_track_file()).unwrap();
    assert_eq!(player.num_bars(), (player.duration() / 2.0).ceil() as usize);

    player.play().unwrap();
    let finished = player.tick(1000.0).unwrap();
    assert!(!finished);
    assert!((player.current_time() - 1.0).abs() < 1e-9);
    assert_eq!(player.current_bar(), 0);
}

#[wasm_bindgen_test]
fn test_bad_bytes_rejected() {
    let mut player = MidiPlayer::new();
    player.load_bytes(&two_track_file()).unwrap();
    assert!(player.load_bytes(b"RIFF....WAVE").is_err());
    assert_eq!(player.num_bars(), 3);
}

#[wasm_bindgen_test]
fn test_render_to_canvas() {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: web_sys::HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_width(640);
    canvas.set_height(480);
    let ctx: web_sys::CanvasRenderingContext2d = canvas.get_context("2d").unwrap().unwrap().dyn_into().unwrap();

    let mut player = MidiPlayer::new();
    player.load_bytes(&two_track_file()).unwrap();
    assert!(player.render(&ctx, 0.0, 0.0, 640.0, 480.0).is_ok());
}

#[wasm_bindgen_test]
fn test_render_display_list_is_array() {
    let mut player = MidiPlayer::new();
    player.load_bytes(&two_track_file()).unwrap();
    let list = player.render_display_list(0.0, 0.0, 640.0, 480.0).unwrap();
    let commands = js_sys::Reflect::get(&list, &"commands".into()).unwrap();
    assert!(js_sys::Array::is_array(&commands));
}
