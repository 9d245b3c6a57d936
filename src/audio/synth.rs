//! Web Audio subtractive synthesizer
//!
//! One voice per sounding note:
//!
//! ```text
//! sawtooth osc → low-pass filter → envelope gain ─┐
//! sawtooth osc → low-pass filter → envelope gain ─┼→ compressor → master gain → destination
//!                                        ...     ─┘
//! ```
//!
//! Voices are keyed by [`NoteId`] so a note-off always finds the voice its
//! note-on created. Released voices ring out for the release time and are
//! disconnected by [`WebSynth::collect_finished`].

use crate::config::SynthConfig;
use crate::models::NoteId;
use crate::transport::{velocity_gain, Trigger};
use std::collections::HashMap;
use wasm_bindgen::JsValue;
use web_sys::{
    AudioContext, AudioNode, BiquadFilterNode, BiquadFilterType, DynamicsCompressorNode, GainNode, OscillatorNode,
    OscillatorType,
};

const MAX_CUTOFF_HZ: f32 = 10_000.0;
/// Gains ramp to this instead of zero
const SILENT: f32 = 0.0001;

/// Equal-tempered frequency, A0 (key 21) = 27.5 Hz
pub fn key_to_frequency(key: u8) -> f32 {
    27.5 * 2f32.powf((key as f32 - 21.0) / 12.0)
}

/// Initial filter cutoff for a voice at `frequency`
pub fn initial_cutoff(frequency: f32) -> f32 {
    (frequency * 4.0).min(MAX_CUTOFF_HZ)
}

struct Voice {
    osc: OscillatorNode,
    filter: BiquadFilterNode,
    amp: GainNode,
    frequency: f32,
    /// Context time at which the release has fully decayed
    release_end: Option<f64>,
}

impl Voice {
    fn start(
        context: &AudioContext,
        destination: &AudioNode,
        config: &SynthConfig,
        key: u8,
        velocity: u8,
    ) -> Result<Self, JsValue> {
        let now = context.current_time();
        let peak = velocity_gain(velocity);
        let sustain = config.sustain_level * peak;
        let frequency = key_to_frequency(key);

        let osc = context.create_oscillator()?;
        osc.set_type(OscillatorType::Sawtooth);
        osc.frequency().set_value(frequency);

        let filter = context.create_biquad_filter()?;
        filter.set_type(BiquadFilterType::Lowpass);
        filter.frequency().set_value(initial_cutoff(frequency));

        let amp = context.create_gain()?;
        let gain = amp.gain();
        gain.set_value_at_time(0.0, now)?;
        gain.linear_ramp_to_value_at_time(peak, now + config.attack_secs)?;
        gain.linear_ramp_to_value_at_time(sustain, now + config.attack_secs + config.decay_secs)?;

        osc.connect_with_audio_node(&filter)?;
        filter.connect_with_audio_node(&amp)?;
        amp.connect_with_audio_node(destination)?;
        osc.start_with_when(now)?;

        Ok(Self { osc, filter, amp, frequency, release_end: None })
    }

    fn release(&mut self, now: f64, release_secs: f64) -> Result<(), JsValue> {
        if self.release_end.is_some() {
            return Ok(());
        }
        let end = now + release_secs;

        let gain = self.amp.gain();
        let level = gain.value();
        gain.cancel_scheduled_values(now)?;
        gain.set_value_at_time(level, now)?;
        gain.linear_ramp_to_value_at_time(SILENT, end)?;

        let cutoff = self.filter.frequency();
        cutoff.cancel_scheduled_values(now)?;
        cutoff.set_value_at_time(cutoff.value(), now)?;
        cutoff.linear_ramp_to_value_at_time(self.frequency * 0.5, end)?;

        self.osc.stop_with_when(end)?;
        self.release_end = Some(end);
        Ok(())
    }

    fn finished(&self, now: f64) -> bool {
        self.release_end.map_or(false, |end| now >= end)
    }
}

impl Drop for Voice {
    fn drop(&mut self) {
        // The context may already be closed; nothing useful to do on failure
        let _ = self.osc.disconnect();
        let _ = self.filter.disconnect();
        let _ = self.amp.disconnect();
    }
}

pub struct WebSynth {
    context: AudioContext,
    compressor: DynamicsCompressorNode,
    master: GainNode,
    config: SynthConfig,
    voices: HashMap<NoteId, Voice>,
    releasing: Vec<Voice>,
}

impl WebSynth {
    pub fn new(config: SynthConfig, volume: f32) -> Result<Self, JsValue> {
        let context = AudioContext::new()?;

        let compressor = context.create_dynamics_compressor()?;
        compressor.threshold().set_value(config.compressor_threshold_db);
        compressor.knee().set_value(config.compressor_knee_db);
        compressor.ratio().set_value(config.compressor_ratio);

        let master = context.create_gain()?;
        master.gain().set_value(volume.clamp(0.0, 1.0));

        compressor.connect_with_audio_node(&master)?;
        master.connect_with_audio_node(&context.destination())?;

        log::debug!("synth ready at {} Hz", context.sample_rate());
        Ok(Self {
            context,
            compressor,
            master,
            config,
            voices: HashMap::new(),
            releasing: Vec::new(),
        })
    }

    /// Browsers start contexts suspended until a user gesture.
    pub fn resume(&self) -> Result<js_sys::Promise, JsValue> {
        self.context.resume()
    }

    pub fn apply(&mut self, triggers: &[Trigger]) -> Result<(), JsValue> {
        for trigger in triggers {
            match *trigger {
                Trigger::NoteOn { id, pitch, velocity, .. } => self.note_on(id, pitch, velocity)?,
                Trigger::NoteOff { id, .. } => self.note_off(id)?,
            }
        }
        self.collect_finished();
        Ok(())
    }

    pub fn note_on(&mut self, id: NoteId, key: u8, velocity: u8) -> Result<(), JsValue> {
        // A repeated note-on for the same id restarts the voice
        self.note_off(id)?;
        let voice = Voice::start(&self.context, &self.compressor, &self.config, key, velocity)?;
        self.voices.insert(id, voice);
        Ok(())
    }

    pub fn note_off(&mut self, id: NoteId) -> Result<(), JsValue> {
        if let Some(mut voice) = self.voices.remove(&id) {
            voice.release(self.context.current_time(), self.config.release_secs)?;
            self.releasing.push(voice);
        }
        Ok(())
    }

    /// Drop voices whose release has fully decayed.
    pub fn collect_finished(&mut self) {
        let now = self.context.current_time();
        self.releasing.retain(|voice| !voice.finished(now));
    }

    pub fn set_volume(&self, volume: f32) {
        self.master.gain().set_value(volume.clamp(0.0, 1.0));
    }
}

impl Drop for WebSynth {
    fn drop(&mut self) {
        self.voices.clear();
        self.releasing.clear();
        let _ = self.compressor.disconnect();
        let _ = self.master.disconnect();
        let _ = self.context.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_to_frequency() {
        assert!((key_to_frequency(21) - 27.5).abs() < 1e-4);
        assert!((key_to_frequency(69) - 440.0).abs() < 1e-2);
        assert!((key_to_frequency(81) - 880.0).abs() < 1e-2);
    }

    #[test]
    fn test_cutoff_capped() {
        assert!((initial_cutoff(440.0) - 1760.0).abs() < 1e-3);
        assert_eq!(initial_cutoff(key_to_frequency(108)), MAX_CUTOFF_HZ);
    }
}
