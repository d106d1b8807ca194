//! Short synthesized feedback tones
//!
//! Every tone is generated at startup as an in-memory WAV clip and played
//! fire-and-forget. Nothing in the game waits on audio; when the audio
//! device is unavailable the sink simply stays silent.

use log::warn;
use macroquad::audio::{load_sound_from_bytes, play_sound, PlaySoundParams, Sound};
use std::collections::HashMap;

const SAMPLE_RATE: u32 = 44_100;
/// Tail appended after the envelope has decayed.
const RELEASE_SECONDS: f32 = 0.02;
const ENVELOPE_FLOOR: f32 = 0.0001;
/// Gain of the loudest beep; every beep is scaled relative to it.
const LOUDEST_GAIN: f32 = 0.12;
const HEADROOM: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Eat,
    GameOver,
    Click,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Eat, Tone::GameOver, Tone::Click];

    pub fn beeps(self) -> &'static [Beep] {
        match self {
            Tone::Eat => &EAT_BEEPS,
            Tone::GameOver => &GAME_OVER_BEEPS,
            Tone::Click => &CLICK_BEEPS,
        }
    }
}

static EAT_BEEPS: [Beep; 2] = [
    Beep::new(880.0, 0.06, Waveform::Sine, 0.07),
    Beep::new(660.0, 0.04, Waveform::Sine, 0.04),
];
static GAME_OVER_BEEPS: [Beep; 1] = [Beep::new(160.0, 0.18, Waveform::Sawtooth, 0.12)];
static CLICK_BEEPS: [Beep; 1] = [Beep::new(1100.0, 0.04, Waveform::Square, 0.04)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
    Square,
}

impl Waveform {
    /// Value in [-1, 1] at `phase` cycles.
    pub fn sample(self, phase: f32) -> f32 {
        let frac = phase - phase.floor();
        match self {
            Waveform::Sine => (std::f32::consts::TAU * frac).sin(),
            Waveform::Sawtooth => 2.0 * (phase - (phase + 0.5).floor()),
            Waveform::Square => {
                if frac < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beep {
    pub freq: f32,
    /// Seconds until the envelope reaches silence
    pub duration: f32,
    pub waveform: Waveform,
    pub gain: f32,
}

impl Beep {
    pub const fn new(freq: f32, duration: f32, waveform: Waveform, gain: f32) -> Self {
        Self {
            freq,
            duration,
            waveform,
            gain,
        }
    }

    /// Exponential decay from full gain to the floor over `duration`.
    pub fn envelope(&self, t: f32) -> f32 {
        if t >= self.duration {
            return 0.0;
        }
        let start = self.gain.max(ENVELOPE_FLOOR);
        start * (ENVELOPE_FLOOR / start).powf(t / self.duration)
    }

    pub fn sample_count(&self) -> u32 {
        ((self.duration + RELEASE_SECONDS) * SAMPLE_RATE as f32) as u32
    }
}

/// Renders a beep as a PCM16 mono WAV file.
pub fn synthesize_wav(beep: &Beep) -> Vec<u8> {
    let num_samples = beep.sample_count();
    let block_align: u16 = 2;
    let byte_rate: u32 = SAMPLE_RATE * block_align as u32;
    let data_size: u32 = num_samples * 2;

    let mut data: Vec<u8> = Vec::with_capacity(data_size as usize + 44);

    data.extend_from_slice(b"RIFF");
    data.extend_from_slice(&(36 + data_size).to_le_bytes());
    data.extend_from_slice(b"WAVE");
    data.extend_from_slice(b"fmt ");
    data.extend_from_slice(&16u32.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes()); // PCM
    data.extend_from_slice(&1u16.to_le_bytes()); // mono
    data.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    data.extend_from_slice(&byte_rate.to_le_bytes());
    data.extend_from_slice(&block_align.to_le_bytes());
    data.extend_from_slice(&16u16.to_le_bytes());
    data.extend_from_slice(b"data");
    data.extend_from_slice(&data_size.to_le_bytes());

    let scale = HEADROOM / LOUDEST_GAIN;
    for n in 0..num_samples {
        let t = n as f32 / SAMPLE_RATE as f32;
        let level = (beep.envelope(t) * scale).clamp(0.0, 1.0);
        let value = level * beep.waveform.sample(beep.freq * t);
        let sample = (value * i16::MAX as f32) as i16;
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

pub trait ToneSink {
    fn play(&mut self, tone: Tone);
}

/// Sink used when no audio device is available.
#[derive(Debug, Default)]
pub struct SilentTones;

impl ToneSink for SilentTones {
    fn play(&mut self, _tone: Tone) {}
}

pub struct MacroquadTones {
    sounds: HashMap<Tone, Vec<Sound>>,
}

impl MacroquadTones {
    /// Synthesizes and loads every tone. Tones that fail to load stay silent.
    pub async fn load() -> Self {
        let mut sounds = HashMap::new();
        let mut failures = 0;

        for tone in Tone::ALL {
            let mut clips = Vec::new();
            for beep in tone.beeps() {
                match load_sound_from_bytes(&synthesize_wav(beep)).await {
                    Ok(sound) => clips.push(sound),
                    Err(_) => failures += 1,
                }
            }
            sounds.insert(tone, clips);
        }

        if failures > 0 {
            warn!("Audio unavailable: {} tone clips failed to load", failures);
        }

        Self { sounds }
    }
}

impl ToneSink for MacroquadTones {
    fn play(&mut self, tone: Tone) {
        if let Some(clips) = self.sounds.get(&tone) {
            for clip in clips {
                play_sound(
                    clip,
                    PlaySoundParams {
                        looped: false,
                        volume: 1.0,
                    },
                );
            }
        }
    }
}
