//! Audio transcription for parley
//!
//! This crate provides:
//! - Speech-to-text transcription via Whisper
//! - WAV decoding and resampling to the 16kHz mono format Whisper expects
//! - The upload path: scratch-file handling and the fixed fallback string
//!   for unrecognizable audio

pub mod clip;
pub mod transcription;
pub mod wav;

pub use clip::{FALLBACK_TRANSCRIPT, transcribe_clip};
pub use transcription::{SpeechToText, WhisperTranscriber};
pub use wav::read_wav_mono_16k;
