//! Transcription of uploaded audio clips
//!
//! The upload path never fails: any problem with the clip - unreadable
//! file, undecodable audio, transcription failure, empty result - yields
//! the fixed fallback string instead of an error.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::transcription::SpeechToText;
use crate::wav::read_wav_mono_16k;

/// Substituted for any transcription that could not be produced.
pub const FALLBACK_TRANSCRIPT: &str = "Sorry, I couldn't make out the audio.";

/// Transcribe an uploaded audio clip, falling back to
/// `FALLBACK_TRANSCRIPT` on any failure.
///
/// The clip is copied to a scratch temp file for the duration of one
/// transcription call; the scratch file is removed when the guard drops.
pub fn transcribe_clip(stt: &dyn SpeechToText, path: impl AsRef<Path>) -> String {
    match try_transcribe(stt, path.as_ref()) {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => {
            warn!(path = %path.as_ref().display(), "Transcription produced no text");
            FALLBACK_TRANSCRIPT.to_string()
        }
        Err(e) => {
            warn!(path = %path.as_ref().display(), error = %e, "Transcription failed");
            FALLBACK_TRANSCRIPT.to_string()
        }
    }
}

fn try_transcribe(stt: &dyn SpeechToText, path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;

    // Scratch copy lives only for this one call.
    let mut scratch = tempfile::Builder::new().suffix(".wav").tempfile()?;
    scratch.write_all(&bytes)?;
    scratch.flush()?;

    let samples = read_wav_mono_16k(scratch.path())?;
    let transcript = stt.transcribe(&samples)?;
    Ok(transcript.trim().to_string())
}
