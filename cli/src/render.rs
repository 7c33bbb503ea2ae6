//! HTML transcript export
//!
//! All turn content crosses askama's HTML escaping on its way into the
//! markup; nothing user- or model-supplied is interpolated verbatim.

use askama::Template;
use conversation::Turn;
use std::fs;
use std::path::Path;

#[derive(Template)]
#[template(path = "transcript.html")]
struct TranscriptTemplate<'a> {
    turns: &'a [Turn],
}

pub fn render_transcript(turns: &[Turn]) -> anyhow::Result<String> {
    Ok(TranscriptTemplate { turns }.render()?)
}

pub fn save_transcript(turns: &[Turn], path: &Path) -> anyhow::Result<()> {
    let html = render_transcript(turns)?;
    fs::write(path, html)?;
    Ok(())
}
