//! Terminal presentation of scenes.

use std::{collections::BTreeMap, io::Write};

use anyhow::Result;
use deck_defence_rendering::{AudioCue, RenderingBackend, Scene};

/// Writes each frame as glyph rows followed by the HUD and build menu.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
    color: bool,
}

impl<W: Write> TextBackend<W> {
    pub(crate) fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, scene: &Scene, cues: &[AudioCue]) -> Result<()> {
        for row in scene.rows() {
            let mut line = String::new();
            for cell in row {
                if self.color {
                    let [red, green, blue] = cell.color.to_rgb_u8();
                    line.push_str(&format!("\x1b[38;2;{red};{green};{blue}m{}", cell.glyph));
                } else {
                    line.push(cell.glyph);
                }
            }
            if self.color {
                line.push_str("\x1b[0m");
            }
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out, "{}", scene.hud_line())?;
        writeln!(self.out, "{}", scene.menu_line())?;

        if !cues.is_empty() {
            let mut counts: BTreeMap<AudioCue, usize> = BTreeMap::new();
            for cue in cues {
                *counts.entry(*cue).or_default() += 1;
            }
            let summary = counts
                .iter()
                .map(|(cue, count)| format!("{cue:?} x{count}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(self.out, "cues: {summary}")?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
