//! Sprite-sheet animation state
//!
//! The sheet itself is a texture owned by the renderer; an animation only
//! tracks which frame to show, how many times to loop and when it is done.

use serde::{Deserialize, Serialize};

use crate::assets::TextureId;

/// Layout of a sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub texture: TextureId,
    pub frame_width: f32,
    pub frame_height: f32,
    pub frames_per_line: u16,
    pub num_lines: u16,
}

impl SpriteSheet {
    /// Sheet with evenly sized frames cut from a `width`×`height` texture
    pub fn new(texture: TextureId, width: f32, height: f32, frames_per_line: u16, num_lines: u16) -> Self {
        Self {
            texture,
            frame_width: width / frames_per_line.max(1) as f32,
            frame_height: height / num_lines.max(1) as f32,
            frames_per_line: frames_per_line.max(1),
            num_lines: num_lines.max(1),
        }
    }

    pub fn explosion_a() -> Self {
        Self::new(TextureId::ExplosionA, 1280.0, 1280.0, 5, 5)
    }

    pub fn explosion_b() -> Self {
        Self::new(TextureId::ExplosionB, 768.0, 768.0, 3, 3)
    }
}

/// Source rectangle of the current frame, in texture pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Playback state of one sheet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteAnimation {
    pub sheet: SpriteSheet,
    pub frame: u16,
    pub line: u16,
    /// Completed passes through the sheet
    pub loops: u16,
    /// Extra passes after the first one
    pub repeats: u16,
    pub active: bool,
    /// World height of the billboard
    pub size: f32,
    pub opacity: f32,
}

impl SpriteAnimation {
    pub fn new(sheet: SpriteSheet, repeats: u16, size: f32, opacity: f32) -> Self {
        Self {
            sheet,
            frame: 0,
            line: 0,
            loops: 0,
            repeats,
            active: true,
            size,
            opacity,
        }
    }

    /// Step one frame; deactivates after the last repeat
    pub fn advance(&mut self) {
        if !self.active {
            return;
        }
        self.frame += 1;
        if self.frame >= self.sheet.frames_per_line {
            self.frame = 0;
            self.line += 1;
            if self.line >= self.sheet.num_lines {
                self.line = 0;
                self.loops += 1;
            }
        }
        if self.loops > self.repeats {
            self.active = false;
        }
    }

    /// Rewind a finished animation so it can play again
    pub fn restart(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.frame = 0;
        self.line = 0;
        self.loops = 0;
    }

    pub fn frame_rect(&self) -> Option<FrameRect> {
        if !self.active {
            return None;
        }
        Some(FrameRect {
            x: self.sheet.frame_width * self.frame as f32,
            y: self.sheet.frame_height * self.line as f32,
            width: self.sheet.frame_width,
            height: self.sheet.frame_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SpriteSheet {
        SpriteSheet::new(TextureId::ExplosionB, 300.0, 300.0, 3, 3)
    }

    #[test]
    fn test_plays_once_then_stops() {
        let mut anim = SpriteAnimation::new(sheet(), 0, 20.0, 1.0);
        for _ in 0..8 {
            anim.advance();
            assert!(anim.active);
        }
        anim.advance();
        assert!(!anim.active);
        assert!(anim.frame_rect().is_none());
    }

    #[test]
    fn test_repeats_extend_playback() {
        let mut anim = SpriteAnimation::new(sheet(), 2, 20.0, 1.0);
        let mut steps = 0;
        while anim.active {
            anim.advance();
            steps += 1;
        }
        assert_eq!(steps, 27);
    }

    #[test]
    fn test_frame_rect_walks_sheet() {
        let mut anim = SpriteAnimation::new(sheet(), 0, 20.0, 1.0);
        anim.advance();
        anim.advance();
        anim.advance();
        let rect = anim.frame_rect().unwrap();
        assert_eq!((rect.x, rect.y), (0.0, 100.0));
        assert_eq!((rect.width, rect.height), (100.0, 100.0));
    }

    #[test]
    fn test_restart_only_when_finished() {
        let mut anim = SpriteAnimation::new(sheet(), 0, 20.0, 1.0);
        anim.advance();
        anim.restart();
        assert_eq!(anim.frame, 1);
        while anim.active {
            anim.advance();
        }
        anim.restart();
        assert!(anim.active);
        assert_eq!((anim.frame, anim.line, anim.loops), (0, 0, 0));
    }
}
