use primitives::{Easing, Interpolator};
use serde::Serialize;

/// Visual state of one sprite, as consumed by the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Sprite {
    pub frame: u32,
    pub sprite_index: Option<i32>,
    pub texture_offset: (f64, f64),
    pub scale: (f64, f64),
    pub scale_speed: (f64, f64),
    pub rotations: [f64; 3],
    pub rotation_speeds: [f64; 3],
    pub dest_offset: [f64; 3],
    pub color: [u8; 3],
    pub alpha: u8,
    pub blend_add: bool,
    pub visible: bool,
    pub mirrored: bool,
    pub corner_relative: bool,
    pub allow_offset: bool,
    pub automatic_orientation: bool,
    pub removed: bool,
    /// Set whenever a field the renderer caches has been touched.
    pub changed: bool,

    #[serde(skip)]
    alpha_interpolator: Option<Interpolator<1>>,
    #[serde(skip)]
    scale_interpolator: Option<Interpolator<2>>,
    #[serde(skip)]
    offset_interpolator: Option<Interpolator<3>>,
    #[serde(skip)]
    color_interpolator: Option<Interpolator<3>>,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            frame: 0,
            sprite_index: None,
            texture_offset: (0.0, 0.0),
            scale: (1.0, 1.0),
            scale_speed: (0.0, 0.0),
            rotations: [0.0; 3],
            rotation_speeds: [0.0; 3],
            dest_offset: [0.0; 3],
            color: [255, 255, 255],
            alpha: 255,
            blend_add: false,
            visible: true,
            mirrored: false,
            corner_relative: false,
            allow_offset: false,
            automatic_orientation: false,
            removed: false,
            changed: true,
            alpha_interpolator: None,
            scale_interpolator: None,
            offset_interpolator: None,
            color_interpolator: None,
        }
    }
}

impl Sprite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fade(&mut self, duration: u32, alpha: u8, easing: Option<Easing>) {
        self.alpha_interpolator = Some(Interpolator::new(
            [f64::from(self.alpha)],
            self.frame,
            [f64::from(alpha)],
            self.frame + duration,
            easing,
        ));
    }

    pub fn scale_in(&mut self, duration: u32, sx: f64, sy: f64, easing: Option<Easing>) {
        self.scale_interpolator = Some(Interpolator::new(
            [self.scale.0, self.scale.1],
            self.frame,
            [sx, sy],
            self.frame + duration,
            easing,
        ));
    }

    pub fn move_in(&mut self, duration: u32, x: f64, y: f64, z: f64, easing: Option<Easing>) {
        self.offset_interpolator = Some(Interpolator::new(
            self.dest_offset,
            self.frame,
            [x, y, z],
            self.frame + duration,
            easing,
        ));
    }

    pub fn color_in(&mut self, duration: u32, r: u8, g: u8, b: u8, easing: Option<Easing>) {
        self.color_interpolator = Some(Interpolator::new(
            self.color.map(f64::from),
            self.frame,
            [f64::from(r), f64::from(g), f64::from(b)],
            self.frame + duration,
            easing,
        ));
    }

    /// Whether any tween is still in flight.
    pub fn is_animating(&self) -> bool {
        let frame = self.frame;
        self.alpha_interpolator
            .as_ref()
            .is_some_and(|i| !i.is_finished(frame))
            || self
                .scale_interpolator
                .as_ref()
                .is_some_and(|i| !i.is_finished(frame))
            || self
                .offset_interpolator
                .as_ref()
                .is_some_and(|i| !i.is_finished(frame))
            || self
                .color_interpolator
                .as_ref()
                .is_some_and(|i| !i.is_finished(frame))
    }

    /// Advance one frame: integrate speeds, then sample every tween.
    pub fn update(&mut self) {
        self.frame += 1;

        if self.rotation_speeds.iter().any(|&s| s != 0.0) {
            for (rotation, speed) in self.rotations.iter_mut().zip(self.rotation_speeds) {
                *rotation += speed;
            }
            self.changed = true;
        }

        if self.scale_speed != (0.0, 0.0) {
            self.scale.0 += self.scale_speed.0;
            self.scale.1 += self.scale_speed.1;
            self.changed = true;
        }

        let frame = self.frame;

        if let Some(interp) = self.alpha_interpolator.as_mut() {
            interp.update(frame);
            self.alpha = channel(interp.values()[0]);
            self.changed = true;
            if interp.is_finished(frame) {
                self.alpha_interpolator = None;
            }
        }

        if let Some(interp) = self.scale_interpolator.as_mut() {
            interp.update(frame);
            let [sx, sy] = interp.values();
            self.scale = (sx, sy);
            self.changed = true;
            if interp.is_finished(frame) {
                self.scale_interpolator = None;
            }
        }

        if let Some(interp) = self.offset_interpolator.as_mut() {
            interp.update(frame);
            self.dest_offset = interp.values();
            self.changed = true;
            if interp.is_finished(frame) {
                self.offset_interpolator = None;
            }
        }

        if let Some(interp) = self.color_interpolator.as_mut() {
            interp.update(frame);
            self.color = interp.values().map(channel);
            self.changed = true;
            if interp.is_finished(frame) {
                self.color_interpolator = None;
            }
        }
    }
}

fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_reaches_target() {
        let mut sprite = Sprite::new();
        sprite.fade(4, 0, None);
        sprite.update();
        sprite.update();
        assert_eq!(sprite.alpha, 128);
        sprite.update();
        sprite.update();
        assert_eq!(sprite.alpha, 0);
        assert!(!sprite.is_animating());
    }

    #[test]
    fn test_speeds_integrate() {
        let mut sprite = Sprite::new();
        sprite.rotation_speeds = [0.0, 0.0, 0.5];
        sprite.scale_speed = (0.25, 0.0);
        sprite.update();
        sprite.update();
        assert_eq!(sprite.rotations[2], 1.0);
        assert_eq!(sprite.scale, (1.5, 1.0));
        assert_eq!(sprite.frame, 2);
    }
}
