use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world space. `y` is the bottom edge, growing upward.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Overlap test where an absent hitbox never collides.
pub fn check_collision(a: Option<&Rect>, b: Option<&Rect>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.intersects(b),
        _ => false,
    }
}

pub fn lerp(start: f32, end: f32, factor: f32) -> f32 {
    start + (end - start) * factor
}

/// Sign as used for facing: zero stays zero.
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_collide_both_ways() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(check_collision(Some(&a), Some(&b)));
        assert!(check_collision(Some(&b), Some(&a)));
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!check_collision(Some(&a), Some(&b)));
        assert!(!check_collision(Some(&b), Some(&a)));
    }

    #[test]
    fn collision_is_symmetric_over_a_grid_of_offsets() {
        let base = Rect::new(0.0, 0.0, 20.0, 8.0);
        for dx in -30..30 {
            for dy in -12..12 {
                let other = Rect::new(dx as f32 * 1.5, dy as f32, 6.0, 14.0);
                assert_eq!(
                    check_collision(Some(&base), Some(&other)),
                    check_collision(Some(&other), Some(&base))
                );
            }
        }
    }

    #[test]
    fn absent_hitbox_never_collides() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!check_collision(Some(&a), None));
        assert!(!check_collision(None, Some(&a)));
        assert!(!check_collision(None, None));
    }

    #[test]
    fn lerp_moves_fraction_of_the_gap() {
        assert!((lerp(0.0, 10.0, 0.3) - 3.0).abs() < 1e-6);
        assert_eq!(sign(-0.2), -1.0);
        assert_eq!(sign(0.0), 0.0);
    }
}
