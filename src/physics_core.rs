use crate::geometry::Rect;

/// Feet are snapped onto a platform top when within this distance of it.
pub const GROUND_SNAP_TOLERANCE: f32 = 15.0;
/// Depth of the probe box under the feet.
pub const FOOT_PROBE_DEPTH: f32 = 10.0;
/// Horizontal speeds below this are zeroed.
pub const STOP_THRESHOLD: f32 = 0.1;

pub fn apply_gravity(vy: &mut f32, grounded: bool, gravity: f32) {
    if !grounded {
        *vy -= gravity;
    }
}

/// Acceleration toward the input axis with a hard speed cap. Without input the
/// body decays by ground friction or air resistance.
pub fn accelerate_horizontal(
    vx: &mut f32,
    axis: f32,
    acceleration: f32,
    max_speed: f32,
    decay: f32,
) {
    if axis != 0.0 {
        *vx += axis * acceleration;
    } else {
        *vx *= decay;
    }
    *vx = vx.clamp(-max_speed, max_speed);
    if vx.abs() < STOP_THRESHOLD {
        *vx = 0.0;
    }
}

pub fn surface_decay(grounded: bool, friction: f32, air_resistance: f32) -> f32 {
    if grounded {
        friction
    } else {
        air_resistance
    }
}

pub fn update_jump_buffer(jump_held: bool, jump_buffer: &mut f32, window: f32, dt: f32) {
    if jump_held {
        *jump_buffer = window;
    }
    if *jump_buffer > 0.0 {
        *jump_buffer -= dt;
    }
}

pub fn update_coyote_timer(grounded: bool, coyote: &mut f32, window: f32, dt: f32) {
    if grounded {
        *coyote = window;
    } else if *coyote > 0.0 {
        *coyote -= dt;
    }
}

/// Consumes both grace windows when a jump is allowed.
pub fn try_jump(allowed: bool, coyote: &mut f32, jump_buffer: &mut f32) -> bool {
    if allowed && *jump_buffer > 0.0 && *coyote > 0.0 {
        *coyote = 0.0;
        *jump_buffer = 0.0;
        return true;
    }
    false
}

/// Cuts the rise once when jump is released early.
pub fn apply_variable_jump(vy: &mut f32, jump_held: bool, rising_from_jump: &mut bool, cut: f32) {
    if !jump_held && *vy > 0.0 && *rising_from_jump {
        *vy *= cut;
        *rising_from_jump = false;
    }
}

/// Surface the feet rest on this tick, if any. The world floor is y = 0.
pub fn find_ground(body: &Rect, vy: f32, platforms: &[Rect]) -> Option<f32> {
    if body.y <= 0.0 && vy <= 0.0 {
        return Some(0.0);
    }
    if vy > 0.0 {
        return None;
    }
    let probe = Rect::new(
        body.x + body.width * 0.2,
        body.y - FOOT_PROBE_DEPTH,
        body.width * 0.6,
        FOOT_PROBE_DEPTH,
    );
    platforms
        .iter()
        .filter(|p| probe.intersects(p))
        .map(|p| p.top())
        .find(|top| (body.y - top).abs() <= GROUND_SNAP_TOLERANCE)
}

/// Platform top a falling body crossed during this tick. `previous_y` is the
/// feet height before vertical motion was applied.
pub fn find_landing(body: &Rect, previous_y: f32, vy: f32, platforms: &[Rect]) -> Option<f32> {
    if vy > 0.0 {
        return None;
    }
    platforms
        .iter()
        .filter(|p| {
            body.right() > p.x && body.x < p.right() && body.y < p.top() && body.top() > p.top()
        })
        .map(|p| p.top())
        .find(|top| previous_y >= *top)
}
