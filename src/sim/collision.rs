//! Pixel-accurate collision tests
//!
//! Ships collide where the opaque pixels of their masks overlap. A coarse
//! rectangle test runs first; only the intersection region is scanned.

use super::mask::{OpacityMask, Rect};
use super::state::{Projectile, Ship};

/// Any opaque pixel of `mask` (placed at `origin`) inside `region`
fn mask_covers(mask: &OpacityMask, origin: &Rect, region: &Rect) -> bool {
    for y in region.top()..region.bottom() {
        for x in region.left()..region.right() {
            if mask.is_opaque(y - origin.y, x - origin.x) {
                return true;
            }
        }
    }
    false
}

/// Two ship hulls overlap on at least one pixel both masks mark opaque
pub fn ships_overlap(a: &Ship, b: &Ship) -> bool {
    let (ra, rb) = (a.bounds(), b.bounds());
    let Some(region) = ra.intersect(&rb) else {
        return false;
    };
    for y in region.top()..region.bottom() {
        for x in region.left()..region.right() {
            if a.mask().is_opaque(y - ra.y, x - ra.x) && b.mask().is_opaque(y - rb.y, x - rb.x) {
                return true;
            }
        }
    }
    false
}

/// Projectile touches an opaque pixel of the ship's rendered hull; ships
/// are never hit by their own fire
pub fn ship_hit_by(ship: &Ship, projectile: &Projectile) -> bool {
    if projectile.owner == ship.id {
        return false;
    }
    let visual = ship.visual_bounds();
    match visual.intersect(&projectile.bounds) {
        Some(region) => mask_covers(ship.mask(), &visual, &region),
        None => false,
    }
}

/// Projectile rectangles overlap
pub fn projectiles_overlap(a: &Projectile, b: &Projectile) -> bool {
    a.bounds.intersects(&b.bounds)
}
