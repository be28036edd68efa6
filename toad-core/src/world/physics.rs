//! Per-frame movement and tile collision.
use euclid::{point2, vec2};
use num_traits::clamp;

use super::{PixelPoint, PixelRect, TileMap, Velocity};
use crate::tileset::TileId;

/// side of a character tile
pub const CHARA_SIZE: i32 = 32;
/// any motion is rounded up to a multiple of this
pub const MINIMUM_PIXELS_PER_FRAME: i32 = 2;
/// pixels of movement between stance changes
pub const PIXELS_PER_STANCE_CHANGE: i32 = 16;
pub const FRICTION: f32 = 0.5;
pub const ICE_FRICTION: f32 = 0.25;
pub const GRAVITY: f32 = 0.5;

/// Round a speed up to whole pixels, then to the movement quantum.
pub fn round_up(n: f32) -> i32 {
    let n = n.ceil() as i32;
    let m = MINIMUM_PIXELS_PER_FRAME;
    (n + m - 1) / m * m
}

/// Position, velocity and animation state shared by every character.
///
/// The hitbox is the character tile shrunk by `width_offset` on both sides
/// and by `height_offset` on top.
#[derive(Clone, Debug)]
pub struct Body {
    pub pos: PixelPoint,
    pub vel: Velocity,
    pub max_speed: Velocity,
    pub acceleration: f32,
    pub width_offset: i32,
    pub height_offset: i32,
    pub facing_right: bool,
    pub stances: i32,
    pub stance: i32,
    /// stance shown while airborne
    pub air_stance: Option<i32>,
    /// the move count restarts while airborne
    pub air_resets_count: bool,
    pub move_count: i32,
    pub crouching: bool,
    pub climbing: bool,
    pub flying: bool,
}

impl Body {
    pub fn new(pos: PixelPoint, max_speed: Velocity, acceleration: f32) -> Body {
        Body {
            pos,
            vel: vec2(0.0, 0.0),
            max_speed,
            acceleration,
            width_offset: 0,
            height_offset: 0,
            facing_right: true,
            stances: 1,
            stance: 0,
            air_stance: None,
            air_resets_count: false,
            move_count: 0,
            crouching: false,
            climbing: false,
            flying: false,
        }
    }

    pub fn push_x(&mut self, ddx: f32) {
        let max = self.max_speed.x;
        self.vel.x += ddx;
        if self.vel.x > 0.0 {
            self.facing_right = true;
        } else if self.vel.x < 0.0 {
            self.facing_right = false;
        }
        self.vel.x = clamp(self.vel.x, -max, max);
    }
    pub fn push_y(&mut self, ddy: f32) {
        let max = self.max_speed.y;
        self.vel.y = clamp(self.vel.y + ddy, -max, max);
    }
    pub fn left(&mut self) {
        let a = self.acceleration;
        self.push_x(-a);
    }
    pub fn right(&mut self) {
        let a = self.acceleration;
        self.push_x(a);
    }

    /// Slow down horizontally; never overshoots zero.
    pub fn apply_friction(&mut self, map: &TileMap) {
        if self.flying {
            return;
        }
        let friction = if self.on_ice(map) {
            ICE_FRICTION
        } else {
            FRICTION
        };
        if self.vel.x > 0.0 {
            if self.vel.x - friction < 0.0 {
                self.vel.x = 0.0;
            } else {
                self.push_x(-friction);
            }
        } else if self.vel.x < 0.0 {
            if self.vel.x + friction > 0.0 {
                self.vel.x = 0.0;
            } else {
                self.push_x(friction);
            }
        }
    }
    pub fn apply_gravity(&mut self) {
        if !self.climbing && !self.flying {
            self.push_y(GRAVITY);
        }
    }
    pub fn jump(&mut self, map: &TileMap) {
        if self.on_ground(map) {
            // doubled so the clamp always yields full speed
            let v = self.max_speed.y * -2.0;
            self.push_y(v);
        }
    }

    /// Move pixel by pixel, x first, stopping an axis at the first collision.
    /// Returns the pixels moved horizontally.
    pub fn step(&mut self, map: &TileMap) -> i32 {
        let sign = |v: f32| if v < 0.0 { -1 } else { 1 };
        let (sx, sy) = (sign(self.vel.x), sign(self.vel.y));
        let mut moved = 0;
        for _ in 0..round_up(self.vel.x.abs()) {
            let next = self.pos + vec2(sx, 0);
            if self.is_colliding(map, next) {
                self.vel.x = 0.0;
                break;
            }
            self.pos = next;
            moved += 1;
        }
        for _ in 0..round_up(self.vel.y.abs()) {
            let next = self.pos + vec2(0, sy);
            if self.is_colliding(map, next) {
                self.vel.y = 0.0;
                break;
            }
            self.pos = next;
        }
        self.animate(map, moved);
        moved
    }

    fn animate(&mut self, map: &TileMap, moved: i32) {
        let half = PIXELS_PER_STANCE_CHANGE;
        self.move_count = (self.move_count + moved) % (half * 2);
        if self.move_count < half {
            self.stance = (self.stance + 1).min(self.stances - 1);
        } else {
            self.stance -= 1;
            if self.stance < 0 {
                self.stance = 1;
            }
        }
        if self.vel.x == 0.0 {
            self.stance = 0;
            self.move_count = 0;
        }
        if let Some(air) = self.air_stance {
            if !self.on_ground(map) {
                self.stance = air;
                if self.air_resets_count {
                    self.move_count = 0;
                }
            }
        }
        if self.stances <= 0 {
            self.stance = 0;
        }
    }

    /// Would the body collide with the map if it stood at `p`?
    pub fn is_colliding(&self, map: &TileMap, p: PixelPoint) -> bool {
        let left = p.x + self.width_offset;
        let right = p.x + (CHARA_SIZE - 1) - self.width_offset;
        let top = p.y + self.height_offset;
        let bottom = p.y + (CHARA_SIZE - 1);
        let mid_x = p.x + CHARA_SIZE / 2;
        let mid_y = p.y + CHARA_SIZE / 2;
        let probes = [
            (left, top),
            (right, top),
            (left, bottom),
            (right, bottom),
            (left, mid_y),
            (right, mid_y),
            (mid_x, top),
            (mid_x, bottom),
        ];
        if probes.iter().any(|&(x, y)| map.is_solid_at(point2(x, y))) {
            return true;
        }
        // top-solid tiles only stop a body that isn't rising
        self.vel.y >= 0.0
            && (map.is_top_solid_at(point2(left, bottom))
                || map.is_top_solid_at(point2(right, bottom)))
    }

    pub fn hitbox(&self) -> PixelRect {
        let w = CHARA_SIZE - 2 * self.width_offset;
        let h = CHARA_SIZE - self.height_offset;
        PixelRect::new(
            self.pos + vec2(self.width_offset, self.height_offset),
            euclid::size2(w, h),
        )
    }
    /// Hitboxes touch or overlap.
    pub fn overlaps(&self, other: &Body) -> bool {
        self.hitbox().intersects(&other.hitbox())
    }

    /// Standing on ground and about to walk off its edge.
    pub fn will_fall(&self, map: &TileMap) -> bool {
        let bottom = self.pos.y + CHARA_SIZE + 1;
        let x = if self.facing_right {
            self.pos.x + CHARA_SIZE + 1
        } else {
            self.pos.x
        };
        self.on_ground(map) && map.is_non_solid_at(point2(x, bottom))
    }
    pub fn on_ground(&self, map: &TileMap) -> bool {
        self.is_colliding(map, self.pos + vec2(0, 1))
    }
    pub fn on_ice(&self, map: &TileMap) -> bool {
        map.rules().is_icy(self.tile_below(map))
    }
    /// Tile at the character's feet, e.g. a door or a ladder.
    pub fn tile_behind(&self, map: &TileMap) -> Option<TileId> {
        map.tile_at(self.pos + vec2(CHARA_SIZE / 2, CHARA_SIZE - 1))
    }
    pub fn tile_below(&self, map: &TileMap) -> Option<TileId> {
        map.tile_at(self.pos + vec2(CHARA_SIZE / 2, CHARA_SIZE + 1))
    }
    /// Fell off the bottom of the map.
    pub fn is_below(&self, map: &TileMap) -> bool {
        self.pos.y + self.height_offset > map.pixel_size().1
    }
}

#[cfg(test)]
mod physics_test {
    use super::*;
    use crate::testutils::{map_from, rules};

    // 10x6 tiles, solid floor on row 4, wall at column 8
    fn arena() -> TileMap {
        map_from(&[
            "..........",
            "..........",
            "........#.",
            "........#.",
            "##########",
            "##########",
        ])
    }

    fn body_at(x: i32, y: i32) -> Body {
        let mut b = Body::new(point2(x, y), vec2(6.0, 7.0), 1.0);
        b.width_offset = 9;
        b.height_offset = 6;
        b.stances = 3;
        b
    }

    #[test]
    fn round_up_to_quantum() {
        assert_eq!(round_up(0.0), 0);
        assert_eq!(round_up(0.5), 2);
        assert_eq!(round_up(2.0), 2);
        assert_eq!(round_up(6.0), 6);
        assert_eq!(round_up(7.0), 8);
    }

    #[test]
    fn push_clamps_and_sets_facing() {
        let mut b = body_at(0, 0);
        (0..10).for_each(|_| b.left());
        assert_eq!(b.vel.x, -6.0);
        assert!(!b.facing_right);
        b.push_y(-100.0);
        assert_eq!(b.vel.y, -7.0);
    }

    #[test]
    fn friction_stops_at_zero() {
        let map = arena();
        let mut b = body_at(0, 32);
        b.vel.x = 0.25;
        b.apply_friction(&map);
        assert_eq!(b.vel.x, 0.0);
        b.vel.x = -2.0;
        b.apply_friction(&map);
        assert_eq!(b.vel.x, -1.5);
        b.flying = true;
        b.apply_friction(&map);
        assert_eq!(b.vel.x, -1.5);
    }

    #[test]
    fn ice_is_slippery() {
        let map = map_from(&["....", "....", "~~~~"]);
        // feet at 31, ice starts at 32
        let mut b = body_at(0, 0);
        assert!(b.on_ice(&map));
        b.vel.x = 2.0;
        b.apply_friction(&map);
        assert_eq!(b.vel.x, 1.75);
        b.vel.x = -1.0;
        b.apply_friction(&map);
        assert_eq!(b.vel.x, -0.75);
    }

    #[test]
    fn standing_on_floor() {
        let map = arena();
        // feet at y = 63, floor starts at 64
        let mut b = body_at(0, 32);
        assert!(b.on_ground(&map));
        b.apply_gravity();
        b.step(&map);
        assert_eq!(b.pos.y, 32);
        assert_eq!(b.vel.y, 0.0);
    }

    #[test]
    fn falls_until_landing() {
        let map = arena();
        let mut b = body_at(0, 0);
        for _ in 0..30 {
            b.apply_gravity();
            b.step(&map);
        }
        assert_eq!(b.pos.y, 32);
        assert!(b.on_ground(&map));
    }

    #[test]
    fn jump_only_from_ground() {
        let map = arena();
        let mut b = body_at(0, 32);
        b.jump(&map);
        assert_eq!(b.vel.y, -7.0);
        let mut air = body_at(0, 0);
        air.jump(&map);
        assert_eq!(air.vel.y, 0.0);
    }

    #[test]
    fn wall_blocks_and_zeroes_speed() {
        let map = arena();
        // wall at x = 128..144, hitbox right edge is x + 22
        let mut b = body_at(100, 32);
        b.vel.x = 6.0;
        let moved = b.step(&map);
        assert_eq!(moved, 5);
        assert_eq!(b.pos.x, 105);
        assert_eq!(b.vel.x, 0.0);
        assert_eq!(b.stance, 0);
    }

    #[test]
    fn top_solid_only_from_above() {
        let map = map_from(&["....", "....", "====", "....", "####"]);
        let mut b = body_at(0, 0);
        // feet at 31 land on the platform at y = 32
        b.vel.y = 1.0;
        assert!(b.is_colliding(&map, point2(0, 1)));
        b.vel.y = -1.0;
        assert!(!b.is_colliding(&map, point2(0, 1)));
    }

    #[test]
    fn stance_cycles_while_walking() {
        let map = arena();
        let mut b = body_at(0, 32);
        b.vel.x = 2.0;
        b.step(&map);
        assert_eq!(b.stance, 1);
        b.step(&map);
        assert_eq!(b.stance, 2);
        b.step(&map);
        assert_eq!(b.stance, 2);
    }

    #[test]
    fn stance_steps_back_in_second_half() {
        let map = arena();
        let mut b = body_at(0, 32);
        b.vel.x = 2.0;
        (0..7).for_each(|_| {
            b.step(&map);
        });
        assert_eq!((b.move_count, b.stance), (14, 2));
        let mut stances = vec![];
        for _ in 0..4 {
            b.step(&map);
            stances.push(b.stance);
        }
        // 16, 18, 20 (wraps below 0 to 1), 22
        assert_eq!(stances, vec![1, 0, 1, 0]);
        (0..5).for_each(|_| {
            b.step(&map);
        });
        assert_eq!(b.move_count, 0);
        assert_eq!(b.stance, 1);
    }

    #[test]
    fn air_stance_overrides() {
        let map = arena();
        let mut b = body_at(0, 0);
        b.air_stance = Some(2);
        b.air_resets_count = true;
        b.vel.x = 2.0;
        b.step(&map);
        assert_eq!(b.stance, 2);
        assert_eq!(b.move_count, 0);
    }

    #[test]
    fn air_stance_can_keep_the_count() {
        let map = arena();
        let mut b = body_at(0, 0);
        b.air_stance = Some(1);
        b.vel.x = 2.0;
        b.step(&map);
        assert_eq!(b.stance, 1);
        assert_eq!(b.move_count, 2);
    }

    #[test]
    fn ledge_detection() {
        let map = map_from(&["....", "....", "##..", "##.."]);
        let mut b = body_at(0, 0);
        b.facing_right = true;
        assert!(b.will_fall(&map));
        b.facing_right = false;
        assert!(!b.will_fall(&map));
    }

    #[test]
    fn hitbox_overlap_is_inclusive() {
        let a = body_at(0, 0);
        // a spans x 9..=22, b starts at 13 + 9 = 22
        let b = body_at(13, 0);
        assert!(a.overlaps(&b));
        let c = body_at(14, 0);
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn tiles_around_the_body() {
        let map = map_from(&["....", "..L.", "##D#", "####"]);
        let b = body_at(16, 0);
        assert_eq!(b.tile_behind(&map), map.tile_at(point2(32, 31)));
        assert_eq!(b.tile_below(&map), map.tile_at(point2(32, 33)));
        assert!(!b.on_ice(&map));
        let rules = rules();
        assert!(rules.is_climbable(b.tile_behind(&map)));
        assert!(rules.is_open_door(b.tile_below(&map)));
    }
}
