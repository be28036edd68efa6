//! The player and the enemies.
use euclid::vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::slice;

use super::physics::{Body, CHARA_SIZE};
use super::{PixelPoint, TileMap};
use crate::input::Controls;
use crate::tileset::TileId;

pub const PLAYER_MAX_SPEED_X: f32 = 6.0;
pub const PLAYER_MAX_SPEED_Y: f32 = 7.0;
pub const PLAYER_ACCELERATION: f32 = 1.0;
pub const PLAYER_CLIMBING_RATE: f32 = 2.0;
pub const PLAYER_WIDTH_OFFSET: i32 = 9;
pub const PLAYER_HEIGHT_OFFSET_BIG: i32 = 6;
pub const PLAYER_HEIGHT_OFFSET_SMALL: i32 = 13;
pub const PLAYER_STANCES: i32 = 3;
pub const PLAYER_JUMPING_STANCE: i32 = 2;
/// frames of invincibility after taking damage
pub const INVINCIBILITY_AFTER_DAMAGE: u32 = 150;

pub const NPC_MAX_SPEED_X: f32 = 0.5;
pub const NPC_MAX_SPEED_Y: f32 = 7.0;
pub const NPC_ACCELERATION: f32 = 0.5;
pub const NPC_WIDTH_OFFSET: i32 = 10;
pub const NPC_HEIGHT_OFFSET: i32 = 13;
pub const NPC_STANCES: i32 = 2;
pub const NINJI_JUMPING_STANCE: i32 = 1;

/// Player sprites in the character tileset.
pub mod tiles {
    use crate::tileset::TileId;
    pub const FIRST_BIG: TileId = 0;
    pub const FIRST_SMALL: TileId = 10;
    pub const CLIMBING_BIG: TileId = 6;
    pub const CLIMBING_SMALL: TileId = 16;
    pub const CROUCHING_BIG: TileId = 8;
    pub const CROUCHING_SMALL: TileId = 18;
    pub const VICTORY_BIG: TileId = 9;
    /// facing right, the next one faces left
    pub const VICTORY_SMALL: TileId = 20;
    pub const DEAD: TileId = 19;
}

/// Anything drawn from the character tileset.
pub trait Character {
    fn body(&self) -> &Body;
    /// current sprite
    fn tile(&self) -> TileId;
}

/// Sprite of a walking character: right-facing stances come first, then the
/// left-facing ones.
fn stance_tile(first: TileId, body: &Body) -> TileId {
    let stances = body.stances.max(0);
    let offset = if body.facing_right {
        body.stance
    } else {
        stances + body.stance
    };
    first + offset.max(0) as TileId
}

pub struct Player {
    body: Body,
    big: bool,
    invincibility: u32,
    dying: bool,
}

impl Player {
    pub fn new(pos: PixelPoint) -> Player {
        let mut body = Body::new(
            pos,
            vec2(PLAYER_MAX_SPEED_X, PLAYER_MAX_SPEED_Y),
            PLAYER_ACCELERATION,
        );
        body.width_offset = PLAYER_WIDTH_OFFSET;
        body.stances = PLAYER_STANCES;
        body.air_stance = Some(PLAYER_JUMPING_STANCE);
        body.air_resets_count = true;
        let mut player = Player {
            body,
            big: true,
            invincibility: 0,
            dying: false,
        };
        player.grow();
        player
    }

    pub fn is_big(&self) -> bool {
        self.big
    }
    pub fn grow(&mut self) {
        self.big = true;
        self.body.height_offset = PLAYER_HEIGHT_OFFSET_BIG;
    }
    pub fn shrink(&mut self) {
        self.big = false;
        self.body.height_offset = PLAYER_HEIGHT_OFFSET_SMALL;
    }
    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0
    }
    pub fn is_dying(&self) -> bool {
        self.dying
    }
    pub fn take_damage(&mut self) {
        if self.is_invincible() || self.dying {
            return;
        }
        if self.big {
            debug!("player hit, shrinking");
            self.shrink();
            self.invincibility = INVINCIBILITY_AFTER_DAMAGE;
        } else {
            self.die();
        }
    }
    pub fn die(&mut self) {
        if !self.dying {
            info!("player died at {:?}", self.body.pos);
            self.dying = true;
        }
    }
    /// Back to the level start, big and facing right.
    pub fn respawn(&mut self, start: PixelPoint) {
        self.grow();
        self.dying = false;
        let body = &mut self.body;
        body.facing_right = true;
        body.pos = start;
        body.vel = vec2(0.0, 0.0);
        body.climbing = false;
        body.crouching = false;
        body.stance = 0;
        body.move_count = 0;
    }

    pub fn can_climb(&self, map: &TileMap) -> bool {
        map.rules().is_climbable(self.body.tile_behind(map))
    }
    fn climb(&mut self, direction: f32) {
        if !self.body.climbing {
            self.body.climbing = true;
            self.body.vel = vec2(0.0, 0.0);
        }
        self.body.vel.y = PLAYER_CLIMBING_RATE * direction;
    }

    /// One frame of player logic.
    pub fn update(&mut self, map: &TileMap, controls: &Controls) {
        let rules = map.rules();
        if rules.is_spike(self.body.tile_below(map)) {
            self.take_damage();
        } else if self.body.is_below(map) {
            self.die();
        }
        if self.dying {
            return;
        }
        self.invincibility = self.invincibility.saturating_sub(1);
        if self.body.crouching && !controls.down {
            self.body.crouching = false;
        }
        if self.body.climbing {
            if self.can_climb(map) {
                self.body.vel.y = 0.0;
            } else {
                self.body.climbing = false;
            }
        }
        self.body.apply_friction(map);
        if controls.left {
            self.body.left();
        }
        if controls.right {
            self.body.right();
        }
        self.body.apply_gravity();
        if controls.jump {
            self.body.jump(map);
        }
        if controls.up && self.can_climb(map) {
            self.climb(-1.0);
        } else if controls.down && self.can_climb(map) {
            self.climb(1.0);
        }
        if controls.down && !self.body.climbing {
            self.body.crouching = true;
        }
        self.body.step(map);
    }

    pub fn victory_tile(&self) -> TileId {
        if self.big {
            tiles::VICTORY_BIG
        } else if self.body.facing_right {
            tiles::VICTORY_SMALL
        } else {
            tiles::VICTORY_SMALL + 1
        }
    }
}

impl Character for Player {
    fn body(&self) -> &Body {
        &self.body
    }
    fn tile(&self) -> TileId {
        let pick = |big, small| if self.big { big } else { small };
        if self.body.crouching {
            pick(tiles::CROUCHING_BIG, tiles::CROUCHING_SMALL)
        } else if self.body.climbing {
            pick(tiles::CLIMBING_BIG, tiles::CLIMBING_SMALL) + (self.body.move_count % 2) as TileId
        } else {
            stance_tile(pick(tiles::FIRST_BIG, tiles::FIRST_SMALL), &self.body)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcKind {
    ShyGuyRed,
    ShyGuyBlue,
    Ninji,
    Flurry,
    Spark,
    Porcupo,
    Albatoss,
    Pokey,
    Phanto,
}

impl NpcKind {
    pub fn variants() -> slice::Iter<'static, NpcKind> {
        use self::NpcKind::*;
        const VARIANTS: &[NpcKind] = &[
            ShyGuyRed, ShyGuyBlue, Ninji, Flurry, Spark, Porcupo, Albatoss, Pokey, Phanto,
        ];
        VARIANTS.iter()
    }
    pub fn first_tile(self) -> TileId {
        use self::NpcKind::*;
        match self {
            ShyGuyRed => 22,
            ShyGuyBlue => 26,
            Ninji => 30,
            Flurry => 34,
            Spark => 38,
            Porcupo => 41,
            Albatoss => 45,
            Pokey => 57,
            Phanto => 61,
        }
    }
    pub fn stances(self) -> i32 {
        match self {
            NpcKind::Spark => 3,
            NpcKind::Albatoss => 6,
            NpcKind::Phanto => 0,
            _ => NPC_STANCES,
        }
    }
    pub fn flies(self) -> bool {
        match self {
            NpcKind::Spark | NpcKind::Albatoss | NpcKind::Phanto => true,
            _ => false,
        }
    }
    /// one-letter marker for level previews
    pub fn marker(self) -> char {
        use self::NpcKind::*;
        match self {
            ShyGuyRed => 'r',
            ShyGuyBlue => 'b',
            Ninji => 'n',
            Flurry => 'f',
            Spark => 's',
            Porcupo => 'p',
            Albatoss => 'a',
            Pokey => 'k',
            Phanto => 'h',
        }
    }
}

impl fmt::Display for NpcKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::NpcKind::*;
        let name = match self {
            ShyGuyRed => "Shy Guy (red)",
            ShyGuyBlue => "Shy Guy (blue)",
            Ninji => "Ninji",
            Flurry => "Flurry",
            Spark => "Spark",
            Porcupo => "Porcupo",
            Albatoss => "Albatoss",
            Pokey => "Pokey",
            Phanto => "Phanto",
        };
        write!(f, "{}", name)
    }
}

pub struct Npc {
    kind: NpcKind,
    body: Body,
}

impl Npc {
    pub fn new(kind: NpcKind, pos: PixelPoint) -> Npc {
        let mut body = Body::new(pos, vec2(NPC_MAX_SPEED_X, NPC_MAX_SPEED_Y), NPC_ACCELERATION);
        body.width_offset = NPC_WIDTH_OFFSET;
        body.height_offset = NPC_HEIGHT_OFFSET;
        body.stances = kind.stances();
        body.flying = kind.flies();
        body.facing_right = false;
        if kind == NpcKind::Ninji {
            body.air_stance = Some(NINJI_JUMPING_STANCE);
        }
        Npc { kind, body }
    }
    pub fn kind(&self) -> NpcKind {
        self.kind
    }

    fn should_turn(&self, map: &TileMap) -> bool {
        let b = &self.body;
        let (map_w, _) = map.pixel_size();
        let size = CHARA_SIZE;
        let blocked = if b.facing_right {
            b.is_colliding(map, b.pos + vec2(size - b.width_offset * 3, 0))
        } else {
            b.is_colliding(map, b.pos + vec2(-1, 0))
        };
        let at_edge = b.flying
            && if b.facing_right {
                b.pos.x + size - b.width_offset * 2 >= map_w
            } else {
                b.pos.x - 1 <= 0
            };
        let ledge = self.kind == NpcKind::ShyGuyBlue && b.will_fall(map);
        blocked || at_edge || ledge
    }

    /// One frame of enemy logic: patrol, turning at walls, map edges (flyers)
    /// and ledges (blue Shy Guys).
    pub fn update(&mut self, map: &TileMap) {
        if self.should_turn(map) {
            self.body.facing_right = !self.body.facing_right;
            self.body.vel.x *= -1.0;
        }
        self.body.apply_friction(map);
        if self.body.facing_right {
            self.body.right();
        } else {
            self.body.left();
        }
        self.body.apply_gravity();
        if self.kind == NpcKind::Ninji {
            self.body.jump(map);
        }
        self.body.step(map);
    }
}

impl Character for Npc {
    fn body(&self) -> &Body {
        &self.body
    }
    fn tile(&self) -> TileId {
        stance_tile(self.kind.first_tile(), &self.body)
    }
}
