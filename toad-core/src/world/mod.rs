//! Level grid, bodies and the rules that tie them together.
//! Everything here is measured in pixels unless a type says otherwise.
use euclid::{Point2D, Rect, Vector2D};

pub mod character;
pub mod map;
pub mod physics;
pub mod platformer;

pub use self::character::{Npc, NpcKind, Player};
pub use self::map::TileMap;
pub use self::physics::Body;
pub use self::platformer::{GameEvent, Level, World};

pub struct PixelSpace;
pub type PixelPoint = Point2D<i32, PixelSpace>;
pub type PixelVector = Vector2D<i32, PixelSpace>;
pub type PixelRect = Rect<i32, PixelSpace>;
/// pixels per frame
pub type Velocity = Vector2D<f32, PixelSpace>;

pub struct TileSpace;
pub type TilePoint = Point2D<i32, TileSpace>;
