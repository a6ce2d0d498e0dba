use std::collections::HashMap;

use log::{debug, info, warn};
use macroquad::rand::gen_range;

use crate::config::GameConfig;
use crate::enemy::Archetype;
use crate::layouts::normal_layout_id;
use crate::loader;
use crate::room::{Direction, Room, RoomKind};
use crate::tilemap::{LoadedMap, MapError};

const MIN_ROOM_ENEMIES: usize = 3;
const MAX_ROOM_ENEMIES: usize = 6;

/// How a room slot's geometry was produced during initialization.
#[derive(Debug)]
pub enum MapOutcome {
    BuiltIn,
    Loaded,
    Fallback(MapError),
}

impl MapOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, MapOutcome::Fallback(_))
    }
}

/// Enemy archetypes eligible for the `index`-th normal room.
pub fn enemy_pool(index: usize) -> &'static [Archetype] {
    const POOL: [Archetype; 4] = [
        Archetype::Slime,
        Archetype::GreenSlime,
        Archetype::Dog,
        Archetype::Golem,
    ];
    match index {
        0..3 => &POOL[..1],
        3..6 => &POOL[..2],
        6..9 => &POOL[..3],
        _ => &POOL,
    }
}

/// Linear sequence of rooms with a current-room cursor.
pub struct RoomManager {
    rooms: Vec<Room>,
    current: usize,
}

impl RoomManager {
    pub fn new(rooms: Vec<Room>) -> Self {
        assert!(!rooms.is_empty(), "room manager needs at least one room");
        Self { rooms, current: 0 }
    }

    /// Builds the shop, normal and boss rooms. Slots with an entry in `maps` use
    /// it; the rest use the built-in layouts.
    pub fn from_template(config: &GameConfig, mut maps: HashMap<usize, LoadedMap>) -> Self {
        let size = config.room_size();
        let boss_index = config.boss_room_index();
        let mut rooms = Vec::with_capacity(config.room_count());

        for index in 0..config.room_count() {
            let (kind, layout_id) = match index {
                0 => (RoomKind::Shop, "shop".to_string()),
                i if i == boss_index => (RoomKind::Boss, "boss".to_string()),
                i => (RoomKind::Normal, normal_layout_id(i - 1)),
            };
            let mut room = match maps.remove(&index) {
                Some(map) => {
                    let seed = config.prop_seed ^ (index as u32).wrapping_mul(0x9E37_79B9);
                    Room::with_map(size, kind, Some(&layout_id), map, seed)
                }
                None => Room::new(size, config.tile_size, kind, Some(&layout_id)),
            };
            room.set_bullet_cap(config.bullet_cap);

            match kind {
                RoomKind::Normal => {
                    let count = gen_range(MIN_ROOM_ENEMIES, MAX_ROOM_ENEMIES + 1);
                    room.spawn_enemies(count, enemy_pool(index - 1));
                }
                RoomKind::Boss => room.spawn_enemies(1, &[Archetype::MushroomBoss]),
                RoomKind::Shop => {}
            }
            rooms.push(room);
        }

        for index in maps.keys() {
            warn!("map for room {index} ignored, template has {} rooms", config.room_count());
        }
        Self::new(rooms)
    }

    /// Loads every configured map from disk, then builds the template. A map that
    /// fails to load leaves its slot on the built-in layout.
    pub async fn initialize(config: &GameConfig) -> (Self, Vec<MapOutcome>) {
        Self::initialize_with(config, |path| async move { loader::load_map(&path).await }).await
    }

    /// Same as [`RoomManager::initialize`] with maps fetched through `fetch`.
    pub async fn initialize_with<F, Fut>(config: &GameConfig, fetch: F) -> (Self, Vec<MapOutcome>)
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<LoadedMap, MapError>>,
    {
        let mut outcomes: Vec<MapOutcome> = (0..config.room_count()).map(|_| MapOutcome::BuiltIn).collect();
        let mut maps = HashMap::new();

        for (&index, path) in &config.room_maps {
            if index >= config.room_count() {
                warn!("map {path} targets room {index}, template has {} rooms", config.room_count());
                continue;
            }
            match fetch(path.clone()).await {
                Ok(map) => {
                    info!("room {index} uses map {path}");
                    maps.insert(index, map);
                    outcomes[index] = MapOutcome::Loaded;
                }
                Err(err) => {
                    warn!("room {index} falls back to its built-in layout: {err}");
                    outcomes[index] = MapOutcome::Fallback(err);
                }
            }
        }

        (Self::from_template(config, maps), outcomes)
    }

    /// Right/down advance and left/up retreat; moves past either end are ignored.
    pub fn change_room(&mut self, direction: Direction) -> bool {
        let next = match direction {
            Direction::Right | Direction::Down if self.current + 1 < self.rooms.len() => self.current + 1,
            Direction::Left | Direction::Up if self.current > 0 => self.current - 1,
            _ => return false,
        };
        debug!("room {} -> {} via {:?}", self.current, next, direction);
        self.current = next;
        true
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_room(&self) -> &Room {
        &self.rooms[self.current]
    }

    pub fn current_room_mut(&mut self) -> &mut Room {
        &mut self.rooms[self.current]
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
