use std::collections::HashMap;

use log::{info, warn};
use macroquad::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::helpers::aabb_intersect;
use crate::room::{Direction, Door, Obstacle};

pub const DEFAULT_MAP_WIDTH: usize = 20;
pub const DEFAULT_MAP_HEIGHT: usize = 12;
pub const DEFAULT_TILE_SIZE: f32 = 64.0;
/// Base-layer tile id that stays walkable.
pub const FLOOR_TILE: u32 = 12;
const GID_FLAGS_MASK: u32 = 0x1FFF_FFFF;
const DOOR_EDGE_THRESHOLD: f32 = 50.0;
const DEFAULT_DOOR_OBJECT_SIZE: Vec2 = Vec2::new(64.0, 20.0);
/// Largest grid a room map may declare.
pub const MAX_MAP_CELLS: usize = 1 << 20;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("malformed map document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to load {path}: {message}")]
    File { path: String, message: String },
    #[error("invalid map dimensions {width}x{height} with tile size {tile_size}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        tile_size: f32,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct TiledMap {
    #[serde(default)]
    pub width: usize,
    #[serde(default)]
    pub height: usize,
    #[serde(default)]
    pub tilewidth: f32,
    pub layers: Vec<TiledLayer>,
    #[serde(default)]
    pub tilesets: Vec<TilesetRef>,
}

impl TiledMap {
    /// `source` paths of tilesets that live in their own files.
    pub fn external_tileset_sources(&self) -> impl Iterator<Item = &str> {
        self.tilesets.iter().filter_map(|t| t.source.as_deref())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum TiledLayer {
    #[serde(rename = "tilelayer")]
    Tiles(TileLayerData),
    #[serde(rename = "objectgroup")]
    Objects(ObjectGroupData),
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TileLayerData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: Vec<u32>,
    #[serde(default)]
    pub offsetx: f32,
    #[serde(default)]
    pub offsety: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ObjectGroupData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub objects: Vec<TiledObject>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TiledObject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub properties: Vec<TiledProperty>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TiledProperty {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TilesetRef {
    pub firstgid: u32,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(flatten)]
    pub inline: TilesetDef,
}

/// Tileset body, either embedded in the map or loaded from a `.tsj`/`.json` file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TilesetDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tilewidth: f32,
    #[serde(default)]
    pub tileheight: f32,
    #[serde(default)]
    pub columns: u32,
    #[serde(default)]
    pub tiles: Vec<TileDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TileDef {
    pub id: u32,
    #[serde(default)]
    pub objectgroup: Option<TileCollision>,
    #[serde(default)]
    pub animation: Vec<AnimationFrame>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TileCollision {
    #[serde(default)]
    pub objects: Vec<CollisionShape>,
}

/// Collision shape relative to the tile's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct CollisionShape {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub ellipse: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct AnimationFrame {
    pub tileid: u32,
    #[serde(default = "default_frame_duration")]
    pub duration: u32,
}

fn default_frame_duration() -> u32 {
    100
}

/// Tile id showing `elapsed_ms` into a looping animation.
pub fn animated_tile_id(frames: &[AnimationFrame], elapsed_ms: u64) -> Option<u32> {
    let total: u64 = frames.iter().map(|f| f.duration as u64).sum();
    if total == 0 {
        return frames.first().map(|f| f.tileid);
    }
    let mut t = elapsed_ms % total;
    for frame in frames {
        if t < frame.duration as u64 {
            return Some(frame.tileid);
        }
        t -= frame.duration as u64;
    }
    None
}

pub fn parse_map(json: &str) -> Result<TiledMap, MapError> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_tileset(json: &str) -> Result<TilesetDef, MapError> {
    Ok(serde_json::from_str(json)?)
}

#[derive(Clone, Debug)]
pub struct TilesetInfo {
    pub name: String,
    pub firstgid: u32,
    pub tile_size: Option<Vec2>,
    pub columns: u32,
    collisions: HashMap<u32, Vec<CollisionShape>>,
    animations: HashMap<u32, Vec<AnimationFrame>>,
}

impl TilesetInfo {
    fn from_def(firstgid: u32, def: &TilesetDef) -> Self {
        let mut collisions = HashMap::new();
        let mut animations = HashMap::new();
        for tile in &def.tiles {
            if let Some(group) = &tile.objectgroup {
                if !group.objects.is_empty() {
                    collisions.insert(tile.id, group.objects.clone());
                }
            }
            if !tile.animation.is_empty() {
                animations.insert(tile.id, tile.animation.clone());
            }
        }
        let tile_size = (def.tileheight > 0.0).then(|| {
            let width = if def.tilewidth > 0.0 { def.tilewidth } else { def.tileheight };
            vec2(width, def.tileheight)
        });
        Self {
            name: def.name.clone(),
            firstgid,
            tile_size,
            columns: def.columns.max(1),
            collisions,
            animations,
        }
    }

    /// Placeholder for a tileset whose definition could not be resolved; its
    /// tiles fall back to full-cell obstacles.
    fn unresolved(firstgid: u32, name: &str) -> Self {
        Self {
            name: name.to_string(),
            firstgid,
            tile_size: None,
            columns: 1,
            collisions: HashMap::new(),
            animations: HashMap::new(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TileLookup<'a> {
    pub local_id: u32,
    pub tileset: &'a TilesetInfo,
}

impl<'a> TileLookup<'a> {
    pub fn collision_shapes(&self) -> &'a [CollisionShape] {
        self.tileset
            .collisions
            .get(&self.local_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn animation(&self) -> Option<&'a [AnimationFrame]> {
        self.tileset.animations.get(&self.local_id).map(Vec::as_slice)
    }

    pub fn tile_size(&self) -> Option<Vec2> {
        self.tileset.tile_size
    }
}

/// Tilesets of one map, sorted by `firstgid`.
#[derive(Clone, Debug, Default)]
pub struct TilesetRegistry {
    tilesets: Vec<TilesetInfo>,
}

impl TilesetRegistry {
    /// `external` maps a tileset `source` path to its parsed definition.
    pub fn build(refs: &[TilesetRef], external: &HashMap<String, TilesetDef>) -> Self {
        let mut tilesets: Vec<TilesetInfo> = refs
            .iter()
            .map(|tileset_ref| match &tileset_ref.source {
                None => TilesetInfo::from_def(tileset_ref.firstgid, &tileset_ref.inline),
                Some(source) => match external.get(source) {
                    Some(def) => TilesetInfo::from_def(tileset_ref.firstgid, def),
                    None => {
                        warn!("tileset {source} unavailable, its tiles collide as full cells");
                        TilesetInfo::unresolved(tileset_ref.firstgid, source)
                    }
                },
            })
            .collect();
        tilesets.sort_by_key(|t| t.firstgid);
        Self { tilesets }
    }

    /// Resolves a global tile id to the tileset with the largest `firstgid <= gid`.
    pub fn lookup(&self, gid: u32) -> Option<TileLookup<'_>> {
        let gid = gid & GID_FLAGS_MASK;
        if gid == 0 {
            return None;
        }
        self.tilesets
            .iter()
            .rev()
            .find(|t| t.firstgid <= gid)
            .map(|tileset| TileLookup {
                local_id: gid - tileset.firstgid,
                tileset,
            })
    }

    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerRole {
    /// Walls and floor; border ring and floor tiles never collide.
    Base,
    /// Trees, rocks and other props; every tile collides.
    Objects,
    Decoration,
}

impl LayerRole {
    pub fn from_layer_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if name == "Tile Layer 1"
            || lower.contains("base")
            || (lower.contains("tile") && !lower.contains("object"))
        {
            LayerRole::Base
        } else if lower.contains("object") || lower.contains("obstacle") {
            LayerRole::Objects
        } else {
            LayerRole::Decoration
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    pub name: String,
    pub role: LayerRole,
    /// Row-major global ids with flip flags stripped; 0 is empty.
    pub gids: Vec<u32>,
    pub offset: Vec2,
}

/// A tile map reduced to per-layer grids, obstacle candidates and doors.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvertedMap {
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    pub layers: Vec<TileGrid>,
    /// Per cell, the topmost layer that made it an obstacle candidate.
    candidates: Vec<Option<usize>>,
    pub doors: Vec<Door>,
}

pub fn convert(map: &TiledMap) -> Result<ConvertedMap, MapError> {
    let width = if map.width == 0 { DEFAULT_MAP_WIDTH } else { map.width };
    let height = if map.height == 0 { DEFAULT_MAP_HEIGHT } else { map.height };
    let tile_size = if map.tilewidth == 0.0 { DEFAULT_TILE_SIZE } else { map.tilewidth };
    let cell_count = match width.checked_mul(height) {
        Some(count) if count <= MAX_MAP_CELLS && tile_size.is_finite() && tile_size > 0.0 => count,
        _ => {
            return Err(MapError::InvalidDimensions {
                width,
                height,
                tile_size,
            });
        }
    };
    let room_size = vec2(width as f32 * tile_size, height as f32 * tile_size);

    let mut layers = Vec::new();
    let mut candidates = vec![None; cell_count];
    let mut doors = Vec::new();

    for layer in &map.layers {
        match layer {
            TiledLayer::Tiles(data) => {
                let role = LayerRole::from_layer_name(&data.name);
                let layer_index = layers.len();
                let mut gids = vec![0; cell_count];
                for y in 0..height {
                    for x in 0..width {
                        let idx = y * width + x;
                        let gid = data.data.get(idx).copied().unwrap_or(0) & GID_FLAGS_MASK;
                        if gid == 0 {
                            continue;
                        }
                        gids[idx] = gid;
                        let on_border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                        let collides = match role {
                            LayerRole::Base => gid != FLOOR_TILE && !on_border,
                            LayerRole::Objects => true,
                            LayerRole::Decoration => false,
                        };
                        if collides {
                            candidates[idx] = Some(layer_index);
                        }
                    }
                }
                layers.push(TileGrid {
                    name: data.name.clone(),
                    role,
                    gids,
                    offset: vec2(data.offsetx, data.offsety),
                });
            }
            TiledLayer::Objects(group) => {
                for object in group.objects.iter().filter(|o| o.name.to_lowercase().contains("door")) {
                    match door_direction(object, room_size) {
                        Some(direction) => doors.push(door_from_object(object, direction)),
                        None => warn!(
                            "door object '{}' at ({}, {}) has no resolvable direction",
                            object.name, object.x, object.y
                        ),
                    }
                }
            }
            TiledLayer::Other => {}
        }
    }

    if doors.is_empty() {
        doors = Door::defaults(room_size, tile_size);
    }

    Ok(ConvertedMap {
        width,
        height,
        tile_size,
        layers,
        candidates,
        doors,
    })
}

fn door_direction(object: &TiledObject, room_size: Vec2) -> Option<Direction> {
    if object.y < DOOR_EDGE_THRESHOLD {
        return Some(Direction::Up);
    }
    if object.y > room_size.y - DOOR_EDGE_THRESHOLD {
        return Some(Direction::Down);
    }
    if object.x < DOOR_EDGE_THRESHOLD {
        return Some(Direction::Left);
    }
    if object.x > room_size.x - DOOR_EDGE_THRESHOLD {
        return Some(Direction::Right);
    }
    object
        .properties
        .iter()
        .find(|p| p.name == "direction" || p.name == "dir")
        .and_then(|p| p.value.as_str())
        .and_then(Direction::from_name)
}

fn door_from_object(object: &TiledObject, direction: Direction) -> Door {
    let width = if object.width > 0.0 { object.width } else { DEFAULT_DOOR_OBJECT_SIZE.x };
    let height = if object.height > 0.0 { object.height } else { DEFAULT_DOOR_OBJECT_SIZE.y };
    Door::new(Rect::new(object.x, object.y, width, height), direction)
}

impl ConvertedMap {
    pub fn cell_rect(&self, x: usize, y: usize) -> Rect {
        Rect::new(
            x as f32 * self.tile_size,
            y as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    pub fn is_candidate(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.candidates[y * self.width + x].is_some()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_some()).count()
    }

    fn overlaps_door(&self, rect: Rect) -> bool {
        self.doors.iter().any(|door| aabb_intersect(rect, door.rect))
    }

    /// Resolves candidate cells into obstacle geometry. Tiles with collision
    /// shapes in their tileset emit one obstacle per shape; others emit a
    /// full-cell rectangle. Nothing overlapping a door is emitted.
    pub fn obstacles(&self, tilesets: &TilesetRegistry) -> Vec<Obstacle> {
        let mut obstacles = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let Some(layer_index) = self.candidates[idx] else {
                    continue;
                };
                let cell = self.cell_rect(x, y);
                if self.overlaps_door(cell) {
                    continue;
                }

                let layer = &self.layers[layer_index];
                let lookup = tilesets.lookup(layer.gids[idx]);
                let shapes = lookup.map(|l| l.collision_shapes()).unwrap_or(&[]);
                if shapes.is_empty() {
                    obstacles.push(Obstacle::rect(cell));
                    continue;
                }

                let mut origin = cell.point();
                if layer.role == LayerRole::Objects {
                    if let Some(size) = lookup.and_then(|l| l.tile_size()) {
                        if size.y > self.tile_size {
                            origin.y -= size.y - self.tile_size;
                        }
                    }
                }
                for shape in shapes {
                    // Point and line objects cover no area.
                    if shape.width <= 0.0 || shape.height <= 0.0 {
                        continue;
                    }
                    let rect = Rect::new(origin.x + shape.x, origin.y + shape.y, shape.width, shape.height);
                    if self.overlaps_door(rect) {
                        continue;
                    }
                    obstacles.push(Obstacle {
                        rect,
                        is_ellipse: shape.ellipse,
                    });
                }
            }
        }
        obstacles
    }

    /// Non-empty global ids of the first objects layer, in row-major order.
    pub fn objects_layer_gids(&self) -> impl Iterator<Item = u32> + '_ {
        self.layers
            .iter()
            .find(|l| l.role == LayerRole::Objects)
            .into_iter()
            .flat_map(|l| l.gids.iter().copied())
            .filter(|&gid| gid != 0)
    }
}

/// A converted map together with the tileset metadata it was resolved against.
#[derive(Clone, Debug)]
pub struct LoadedMap {
    pub map: ConvertedMap,
    pub tilesets: TilesetRegistry,
}

impl LoadedMap {
    pub fn from_document(
        document: &TiledMap,
        external: &HashMap<String, TilesetDef>,
    ) -> Result<Self, MapError> {
        let map = convert(document)?;
        let tilesets = TilesetRegistry::build(&document.tilesets, external);
        info!(
            "converted map {}x{} tiles: {} layers, {} obstacle cells, {} doors, {} tilesets",
            map.width,
            map.height,
            map.layers.len(),
            map.candidate_count(),
            map.doors.len(),
            tilesets.len()
        );
        Ok(Self { map, tilesets })
    }

    /// Parses and converts a map whose tilesets are all embedded or supplied
    /// in `external`.
    pub fn from_json_str(
        json: &str,
        external: &HashMap<String, TilesetDef>,
    ) -> Result<Self, MapError> {
        Self::from_document(&parse_map(json)?, external)
    }

    pub fn obstacles(&self) -> Vec<Obstacle> {
        self.map.obstacles(&self.tilesets)
    }
}
