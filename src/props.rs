use macroquad::prelude::*;

use crate::helpers::{aabb_intersect, hash_unit, padded_rect};
use crate::tilemap::LoadedMap;

pub const TREE_COUNT: usize = 20;
pub const STONE_COUNT: usize = 30;
pub const PROP_SPACING: f32 = 20.0;
pub const PLACEMENT_ATTEMPTS: u32 = 50;
pub const BAND_MIN: f32 = 100.0;
pub const BAND_MAX: f32 = 400.0;
const DEFAULT_TREE_SIZE: Vec2 = Vec2::new(192.0, 256.0);
const DEFAULT_STONE_SIZE: Vec2 = Vec2::new(64.0, 64.0);
const SMALL_TILE_HEIGHT: f32 = 64.0;
/// Slack beyond the room corners along each edge.
const EDGE_OVERHANG: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropKind {
    Tree,
    Stone,
}

/// Decorative tile placed outside the room; never collides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prop {
    pub kind: PropKind,
    pub gid: u32,
    pub rect: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropTile {
    pub gid: u32,
    pub size: Vec2,
}

/// First tall and first small tile found on the map's objects layer.
pub fn pick_prop_tiles(loaded: &LoadedMap) -> (Option<PropTile>, Option<PropTile>) {
    let mut tree = None;
    let mut stone = None;
    for gid in loaded.map.objects_layer_gids() {
        let Some(size) = loaded.tilesets.lookup(gid).and_then(|t| t.tile_size()) else {
            continue;
        };
        if size.y > SMALL_TILE_HEIGHT {
            if tree.is_none() {
                tree = Some(PropTile { gid, size });
            }
        } else if stone.is_none() {
            stone = Some(PropTile { gid, size });
        }
        if tree.is_some() && stone.is_some() {
            break;
        }
    }
    (tree, stone)
}

/// Scatters trees then stones in a band outside the room rectangle. A prop with
/// no free spot after the attempt budget is skipped.
pub fn scatter_props(
    room_size: Vec2,
    tree: Option<PropTile>,
    stone: Option<PropTile>,
    seed: u32,
) -> Vec<Prop> {
    let mut props = Vec::new();
    let mut placed: Vec<Rect> = Vec::new();
    let batches = [
        (PropKind::Tree, tree, TREE_COUNT, DEFAULT_TREE_SIZE),
        (PropKind::Stone, stone, STONE_COUNT, DEFAULT_STONE_SIZE),
    ];

    for (kind_index, (kind, tile, count, default_size)) in batches.into_iter().enumerate() {
        let Some(tile) = tile else {
            continue;
        };
        let size = vec2(
            if tile.size.x > 0.0 { tile.size.x } else { default_size.x },
            if tile.size.y > 0.0 { tile.size.y } else { default_size.y },
        );
        let kind_seed = seed ^ (kind_index as u32 + 1).wrapping_mul(0x27D4_EB2F);

        for i in 0..count as u32 {
            for attempt in 0..PLACEMENT_ATTEMPTS {
                let rect = band_position(room_size, size, i, attempt, kind_seed);
                let padded = padded_rect(rect, PROP_SPACING);
                if placed.iter().any(|other| aabb_intersect(padded, *other)) {
                    continue;
                }
                placed.push(rect);
                props.push(Prop {
                    kind,
                    gid: tile.gid,
                    rect,
                });
                break;
            }
        }
    }
    props
}

fn band_position(room_size: Vec2, size: Vec2, index: u32, attempt: u32, seed: u32) -> Rect {
    let roll = |channel: u32| hash_unit(index, attempt * 3 + channel, seed);
    let side = (roll(0) * 4.0) as u32;
    let gap = BAND_MIN + roll(1) * (BAND_MAX - BAND_MIN);
    let along = roll(2);
    let along_x = -EDGE_OVERHANG + along * (room_size.x + EDGE_OVERHANG * 2.0);
    let along_y = -EDGE_OVERHANG + along * (room_size.y + EDGE_OVERHANG * 2.0);
    let (x, y) = match side {
        0 => (-gap - size.x, along_y),
        1 => (room_size.x + gap, along_y),
        2 => (along_x, -gap - size.y),
        _ => (along_x, room_size.y + gap),
    };
    Rect::new(x, y, size.x, size.y)
}
