use log::{debug, info, warn};
use macroquad::prelude::*;
use macroquad::rand::gen_range;

use crate::bullet::Bullet;
use crate::enemy::{Archetype, Enemy, EnemyContext};
use crate::helpers::{
    Circle, aabb_intersect, circle_circle_intersect, circle_rect_intersect, push_out_of_circle,
    rect_center, resolve_rect_overlap,
};
use crate::layouts;
use crate::player::{InputSnapshot, Player};
use crate::props::{self, Prop};
use crate::tilemap::LoadedMap;

pub const DOOR_THICKNESS: f32 = 20.0;
const SPAWN_MARGIN: i32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoomKind {
    Normal,
    Boss,
    Shop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Door {
    pub rect: Rect,
    pub direction: Direction,
}

impl Door {
    pub fn new(rect: Rect, direction: Direction) -> Self {
        Self { rect, direction }
    }

    /// One tile-wide door centered on each edge, snapped to the tile grid.
    pub fn defaults(room_size: Vec2, tile_size: f32) -> Vec<Door> {
        let center_x = (room_size.x / 2.0 / tile_size).floor() * tile_size;
        let center_y = (room_size.y / 2.0 / tile_size).floor() * tile_size;
        let half = tile_size / 2.0;
        vec![
            Door::new(
                Rect::new(center_x - half, 0.0, tile_size, DOOR_THICKNESS),
                Direction::Up,
            ),
            Door::new(
                Rect::new(center_x - half, room_size.y - DOOR_THICKNESS, tile_size, DOOR_THICKNESS),
                Direction::Down,
            ),
            Door::new(
                Rect::new(0.0, center_y - half, DOOR_THICKNESS, tile_size),
                Direction::Left,
            ),
            Door::new(
                Rect::new(room_size.x - DOOR_THICKNESS, center_y - half, DOOR_THICKNESS, tile_size),
                Direction::Right,
            ),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub rect: Rect,
    pub is_ellipse: bool,
}

impl Obstacle {
    pub fn rect(rect: Rect) -> Self {
        Self {
            rect,
            is_ellipse: false,
        }
    }

    /// Ellipse obstacles collide as the circle inscribed in their rect.
    pub fn bounding_circle(&self) -> Circle {
        Circle::new(rect_center(self.rect), self.rect.w.min(self.rect.h) / 2.0)
    }
}

pub struct Room {
    size: Vec2,
    kind: RoomKind,
    layout_id: Option<String>,
    enemies: Vec<Enemy>,
    bullets: Vec<Bullet>,
    obstacles: Vec<Obstacle>,
    doors: Vec<Door>,
    cleared: bool,
    locked: bool,
    boss_defeated: bool,
    pub shop_opened: bool,
    boss_initial_health: Option<f32>,
    props: Vec<Prop>,
    tile_map: Option<LoadedMap>,
    bullet_cap: Option<usize>,
}

impl Room {
    /// Builds a room from the built-in layout catalogue.
    pub fn new(size: Vec2, tile_size: f32, kind: RoomKind, layout_id: Option<&str>) -> Self {
        let mut room = Self::empty(size, kind, layout_id);
        let resolved = match resolve_layout(kind, layout_id) {
            Some((id, rects)) => {
                room.obstacles = rects.into_iter().map(Obstacle::rect).collect();
                id
            }
            None => {
                room.obstacles = random_obstacles(size);
                "random"
            }
        };
        room.doors = Door::defaults(size, tile_size);
        info!(
            "built {:?} room ({}): {} obstacles, {} doors",
            kind,
            resolved,
            room.obstacles.len(),
            room.doors.len()
        );
        room
    }

    /// Builds a room from a converted tile map, with perimeter props seeded by `prop_seed`.
    pub fn with_map(
        size: Vec2,
        kind: RoomKind,
        layout_id: Option<&str>,
        map: LoadedMap,
        prop_seed: u32,
    ) -> Self {
        let mut room = Self::empty(size, kind, layout_id);
        room.doors = map.map.doors.clone();
        room.obstacles = map.obstacles();
        let (tree, stone) = props::pick_prop_tiles(&map);
        room.props = props::scatter_props(size, tree, stone, prop_seed);
        info!(
            "built {:?} room from tile map: {} obstacles, {} doors, {} props",
            kind,
            room.obstacles.len(),
            room.doors.len(),
            room.props.len()
        );
        room.tile_map = Some(map);
        room
    }

    fn empty(size: Vec2, kind: RoomKind, layout_id: Option<&str>) -> Self {
        Self {
            size,
            kind,
            layout_id: layout_id.map(str::to_string),
            enemies: Vec::new(),
            bullets: Vec::new(),
            obstacles: Vec::new(),
            doors: Vec::new(),
            cleared: false,
            locked: kind == RoomKind::Boss,
            boss_defeated: false,
            shop_opened: false,
            boss_initial_health: None,
            props: Vec::new(),
            tile_map: None,
            bullet_cap: None,
        }
    }

    pub fn set_bullet_cap(&mut self, cap: Option<usize>) {
        self.bullet_cap = cap;
    }

    /// Spawns `count` enemies at random interior positions, each drawn from `types`.
    pub fn spawn_enemies(&mut self, count: usize, types: &[Archetype]) {
        if types.is_empty() {
            return;
        }
        let max_x = (self.size.x as i32 - SPAWN_MARGIN).max(SPAWN_MARGIN);
        let max_y = (self.size.y as i32 - SPAWN_MARGIN).max(SPAWN_MARGIN);
        for _ in 0..count {
            let archetype = types[gen_range(0, types.len())];
            let pos = vec2(
                gen_range(SPAWN_MARGIN, max_x + 1) as f32,
                gen_range(SPAWN_MARGIN, max_y + 1) as f32,
            );
            self.spawn_enemy(Enemy::new(pos, archetype));
        }
    }

    pub fn spawn_enemy(&mut self, enemy: Enemy) {
        if enemy.is_boss() {
            self.boss_initial_health = Some(enemy.max_health());
        }
        self.enemies.push(enemy);
    }

    /// Runs the player's actions against this room's enemies and queues any javelin.
    pub fn update_player(&mut self, player: &mut Player, dt: f32, input: &InputSnapshot) {
        let mut spawns = Vec::new();
        player.update(dt, input, &mut self.enemies, &mut spawns);
        self.push_bullets(spawns);
    }

    /// Advances enemies then bullets, compacts spent bullets and re-evaluates the
    /// clear state and boss health.
    pub fn update(&mut self, dt: f32, player: &mut Player) {
        let mut ctx = EnemyContext::new(player.position(), self.size);
        for enemy in self.enemies.iter_mut().filter(|e| e.is_active()) {
            enemy.update(dt, &mut ctx);
        }
        for event in ctx.damage_events.drain(..) {
            player.take_damage(event.amount);
        }
        self.push_bullets(ctx.spawns);

        for bullet in self.bullets.iter_mut() {
            bullet.advance(dt);
        }
        self.bullets.retain(Bullet::is_active);

        self.refresh_clear_state();
        self.restore_boss_health(player.position());
    }

    fn push_bullets(&mut self, spawns: Vec<Bullet>) {
        match self.bullet_cap {
            Some(cap) => {
                let room = cap.saturating_sub(self.bullets.len());
                self.bullets.extend(spawns.into_iter().take(room));
            }
            None => self.bullets.extend(spawns),
        }
    }

    fn refresh_clear_state(&mut self) {
        if self.kind == RoomKind::Shop || self.cleared {
            return;
        }
        if self.enemies.iter().any(Enemy::is_active) {
            return;
        }
        self.cleared = true;
        self.locked = false;
        if self.kind == RoomKind::Boss {
            self.boss_defeated = true;
        }
        debug!("{:?} room cleared", self.kind);
    }

    fn restore_boss_health(&mut self, player_pos: Vec2) {
        if self.kind != RoomKind::Boss || self.boss_defeated {
            return;
        }
        let Some(initial) = self.boss_initial_health else {
            return;
        };
        if self.contains_point(player_pos) {
            return;
        }
        if let Some(boss) = self.enemies.iter_mut().find(|e| e.is_boss()) {
            if boss.health() < initial {
                boss.restore_health(initial);
                debug!("boss health reset to {initial}");
            }
        }
    }

    /// Strictly inside the room rectangle.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x > 0.0 && point.x < self.size.x && point.y > 0.0 && point.y < self.size.y
    }

    /// Resolves player against obstacles, enemies and enemy bullets, then player
    /// bullets against enemies. Each step sees the position left by the one before.
    pub fn check_collisions(&mut self, player: &mut Player) {
        let half = player.half_extent();

        for obstacle in &self.obstacles {
            let pos = player.position();
            if obstacle.is_ellipse {
                let circle = obstacle.bounding_circle();
                if circle_rect_intersect(circle, player.collision_rect()) {
                    player.set_position(push_out_of_circle(pos, half.x, circle));
                }
            } else {
                player.set_position(resolve_rect_overlap(pos, player.size(), obstacle.rect));
            }
        }

        for enemy in self.enemies.iter().filter(|e| e.is_active()) {
            let circle = enemy.collision_shape();
            if circle_rect_intersect(circle, player.collision_rect()) {
                player.set_position(push_out_of_circle(player.position(), half.x, circle));
            }
        }

        for bullet in self.bullets.iter_mut() {
            if !bullet.is_active() || bullet.is_player_owned() {
                continue;
            }
            if circle_rect_intersect(bullet.collision_shape(), player.collision_rect()) {
                player.take_damage(bullet.damage());
                bullet.deactivate();
            }
        }

        for bullet in self.bullets.iter_mut() {
            if !bullet.is_active() || !bullet.is_player_owned() {
                continue;
            }
            let hit = self
                .enemies
                .iter_mut()
                .filter(|e| e.is_active())
                .find(|e| circle_circle_intersect(e.collision_shape(), bullet.collision_shape()));
            if let Some(enemy) = hit {
                enemy.take_damage(bullet.damage());
                bullet.deactivate();
            }
        }
    }

    /// Direction of the first door the player overlaps.
    pub fn check_door_collision(&self, player: &Player) -> Option<Direction> {
        let rect = player.collision_rect();
        self.doors
            .iter()
            .find(|door| aabb_intersect(rect, door.rect))
            .map(|door| door.direction)
    }

    pub fn door(&self, direction: Direction) -> Option<&Door> {
        self.doors.iter().find(|d| d.direction == direction)
    }

    /// Pays out gold for every dead enemy not yet rewarded.
    pub fn collect_gold(&mut self) -> u32 {
        self.enemies
            .iter_mut()
            .filter_map(Enemy::award_gold)
            .sum()
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    pub fn layout_id(&self) -> Option<&str> {
        self.layout_id.as_deref()
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    pub fn tile_map(&self) -> Option<&LoadedMap> {
        self.tile_map.as_ref()
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_boss_defeated(&self) -> bool {
        self.boss_defeated
    }

    pub fn boss_initial_health(&self) -> Option<f32> {
        self.boss_initial_health
    }

    pub fn active_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_active()).count()
    }
}

/// Catalogue entry a room is built from: the requested id when it exists, else
/// the kind's own layout. Normal rooms have none to fall back on.
fn resolve_layout(kind: RoomKind, layout_id: Option<&str>) -> Option<(&str, Vec<Rect>)> {
    if let Some(id) = layout_id {
        match layouts::layout(id) {
            Some(rects) => return Some((id, rects)),
            None => warn!("unknown room layout '{id}'"),
        }
    }
    let fallback = match kind {
        RoomKind::Boss => "boss",
        RoomKind::Shop => "shop",
        RoomKind::Normal => return None,
    };
    layouts::layout(fallback).map(|rects| (fallback, rects))
}

fn random_obstacles(size: Vec2) -> Vec<Obstacle> {
    let max_x = (size.x as i32 - SPAWN_MARGIN).max(SPAWN_MARGIN);
    let max_y = (size.y as i32 - SPAWN_MARGIN).max(SPAWN_MARGIN);
    let count = gen_range(3, 7);
    (0..count)
        .map(|_| {
            let side = gen_range(30, 61) as f32;
            Obstacle::rect(Rect::new(
                gen_range(SPAWN_MARGIN, max_x + 1) as f32,
                gen_range(SPAWN_MARGIN, max_y + 1) as f32,
                side,
                side,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bullet::Bullet;
    use pretty_assertions::assert_eq;

    const SIZE: Vec2 = Vec2::new(1280.0, 768.0);

    fn bare_room(kind: RoomKind) -> Room {
        let mut room = Room::new(SIZE, 64.0, kind, Some("shop"));
        room.obstacles.clear();
        room
    }

    #[test]
    fn layout_resolution_names_the_layout_used() {
        fn id(kind: RoomKind, requested: Option<&'static str>) -> Option<&'static str> {
            resolve_layout(kind, requested).map(|(id, _)| id)
        }
        assert_eq!(id(RoomKind::Shop, None), Some("shop"));
        assert_eq!(id(RoomKind::Boss, Some("missing")), Some("boss"));
        assert_eq!(id(RoomKind::Normal, Some("normal_4")), Some("normal_4"));
        assert_eq!(id(RoomKind::Normal, Some("missing")), None);
        assert_eq!(id(RoomKind::Normal, None), None);

        let (_, boss) = resolve_layout(RoomKind::Boss, None).unwrap();
        assert_eq!(Room::new(SIZE, 64.0, RoomKind::Boss, None).obstacles().len(), boss.len());
    }

    #[test]
    fn default_doors_center_on_tile_grid() {
        let doors = Door::defaults(SIZE, 64.0);
        assert_eq!(
            doors.iter().map(|d| (d.direction, d.rect)).collect::<Vec<_>>(),
            vec![
                (Direction::Up, Rect::new(608.0, 0.0, 64.0, 20.0)),
                (Direction::Down, Rect::new(608.0, 748.0, 64.0, 20.0)),
                (Direction::Left, Rect::new(0.0, 352.0, 20.0, 64.0)),
                (Direction::Right, Rect::new(1260.0, 352.0, 20.0, 64.0)),
            ]
        );
    }

    #[test]
    fn direction_names_and_opposites() {
        assert_eq!(Direction::from_name(" Right "), Some(Direction::Right));
        assert_eq!(Direction::from_name("north"), None);
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
    }

    #[test]
    fn catalogue_layouts_and_locks() {
        let normal = Room::new(SIZE, 64.0, RoomKind::Normal, Some("normal_3"));
        assert_eq!(normal.obstacles().len(), 4);
        assert!(!normal.is_locked());
        let boss = Room::new(SIZE, 64.0, RoomKind::Boss, Some("boss"));
        assert!(boss.is_locked());
        assert_eq!(boss.doors().len(), 4);
        let shop = Room::new(SIZE, 64.0, RoomKind::Shop, None);
        assert_eq!(shop.obstacles().len(), 4);
    }

    #[test]
    fn unknown_normal_layout_scatters_squares() {
        let room = Room::new(SIZE, 64.0, RoomKind::Normal, Some("nowhere"));
        assert!((3..=6).contains(&room.obstacles().len()));
        for obstacle in room.obstacles() {
            assert_eq!(obstacle.rect.w, obstacle.rect.h);
            assert!((30.0..=60.0).contains(&obstacle.rect.w));
            assert!(obstacle.rect.x >= 100.0 && obstacle.rect.x <= 1180.0);
        }
    }

    #[test]
    fn ellipse_bounding_circle_uses_short_side() {
        let obstacle = Obstacle {
            rect: Rect::new(0.0, 0.0, 40.0, 60.0),
            is_ellipse: true,
        };
        assert_eq!(obstacle.bounding_circle(), Circle::new(vec2(20.0, 30.0), 20.0));
    }

    #[test]
    fn rect_obstacle_pushes_on_shallow_axis() {
        let mut room = bare_room(RoomKind::Normal);
        room.obstacles.push(Obstacle::rect(Rect::new(100.0, 100.0, 50.0, 50.0)));
        let mut player = Player::new(vec2(90.0, 125.0));
        room.check_collisions(&mut player);
        assert_eq!(player.position(), vec2(84.0, 125.0));
    }

    #[test]
    fn ellipse_obstacle_pushes_radially() {
        let mut room = bare_room(RoomKind::Normal);
        room.obstacles.push(Obstacle {
            rect: Rect::new(100.0, 100.0, 40.0, 40.0),
            is_ellipse: true,
        });
        let mut player = Player::new(vec2(150.0, 120.0));
        room.check_collisions(&mut player);
        assert!((player.position().x - 156.0).abs() < 1e-4);
        assert_eq!(player.position().y, 120.0);
    }

    #[test]
    fn sequential_resolution_uses_corrected_position() {
        let mut room = bare_room(RoomKind::Normal);
        // The second block only overlaps once the wall has pushed the player to x=84.
        room.obstacles.push(Obstacle::rect(Rect::new(100.0, 0.0, 50.0, 300.0)));
        room.obstacles.push(Obstacle::rect(Rect::new(60.0, 110.0, 15.0, 30.0)));
        let mut player = Player::new(vec2(110.0, 125.0));
        room.check_collisions(&mut player);
        assert_eq!(player.position(), vec2(91.0, 125.0));
    }

    #[test]
    fn enemy_bullet_damages_player_once() {
        let mut room = bare_room(RoomKind::Normal);
        room.bullets.push(Bullet::enemy(vec2(100.0, 100.0), 0.0, 150.0, 8.0));
        room.bullets.push(Bullet::javelin(vec2(100.0, 100.0), 0.0, 400.0, 15.0));
        let mut player = Player::new(vec2(100.0, 100.0));
        room.check_collisions(&mut player);
        room.check_collisions(&mut player);
        assert_eq!(player.health, 92.0);
        assert!(!room.bullets[0].is_active());
        assert!(room.bullets[1].is_active());
    }

    #[test]
    fn javelin_hits_only_first_enemy() {
        let mut room = bare_room(RoomKind::Normal);
        room.spawn_enemy(Enemy::new(vec2(500.0, 500.0), Archetype::Golem));
        room.spawn_enemy(Enemy::new(vec2(505.0, 500.0), Archetype::Golem));
        room.bullets.push(Bullet::javelin(vec2(500.0, 500.0), 0.0, 400.0, 15.0));
        let mut player = Player::new(vec2(100.0, 100.0));
        room.check_collisions(&mut player);
        assert_eq!(room.enemies()[0].health(), 135.0);
        assert_eq!(room.enemies()[1].health(), 150.0);
        assert!(!room.bullets[0].is_active());
    }

    #[test]
    fn update_compacts_spent_bullets() {
        let mut room = bare_room(RoomKind::Shop);
        room.bullets.push(Bullet::enemy(vec2(600.0, 300.0), 0.0, 10.0, 1.0));
        let mut spent = Bullet::enemy(vec2(600.0, 300.0), 0.0, 10.0, 1.0);
        spent.deactivate();
        room.bullets.push(spent);
        let mut player = Player::new(vec2(100.0, 100.0));
        room.update(0.1, &mut player);
        assert_eq!(room.bullets().len(), 1);
        room.update(3.0, &mut player);
        assert!(room.bullets().is_empty());
    }

    #[test]
    fn bullet_cap_drops_overflow() {
        let mut room = bare_room(RoomKind::Boss);
        room.set_bullet_cap(Some(5));
        room.spawn_enemy(Enemy::new(vec2(640.0, 384.0), Archetype::MushroomBoss));
        let mut player = Player::new(vec2(640.0, 500.0));
        room.update(1.6, &mut player);
        assert_eq!(room.bullets().len(), 5);
    }

    #[test]
    fn shop_room_never_clears_or_locks() {
        let mut room = bare_room(RoomKind::Shop);
        let mut player = Player::new(vec2(100.0, 100.0));
        room.update(0.1, &mut player);
        assert!(!room.is_cleared());
        assert!(!room.is_locked());
    }

    #[test]
    fn door_collision_reports_first_overlap() {
        let room = bare_room(RoomKind::Normal);
        let player = Player::new(vec2(1270.0, 384.0));
        assert_eq!(room.check_door_collision(&player), Some(Direction::Right));
        let player = Player::new(vec2(640.0, 384.0));
        assert_eq!(room.check_door_collision(&player), None);
    }

    #[test]
    fn gold_is_paid_once_per_death() {
        let mut room = bare_room(RoomKind::Normal);
        room.spawn_enemy(Enemy::new(vec2(500.0, 500.0), Archetype::Dog));
        room.enemies_mut()[0].take_damage(100.0);
        let gold = room.collect_gold();
        assert!((10..=25).contains(&gold));
        assert_eq!(room.collect_gold(), 0);
    }
}
