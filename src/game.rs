use log::debug;
use macroquad::prelude::*;

use crate::config::GameConfig;
use crate::helpers::{clamp_center_to_bounds, rect_center};
use crate::player::{InputSnapshot, Player};
use crate::room::{Direction, RoomKind};
use crate::room_manager::RoomManager;
use crate::shop::Shop;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    RoomChanged(Direction),
    /// The player just walked into the shop; the caller shows its menu.
    ShopOpened,
    PlayerDied,
}

/// One run: the player, the rooms and the shop, advanced one frame at a time.
pub struct Session {
    pub player: Player,
    pub rooms: RoomManager,
    pub shop: Shop,
    max_dt: f32,
}

impl Session {
    pub fn new(rooms: RoomManager, config: &GameConfig) -> Self {
        let start = rooms.current_room().size() * 0.5;
        let mut player = Player::new(start);
        player.auto_attack = config.auto_attack;
        let shop = Shop::new();
        shop.apply_to(&mut player);
        Self {
            player,
            rooms,
            shop,
            max_dt: config.max_frame_dt,
        }
    }

    pub fn tick(&mut self, dt: f32, input: &InputSnapshot) -> TickOutcome {
        if !self.player.is_alive() {
            return TickOutcome::PlayerDied;
        }
        let dt = dt.min(self.max_dt).max(0.0);
        let room = self.rooms.current_room_mut();

        if room.kind() == RoomKind::Shop && !room.shop_opened {
            room.shop_opened = true;
            return TickOutcome::ShopOpened;
        }

        room.update_player(&mut self.player, dt, input);
        let clamped = clamp_center_to_bounds(self.player.position(), self.player.half_extent(), room.size());
        self.player.set_position(clamped);

        room.update(dt, &mut self.player);
        room.check_collisions(&mut self.player);
        self.player.gold += room.collect_gold();

        if !self.player.is_alive() {
            return TickOutcome::PlayerDied;
        }

        let Some(direction) = room.check_door_collision(&self.player) else {
            return TickOutcome::Continue;
        };
        if room.is_locked() || !self.rooms.change_room(direction) {
            return TickOutcome::Continue;
        }
        self.enter_current_room(direction);
        TickOutcome::RoomChanged(direction)
    }

    /// Places the player just inside the door opposite the one they left through.
    fn enter_current_room(&mut self, travelled: Direction) {
        let half = self.player.half_extent();
        let room = self.rooms.current_room_mut();
        let pos = match room.door(travelled.opposite()) {
            Some(door) => {
                let center = rect_center(door.rect);
                match door.direction {
                    Direction::Up => vec2(center.x, door.rect.y + door.rect.h + half.y),
                    Direction::Down => vec2(center.x, door.rect.y - half.y),
                    Direction::Left => vec2(door.rect.x + door.rect.w + half.x, center.y),
                    Direction::Right => vec2(door.rect.x - half.x, center.y),
                }
            }
            None => room.size() * 0.5,
        };
        if room.kind() == RoomKind::Shop {
            room.shop_opened = false;
        }
        let pos = clamp_center_to_bounds(pos, half, room.size());
        self.player.set_position(pos);
        debug!("entered room {} at {pos}", self.rooms.current_index());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::Room;
    use pretty_assertions::assert_eq;

    const SIZE: Vec2 = Vec2::new(1280.0, 768.0);

    fn open_rooms(count: usize) -> RoomManager {
        RoomManager::new(
            (0..count)
                .map(|_| Room::new(SIZE, 64.0, RoomKind::Normal, Some("normal_1")))
                .collect(),
        )
    }

    fn quiet_session(rooms: RoomManager) -> Session {
        let mut session = Session::new(rooms, &GameConfig::default());
        session.player.auto_attack = false;
        session
    }

    #[test]
    fn starts_centered_with_shop_stats() {
        let session = Session::new(open_rooms(1), &GameConfig::default());
        assert_eq!(session.player.position(), vec2(640.0, 384.0));
        assert_eq!(session.player.damage, 10.0);
        assert!(session.player.auto_attack);
    }

    #[test]
    fn large_dt_is_clamped() {
        let mut session = quiet_session(open_rooms(1));
        let input = InputSnapshot {
            move_axis: vec2(1.0, 0.0),
            aim: vec2(2000.0, 384.0),
            ..Default::default()
        };
        session.tick(5.0, &input);
        assert!((session.player.position().x - (640.0 + 200.0 * 0.033)).abs() < 1e-3);
    }

    #[test]
    fn bad_frame_cap_never_panics() {
        let config = GameConfig {
            max_frame_dt: -1.0,
            auto_attack: false,
            ..GameConfig::default()
        };
        let mut session = Session::new(open_rooms(1), &config);
        assert_eq!(session.tick(0.016, &InputSnapshot::default()), TickOutcome::Continue);

        session.max_dt = f32::NAN;
        let input = InputSnapshot {
            move_axis: vec2(1.0, 0.0),
            ..Default::default()
        };
        assert_eq!(session.tick(0.01, &input), TickOutcome::Continue);
        assert!((session.player.position().x - 642.0).abs() < 1e-3);
    }

    #[test]
    fn walking_through_right_door_enters_next_room_on_left() {
        let mut session = quiet_session(open_rooms(2));
        session.player.set_position(vec2(1255.0, 384.0));
        let outcome = session.tick(0.016, &InputSnapshot::default());
        assert_eq!(outcome, TickOutcome::RoomChanged(Direction::Right));
        assert_eq!(session.rooms.current_index(), 1);
        assert_eq!(session.player.position(), vec2(36.0, 384.0));
    }

    #[test]
    fn last_room_door_is_a_no_op() {
        let mut session = quiet_session(open_rooms(1));
        session.player.set_position(vec2(1255.0, 384.0));
        assert_eq!(session.tick(0.016, &InputSnapshot::default()), TickOutcome::Continue);
        assert_eq!(session.rooms.current_index(), 0);
    }

    #[test]
    fn locked_room_keeps_player_in() {
        let boss = Room::new(SIZE, 64.0, RoomKind::Boss, Some("boss"));
        let next = Room::new(SIZE, 64.0, RoomKind::Normal, Some("normal_1"));
        let mut session = quiet_session(RoomManager::new(vec![boss, next]));
        session.rooms.current_room_mut().spawn_enemy(crate::enemy::Enemy::new(
            vec2(100.0, 700.0),
            crate::enemy::Archetype::Slime,
        ));
        session.player.set_position(vec2(1255.0, 384.0));
        assert_eq!(session.tick(0.016, &InputSnapshot::default()), TickOutcome::Continue);
        assert_eq!(session.rooms.current_index(), 0);
    }

    #[test]
    fn shop_opens_once_per_visit() {
        let shop = Room::new(SIZE, 64.0, RoomKind::Shop, Some("shop"));
        let normal = Room::new(SIZE, 64.0, RoomKind::Normal, Some("normal_1"));
        let mut session = quiet_session(RoomManager::new(vec![shop, normal]));
        let idle = InputSnapshot::default();
        assert_eq!(session.tick(0.016, &idle), TickOutcome::ShopOpened);
        assert_eq!(session.tick(0.016, &idle), TickOutcome::Continue);

        session.player.set_position(vec2(1255.0, 384.0));
        assert_eq!(session.tick(0.016, &idle), TickOutcome::RoomChanged(Direction::Right));
        session.player.set_position(vec2(25.0, 384.0));
        assert_eq!(session.tick(0.016, &idle), TickOutcome::RoomChanged(Direction::Left));
        assert_eq!(session.tick(0.016, &idle), TickOutcome::ShopOpened);
    }

    #[test]
    fn dead_player_ends_the_run() {
        let mut session = quiet_session(open_rooms(1));
        session.player.take_damage(1000.0);
        assert_eq!(session.tick(0.016, &InputSnapshot::default()), TickOutcome::PlayerDied);
    }
}
