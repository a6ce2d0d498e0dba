use macroquad::prelude::*;

use crate::bullet::Bullet;
use crate::enemy::Enemy;
use crate::helpers::{angle_between, centered_rect, distance, normalize};

pub const PLAYER_SIZE: f32 = 32.0;
pub const JAVELIN_SPEED: f32 = 400.0;
pub const JAVELIN_DAMAGE_SCALE: f32 = 1.5;

/// Normalized controls for one frame. Device capture lives with the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Keyboard axis, each component in [-1, 1].
    pub move_axis: Vec2,
    /// Virtual joystick; overrides `move_axis` when non-zero.
    pub joystick: Vec2,
    /// World-space aim point (mouse or touch).
    pub aim: Vec2,
    pub melee_pressed: bool,
    pub javelin_pressed: bool,
    pub potion_pressed: bool,
    pub pause_pressed: bool,
}

impl InputSnapshot {
    pub fn movement(&self) -> Vec2 {
        if self.joystick != Vec2::ZERO {
            self.joystick
        } else {
            self.move_axis
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pos: Vec2,
    size: Vec2,
    vel: Vec2,
    speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub gold: u32,
    pub level: u32,
    pub damage: f32,
    pub defense: f32,
    attack_range: f32,
    attack_cooldown: f32,
    attack_cooldown_time: f32,
    is_attacking: bool,
    attack_timer: f32,
    attack_duration: f32,
    javelin_cooldown: f32,
    javelin_cooldown_time: f32,
    pub potions: u32,
    potion_heal_amount: f32,
    potion_cooldown: f32,
    potion_cooldown_time: f32,
    pub auto_attack: bool,
    auto_attack_timer: f32,
    auto_attack_interval: f32,
    facing_angle: f32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: vec2(PLAYER_SIZE, PLAYER_SIZE),
            vel: Vec2::ZERO,
            speed: 200.0,
            health: 100.0,
            max_health: 100.0,
            gold: 0,
            level: 1,
            damage: 10.0,
            defense: 0.0,
            attack_range: 40.0,
            attack_cooldown: 0.0,
            attack_cooldown_time: 0.5,
            is_attacking: false,
            attack_timer: 0.0,
            attack_duration: 0.2,
            javelin_cooldown: 0.0,
            javelin_cooldown_time: 1.0,
            potions: 3,
            potion_heal_amount: 50.0,
            potion_cooldown: 0.0,
            potion_cooldown_time: 0.5,
            auto_attack: true,
            auto_attack_timer: 0.0,
            auto_attack_interval: 0.6,
            facing_angle: 0.0,
        }
    }

    /// One frame of player actions. Javelins are pushed onto `spawns`; melee hits
    /// land on `enemies` immediately.
    pub fn update(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        enemies: &mut [Enemy],
        spawns: &mut Vec<Bullet>,
    ) {
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        self.javelin_cooldown = (self.javelin_cooldown - dt).max(0.0);
        self.potion_cooldown = (self.potion_cooldown - dt).max(0.0);

        let dir = normalize(input.movement());
        if dir != Vec2::ZERO {
            self.vel = dir * self.speed;
            self.pos += self.vel * dt;
        } else {
            self.vel = Vec2::ZERO;
        }

        self.face(input.aim);

        if self.is_attacking {
            self.attack_timer -= dt;
            if self.attack_timer <= 0.0 {
                self.is_attacking = false;
            }
        }

        let auto_ready =
            self.auto_attack && self.auto_attack_timer <= 0.0 && self.attack_cooldown <= 0.0;
        if input.melee_pressed || auto_ready {
            self.attack(enemies);
            if self.auto_attack {
                self.auto_attack_timer = self.auto_attack_interval;
            }
        }
        if self.auto_attack {
            self.auto_attack_timer = (self.auto_attack_timer - dt).max(0.0);
        }

        if input.javelin_pressed {
            if let Some(javelin) = self.throw_javelin(input.aim) {
                spawns.push(javelin);
            }
        }

        if input.potion_pressed {
            self.drink_potion();
        }
    }

    /// Turns toward `target`; a target on top of the player keeps the old facing.
    pub fn face(&mut self, target: Vec2) {
        if normalize(target - self.pos) != Vec2::ZERO {
            self.facing_angle = angle_between(self.pos, target);
        }
    }

    /// Melee swing with an instant hit-scan over the forward half-plane. Returns
    /// false when the swing is still on cooldown.
    pub fn attack(&mut self, enemies: &mut [Enemy]) -> bool {
        if self.attack_cooldown > 0.0 {
            return false;
        }
        self.is_attacking = true;
        self.attack_timer = self.attack_duration;
        self.attack_cooldown = self.attack_cooldown_time;

        for enemy in enemies.iter_mut().filter(|e| e.is_active()) {
            let dist = distance(self.pos, enemy.position());
            if dist > self.attack_range + enemy.radius() {
                continue;
            }
            let to_enemy = angle_between(self.pos, enemy.position());
            let diff = (self.facing_angle - to_enemy).abs();
            if diff < std::f32::consts::FRAC_PI_2 || diff > 3.0 * std::f32::consts::FRAC_PI_2 {
                enemy.take_damage(self.damage);
            }
        }
        true
    }

    pub fn throw_javelin(&mut self, target: Vec2) -> Option<Bullet> {
        if self.javelin_cooldown > 0.0 {
            return None;
        }
        self.javelin_cooldown = self.javelin_cooldown_time;
        let angle = angle_between(self.pos, target);
        Some(Bullet::javelin(
            self.pos,
            angle,
            JAVELIN_SPEED,
            self.damage * JAVELIN_DAMAGE_SCALE,
        ))
    }

    pub fn drink_potion(&mut self) -> bool {
        if self.potion_cooldown > 0.0 || self.potions == 0 || self.health >= self.max_health {
            return false;
        }
        self.potion_cooldown = self.potion_cooldown_time;
        self.potions -= 1;
        self.health = (self.health + self.potion_heal_amount).min(self.max_health);
        true
    }

    /// Applies a hit reduced by defense; at least 1 point always lands.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        debug_assert!(amount >= 0.0, "negative damage {amount}");
        let actual = (amount - self.defense).max(1.0);
        self.health = (self.health - actual).max(0.0);
        actual
    }

    pub fn collision_rect(&self) -> Rect {
        centered_rect(self.pos, self.size)
    }

    pub fn half_extent(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn velocity(&self) -> Vec2 {
        self.vel
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn facing_angle(&self) -> f32 {
        self.facing_angle
    }

    pub fn attack_range(&self) -> f32 {
        self.attack_range
    }

    pub fn is_attacking(&self) -> bool {
        self.is_attacking
    }

    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    pub fn javelin_cooldown(&self) -> f32 {
        self.javelin_cooldown
    }

    pub fn health_fraction(&self) -> f32 {
        self.health / self.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::Archetype;

    fn idle_input(aim: Vec2) -> InputSnapshot {
        InputSnapshot {
            aim,
            ..Default::default()
        }
    }

    fn manual_player(pos: Vec2) -> Player {
        let mut player = Player::new(pos);
        player.auto_attack = false;
        player
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut player = manual_player(vec2(100.0, 100.0));
        let input = InputSnapshot {
            move_axis: vec2(1.0, 1.0),
            ..idle_input(vec2(500.0, 100.0))
        };
        player.update(0.5, &input, &mut [], &mut Vec::new());
        assert!((player.velocity().length() - 200.0).abs() < 1e-3);
        assert!((distance(player.position(), vec2(100.0, 100.0)) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn joystick_overrides_keyboard() {
        let mut player = manual_player(vec2(100.0, 100.0));
        let input = InputSnapshot {
            move_axis: vec2(1.0, 0.0),
            joystick: vec2(0.0, -0.5),
            ..idle_input(vec2(500.0, 100.0))
        };
        player.update(0.5, &input, &mut [], &mut Vec::new());
        assert!((player.position().x - 100.0).abs() < 1e-4);
        assert!((player.position().y - 0.0).abs() < 1e-4);
    }

    #[test]
    fn no_input_zeroes_velocity() {
        let mut player = manual_player(vec2(100.0, 100.0));
        player.update(0.1, &idle_input(vec2(0.0, 0.0)), &mut [], &mut Vec::new());
        assert_eq!(player.velocity(), Vec2::ZERO);
        assert_eq!(player.position(), vec2(100.0, 100.0));
    }

    #[test]
    fn aim_on_player_keeps_facing() {
        let mut player = manual_player(vec2(100.0, 100.0));
        player.face(vec2(100.0, 200.0));
        let facing = player.facing_angle();
        player.face(vec2(100.0, 100.0));
        assert_eq!(player.facing_angle(), facing);
        assert!(!facing.is_nan());
    }

    #[test]
    fn melee_only_hits_forward_cone() {
        let mut player = manual_player(vec2(100.0, 100.0));
        player.face(vec2(200.0, 100.0));
        let mut enemies = vec![
            Enemy::new(vec2(130.0, 100.0), Archetype::Slime),
            Enemy::new(vec2(70.0, 100.0), Archetype::Slime),
            Enemy::new(vec2(300.0, 100.0), Archetype::Slime),
        ];
        assert!(player.attack(&mut enemies));
        assert_eq!(enemies[0].health(), 20.0);
        assert_eq!(enemies[1].health(), 30.0);
        assert_eq!(enemies[2].health(), 30.0);
        assert!(player.is_attacking());
        assert!(!player.attack(&mut enemies));
    }

    #[test]
    fn cone_handles_angle_wraparound() {
        let mut player = manual_player(vec2(100.0, 100.0));
        // Facing just above -pi; enemy just below +pi is straight ahead.
        player.face(vec2(0.0, 99.0));
        let mut enemies = vec![Enemy::new(vec2(70.0, 101.0), Archetype::Slime)];
        player.attack(&mut enemies);
        assert_eq!(enemies[0].health(), 20.0);
    }

    #[test]
    fn attack_flag_clears_after_duration() {
        let mut player = manual_player(vec2(100.0, 100.0));
        let input = InputSnapshot {
            melee_pressed: true,
            ..idle_input(vec2(200.0, 100.0))
        };
        player.update(0.01, &input, &mut [], &mut Vec::new());
        assert!(player.is_attacking());
        player.update(0.25, &idle_input(vec2(200.0, 100.0)), &mut [], &mut Vec::new());
        assert!(!player.is_attacking());
    }

    #[test]
    fn auto_attack_fires_on_interval() {
        let mut player = Player::new(vec2(100.0, 100.0));
        player.face(vec2(200.0, 100.0));
        let mut enemies = vec![Enemy::new(vec2(120.0, 100.0), Archetype::Golem)];
        let input = idle_input(vec2(200.0, 100.0));
        player.update(0.1, &input, &mut enemies, &mut Vec::new());
        assert_eq!(enemies[0].health(), 140.0);
        player.update(0.1, &input, &mut enemies, &mut Vec::new());
        assert_eq!(enemies[0].health(), 140.0);
        for _ in 0..6 {
            player.update(0.1, &input, &mut enemies, &mut Vec::new());
        }
        assert_eq!(enemies[0].health(), 130.0);
    }

    #[test]
    fn javelin_is_cooldown_gated() {
        let mut player = manual_player(vec2(100.0, 100.0));
        player.damage = 20.0;
        let javelin = player.throw_javelin(vec2(100.0, 300.0)).expect("ready");
        assert!(javelin.is_player_owned());
        assert_eq!(javelin.damage(), 30.0);
        assert!((javelin.angle() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(player.throw_javelin(vec2(100.0, 300.0)).is_none());
    }

    #[test]
    fn potion_heals_clamped_and_consumes() {
        let mut player = manual_player(Vec2::ZERO);
        assert!(!player.drink_potion());
        assert_eq!(player.potions, 3);

        player.health = 80.0;
        assert!(player.drink_potion());
        assert_eq!(player.health, 100.0);
        assert_eq!(player.potions, 2);

        player.health = 10.0;
        assert!(!player.drink_potion());

        player.potions = 0;
        player.potion_cooldown = 0.0;
        assert!(!player.drink_potion());
    }

    #[test]
    fn damage_floor_is_one() {
        let mut player = manual_player(Vec2::ZERO);
        player.defense = 10.0;
        assert_eq!(player.take_damage(4.0), 1.0);
        assert_eq!(player.take_damage(15.0), 5.0);
        assert_eq!(player.take_damage(0.0), 1.0);
        assert_eq!(player.health, 93.0);
        player.take_damage(1000.0);
        assert_eq!(player.health, 0.0);
        assert!(!player.is_alive());
    }
}
