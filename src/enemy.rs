use macroquad::prelude::*;

use crate::bullet::Bullet;
use crate::helpers::{Circle, angle_between, clamp_center_to_bounds, distance, normalize};

pub const AGGRO_RANGE: f32 = 400.0;
pub const CHARGE_TRIGGER_RANGE: f32 = 150.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Archetype {
    Slime,
    GreenSlime,
    Golem,
    Dog,
    MushroomBoss,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Self::Slime,
        Self::GreenSlime,
        Self::Golem,
        Self::Dog,
        Self::MushroomBoss,
    ];

    /// Unknown names fall back to the slime stat block.
    pub fn from_name(name: &str) -> Self {
        match name {
            "green_slime" => Self::GreenSlime,
            "golem" => Self::Golem,
            "dog" => Self::Dog,
            "mushroom_boss" => Self::MushroomBoss,
            _ => Self::Slime,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Slime => "slime",
            Self::GreenSlime => "green_slime",
            Self::Golem => "golem",
            Self::Dog => "dog",
            Self::MushroomBoss => "mushroom_boss",
        }
    }

    pub fn stats(self) -> EnemyStats {
        match self {
            Self::Slime => EnemyStats {
                radius: 20.0,
                max_health: 30.0,
                speed: 80.0,
                damage: 5.0,
                attack_range: 30.0,
                attack_cooldown: 1.5,
                color: Color::from_hex(0x4a9e4a),
                ranged: None,
                charge: None,
                gold_drop: (5, 15),
                is_boss: false,
            },
            Self::GreenSlime => EnemyStats {
                radius: 22.0,
                max_health: 40.0,
                speed: 70.0,
                damage: 8.0,
                attack_range: 200.0,
                attack_cooldown: 2.0,
                color: Color::from_hex(0x2d7a2d),
                ranged: Some(RangedAttack {
                    bullet_speed: 150.0,
                    pattern: FirePattern::Aimed,
                }),
                charge: None,
                gold_drop: (5, 15),
                is_boss: false,
            },
            Self::Golem => EnemyStats {
                radius: 35.0,
                max_health: 150.0,
                speed: 100.0,
                damage: 15.0,
                attack_range: 50.0,
                attack_cooldown: 2.5,
                color: Color::from_hex(0x8b7355),
                ranged: None,
                charge: Some(ChargeAttack {
                    speed: 300.0,
                    cooldown: 3.0,
                }),
                gold_drop: (20, 40),
                is_boss: false,
            },
            Self::Dog => EnemyStats {
                radius: 25.0,
                max_health: 60.0,
                speed: 120.0,
                damage: 10.0,
                attack_range: 40.0,
                attack_cooldown: 1.8,
                color: Color::from_hex(0x654321),
                ranged: None,
                charge: Some(ChargeAttack {
                    speed: 250.0,
                    cooldown: 2.5,
                }),
                gold_drop: (10, 25),
                is_boss: false,
            },
            Self::MushroomBoss => EnemyStats {
                radius: 50.0,
                max_health: 300.0,
                speed: 60.0,
                damage: 20.0,
                attack_range: 300.0,
                attack_cooldown: 1.5,
                color: Color::from_hex(0x8b4513),
                ranged: Some(RangedAttack {
                    bullet_speed: 120.0,
                    pattern: FirePattern::Radial { count: 8 },
                }),
                charge: None,
                gold_drop: (100, 200),
                is_boss: true,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FirePattern {
    /// One shot at the player's current position.
    Aimed,
    /// `count` shots evenly spaced around a full circle.
    Radial { count: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangedAttack {
    pub bullet_speed: f32,
    pub pattern: FirePattern,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeAttack {
    pub speed: f32,
    pub cooldown: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    pub radius: f32,
    pub max_health: f32,
    pub speed: f32,
    pub damage: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub color: Color,
    pub ranged: Option<RangedAttack>,
    pub charge: Option<ChargeAttack>,
    /// Inclusive gold payout range.
    pub gold_drop: (u32, u32),
    pub is_boss: bool,
}

impl EnemyStats {
    pub fn is_ranged(&self) -> bool {
        self.ranged.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyState {
    Idle,
    Chase,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageEvent {
    pub amount: f32,
}

/// Per-frame view of the world an enemy reacts to. Spawned bullets and melee
/// hits are queued here and applied by the room after every enemy has run.
pub struct EnemyContext {
    pub player_pos: Vec2,
    pub bounds: Vec2,
    pub spawns: Vec<Bullet>,
    pub damage_events: Vec<DamageEvent>,
}

impl EnemyContext {
    pub fn new(player_pos: Vec2, bounds: Vec2) -> Self {
        Self {
            player_pos,
            bounds,
            spawns: Vec::new(),
            damage_events: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pos: Vec2,
    archetype: Archetype,
    stats: EnemyStats,
    health: f32,
    active: bool,
    state: EnemyState,
    state_timer: f32,
    last_attack_time: f32,
    charge_timer: f32,
    velocity: Vec2,
    gold_dropped: bool,
}

impl Enemy {
    pub fn new(pos: Vec2, archetype: Archetype) -> Self {
        let stats = archetype.stats();
        Self {
            pos,
            archetype,
            stats,
            health: stats.max_health,
            active: true,
            state: EnemyState::Idle,
            state_timer: 0.0,
            last_attack_time: 0.0,
            charge_timer: 0.0,
            velocity: Vec2::ZERO,
            gold_dropped: false,
        }
    }

    pub fn update(&mut self, dt: f32, ctx: &mut EnemyContext) {
        if !self.active {
            return;
        }

        self.state_timer += dt;
        self.last_attack_time += dt;
        self.charge_timer += dt;

        let to_player = distance(self.pos, ctx.player_pos);
        let next_state = if to_player < AGGRO_RANGE {
            EnemyState::Chase
        } else {
            EnemyState::Idle
        };
        if next_state != self.state {
            self.state = next_state;
            self.state_timer = 0.0;
        }

        if self.state == EnemyState::Idle {
            self.velocity = Vec2::ZERO;
            return;
        }

        let dir = normalize(ctx.player_pos - self.pos);
        let speed = match self.stats.charge {
            Some(charge)
                if self.charge_timer >= charge.cooldown && to_player < CHARGE_TRIGGER_RANGE =>
            {
                self.charge_timer = 0.0;
                charge.speed
            }
            _ => self.stats.speed,
        };
        self.velocity = dir * speed;
        self.pos += self.velocity * dt;
        self.pos = clamp_center_to_bounds(self.pos, Vec2::splat(self.stats.radius), ctx.bounds);

        if to_player <= self.stats.attack_range
            && self.last_attack_time >= self.stats.attack_cooldown
        {
            match self.stats.ranged {
                Some(ranged) => self.ranged_attack(ranged, ctx),
                None => self.melee_attack(ctx),
            }
            self.last_attack_time = 0.0;
        }
    }

    fn melee_attack(&self, ctx: &mut EnemyContext) {
        if distance(self.pos, ctx.player_pos) <= self.stats.attack_range {
            ctx.damage_events.push(DamageEvent {
                amount: self.stats.damage,
            });
        }
    }

    fn ranged_attack(&self, ranged: RangedAttack, ctx: &mut EnemyContext) {
        match ranged.pattern {
            FirePattern::Radial { count } => {
                let step = std::f32::consts::TAU / count.max(1) as f32;
                for i in 0..count {
                    ctx.spawns.push(Bullet::enemy(
                        self.pos,
                        step * i as f32,
                        ranged.bullet_speed,
                        self.stats.damage,
                    ));
                }
            }
            FirePattern::Aimed => {
                let angle = angle_between(self.pos, ctx.player_pos);
                ctx.spawns.push(Bullet::enemy(
                    self.pos,
                    angle,
                    ranged.bullet_speed,
                    self.stats.damage,
                ));
            }
        }
    }

    /// Returns true only on the hit that kills the enemy.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        debug_assert!(amount >= 0.0, "negative damage {amount}");
        if !self.active {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.active = false;
            return true;
        }
        false
    }

    /// Gold for a dead enemy, paid at most once.
    pub fn award_gold(&mut self) -> Option<u32> {
        if self.active || self.gold_dropped {
            return None;
        }
        self.gold_dropped = true;
        let (low, high) = self.stats.gold_drop;
        Some(macroquad::rand::gen_range(low, high + 1))
    }

    pub fn restore_health(&mut self, health: f32) {
        if self.active {
            self.health = health.clamp(0.0, self.stats.max_health);
        }
    }

    pub fn collision_shape(&self) -> Circle {
        Circle::new(self.pos, self.stats.radius)
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn stats(&self) -> &EnemyStats {
        &self.stats
    }

    pub fn radius(&self) -> f32 {
        self.stats.radius
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.stats.max_health
    }

    pub fn health_fraction(&self) -> f32 {
        self.health / self.stats.max_health
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_boss(&self) -> bool {
        self.stats.is_boss
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn gold_dropped(&self) -> bool {
        self.gold_dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(1280.0, 768.0);

    #[test]
    fn unknown_archetype_uses_slime_stats() {
        assert_eq!(Archetype::from_name("wraith"), Archetype::Slime);
        for archetype in Archetype::ALL {
            assert_eq!(Archetype::from_name(archetype.name()), archetype);
        }
    }

    #[test]
    fn idle_beyond_aggro_range() {
        let mut enemy = Enemy::new(vec2(100.0, 100.0), Archetype::Slime);
        let mut ctx = EnemyContext::new(vec2(600.0, 100.0), BOUNDS);
        enemy.update(0.1, &mut ctx);
        assert_eq!(enemy.state(), EnemyState::Idle);
        assert_eq!(enemy.velocity(), Vec2::ZERO);
        assert_eq!(enemy.position(), vec2(100.0, 100.0));
    }

    #[test]
    fn chases_toward_player_at_speed() {
        let mut enemy = Enemy::new(vec2(100.0, 100.0), Archetype::Slime);
        let mut ctx = EnemyContext::new(vec2(300.0, 100.0), BOUNDS);
        enemy.update(0.5, &mut ctx);
        assert_eq!(enemy.state(), EnemyState::Chase);
        assert!((enemy.position().x - 140.0).abs() < 1e-4);
        assert!(ctx.damage_events.is_empty());
    }

    #[test]
    fn charger_bursts_after_cooldown_when_close() {
        let mut dog = Enemy::new(vec2(100.0, 100.0), Archetype::Dog);
        let mut ctx = EnemyContext::new(vec2(200.0, 100.0), BOUNDS);
        dog.update(1.0, &mut ctx);
        assert!((dog.velocity().length() - 120.0).abs() < 1e-3);

        dog.set_position(vec2(100.0, 100.0));
        dog.update(1.5, &mut ctx);
        assert!((dog.velocity().length() - 250.0).abs() < 1e-3);

        dog.set_position(vec2(100.0, 100.0));
        dog.update(0.01, &mut ctx);
        assert!((dog.velocity().length() - 120.0).abs() < 1e-3);
    }

    #[test]
    fn melee_attack_respects_cooldown() {
        let mut slime = Enemy::new(vec2(100.0, 100.0), Archetype::Slime);
        let player = vec2(120.0, 100.0);
        let mut ctx = EnemyContext::new(player, BOUNDS);
        slime.update(1.0, &mut ctx);
        assert!(ctx.damage_events.is_empty());

        slime.set_position(vec2(100.0, 100.0));
        slime.update(0.6, &mut ctx);
        assert_eq!(ctx.damage_events, vec![DamageEvent { amount: 5.0 }]);

        slime.set_position(vec2(100.0, 100.0));
        slime.update(0.1, &mut ctx);
        assert_eq!(ctx.damage_events.len(), 1);
    }

    #[test]
    fn boss_fires_radial_volley() {
        let mut boss = Enemy::new(vec2(400.0, 400.0), Archetype::MushroomBoss);
        let mut ctx = EnemyContext::new(vec2(500.0, 400.0), BOUNDS);
        boss.update(1.6, &mut ctx);
        assert_eq!(ctx.spawns.len(), 8);
        let step = std::f32::consts::TAU / 8.0;
        for (i, bullet) in ctx.spawns.iter().enumerate() {
            assert!((bullet.angle() - step * i as f32).abs() < 1e-5);
            assert!(!bullet.is_player_owned());
        }
    }

    #[test]
    fn green_slime_aims_at_player() {
        let mut shooter = Enemy::new(vec2(100.0, 100.0), Archetype::GreenSlime);
        let mut ctx = EnemyContext::new(vec2(100.0, 250.0), BOUNDS);
        shooter.update(2.0, &mut ctx);
        assert_eq!(ctx.spawns.len(), 1);
        assert!((ctx.spawns[0].angle() - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn take_damage_reports_death_once() {
        let mut slime = Enemy::new(Vec2::ZERO, Archetype::Slime);
        assert!(!slime.take_damage(10.0));
        assert!(!slime.take_damage(10.0));
        assert!(slime.take_damage(15.0));
        assert_eq!(slime.health(), 0.0);
        assert!(!slime.is_active());
        assert!(!slime.take_damage(10.0));
        assert_eq!(slime.health(), 0.0);
    }

    #[test]
    fn gold_awarded_once_within_range() {
        let mut dog = Enemy::new(Vec2::ZERO, Archetype::Dog);
        assert_eq!(dog.award_gold(), None);
        dog.take_damage(100.0);
        let gold = dog.award_gold().expect("dead enemy pays out");
        assert!((10..=25).contains(&gold));
        assert_eq!(dog.award_gold(), None);
    }

    #[test]
    fn dead_enemy_is_frozen() {
        let mut slime = Enemy::new(vec2(100.0, 100.0), Archetype::Slime);
        slime.take_damage(30.0);
        let mut ctx = EnemyContext::new(vec2(120.0, 100.0), BOUNDS);
        slime.update(5.0, &mut ctx);
        assert_eq!(slime.position(), vec2(100.0, 100.0));
        assert!(ctx.damage_events.is_empty());
    }
}
