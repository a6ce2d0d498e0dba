use macroquad::prelude::*;

use crate::helpers::{Circle, direction_from_angle};

pub const JAVELIN_RADIUS: f32 = 8.0;
pub const ENEMY_BULLET_RADIUS: f32 = 6.0;
pub const JAVELIN_LIFETIME: f32 = 2.0;
pub const ENEMY_BULLET_LIFETIME: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// Straight-line projectile. Once inactive it never moves or reactivates.
#[derive(Clone, Debug)]
pub struct Bullet {
    pos: Vec2,
    angle: f32,
    speed: f32,
    damage: f32,
    owner: BulletOwner,
    radius: f32,
    active: bool,
    lifetime: f32,
    max_lifetime: f32,
}

impl Bullet {
    pub fn new(pos: Vec2, angle: f32, speed: f32, damage: f32, owner: BulletOwner) -> Self {
        let (radius, max_lifetime) = match owner {
            BulletOwner::Player => (JAVELIN_RADIUS, JAVELIN_LIFETIME),
            BulletOwner::Enemy => (ENEMY_BULLET_RADIUS, ENEMY_BULLET_LIFETIME),
        };
        Self {
            pos,
            angle,
            speed,
            damage,
            owner,
            radius,
            active: true,
            lifetime: 0.0,
            max_lifetime,
        }
    }

    pub fn javelin(pos: Vec2, angle: f32, speed: f32, damage: f32) -> Self {
        Self::new(pos, angle, speed, damage, BulletOwner::Player)
    }

    pub fn enemy(pos: Vec2, angle: f32, speed: f32, damage: f32) -> Self {
        Self::new(pos, angle, speed, damage, BulletOwner::Enemy)
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.lifetime += dt;
        if self.lifetime >= self.max_lifetime {
            self.active = false;
            return;
        }
        self.pos += direction_from_angle(self.angle) * self.speed * dt;
    }

    pub fn collision_shape(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_player_owned(&self) -> bool {
        self.owner == BulletOwner::Player
    }

    pub fn owner(&self) -> BulletOwner {
        self.owner
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }
}
