use macroquad::prelude::*;

use roomcrawl::bullet::Bullet;
use roomcrawl::enemy::Enemy;
use roomcrawl::helpers::{direction_from_angle, rect_center};
use roomcrawl::player::Player;
use roomcrawl::props::PropKind;
use roomcrawl::room::Room;
use roomcrawl::shop::Shop;
use roomcrawl::tilemap::{FLOOR_TILE, LayerRole, LoadedMap, animated_tile_id};

const FLOOR_COLOR: Color = Color::new(0.16, 0.17, 0.2, 1.0);
const WALL_COLOR: Color = Color::new(0.32, 0.3, 0.34, 1.0);
const OBSTACLE_COLOR: Color = Color::new(0.45, 0.4, 0.36, 1.0);
const DOOR_OPEN: Color = Color::new(0.3, 0.8, 0.4, 1.0);
const DOOR_LOCKED: Color = Color::new(0.8, 0.25, 0.25, 1.0);
const TREE_COLOR: Color = Color::new(0.12, 0.4, 0.18, 1.0);
const STONE_COLOR: Color = Color::new(0.5, 0.5, 0.52, 1.0);
const PLAYER_COLOR: Color = Color::new(0.3, 0.6, 1.0, 1.0);

/// Everything the draw calls need besides the room itself.
pub struct RenderContext<'a> {
    pub camera: &'a Camera2D,
    pub player: &'a Player,
    /// Seconds since the session started; drives tile animations.
    pub time: f64,
}

pub fn draw_room(room: &Room, ctx: &RenderContext) {
    let size = room.size();
    for prop in room.props() {
        match prop.kind {
            PropKind::Tree => {
                draw_rectangle(prop.rect.x, prop.rect.y, prop.rect.w, prop.rect.h, TREE_COLOR)
            }
            PropKind::Stone => {
                let c = rect_center(prop.rect);
                draw_circle(c.x, c.y, prop.rect.w.min(prop.rect.h) * 0.5, STONE_COLOR);
            }
        }
    }

    draw_rectangle(0.0, 0.0, size.x, size.y, FLOOR_COLOR);
    if let Some(map) = room.tile_map() {
        draw_tile_layers(map, ctx);
    }

    for obstacle in room.obstacles() {
        let r = obstacle.rect;
        if obstacle.is_ellipse {
            let circle = obstacle.bounding_circle();
            draw_circle(circle.center.x, circle.center.y, circle.radius, OBSTACLE_COLOR);
        } else {
            draw_rectangle(r.x, r.y, r.w, r.h, OBSTACLE_COLOR);
        }
    }
    draw_rectangle_lines(0.0, 0.0, size.x, size.y, 4.0, WALL_COLOR);

    let door_color = if room.is_locked() { DOOR_LOCKED } else { DOOR_OPEN };
    for door in room.doors() {
        draw_rectangle(door.rect.x, door.rect.y, door.rect.w, door.rect.h, door_color);
    }

    for enemy in room.enemies().iter().filter(|e| e.is_active()) {
        draw_enemy(enemy);
    }
    for bullet in room.bullets() {
        draw_bullet(bullet);
    }
}

fn draw_tile_layers(map: &LoadedMap, ctx: &RenderContext) {
    let tile = map.map.tile_size;
    let elapsed_ms = (ctx.time * 1000.0) as u64;
    let view = visible_world_rect(ctx.camera);
    for layer in &map.map.layers {
        for (idx, &gid) in layer.gids.iter().enumerate() {
            if gid == 0 || (layer.role == LayerRole::Base && gid == FLOOR_TILE) {
                continue;
            }
            let x = (idx % map.map.width) as f32 * tile + layer.offset.x;
            let y = (idx / map.map.width) as f32 * tile + layer.offset.y;
            if !view.overlaps(&Rect::new(x, y, tile, tile)) {
                continue;
            }
            let shown = map
                .tilesets
                .lookup(gid)
                .and_then(|t| t.animation().and_then(|frames| animated_tile_id(frames, elapsed_ms)))
                .unwrap_or(gid);
            let color = match layer.role {
                LayerRole::Base => WALL_COLOR,
                LayerRole::Objects => TREE_COLOR,
                LayerRole::Decoration => tint_for(shown),
            };
            draw_rectangle(x, y, tile, tile, Color { a: 0.6, ..color });
        }
    }
}

fn visible_world_rect(camera: &Camera2D) -> Rect {
    let a = camera.screen_to_world(Vec2::ZERO);
    let b = camera.screen_to_world(vec2(screen_width(), screen_height()));
    let min = a.min(b);
    let max = a.max(b);
    Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
}

fn tint_for(id: u32) -> Color {
    let hue = (id.wrapping_mul(37) % 360) as f32 / 360.0;
    macroquad::color::hsl_to_rgb(hue, 0.35, 0.35)
}

fn draw_enemy(enemy: &Enemy) {
    let pos = enemy.position();
    let radius = enemy.radius();
    draw_circle(pos.x, pos.y, radius, enemy.stats().color);
    let bar_w = radius * 2.0;
    let bar_y = pos.y - radius - 10.0;
    draw_rectangle(pos.x - radius, bar_y, bar_w, 5.0, DARKGRAY);
    draw_rectangle(pos.x - radius, bar_y, bar_w * enemy.health_fraction(), 5.0, RED);
    if enemy.is_boss() {
        draw_circle_lines(pos.x, pos.y, radius + 4.0, 3.0, GOLD);
    }
}

fn draw_bullet(bullet: &Bullet) {
    let pos = bullet.position();
    if bullet.is_player_owned() {
        let tail = pos - direction_from_angle(bullet.angle()) * bullet.radius() * 3.0;
        draw_line(tail.x, tail.y, pos.x, pos.y, 3.0, BEIGE);
    } else {
        draw_circle(pos.x, pos.y, bullet.radius(), ORANGE);
    }
}

pub fn draw_player(ctx: &RenderContext) {
    let player = ctx.player;
    let rect = player.collision_rect();
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, PLAYER_COLOR);
    let facing = direction_from_angle(player.facing_angle());
    let pos = player.position();
    let tip = pos + facing * player.attack_range();
    let color = if player.is_attacking() { WHITE } else { Color { a: 0.4, ..WHITE } };
    draw_line(pos.x, pos.y, tip.x, tip.y, 2.0, color);
    if player.is_attacking() {
        draw_circle_lines(pos.x, pos.y, player.attack_range(), 2.0, color);
    }
}

/// Screen-space HUD; call after `set_default_camera`.
pub fn draw_hud(ctx: &RenderContext, room_index: usize, room_count: usize) {
    let player = ctx.player;
    draw_rectangle(20.0, 20.0, 200.0, 16.0, DARKGRAY);
    draw_rectangle(20.0, 20.0, 200.0 * player.health_fraction(), 16.0, RED);
    let lines = [
        format!("HP {:.0}/{:.0}", player.health, player.max_health),
        format!("Gold {}  Potions {}", player.gold, player.potions),
        format!("Damage {:.0}  Defense {:.0}", player.damage, player.defense),
        format!(
            "Room {}/{}  Auto-attack {}",
            room_index + 1,
            room_count,
            if player.auto_attack { "on" } else { "off" }
        ),
    ];
    for (i, line) in lines.iter().enumerate() {
        draw_text(line, 20.0, 60.0 + i as f32 * 24.0, 24.0, WHITE);
    }
    if player.javelin_cooldown() > 0.0 {
        draw_text(
            &format!("Javelin {:.1}s", player.javelin_cooldown()),
            20.0,
            60.0 + lines.len() as f32 * 24.0,
            24.0,
            GRAY,
        );
    }
}

pub fn draw_shop_menu(shop: &Shop, player: &Player) {
    draw_rectangle(0.0, 0.0, screen_width(), screen_height(), Color::new(0.0, 0.0, 0.0, 0.7));
    let mut y = 80.0;
    draw_text("SHOP", 60.0, y, 40.0, GOLD);
    y += 40.0;
    draw_text(&format!("Gold: {}", player.gold), 60.0, y, 26.0, WHITE);
    y += 40.0;
    draw_text(
        &format!("Weapon: {} (1-4 to upgrade)", shop.current_weapon().name),
        60.0,
        y,
        26.0,
        WHITE,
    );
    for (index, tier) in shop.available_weapons() {
        y += 28.0;
        let color = if player.gold >= tier.cost { WHITE } else { GRAY };
        draw_text(
            &format!("  [{index}] {} dmg {:.0}  {}g", tier.name, tier.value, tier.cost),
            60.0,
            y,
            24.0,
            color,
        );
    }
    y += 44.0;
    draw_text(
        &format!("Armor: {} (Shift+1-4 to upgrade)", shop.current_armor().name),
        60.0,
        y,
        26.0,
        WHITE,
    );
    for (index, tier) in shop.available_armor() {
        y += 28.0;
        let color = if player.gold >= tier.cost { WHITE } else { GRAY };
        draw_text(
            &format!("  [{index}] {} def {:.0}  {}g", tier.name, tier.value, tier.cost),
            60.0,
            y,
            24.0,
            color,
        );
    }
    draw_text("Enter to leave", 60.0, y + 50.0, 24.0, GRAY);
}

pub fn draw_banner(title: &str, subtitle: &str) {
    draw_rectangle(0.0, 0.0, screen_width(), screen_height(), Color::new(0.0, 0.0, 0.0, 0.6));
    let size = measure_text(title, None, 56, 1.0);
    draw_text(
        title,
        (screen_width() - size.width) * 0.5,
        screen_height() * 0.45,
        56.0,
        WHITE,
    );
    let size = measure_text(subtitle, None, 26, 1.0);
    draw_text(
        subtitle,
        (screen_width() - size.width) * 0.5,
        screen_height() * 0.45 + 44.0,
        26.0,
        GRAY,
    );
}

pub async fn show_loading(label: &str, spin: f32) {
    set_default_camera();
    clear_background(BLACK);
    let center = vec2(screen_width() * 0.5, screen_height() * 0.5);
    let size = (screen_height() * 0.075).max(32.0);
    draw_poly_lines(center.x, center.y, 4, size, spin.to_degrees(), 4.0, WHITE);
    draw_text(label, 20.0, 40.0, 30.0, WHITE);
    next_frame().await;
}
