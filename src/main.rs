use macroquad::prelude::*;
use std::future::poll_fn;
use std::task::Poll;

use log::{info, warn};

use roomcrawl::config::GameConfig;
use roomcrawl::game::{Session, TickOutcome};
use roomcrawl::player::InputSnapshot;
use roomcrawl::room_manager::RoomManager;
use roomcrawl::shop::UpgradeKind;

mod render;

use render::{RenderContext, draw_banner, draw_hud, draw_player, draw_room, draw_shop_menu, show_loading};

const CONFIG_PATH: &str = "config/game.yaml";
const CAMERA_DRAG: f32 = 5.0;
const CAMERA_FOV: f32 = 800.0;
const LOADING_SPIN_SPEED: f32 = 3.0;
const SHOP_KEYS: [KeyCode; 4] = [KeyCode::Key1, KeyCode::Key2, KeyCode::Key3, KeyCode::Key4];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Playing,
    Paused,
    Shop,
    GameOver,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "roomcrawl".to_owned(),
        window_width: 1280,
        window_height: 768,
        sample_count: 1,
        ..Default::default()
    }
}

async fn await_with_loading<F, T>(future: F, label: &str, spin: &mut f32) -> T
where
    F: std::future::Future<Output = T>,
{
    let mut future = std::pin::pin!(future);
    loop {
        let polled = poll_fn(|cx| Poll::Ready(future.as_mut().poll(cx))).await;
        match polled {
            Poll::Ready(value) => return value,
            Poll::Pending => {
                *spin += LOADING_SPIN_SPEED * get_frame_time();
                show_loading(label, *spin).await;
            }
        }
    }
}

async fn new_session(config: &GameConfig, spin: &mut f32) -> Session {
    let (rooms, outcomes) = await_with_loading(RoomManager::initialize(config), "Loading rooms", spin).await;
    let fallbacks = outcomes.iter().filter(|o| o.is_fallback()).count();
    if fallbacks > 0 {
        warn!("{fallbacks} room(s) use built-in layouts after map errors");
    }
    info!("session ready with {} rooms", rooms.room_count());
    Session::new(rooms, config)
}

fn load_config() -> GameConfig {
    match GameConfig::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(err) => {
            warn!("using default config: {err}");
            GameConfig::default()
        }
    }
}

fn capture_input(camera: &Camera2D) -> InputSnapshot {
    let axis = |neg: [KeyCode; 2], pos: [KeyCode; 2]| {
        let held = |keys: [KeyCode; 2]| keys.iter().any(|k| is_key_down(*k));
        held(pos) as i32 as f32 - held(neg) as i32 as f32
    };
    let move_axis = vec2(
        axis([KeyCode::A, KeyCode::Left], [KeyCode::D, KeyCode::Right]),
        axis([KeyCode::W, KeyCode::Up], [KeyCode::S, KeyCode::Down]),
    );
    InputSnapshot {
        move_axis,
        joystick: Vec2::ZERO,
        aim: camera.screen_to_world(mouse_position().into()),
        melee_pressed: is_mouse_button_pressed(MouseButton::Left),
        javelin_pressed: is_mouse_button_pressed(MouseButton::Right) || is_key_pressed(KeyCode::E),
        potion_pressed: is_key_pressed(KeyCode::Space),
        pause_pressed: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::M),
    }
}

fn handle_shop_keys(session: &mut Session) -> bool {
    if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::Escape) {
        return false;
    }
    let kind = if is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift) {
        UpgradeKind::Armor
    } else {
        UpgradeKind::Weapon
    };
    for (slot, key) in SHOP_KEYS.iter().enumerate() {
        if !is_key_pressed(*key) {
            continue;
        }
        match session.shop.buy(kind, slot + 1, &mut session.player) {
            Ok(tier) => info!("bought {}", tier.name),
            Err(err) => info!("purchase refused: {err}"),
        }
    }
    true
}

fn camera_zoom_for_fov(view_height: f32) -> Vec2 {
    let view_h = view_height.max(1.0);
    let aspect = screen_width().max(1.0) / screen_height().max(1.0);
    let view_w = view_h * aspect;
    vec2(2.0 / view_w, 2.0 / view_h)
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut loading_spin = 0.0f32;
    show_loading("Loading", loading_spin).await;

    let config = load_config();
    let mut session = new_session(&config, &mut loading_spin).await;
    let mut screen = Screen::Playing;

    let mut camera = Camera2D {
        target: session.player.position(),
        zoom: camera_zoom_for_fov(CAMERA_FOV),
        ..Default::default()
    };

    let mut fps = 0;
    let mut fps_timer = 0.0f32;
    let mut elapsed = 0.0f64;

    loop {
        let dt = get_frame_time();
        let input = capture_input(&camera);

        match screen {
            Screen::Playing if input.pause_pressed => screen = Screen::Paused,
            Screen::Playing => {
                elapsed += dt as f64;
                if is_key_pressed(KeyCode::Q) {
                    session.player.auto_attack = !session.player.auto_attack;
                }
                match session.tick(dt, &input) {
                    TickOutcome::ShopOpened => screen = Screen::Shop,
                    TickOutcome::PlayerDied => {
                        info!("player died in room {}", session.rooms.current_index());
                        screen = Screen::GameOver;
                    }
                    TickOutcome::RoomChanged(_) | TickOutcome::Continue => {}
                }
            }
            Screen::Paused if input.pause_pressed => screen = Screen::Playing,
            Screen::Paused => {}
            Screen::Shop => {
                if !handle_shop_keys(&mut session) {
                    screen = Screen::Playing;
                }
            }
            Screen::GameOver => {
                if is_key_pressed(KeyCode::R) {
                    session = new_session(&config, &mut loading_spin).await;
                    camera.target = session.player.position();
                    elapsed = 0.0;
                    screen = Screen::Playing;
                }
            }
        }

        camera.zoom = camera_zoom_for_fov(CAMERA_FOV);
        let follow = 1.0 - (-CAMERA_DRAG * dt).exp();
        camera.target += (session.player.position() - camera.target) * follow;

        set_camera(&camera);
        clear_background(BLACK);
        let ctx = RenderContext {
            camera: &camera,
            player: &session.player,
            time: elapsed,
        };
        draw_room(session.rooms.current_room(), &ctx);
        draw_player(&ctx);

        set_default_camera();
        draw_hud(&ctx, session.rooms.current_index(), session.rooms.room_count());
        match screen {
            Screen::Shop => draw_shop_menu(&session.shop, &session.player),
            Screen::Paused => draw_banner("Paused", "Esc or M to resume"),
            Screen::GameOver => draw_banner("You died", "R to restart"),
            Screen::Playing => {}
        }

        fps_timer += dt;
        if fps_timer >= 1.0 {
            fps = get_fps();
            fps_timer = 0.0;
        }
        draw_text(&format!("FPS: {fps}"), screen_width() - 140.0, 40.0, 30.0, WHITE);
        next_frame().await;
    }
}
