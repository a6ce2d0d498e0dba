pub mod bullet;
pub mod config;
pub mod enemy;
pub mod game;
pub mod helpers;
pub mod layouts;
pub mod loader;
pub mod player;
pub mod props;
pub mod room;
pub mod room_manager;
pub mod shop;
pub mod tilemap;
