use std::collections::HashMap;
use std::path::Path;

use log::warn;
use macroquad::file::load_string;

use crate::tilemap::{self, LoadedMap, MapError, TilesetDef};

/// Fetches a Tiled JSON map and any external JSON tilesets it references.
/// Tilesets that cannot be fetched degrade to full-cell collision.
pub async fn load_map(path: &str) -> Result<LoadedMap, MapError> {
    let raw = load_string(path).await.map_err(|err| MapError::File {
        path: path.to_string(),
        message: err.to_string(),
    })?;
    let document = tilemap::parse_map(&raw)?;

    let mut external: HashMap<String, TilesetDef> = HashMap::new();
    for source in document.external_tileset_sources() {
        if external.contains_key(source) {
            continue;
        }
        if !is_json_tileset(source) {
            warn!("tileset {source} is not a JSON tileset and is not supported");
            continue;
        }
        let tileset_path = resolve_relative(path, source);
        match load_string(&tileset_path).await {
            Ok(raw) => match tilemap::parse_tileset(&raw) {
                Ok(def) => {
                    external.insert(source.to_string(), def);
                }
                Err(err) => warn!("tileset {tileset_path}: {err}"),
            },
            Err(err) => warn!("tileset {tileset_path}: {err}"),
        }
    }

    LoadedMap::from_document(&document, &external)
}

pub fn is_json_tileset(source: &str) -> bool {
    Path::new(source)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("tsj") || ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Resolves `source` against the directory of `map_path`, folding `.` and `..`.
pub fn resolve_relative(map_path: &str, source: &str) -> String {
    let source = source.replace('\\', "/");
    if source.starts_with('/') {
        return source;
    }
    let map_path = map_path.replace('\\', "/");
    let mut parts: Vec<&str> = match map_path.rfind('/') {
        Some(idx) => map_path[..idx].split('/').collect(),
        None => Vec::new(),
    };
    for part in source.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." && !last.is_empty() => {
                    parts.pop();
                }
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    parts.join("/")
}
