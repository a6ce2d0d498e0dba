use macroquad::prelude::*;

type LayoutRect = (f32, f32, f32, f32);

const SHOP: &[LayoutRect] = &[
    (300.0, 200.0, 80.0, 80.0),
    (500.0, 300.0, 100.0, 100.0),
    (700.0, 200.0, 80.0, 80.0),
    (450.0, 500.0, 90.0, 90.0),
];

const NORMAL_1: &[LayoutRect] = &[
    (200.0, 150.0, 60.0, 60.0),
    (400.0, 300.0, 70.0, 70.0),
    (600.0, 450.0, 60.0, 60.0),
    (800.0, 200.0, 80.0, 80.0),
];

const NORMAL_2: &[LayoutRect] = &[
    (150.0, 300.0, 50.0, 50.0),
    (350.0, 150.0, 60.0, 60.0),
    (550.0, 500.0, 70.0, 70.0),
    (750.0, 350.0, 60.0, 60.0),
    (950.0, 200.0, 50.0, 50.0),
];

const NORMAL_3: &[LayoutRect] = &[
    (300.0, 100.0, 80.0, 80.0),
    (500.0, 250.0, 60.0, 60.0),
    (700.0, 400.0, 70.0, 70.0),
    (900.0, 550.0, 60.0, 60.0),
];

const NORMAL_4: &[LayoutRect] = &[
    (250.0, 400.0, 70.0, 70.0),
    (450.0, 200.0, 60.0, 60.0),
    (650.0, 350.0, 80.0, 80.0),
    (850.0, 500.0, 60.0, 60.0),
    (1050.0, 150.0, 50.0, 50.0),
];

const NORMAL_5: &[LayoutRect] = &[
    (200.0, 250.0, 60.0, 60.0),
    (400.0, 450.0, 70.0, 70.0),
    (600.0, 200.0, 60.0, 60.0),
    (800.0, 400.0, 80.0, 80.0),
    (1000.0, 300.0, 60.0, 60.0),
];

const NORMAL_6: &[LayoutRect] = &[
    (150.0, 500.0, 50.0, 50.0),
    (350.0, 300.0, 60.0, 60.0),
    (550.0, 100.0, 70.0, 70.0),
    (750.0, 450.0, 60.0, 60.0),
    (950.0, 250.0, 70.0, 70.0),
];

const NORMAL_7: &[LayoutRect] = &[
    (300.0, 350.0, 80.0, 80.0),
    (500.0, 150.0, 60.0, 60.0),
    (700.0, 500.0, 70.0, 70.0),
    (900.0, 300.0, 60.0, 60.0),
];

const NORMAL_8: &[LayoutRect] = &[
    (200.0, 100.0, 60.0, 60.0),
    (400.0, 400.0, 70.0, 70.0),
    (600.0, 250.0, 60.0, 60.0),
    (800.0, 550.0, 80.0, 80.0),
    (1000.0, 200.0, 60.0, 60.0),
];

const NORMAL_9: &[LayoutRect] = &[
    (250.0, 300.0, 70.0, 70.0),
    (450.0, 500.0, 60.0, 60.0),
    (650.0, 150.0, 80.0, 80.0),
    (850.0, 350.0, 60.0, 60.0),
];

const NORMAL_10: &[LayoutRect] = &[
    (150.0, 200.0, 50.0, 50.0),
    (350.0, 450.0, 60.0, 60.0),
    (550.0, 300.0, 70.0, 70.0),
    (750.0, 100.0, 60.0, 60.0),
    (950.0, 500.0, 70.0, 70.0),
    (1100.0, 250.0, 50.0, 50.0),
];

const BOSS: &[LayoutRect] = &[
    (300.0, 200.0, 100.0, 100.0),
    (500.0, 400.0, 100.0, 100.0),
    (700.0, 200.0, 100.0, 100.0),
    (900.0, 400.0, 100.0, 100.0),
];

pub const NORMAL_LAYOUT_COUNT: usize = 10;

/// Hand-authored obstacle rectangles for a layout id.
pub fn layout(id: &str) -> Option<Vec<Rect>> {
    let rects = match id {
        "shop" => SHOP,
        "normal_1" => NORMAL_1,
        "normal_2" => NORMAL_2,
        "normal_3" => NORMAL_3,
        "normal_4" => NORMAL_4,
        "normal_5" => NORMAL_5,
        "normal_6" => NORMAL_6,
        "normal_7" => NORMAL_7,
        "normal_8" => NORMAL_8,
        "normal_9" => NORMAL_9,
        "normal_10" => NORMAL_10,
        "boss" => BOSS,
        _ => return None,
    };
    Some(rects.iter().map(|&(x, y, w, h)| Rect::new(x, y, w, h)).collect())
}

/// Layout id for the `index`-th normal room; wraps after the catalogue runs out.
pub fn normal_layout_id(index: usize) -> String {
    format!("normal_{}", index % NORMAL_LAYOUT_COUNT + 1)
}
