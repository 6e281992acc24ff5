//! Inline style reading and box geometry.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in page coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Edge-inclusive point test, as browser hit-testing treats box borders.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Layout box plus stacking level for one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub rect: Rect,
    pub z_index: i32,
}

/// Parses `name: value; ...` declarations into lowercase-name pairs.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim().to_string()))
        })
        .collect()
}

/// Returns the last declared value of `property`, as cascade order would.
pub fn declared_value<'a>(declarations: &'a [(String, String)], property: &str) -> Option<&'a str> {
    declarations
        .iter()
        .rev()
        .find(|(name, _)| name == property)
        .map(|(_, value)| value.as_str())
}

/// Reads an absolute box from `left/top/width/height` pixel declarations.
///
/// Returns `None` unless all four are present; `z-index` defaults to 0.
pub fn layout_from_style(style: &str) -> Option<LayoutBox> {
    let declarations = parse_declarations(style);
    let px = |property: &str| declared_value(&declarations, property).and_then(parse_px);
    let rect = Rect::new(px("left")?, px("top")?, px("width")?, px("height")?);
    let z_index = declared_value(&declarations, "z-index")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    Some(LayoutBox { rect, z_index })
}

fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number.trim().parse().ok()
}
