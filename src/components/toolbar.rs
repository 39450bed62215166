use eframe::egui::{Pos2, Rect, Vec2};

use crate::components::tools::Tool;

/// Toolbar hit rectangles supplied by the surrounding UI.
pub trait ToolbarLayout {
    fn tool_at(&self, pos: Pos2) -> Option<Tool>;

    fn buttons(&self) -> Vec<(Rect, Tool)>;
}

/// One horizontal row of equally sized buttons, one per tool.
#[derive(Clone, Debug)]
pub struct ToolbarRow {
    pub origin: Pos2,
    pub button_size: Vec2,
    pub gap: f32,
}

impl Default for ToolbarRow {
    fn default() -> Self {
        Self {
            origin: Pos2::new(360.0, 35.0),
            button_size: Vec2::new(80.0, 30.0),
            gap: 6.0,
        }
    }
}

impl ToolbarLayout for ToolbarRow {
    fn tool_at(&self, pos: Pos2) -> Option<Tool> {
        self.buttons()
            .into_iter()
            .find(|(rect, _)| rect.contains(pos))
            .map(|(_, tool)| tool)
    }

    fn buttons(&self) -> Vec<(Rect, Tool)> {
        Tool::all()
            .iter()
            .enumerate()
            .map(|(i, &tool)| {
                let min = self.origin + Vec2::new(i as f32 * (self.button_size.x + self.gap), 0.0);
                (Rect::from_min_size(min, self.button_size), tool)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_button_maps_to_its_tool() {
        let bar = ToolbarRow::default();
        let buttons = bar.buttons();
        assert_eq!(buttons.len(), Tool::all().len());
        for (rect, tool) in buttons {
            assert_eq!(bar.tool_at(rect.center()), Some(tool));
        }
    }

    #[test]
    fn test_gap_between_buttons_is_dead_space() {
        let bar = ToolbarRow::default();
        let gap_x = bar.origin.x + bar.button_size.x + bar.gap / 2.0;
        assert_eq!(bar.tool_at(Pos2::new(gap_x, bar.origin.y + 5.0)), None);
    }
}
