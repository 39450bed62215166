use image::{Rgba, imageops};

use crate::canvas::Layer;
use crate::ops::transform::{self, Interpolation};

/// Ordered stack of committed layers.  Index 0 is the bottom; later layers
/// draw on top.
#[derive(Clone, Debug)]
pub struct LayerStack {
    layers: Vec<Layer>,
    /// Above this count the two bottom layers are merged on push.
    max_layers: usize,
    /// Running number for layer names ("Stroke 1", "Stroke 2", ...).
    stroke_counter: u64,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new(256)
    }
}

impl LayerStack {
    pub fn new(max_layers: usize) -> Self {
        Self {
            layers: Vec::new(),
            max_layers: max_layers.max(2),
            stroke_counter: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Bottom-to-top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn top(&self) -> Option<&Layer> {
        self.layers.last()
    }

    pub fn max_layers(&self) -> usize {
        self.max_layers
    }

    /// Name for the next committed stroke.
    pub fn next_stroke_name(&mut self) -> String {
        self.stroke_counter += 1;
        format!("Stroke {}", self.stroke_counter)
    }

    /// Append a layer on top.  Returns true if the stack hit its cap and the
    /// two bottom layers were merged to make room.
    pub fn push(&mut self, layer: Layer) -> bool {
        self.layers.push(layer);
        if self.layers.len() > self.max_layers {
            self.merge_bottom_pair();
            log_info!(
                "Layer cap {} reached, merged the two bottom layers",
                self.max_layers
            );
            return true;
        }
        false
    }

    /// Fold layer 1 onto layer 0.  The composite looks the same afterwards.
    fn merge_bottom_pair(&mut self) {
        if self.layers.len() < 2 {
            return;
        }
        let upper = self.layers.remove(1);
        let base = &mut self.layers[0];
        imageops::overlay(&mut base.pixels, &upper.pixels, 0, 0);
        base.name = "Merged".to_string();
    }

    /// Remove the most recent layer.  No-op on an empty stack.
    pub fn undo(&mut self) -> Option<Layer> {
        self.layers.pop()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Write transparent pixels at every cell into every layer, in place.
    pub fn erase_cells(&mut self, cells: &[(i32, i32)], cell_size: u32) {
        for layer in &mut self.layers {
            for &(x, y) in cells {
                layer.erase_cell(x, y, cell_size);
            }
        }
    }

    /// Top-most non-transparent pixel at `(x, y)`.
    pub fn sample(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        self.layers
            .iter()
            .rev()
            .filter_map(|layer| layer.pixel(x, y))
            .find(|p| p[3] > 0)
    }

    /// Resample every layer to the new canvas dimensions.
    pub fn resample(&mut self, width: u32, height: u32, interp: Interpolation) {
        let mut images: Vec<_> = self.layers.iter_mut().map(|l| &mut l.pixels).collect();
        transform::resample_all(&mut images, width, height, interp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::fill_cell;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn painted(name: &str, x: i32, y: i32, color: Rgba<u8>) -> Layer {
        let mut layer = Layer::new(name.to_string(), 40, 40);
        fill_cell(&mut layer.pixels, x, y, 10, color);
        layer
    }

    #[test]
    fn test_undo_pops_one_layer_at_a_time() {
        let mut stack = LayerStack::new(16);
        assert!(stack.undo().is_none());
        stack.push(painted("a", 0, 0, RED));
        stack.push(painted("b", 10, 0, BLUE));
        assert_eq!(stack.undo().map(|l| l.name), Some("b".to_string()));
        assert_eq!(stack.len(), 1);
        stack.undo();
        assert!(stack.is_empty());
        assert!(stack.undo().is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_sample_prefers_top_layer() {
        let mut stack = LayerStack::new(16);
        stack.push(painted("a", 0, 0, RED));
        stack.push(painted("b", 0, 0, BLUE));
        assert_eq!(stack.sample(5, 5), Some(BLUE));
        stack.undo();
        assert_eq!(stack.sample(5, 5), Some(RED));
        assert_eq!(stack.sample(25, 25), None);
        assert_eq!(stack.sample(-1, 5), None);
    }

    #[test]
    fn test_erase_hits_every_layer_and_adds_none() {
        let mut stack = LayerStack::new(16);
        stack.push(painted("a", 0, 0, RED));
        stack.push(painted("b", 0, 0, BLUE));
        stack.erase_cells(&[(0, 0)], 10);
        assert_eq!(stack.len(), 2);
        for layer in stack.layers() {
            assert!(layer.is_blank());
        }
    }

    #[test]
    fn test_cap_merges_bottom_pair_without_visual_change() {
        let mut stack = LayerStack::new(2);
        stack.push(painted("a", 0, 0, RED));
        stack.push(painted("b", 10, 0, BLUE));
        assert!(stack.push(painted("c", 20, 0, RED)));
        assert_eq!(stack.len(), 2);
        let base = &stack.layers()[0];
        assert_eq!(base.pixel(5, 5), Some(RED));
        assert_eq!(base.pixel(15, 5), Some(BLUE));
        assert_eq!(stack.layers()[1].name, "c");
    }

    #[test]
    fn test_resample_resizes_all_layers() {
        let mut stack = LayerStack::new(16);
        stack.push(painted("a", 0, 0, RED));
        stack.push(painted("b", 20, 20, BLUE));
        stack.resample(20, 20, Interpolation::Nearest);
        for layer in stack.layers() {
            assert_eq!((layer.width(), layer.height()), (20, 20));
        }
        assert_eq!(stack.sample(2, 2), Some(RED));
        assert_eq!(stack.sample(12, 12), Some(BLUE));
    }
}
