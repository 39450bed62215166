// ============================================================================
// OPS: pure raster math and document-wide operations
// ============================================================================
//
//   geometry.rs   screen → canvas-cell mapping
//   shapes.rs     cell rasterizer for lines, rectangles, ellipses, arcs
//   transform.rs  layer resampling filters
//   canvas_ops.rs zoom steps over canvas, layers, stroke and viewport
// ============================================================================

pub mod canvas_ops;
pub mod geometry;
pub mod shapes;
pub mod transform;
