// Engine library behind the GridPaint binary: document model, rasterizer,
// compositor and the headless replay front end.
#![allow(clippy::too_many_arguments)]

#[macro_use]
pub mod logger;

pub mod app;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod compositor;
pub mod io;
pub mod ops;
pub mod session;
pub mod settings;
pub mod viewport;
