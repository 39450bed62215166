pub mod colors;
pub mod layers;
pub mod toolbar;
pub mod tools;
