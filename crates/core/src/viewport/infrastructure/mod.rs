pub mod viewport_renderer;
