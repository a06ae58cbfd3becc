pub mod composite_stream_use_case;
pub mod compositor_config;
pub mod frame_compositor;
pub mod frame_overlay;
pub mod pipeline_logger;
pub mod presentation_sink;
