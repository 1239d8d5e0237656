// Pagination engine: block plan → measured heights → greedy atomic page packing.
// Packing is CPU-bound; async callers go through PaginationEngine, which runs it
// inside tokio::task::spawn_blocking.

pub mod block;
pub mod engine;
pub mod font_metrics;
pub mod handlers;
pub mod measure;
pub mod packer;
pub mod page_config;
pub mod rich_text;
pub mod text_metrics;

// Re-export the public API consumed by the preview, export and handler modules.
pub use engine::{PaginationEngine, SharedCache};
pub use measure::MeasurementProvider;
pub use packer::{Page, Pagination};
pub use page_config::{default_page_config, LayoutError, PageConfig};
pub use text_metrics::TextMetricsProvider;
