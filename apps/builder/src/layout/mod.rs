// Export layout: standard-face glyph widths and A4 pagination of the
// rendered preview. Pure computation, safe to run on the blocking pool.

pub mod font_metrics;
pub mod paginate;

pub use font_metrics::{a4_page_config, FontFamily, PageConfig, StandardFont};
pub use paginate::{paginate, LineStyle, Page, Pagination, PlacedLine, StyledLine};
