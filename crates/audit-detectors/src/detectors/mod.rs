pub mod images;
pub mod mobile;
pub mod render_blocking;
pub mod security_headers;
pub mod seo_elements;
