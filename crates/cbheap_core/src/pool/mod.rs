//! Upload pages and the rings that recycle them

mod page;
mod ring;

pub use page::Page;
pub use ring::PageRing;
