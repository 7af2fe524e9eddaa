pub mod config;
pub mod logger;
pub mod util;
pub mod content;
pub mod knowledge_base;
pub mod selector;
pub mod caption;
pub mod render;
pub mod creator;
pub mod instagram;
pub mod poster;
pub mod supervisor;
pub mod pipeline;
mod test_data;
