pub mod text_layout;
pub mod fonts;
pub mod compositor;
