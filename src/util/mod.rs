pub mod hex_color;
pub mod flat_file;
