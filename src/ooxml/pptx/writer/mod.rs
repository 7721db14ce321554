//! Generated payloads embedded alongside presentation parts.

pub mod excel_embed;

pub use excel_embed::generate_chart_excel_data;
