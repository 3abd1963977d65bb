//! Parsers pour le document topologique

pub mod arcs;
pub mod document;
