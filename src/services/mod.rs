pub mod chart;
pub mod quote;
