pub mod answer;
pub mod declaration;
pub mod spec;
pub mod validation;
