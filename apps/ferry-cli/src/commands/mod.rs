pub mod glob;
pub mod labels;
pub mod run;
