pub mod node;
pub mod run;
