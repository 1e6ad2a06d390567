pub mod config;
pub mod reward;
pub mod run;
pub mod themes;
