pub mod proc_loader;
pub mod proc_validator;
pub mod run;
pub mod settings;
