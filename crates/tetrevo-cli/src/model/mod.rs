pub mod training_config;
pub mod weight_model;
