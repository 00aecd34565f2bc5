pub mod controllers;
pub mod filters;
