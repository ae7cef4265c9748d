// Domain layer - Core types and edit policy

pub mod model;
pub mod rules;
