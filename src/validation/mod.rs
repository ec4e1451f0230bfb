//! Declarative request validation: rule schemas and the interpreter that applies them.

mod engine;
pub mod formats;
mod rules;

pub use engine::validate;
pub use rules::{
    CustomCheck, FieldRule, FieldType, RuleFault, ValidationError, ValidationResult,
    ValidationSchema,
};
