use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Value {value} in '{field}' cannot be represented as a decimal for rounding")]
    NotRepresentable { field: &'static str, value: f64 },
}
