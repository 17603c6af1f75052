use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NumericError {
    #[error("coordinate transform is singular (determinant {determinant})")]
    SingularTransform { determinant: f64 },
}
