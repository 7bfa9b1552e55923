#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    NotANumber(&'static str),
    NotFinite(&'static str),
    NotPositive(&'static str),
    NegativeElevation,
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotANumber(field) => {
                write!(f, "The {} has to be a number!", field)
            }
            DomainError::NotFinite(field) => {
                write!(f, "The {} has to be a finite number!", field)
            }
            DomainError::NotPositive(field) => {
                write!(f, "The {} has to be a positive number!", field)
            }
            DomainError::NegativeElevation => {
                write!(f, "The elevation gain cannot be negative!")
            }
        }
    }
}

impl std::error::Error for DomainError {}

pub type DomainResult<T> = Result<T, DomainError>;
