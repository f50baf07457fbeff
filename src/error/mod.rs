/// Failures surfaced to the user. Ignored operations (bad indices, duplicate
/// countries, empty names) are not errors and never produce one of these.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TripError {
    #[error("Trip not found: {0}")]
    NotFound(String),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Could not save trip: {0}")]
    Persistence(String),

    #[error("Session expired, please sign in again")]
    Unauthorized,
}

impl TripError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TripError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(TripError::NotFound("t1".into()).to_string(), "Trip not found: t1");
        assert_eq!(
            TripError::Storage("quota".into()).to_string(),
            "Storage failure: quota"
        );
        assert!(TripError::Unauthorized.is_unauthorized());
        assert!(!TripError::Persistence("x".into()).is_unauthorized());
    }
}
