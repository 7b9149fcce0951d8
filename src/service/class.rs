/// The failure classes shared by every entity service.
///
/// Each service has its own error enum; this is the common vocabulary callers use to
/// decide how to respond without matching on per-entity variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A field failed its constraint. Client error.
    Validation,
    /// A reference names no existing row, or a delete would break one. Client error.
    ReferentialIntegrity,
    NotFound,
    /// The store failed; the operation's writes were rolled back. Server error.
    Storage,
}

impl ErrorClass {
    /// HTTP-equivalent status code.
    pub fn status(&self) -> u16 {
        match self {
            ErrorClass::Validation => 422,
            ErrorClass::ReferentialIntegrity => 409,
            ErrorClass::NotFound => 404,
            ErrorClass::Storage => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status() < 500
    }
}

pub trait Classify {
    fn class(&self) -> ErrorClass;
}
