use crate::model::AccessError;

/// Proof that the caller passed the access check. Only `authorize` can mint
/// one, and the batch entry point requires it.
#[derive(Debug)]
pub struct AccessGrant {
    _private: (),
}

/// No configured code means the tool is open; otherwise the supplied code
/// must match exactly.
pub fn authorize(expected: Option<&str>, supplied: Option<&str>) -> Result<AccessGrant, AccessError> {
    match expected.filter(|code| !code.is_empty()) {
        None => Ok(AccessGrant { _private: () }),
        Some(code) => match supplied {
            None => Err(AccessError::Missing),
            Some(given) if given == code => Ok(AccessGrant { _private: () }),
            Some(_) => Err(AccessError::Rejected),
        },
    }
}
