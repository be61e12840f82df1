// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Error codes reported by the EXTI and SYSCFG drivers.

/// Errors returned by the fallible EXTI operations.
///
/// Success is expressed as `Ok(())`; this enum only carries the failure
/// cases. Operations never retry internally, and a failure does not undo
/// register writes that were already performed (see `Exti::init`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition: an invalid enumeration value or an
    /// incomplete configuration field
    FAIL = 0,
    /// A required reference (configuration record or output slot) was not
    /// supplied
    NOREF = 1,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

/// Convert a `Result<(), ErrorCode>` to a numeric status code.
///
/// Success maps to 0 and each `ErrorCode` to its discriminant plus one, so
/// `FAIL` is 1 and `NOREF` is 2.
pub fn into_statuscode(r: Result<(), ErrorCode>) -> usize {
    match r {
        Ok(()) => 0,
        Err(e) => usize::from(e) + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuscodes_are_distinct() {
        assert_eq!(into_statuscode(Ok(())), 0);
        assert_eq!(into_statuscode(Err(ErrorCode::FAIL)), 1);
        assert_eq!(into_statuscode(Err(ErrorCode::NOREF)), 2);
    }
}
