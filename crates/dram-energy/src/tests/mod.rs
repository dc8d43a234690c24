//! Unit tests.

use crate::error::Error;

mod test_voltage_domain;

/// Unwraps the field name of an `InvalidParameter` error.
fn invalid_field(err: Error) -> &'static str {
    match err {
        Error::InvalidParameter { field, .. } => field,
        other => panic!("expected InvalidParameter, got {other}"),
    }
}
