//! Integration tests for rail-translate

mod test_forward;
mod test_reverse;
