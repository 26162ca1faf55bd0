mod session_tests;
mod source_tests;
mod test_helpers;
mod yield_tests;
