//! Property-based tests for the async collective creator.
