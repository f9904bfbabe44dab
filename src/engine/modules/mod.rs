pub mod drum;
pub mod poly;

// Intentionally do not re-export modules here; import concrete types where needed
