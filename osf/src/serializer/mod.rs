//! External (de)serialization of terms, knowledge-base documents, and results.
//!
//! Only JSON is supported ([`json`]). A term looks like:
//!
//! ```json
//! { "sort": "teacher", "features": { "works_at": { "sort": "university" } } }
//! ```

pub mod json;
