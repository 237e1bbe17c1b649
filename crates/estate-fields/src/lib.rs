//! Field Extraction Engine
//!
//! Turns an answer-set export into a flat, typed [`FieldTable`]:
//!
//! - **Parser**: a single streaming pass over the markup
//! - **Coercion**: boolean, number, and day-first date normalization, with
//!   exporter artifacts ("None", short digit strings) mapped to absent
//! - **Table**: ordered name → scalar-or-list map with typed accessors
//!
//! # Example
//!
//! ```
//! use estate_fields::parse_answer_set;
//!
//! let markup = r#"<AnswerSet>
//!   <Answer name="Client DOB"><DateValue>25/12/1980</DateValue></Answer>
//! </AnswerSet>"#;
//!
//! let table = parse_answer_set(markup).unwrap();
//! assert_eq!(table.text("Client DOB"), Some("1980-12-25"));
//! ```

pub mod error;
pub mod parser;
pub mod table;
pub mod value;

pub use error::{FieldError, ParseError};
pub use parser::{parse_answer_set, AnswerSetParser, DEFAULT_MAX_MARKUP_BYTES};
pub use table::{FieldEntry, FieldTable};
pub use value::{coerce, normalize_date, parse_number, FieldValue, ValueKind};
