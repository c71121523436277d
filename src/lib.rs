//! Coursesed: bulk regex search-and-replace for Canvas course content
//!
//! Coursesed applies one compiled regex/replacement pair uniformly across
//! heterogeneous course content objects (assignments, pages, quizzes) and
//! writes back only the objects whose text actually changed.
//!
//! # Architecture
//!
//! - **Pattern engine**: compiles the regex and replacement template once;
//!   substitution is a pure `(text) -> (new text, match count)` operation
//! - **Object-type processor**: declares which attributes of a content class
//!   hold text and drives the substitute-then-conditionally-persist pass
//! - **Canvas client**: fetches collections (with `Link`-header pagination)
//!   and pushes one write-back per changed object
//!
//! # Example Usage
//!
//! ```no_run
//! use coursesed::{CanvasClient, ConsoleReporter, ObjectTypeSpec, Pattern};
//!
//! let pattern = Pattern::compile("foo", "bar").unwrap();
//! let client = CanvasClient::new("https://canvas.example.edu", "token").unwrap();
//!
//! let mut assignments = client.fetch_assignments(12345).unwrap();
//! let spec = ObjectTypeSpec::new("assignment", "description", Some("name"));
//! spec.process(&mut assignments, &pattern, &mut ConsoleReporter::new()).unwrap();
//! ```

pub mod canvas;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod pattern;
pub mod processor;
pub mod report;

// Re-export commonly used types
pub use canvas::{CanvasClient, CanvasObject, Course};
pub use error::{FetchError, PatternError, PersistError, ProcessError};
pub use pattern::{Pattern, Substitution};
pub use processor::{ContentObject, ObjectTypeSpec, TextFields};
pub use report::{ConsoleReporter, Reporter};
