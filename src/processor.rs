//! Object-type processor: drives substitution across a collection
//!
//! An [`ObjectTypeSpec`] declares, for one class of content objects, which
//! attributes hold substitutable text and which attribute identifies an
//! object in reports. The same spec instance is built once per run and
//! reused across every object of that type.
//!
//! Objects are processed strictly sequentially, one field at a time. An
//! object is written back at most once per pass, and only when at least one
//! of its fields actually changed; an unmodified object never causes a
//! write.

use crate::error::ProcessError;
use crate::pattern::Pattern;
use crate::report::Reporter;

/// Keyed access to a remote content object's attributes, plus the ability to
/// push staged changes back to the remote store.
///
/// Implemented by an adapter per concrete object class. `set` is local and
/// in-memory; nothing reaches the remote store until `persist`, which pushes
/// all staged changes in one operation.
pub trait ContentObject {
    /// Read a text attribute. `None` means the attribute is absent or does
    /// not hold text.
    fn get(&self, field: &str) -> Option<&str>;

    /// Stage a new value for a text attribute, in memory only.
    fn set(&mut self, field: &str, value: String);

    /// Push every staged change to the remote store. Called at most once per
    /// processing pass, and only when something changed.
    fn persist(&mut self) -> Result<(), crate::error::PersistError>;
}

/// Ordered list of text-bearing attribute names.
///
/// Callers may name a single field or a sequence; both normalize here, at
/// construction, so the rest of the processor only ever sees a `Vec`.
#[derive(Debug, Clone)]
pub struct TextFields(Vec<String>);

impl From<&str> for TextFields {
    fn from(field: &str) -> Self {
        Self(vec![field.to_string()])
    }
}

impl From<String> for TextFields {
    fn from(field: String) -> Self {
        Self(vec![field])
    }
}

impl From<Vec<String>> for TextFields {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl From<Vec<&str>> for TextFields {
    fn from(fields: Vec<&str>) -> Self {
        Self(fields.iter().map(|f| f.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TextFields {
    fn from(fields: [&str; N]) -> Self {
        Self(fields.iter().map(|f| f.to_string()).collect())
    }
}

/// Describes one class of content objects: its reporting label, which
/// attributes carry substitutable text, and (optionally) which attribute
/// names an object in reports.
#[derive(Debug, Clone)]
pub struct ObjectTypeSpec {
    type_name: String,
    text_fields: Vec<String>,
    title_field: Option<String>,
}

impl ObjectTypeSpec {
    /// Build a spec. `text_fields` accepts a single field name or an ordered
    /// sequence of names; `title_field` may be omitted, in which case reports
    /// fall back to a generic label.
    pub fn new(
        type_name: impl Into<String>,
        text_fields: impl Into<TextFields>,
        title_field: Option<&str>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            text_fields: text_fields.into().0,
            title_field: title_field.map(str::to_string),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Apply `pattern` to every declared text field of every object, in
    /// iteration order, persisting each object that changed.
    ///
    /// Objects are independent: order affects report readability only. The
    /// first error halts the pass; objects persisted before the failure
    /// stay persisted (each object is its own unit of atomicity).
    pub fn process<O: ContentObject>(
        &self,
        objects: &mut [O],
        pattern: &Pattern,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ProcessError> {
        log::debug!(
            "processing {} {} object(s) with pattern `{}`",
            objects.len(),
            self.type_name,
            pattern.as_str()
        );
        reporter.collection_started(
            &self.type_name,
            self.title_field.as_deref(),
            &self.text_fields,
        );
        for object in objects.iter_mut() {
            self.process_one(object, pattern, reporter)?;
        }
        Ok(())
    }

    /// Process a single object: substitute each text field, then write the
    /// object back exactly once if any field changed.
    fn process_one<O: ContentObject>(
        &self,
        object: &mut O,
        pattern: &Pattern,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ProcessError> {
        // Owned copy: the title borrow must not outlive the mutations below
        let title = self
            .title_field
            .as_deref()
            .and_then(|field| object.get(field))
            .map(str::to_string);
        reporter.object_started(title.as_deref());

        let mut changed = false;
        for field in &self.text_fields {
            let old = object
                .get(field)
                .ok_or_else(|| ProcessError::MissingField {
                    type_name: self.type_name.clone(),
                    field: field.clone(),
                })?
                .to_string();
            let substitution = pattern.substitute(&old);
            if substitution.count > 0 {
                reporter.field_replaced(field, &old, &substitution.text, substitution.count);
                // Written back immediately so the in-memory object carries
                // every accumulated change when persist runs
                object.set(field, substitution.text);
                changed = true;
            } else {
                reporter.field_unchanged(field);
            }
        }

        if changed {
            reporter.persisting();
            object.persist()?;
            reporter.persisted();
        }

        reporter.object_finished(title.as_deref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistError;
    use std::collections::BTreeMap;

    #[derive(Debug, Default)]
    struct FakeObject {
        fields: BTreeMap<String, String>,
        persist_calls: usize,
        fail_persist: bool,
    }

    impl FakeObject {
        fn with_fields(pairs: &[(&str, &str)]) -> Self {
            Self {
                fields: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl ContentObject for FakeObject {
        fn get(&self, field: &str) -> Option<&str> {
            self.fields.get(field).map(String::as_str)
        }

        fn set(&mut self, field: &str, value: String) {
            self.fields.insert(field.to_string(), value);
        }

        fn persist(&mut self) -> Result<(), PersistError> {
            if self.fail_persist {
                return Err(PersistError::Rejected {
                    status: 500,
                    url: "fake".to_string(),
                    body: "boom".to_string(),
                });
            }
            self.persist_calls += 1;
            Ok(())
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        CollectionStarted(String),
        ObjectStarted(Option<String>),
        FieldReplaced(String, usize),
        FieldUnchanged(String),
        Persisting,
        Persisted,
        ObjectFinished(Option<String>),
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Vec<Event>,
    }

    impl Reporter for RecordingReporter {
        fn collection_started(&mut self, type_name: &str, _title: Option<&str>, _fields: &[String]) {
            self.events.push(Event::CollectionStarted(type_name.to_string()));
        }
        fn object_started(&mut self, title: Option<&str>) {
            self.events.push(Event::ObjectStarted(title.map(str::to_string)));
        }
        fn field_replaced(&mut self, field: &str, _old: &str, _new: &str, count: usize) {
            self.events.push(Event::FieldReplaced(field.to_string(), count));
        }
        fn field_unchanged(&mut self, field: &str) {
            self.events.push(Event::FieldUnchanged(field.to_string()));
        }
        fn persisting(&mut self) {
            self.events.push(Event::Persisting);
        }
        fn persisted(&mut self) {
            self.events.push(Event::Persisted);
        }
        fn object_finished(&mut self, title: Option<&str>) {
            self.events.push(Event::ObjectFinished(title.map(str::to_string)));
        }
    }

    fn pattern(re: &str, repl: &str) -> Pattern {
        Pattern::compile(re, repl).unwrap()
    }

    #[test]
    fn test_changed_object_is_rewritten_and_persisted_once() {
        let spec = ObjectTypeSpec::new("assignment", "description", Some("name"));
        let mut objects = vec![FakeObject::with_fields(&[
            ("name", "HW1"),
            ("description", "foo and foo again"),
        ])];
        let mut reporter = RecordingReporter::default();

        spec.process(&mut objects, &pattern("foo", "bar"), &mut reporter)
            .unwrap();

        assert_eq!(objects[0].get("description"), Some("bar and bar again"));
        assert_eq!(objects[0].persist_calls, 1);
        assert!(reporter
            .events
            .contains(&Event::FieldReplaced("description".to_string(), 2)));
        assert!(reporter
            .events
            .contains(&Event::ObjectStarted(Some("HW1".to_string()))));
    }

    #[test]
    fn test_unchanged_object_is_never_persisted() {
        let spec = ObjectTypeSpec::new("assignment", "description", Some("name"));
        let mut objects = vec![FakeObject::with_fields(&[
            ("name", "HW2"),
            ("description", "nothing here"),
        ])];
        let mut reporter = RecordingReporter::default();

        spec.process(&mut objects, &pattern("foo", "bar"), &mut reporter)
            .unwrap();

        assert_eq!(objects[0].get("description"), Some("nothing here"));
        assert_eq!(objects[0].persist_calls, 0);
        assert!(!reporter.events.contains(&Event::Persisting));
    }

    #[test]
    fn test_fields_are_independent_and_persist_runs_once() {
        let spec = ObjectTypeSpec::new("page", vec!["body", "summary"], None);
        let mut objects = vec![FakeObject::with_fields(&[
            ("body", "foo here"),
            ("summary", "untouched"),
        ])];
        let mut reporter = RecordingReporter::default();

        spec.process(&mut objects, &pattern("foo", "bar"), &mut reporter)
            .unwrap();

        assert_eq!(objects[0].get("body"), Some("bar here"));
        assert_eq!(objects[0].get("summary"), Some("untouched"));
        assert_eq!(objects[0].persist_calls, 1);
        let persists = reporter
            .events
            .iter()
            .filter(|e| **e == Event::Persisting)
            .count();
        assert_eq!(persists, 1);
    }

    #[test]
    fn test_any_changed_field_triggers_persist_even_when_last_does_not() {
        // The first field matches, the last does not; the object must still
        // be written back
        let spec = ObjectTypeSpec::new("page", vec!["body", "summary"], None);
        let mut objects = vec![FakeObject::with_fields(&[
            ("body", "foo"),
            ("summary", "clean"),
        ])];
        let mut reporter = RecordingReporter::default();

        spec.process(&mut objects, &pattern("foo", "bar"), &mut reporter)
            .unwrap();

        assert_eq!(objects[0].persist_calls, 1);
    }

    #[test]
    fn test_missing_title_field_falls_back_to_generic_label() {
        let spec = ObjectTypeSpec::new("quiz", "description", None);
        let mut objects = vec![FakeObject::with_fields(&[("description", "foo")])];
        let mut reporter = RecordingReporter::default();

        spec.process(&mut objects, &pattern("foo", "bar"), &mut reporter)
            .unwrap();

        assert!(reporter.events.contains(&Event::ObjectStarted(None)));
        assert!(reporter.events.contains(&Event::ObjectFinished(None)));
    }

    #[test]
    fn test_declared_title_absent_on_object_degrades_gracefully() {
        let spec = ObjectTypeSpec::new("quiz", "description", Some("title"));
        let mut objects = vec![FakeObject::with_fields(&[("description", "foo")])];
        let mut reporter = RecordingReporter::default();

        spec.process(&mut objects, &pattern("foo", "bar"), &mut reporter)
            .unwrap();

        assert!(reporter.events.contains(&Event::ObjectStarted(None)));
        assert_eq!(objects[0].persist_calls, 1);
    }

    #[test]
    fn test_scalar_text_fields_matches_sequence_form() {
        let scalar = ObjectTypeSpec::new("page", "body", None);
        let sequence = ObjectTypeSpec::new("page", vec!["body"], None);

        for spec in [scalar, sequence] {
            let mut objects = vec![FakeObject::with_fields(&[("body", "foo")])];
            let mut reporter = RecordingReporter::default();
            spec.process(&mut objects, &pattern("foo", "bar"), &mut reporter)
                .unwrap();
            assert_eq!(objects[0].get("body"), Some("bar"));
            assert_eq!(objects[0].persist_calls, 1);
        }
    }

    #[test]
    fn test_second_pass_over_exhausted_objects_does_not_persist() {
        let spec = ObjectTypeSpec::new("assignment", "description", None);
        let mut objects = vec![FakeObject::with_fields(&[("description", "foo foo")])];
        let p = pattern("foo", "bar");

        let mut reporter = RecordingReporter::default();
        spec.process(&mut objects, &p, &mut reporter).unwrap();
        assert_eq!(objects[0].persist_calls, 1);

        // Same objects, same pattern: nothing left to replace
        let mut reporter = RecordingReporter::default();
        spec.process(&mut objects, &p, &mut reporter).unwrap();
        assert_eq!(objects[0].persist_calls, 1);
        assert!(!reporter.events.contains(&Event::Persisting));
    }

    #[test]
    fn test_missing_text_field_is_an_error() {
        let spec = ObjectTypeSpec::new("assignment", "description", None);
        let mut objects = vec![FakeObject::with_fields(&[("name", "HW1")])];
        let mut reporter = RecordingReporter::default();

        let err = spec
            .process(&mut objects, &pattern("foo", "bar"), &mut reporter)
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessError::MissingField { field, .. } if field == "description"
        ));
    }

    #[test]
    fn test_persist_failure_halts_before_later_objects() {
        let spec = ObjectTypeSpec::new("assignment", "description", Some("name"));
        let mut failing = FakeObject::with_fields(&[("name", "HW1"), ("description", "foo")]);
        failing.fail_persist = true;
        let mut objects = vec![
            failing,
            FakeObject::with_fields(&[("name", "HW2"), ("description", "foo")]),
        ];
        let mut reporter = RecordingReporter::default();

        let err = spec
            .process(&mut objects, &pattern("foo", "bar"), &mut reporter)
            .unwrap_err();
        assert!(matches!(err, ProcessError::Persist(_)));

        // The second object was never reached
        assert_eq!(objects[1].get("description"), Some("foo"));
        assert_eq!(objects[1].persist_calls, 0);
        assert!(!reporter
            .events
            .contains(&Event::ObjectStarted(Some("HW2".to_string()))));
    }
}
