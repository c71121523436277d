//! Progress reporting for substitution runs
//!
//! The processor emits structured events through a [`Reporter`] rather than
//! printing directly, so tests can capture what happened and alternative
//! frontends can render it differently. The stream is observational only:
//! nothing a reporter does feeds back into processing decisions.

use owo_colors::OwoColorize;

/// Sink for substitution progress events.
///
/// Event order for one collection: `collection_started`, then per object
/// `object_started`, one `field_replaced` or `field_unchanged` per declared
/// text field in declaration order, `persisting`/`persisted` when a
/// write-back happens, and finally `object_finished`.
pub trait Reporter {
    fn collection_started(&mut self, type_name: &str, title_field: Option<&str>, text_fields: &[String]);

    /// `title` is the object's title-field value, or `None` when the type
    /// declares no title field (or the attribute is absent on this object).
    fn object_started(&mut self, title: Option<&str>);

    fn field_replaced(&mut self, field: &str, old: &str, new: &str, count: usize);

    fn field_unchanged(&mut self, field: &str);

    /// A write-back is about to be issued for the current object.
    fn persisting(&mut self);

    fn persisted(&mut self);

    fn object_finished(&mut self, title: Option<&str>);
}

/// Renders events as human-readable text on stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn collection_started(&mut self, type_name: &str, title_field: Option<&str>, text_fields: &[String]) {
        println!("Processing {} objects", type_name);
        println!("Title field is {}", title_field.unwrap_or("not present"));
        println!("Text fields: {}", text_fields.join(", "));
    }

    fn object_started(&mut self, title: Option<&str>) {
        println!();
        println!("{}", "---------------------------------------------------------------".dimmed());
        match title {
            Some(title) => println!("Processing object: {}", title.bold()),
            None => println!("Processing next object"),
        }
    }

    fn field_replaced(&mut self, field: &str, old: &str, new: &str, count: usize) {
        println!("Processing text field: {}", field);
        println!("Replaced {} matches", count.green());
        println!("Old value:");
        println!("{}", old);
        println!();
        println!("New value:");
        println!("{}", new);
        println!();
    }

    fn field_unchanged(&mut self, field: &str) {
        println!("Processing text field: {}", field);
        println!("No replacements made.");
    }

    fn persisting(&mut self) {
        println!("Pushing changes to the course service...");
    }

    fn persisted(&mut self) {
        println!("Update complete.");
    }

    fn object_finished(&mut self, title: Option<&str>) {
        match title {
            Some(title) => println!("Done processing object: {}", title),
            None => println!("Done processing object"),
        }
    }
}
