//! CLI argument parsing and the top-level run
//!
//! One invocation applies one regex/replacement pair to the selected object
//! types of one course. The pattern is compiled before anything talks to
//! Canvas, so a bad pattern aborts with zero side effects; any later failure
//! (fetch, write-back) halts the run where it stands.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};

use crate::canvas::CanvasClient;
use crate::config;
use crate::pattern::Pattern;
use crate::processor::ObjectTypeSpec;
use crate::report::ConsoleReporter;

/// Coursesed: bulk regex search-and-replace for Canvas course content
#[derive(Parser, Debug)]
#[command(
    name = "csed",
    version,
    about = "Bulk regex search-and-replace across Canvas course content",
    long_about = "Coursesed fetches the selected content collections (assignments, pages, \
                  quizzes) from a Canvas course, applies a regular-expression substitution \
                  to every text field of every object, and writes back only the objects \
                  whose text actually changed.\n\n\
                  The replacement may reference capture groups with $1 or ${name}. \
                  Changed objects are updated exactly once; nothing is retried.",
    group(
        ArgGroup::new("object_types")
            .required(true)
            .multiple(true)
            .args(["assignments", "pages", "quizzes", "all"])
    )
)]
pub struct Cli {
    /// Enable verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Process assignments
    #[arg(short, long)]
    pub assignments: bool,

    /// Process pages
    #[arg(short, long)]
    pub pages: bool,

    /// Process quizzes
    #[arg(short, long)]
    pub quizzes: bool,

    /// Process all types (assignments, pages, and quizzes)
    #[arg(short = 'A', long)]
    pub all: bool,

    /// Canvas course id (falls back to `course` in ~/.coursesed/config.toml)
    #[arg(short, long, value_name = "ID")]
    pub course: Option<u64>,

    /// Canvas instance base URL, e.g. https://canvas.example.edu
    /// (falls back to CANVAS_BASE_URL, then the config file)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// The regular expression to search for (Rust regex syntax)
    pub regex: String,

    /// The replacement text (capture groups as $1, ${name}; $$ for a literal $)
    pub replacement: String,
}

impl Cli {
    /// Execute the run described by the parsed arguments.
    pub fn execute(self) -> Result<()> {
        // Setup logging based on verbosity
        let log_level = match self.verbose {
            0 => "warn",   // Default: only warnings and errors
            1 => "info",   // -v: show info messages
            2 => "debug",  // -vv: show debug messages
            _ => "trace",  // -vvv: show trace messages
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();

        // Compile before any remote traffic: a bad pattern must abort with
        // no side effects
        let pattern = Pattern::compile(&self.regex, &self.replacement)?;

        let base_url = config::resolve_base_url(self.base_url.clone())?;
        let token = config::resolve_token()?;
        let course_id = config::resolve_course(self.course)?;
        let client = CanvasClient::new(base_url, token)?;

        let process_assignments = self.assignments || self.all;
        let process_pages = self.pages || self.all;
        let process_quizzes = self.quizzes || self.all;

        println!(
            "Object types being processed: {}{}{}",
            if process_assignments { "assignments " } else { "" },
            if process_pages { "pages " } else { "" },
            if process_quizzes { "quizzes " } else { "" },
        );

        println!("Reading course from Canvas...");
        let course = client
            .get_course(course_id)
            .context("Failed to look up course")?;
        match &course.term {
            Some(term) => println!("Using course: {} / {}", term.name, course.course_code),
            None => println!("Using course: {}", course.course_code),
        }

        let mut reporter = ConsoleReporter::new();

        if process_assignments {
            println!("Fetching assignments from Canvas...");
            let mut assignments = client
                .fetch_assignments(course.id)
                .context("Failed to fetch assignments")?;
            println!("Done fetching assignments from Canvas.");
            ObjectTypeSpec::new("assignment", "description", Some("name"))
                .process(&mut assignments, &pattern, &mut reporter)
                .context("Failed while processing assignments")?;
        }

        if process_pages {
            println!("Fetching pages from Canvas...");
            let mut pages = client
                .fetch_pages(course.id)
                .context("Failed to fetch pages")?;
            println!("Done fetching pages from Canvas.");
            ObjectTypeSpec::new("page", "body", Some("url"))
                .process(&mut pages, &pattern, &mut reporter)
                .context("Failed while processing pages")?;
        }

        if process_quizzes {
            println!("Fetching quizzes from Canvas...");
            let mut quizzes = client
                .fetch_quizzes(course.id)
                .context("Failed to fetch quizzes")?;
            println!("Done fetching quizzes from Canvas.");
            ObjectTypeSpec::new("quiz", "description", Some("title"))
                .process(&mut quizzes, &pattern, &mut reporter)
                .context("Failed while processing quizzes")?;
        }

        Ok(())
    }
}
