use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hoshizu::content::{self, Course};
use hoshizu::storage::{BookmarkItem, QuizResult};
use hoshizu::{Config, Storage, export};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hoshizu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Use this config file instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark a lesson complete
    Complete { course: String, lesson: String },
    /// Mark a lesson not complete
    Uncomplete { course: String, lesson: String },
    /// Show completion for a course
    Progress {
        course: String,
        /// Lesson count (read from the content directory if omitted)
        #[arg(long)]
        total: Option<usize>,
    },
    /// Record the lesson being visited
    Visit { course: String, lesson: String },
    /// Show the last visited lesson
    Last,
    /// Quiz results
    #[command(subcommand)]
    Quiz(QuizCommand),
    /// Course certificates
    #[command(subcommand)]
    Certificate(CertificateCommand),
    /// Bookmarks
    #[command(subcommand)]
    Bookmark(BookmarkCommand),
    /// Mark an article read
    Read { slug: String },
    /// List read articles
    Reading,
    /// Print the table of contents of a lesson file
    Toc { path: PathBuf },
    /// Export learner state to a JSON backup
    Export {
        #[arg(default_value = "hoshizu-backup.json")]
        output: PathBuf,
    },
    /// Replace learner state with a JSON backup
    Import { input: PathBuf },
    /// Write a Markdown progress report
    Report {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete all learner state
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum QuizCommand {
    /// Save the latest attempt for a lesson
    Save {
        course: String,
        lesson: String,
        /// Selected option per question, comma separated
        #[arg(long, value_delimiter = ',')]
        answers: Vec<usize>,
        #[arg(long)]
        score: u32,
        #[arg(long)]
        total: u32,
    },
    /// Show the latest attempt for a lesson
    Show { course: String, lesson: String },
    /// List lessons scoring below a threshold
    Weak {
        #[arg(long, default_value_t = 70)]
        threshold: u8,
    },
}

#[derive(Subcommand)]
enum CertificateCommand {
    /// Issue a certificate if the course is finished
    Issue {
        course: String,
        /// Name printed on the certificate
        #[arg(long)]
        name: String,
        /// Lesson count (read from the content directory if omitted)
        #[arg(long)]
        total: Option<usize>,
    },
    /// Show the certificate for a course
    Show { course: String },
}

#[derive(Subcommand)]
enum BookmarkCommand {
    /// Bookmark a piece of content
    Add {
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long = "type", default_value = "article")]
        content_type: String,
    },
    /// Remove a bookmark
    Remove { slug: String },
    /// List bookmarks, newest first
    List,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hoshizu=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let storage = config.open_storage();

    run(cli.command, &config, &storage)
}

/// Load a course from the content directory, if it exists there
fn find_course(config: &Config, course_id: &str) -> Result<Option<Course>> {
    let dir = config.content_dir.join(course_id);
    if !dir.is_dir() {
        return Ok(None);
    }
    content::load_course(&dir).map(Some)
}

/// Lesson total from the flag, else from the course's content directory
fn lesson_total(config: &Config, course_id: &str, explicit: Option<usize>) -> Result<usize> {
    if let Some(total) = explicit {
        return Ok(total);
    }
    find_course(config, course_id)?.map(|c| c.lesson_count()).with_context(|| {
        format!(
            "Course {:?} not found under {:?}; pass --total",
            course_id, config.content_dir
        )
    })
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write report to {:?}", path)),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

fn run(command: Commands, config: &Config, storage: &Storage) -> Result<()> {
    match command {
        Commands::Complete { course, lesson } => {
            let data = storage.progress().mark_complete(&course, &lesson);
            println!("{}: {} lessons complete", course, data.completed_count(&course));
        }
        Commands::Uncomplete { course, lesson } => {
            let data = storage.progress().unmark_complete(&course, &lesson);
            println!("{}: {} lessons complete", course, data.completed_count(&course));
        }
        Commands::Progress { course, total } => {
            let total = lesson_total(config, &course, total)?;
            let progress = storage.progress();
            let done = progress.completed_lessons(&course);
            println!(
                "{}: {}/{} lessons ({}%)",
                course,
                done.len(),
                total,
                progress.completion_percent(&course, total)
            );
            for slug in done {
                println!("  [x] {}", slug);
            }
        }
        Commands::Visit { course, lesson } => {
            storage.progress().set_last_visited(&course, &lesson);
        }
        Commands::Last => match storage.progress().last_visited() {
            Some(last) => println!("{}/{}", last.course_id, last.lesson_slug),
            None => println!("No lesson visited yet"),
        },
        Commands::Quiz(QuizCommand::Save { course, lesson, answers, score, total }) => {
            anyhow::ensure!(score <= total, "Score {} exceeds total {}", score, total);
            let result = QuizResult { answers, score, total, completed_at: storage.now() };
            storage.quizzes().save_result(&course, &lesson, result);
        }
        Commands::Quiz(QuizCommand::Show { course, lesson }) => {
            match storage.quizzes().result(&course, &lesson) {
                Some(result) => println!(
                    "{}/{}: {}/{} ({}%) answers {:?}",
                    course,
                    lesson,
                    result.score,
                    result.total,
                    result.percent(),
                    result.answers
                ),
                None => println!("No quiz result for {}/{}", course, lesson),
            }
        }
        Commands::Quiz(QuizCommand::Weak { threshold }) => {
            for weak in storage.quizzes().weak_lessons(threshold) {
                println!("{}/{}: {}%", weak.course_id, weak.lesson_slug, weak.percent);
            }
        }
        Commands::Certificate(CertificateCommand::Issue { course, name, total }) => {
            let total = lesson_total(config, &course, total)?;
            let certificates = storage.certificates();
            let issued = match find_course(config, &course)? {
                Some(loaded) => certificates.issue_for_course(&loaded, &name),
                None => certificates.issue(&course, &name, &course, total),
            };
            match issued {
                Some(cert) => {
                    println!("Certificate issued to {} for {}", cert.user_name, cert.course_title)
                }
                None => println!(
                    "{} is {}% complete; finish every lesson first",
                    course,
                    storage.progress().completion_percent(&course, total)
                ),
            }
        }
        Commands::Certificate(CertificateCommand::Show { course }) => {
            match storage.certificates().certificate(&course) {
                Some(cert) => println!("{}: {} ({})", course, cert.course_title, cert.user_name),
                None => println!("No certificate for {}", course),
            }
        }
        Commands::Bookmark(BookmarkCommand::Add { slug, title, content_type }) => {
            storage.bookmarks().add(BookmarkItem {
                slug,
                title,
                content_type,
                bookmarked_at: storage.now(),
            });
        }
        Commands::Bookmark(BookmarkCommand::Remove { slug }) => {
            storage.bookmarks().remove(&slug);
        }
        Commands::Bookmark(BookmarkCommand::List) => {
            for item in storage.bookmarks().list() {
                println!("[{}] {} ({})", item.content_type, item.title, item.slug);
            }
        }
        Commands::Read { slug } => {
            storage.reading().mark_read(&slug);
        }
        Commands::Reading => {
            let reading = storage.reading();
            for slug in reading.all_read().keys() {
                println!("{}", slug);
            }
            println!("{} articles read", reading.read_count());
        }
        Commands::Toc { path } => {
            let markdown = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            for entry in content::extract_toc(&markdown) {
                let indent = if entry.level == 3 { "  " } else { "" };
                println!("{}- {} (#{})", indent, entry.text, entry.id);
            }
        }
        Commands::Export { output } => {
            export::export_backup(storage, &output)?;
        }
        Commands::Import { input } => {
            export::import_backup(storage, &input)?;
        }
        Commands::Report { output } => {
            let courses = if config.content_dir.is_dir() {
                content::load_courses(&config.content_dir)?
            } else {
                Vec::new()
            };
            let report = export::render_report(&storage.read(), &courses);
            write_output(output.as_deref(), &report)?;
        }
        Commands::Reset { yes } => {
            if yes {
                storage.clear();
                println!("Learner state cleared");
            } else {
                println!("This deletes all learner state. Re-run with --yes to confirm.");
            }
        }
    }

    Ok(())
}
