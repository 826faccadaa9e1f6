use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use coursepath::api::{ApiClient, CourseApi};
use coursepath::app::ExitReason;
use coursepath::catalog::CourseCatalog;
use coursepath::certificate::{CertificateConfig, CertificateTag};
use coursepath::config::session::SessionHandle;
use coursepath::grading::{GradeInput, SubmissionStats};
use coursepath::notifications::NotificationCenter;
use coursepath::{App, Config, SequentialTracker};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coursepath")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the learning platform
    Login {
        /// Account email
        email: String,
    },
    /// Forget the stored session
    Logout,
    /// List your courses
    Courses,
    /// Rename a course you teach
    Rename {
        course_id: String,
        title: String,
    },
    /// Study a course lesson by lesson
    Study {
        course_id: String,
    },
    /// Show notifications
    Notifications {
        /// Mark everything read afterwards
        #[arg(long)]
        read: bool,
    },
    /// Submission statistics for an assignment
    Stats {
        assignment_id: String,
        /// Pass mark as a percentage of max points
        #[arg(long, default_value_t = 60.0)]
        pass: f64,
    },
    /// Grade a submission
    Grade {
        assignment_id: String,
        submission_id: String,
        score: f64,
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Certificate configuration
    Certificate {
        #[command(subcommand)]
        action: CertificateCommand,
    },
}

#[derive(Subcommand)]
enum CertificateCommand {
    /// Validate a configuration file and preview its tags
    Check {
        /// Path to the JSON configuration
        file: PathBuf,
    },
    /// Validate a configuration file and save it to a course
    Publish {
        course_id: String,
        file: PathBuf,
        /// Upload this image as the template first
        #[arg(long)]
        template: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let studying = matches!(cli.command, Commands::Study { .. });
    init_logging(studying)?;

    let config = Config::load()?;
    let session = SessionHandle::persistent()?;
    let client = ApiClient::new(&config, session.clone());

    match cli.command {
        Commands::Login { email } => {
            let password = prompt_password()?;
            let signed_in = client.login(&email, &password).await.context("Login failed")?;
            println!("Signed in as {} ({:?})", signed_in.user.name, signed_in.user.role);
        }
        Commands::Logout => {
            session.sign_out();
            println!("Signed out");
        }
        Commands::Courses => {
            let catalog = CourseCatalog::new(Arc::new(client));
            catalog.refresh().await.context("Failed to load courses")?;
            let snapshot = catalog.snapshot();
            if snapshot.courses.is_empty() {
                println!("No courses yet");
            }
            for course in &snapshot.courses {
                let progress =
                    course.progress.map(|p| format!("{:>4.0}%", p)).unwrap_or_else(|| "    -".into());
                println!("{}  {}  {}", progress, course.id, course.title);
            }
        }
        Commands::Rename { course_id, title } => {
            let catalog = CourseCatalog::new(Arc::new(client));
            catalog.refresh().await.context("Failed to load courses")?;
            catalog.rename(&course_id, &title).await?;
            println!("Renamed {} to {}", course_id, title.trim());
        }
        Commands::Study { course_id } => {
            if !session.is_signed_in() {
                bail!("Not signed in. Run `coursepath login <email>` first");
            }
            let course = client
                .get_course(&course_id)
                .await
                .with_context(|| format!("Failed to load course {}", course_id))?;

            let api = Arc::new(client);
            let mut tracker =
                SequentialTracker::new(course, api.clone(), config.thresholds.clone());
            if config.certificates.auto_generate {
                tracker = tracker.with_certificates(api.clone());
            }
            let settled = tracker.load_progress().await.context("Failed to load progress")?;
            for warning in &settled.warnings {
                tracing::warn!("{}", warning);
            }

            let notifications = NotificationCenter::new(api);
            let mut app = App::new(config, tracker, notifications, &session)?;
            if let ExitReason::SessionExpired { route } = app.run().await? {
                eprintln!("Session expired, sign in again ({})", route);
            }
        }
        Commands::Notifications { read } => {
            let center = NotificationCenter::new(Arc::new(client));
            center.refresh().await.context("Failed to load notifications")?;
            let feed = center.snapshot();
            println!("{} unread", feed.unread);
            for item in &feed.items {
                let marker = if item.read { ' ' } else { '*' };
                println!("{} {}  {}", marker, item.title, item.message);
            }
            if read && feed.unread > 0 {
                center.mark_all_read().await?;
            }
        }
        Commands::Stats { assignment_id, pass } => {
            let assignment = client.get_assignment(&assignment_id).await?;
            let submissions = client.list_submissions(&assignment_id).await?;
            let stats = SubmissionStats::from_submissions(&assignment, &submissions, pass);
            print_stats(&assignment.title, &stats);
        }
        Commands::Grade { assignment_id, submission_id, score, feedback } => {
            let assignment = client.get_assignment(&assignment_id).await?;
            let grade = GradeInput { score, feedback }.validate(assignment.max_points)?;
            client.grade_submission(&submission_id, &grade).await?;
            println!("Graded {}: {}/{}", submission_id, grade.score, assignment.max_points);
        }
        Commands::Certificate { action: CertificateCommand::Check { file } } => {
            let certificate = read_certificate(&file)?;
            certificate.validate()?;

            let samples: HashMap<CertificateTag, String> = CertificateTag::all()
                .iter()
                .map(|tag| (*tag, format!("<{}>", tag.key())))
                .collect();
            for tag in certificate.render_preview(&samples) {
                println!("{:>6.1}% {:>6.1}%  {}", tag.x, tag.y, tag.text);
            }
            println!("{} is valid", file.display());
        }
        Commands::Certificate { action: CertificateCommand::Publish { course_id, file, template } } => {
            let mut certificate = read_certificate(&file)?;
            if let Some(image) = template {
                let url = client
                    .upload_certificate_template(&course_id, &image)
                    .await
                    .with_context(|| format!("Failed to upload {:?}", image))?;
                certificate.template_url = Some(url);
            } else if certificate.template_url.is_none() {
                certificate.template_url =
                    client.get_certificate_config(&course_id).await?.template_url;
            }
            certificate.validate()?;

            client.save_certificate_config(&course_id, &certificate).await?;
            println!("Saved certificate for {}", course_id);
        }
    }

    Ok(())
}

/// Log to stderr, or to a file while the TUI owns the terminal
fn init_logging(to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "coursepath=info".into());

    let (stderr_layer, file_layer) = if to_file {
        let path = Config::log_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {:?}", parent))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file));
        (None, Some(layer))
    } else {
        let layer = tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr);
        (Some(layer), None)
    };

    tracing_subscriber::registry().with(filter).with(stderr_layer).with(file_layer).init();
    Ok(())
}

fn read_certificate(file: &Path) -> Result<CertificateConfig> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {:?}", file))?;
    CertificateConfig::from_json(&json).with_context(|| format!("Failed to parse {:?}", file))
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_stats(title: &str, stats: &SubmissionStats) {
    let score = |s: Option<f64>| s.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".into());

    println!("{}", title);
    println!("  submissions  {} ({} submitted, {} late)", stats.total, stats.submitted, stats.late);
    println!("  graded       {} ({} pending, {} passed)", stats.graded, stats.pending, stats.passed);
    println!(
        "  scores       avg {}  high {}  low {}",
        score(stats.average_score),
        score(stats.highest_score),
        score(stats.lowest_score)
    );
    if let Some(percent) = stats.average_percent {
        println!("  average      {:.0}%", percent);
    }
}
