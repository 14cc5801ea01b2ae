//! CLI entry point for the profile/posting matching system.
//!
//! Provides commands for seeding demo data, upserting profiles and postings,
//! running similarity matches, and managing the store snapshot.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use jobmatch::display::{counts_table, match_results_table, should_disable_colors};
use jobmatch::embedding::{EmbeddingProvider, FastEmbedProvider};
use jobmatch::io::ExitCode;
use jobmatch::vector::{VectorDimension, VectorError};
use jobmatch::{EntityKind, MatchEngine, MatchError, MatchHit, MatchStore, RecordAttributes, Settings};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Parser)]
#[command(
    name = "jobmatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Semantic matching for candidate profiles and job postings",
    long_about = "Store profiles and postings with embeddings and rank matches by vector similarity.",
    styles = clap_cargo_style(),
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .jobmatch directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Seed sample data and print ranked matches
    #[command(
        about = "Run the matching demo with sample profiles and postings",
        after_help = "Examples:\n  jobmatch demo\n  jobmatch demo --persist"
    )]
    Demo {
        /// Save the seeded store as a snapshot afterwards
        #[arg(long)]
        persist: bool,
    },

    /// Add or update a candidate profile
    #[command(
        name = "add-profile",
        about = "Upsert a profile by name; an existing name is overwritten",
        after_help = "Example:\n  jobmatch add-profile \"Jane Doe\" --seniority Senior \\\n    --skills \"Rust,SQL\" --industry Technology --text \"Systems engineer...\""
    )]
    AddProfile {
        /// Profile name (the natural key; exact-match identity)
        name: String,

        /// Free resume text
        #[arg(long)]
        text: String,

        /// Seniority label, e.g. Senior or Mid-level
        #[arg(long)]
        seniority: String,

        /// Comma-separated skill tokens
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,

        /// Industry tag
        #[arg(long)]
        industry: String,
    },

    /// Add or update a job posting
    #[command(
        name = "add-posting",
        about = "Upsert a posting by title; an existing title is overwritten"
    )]
    AddPosting {
        /// Posting title (the natural key; exact-match identity)
        title: String,

        /// Free description text
        #[arg(long)]
        text: String,

        /// Seniority label, e.g. Senior or Mid-level
        #[arg(long)]
        seniority: String,

        /// Comma-separated required-skill tokens
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,

        /// Industry tag
        #[arg(long)]
        industry: String,
    },

    /// Rank stored matches for a profile or posting
    #[command(
        about = "Find nearest matches by vector similarity",
        after_help = "Examples:\n  jobmatch match postings \"Jane Doe\"\n  jobmatch match profiles \"Backend Engineer\" --limit 5"
    )]
    Match {
        #[command(subcommand)]
        direction: MatchQuery,
    },

    /// Remove all records of one kind
    #[command(about = "Clear a partition (profiles or postings)")]
    Clear {
        /// Entity kind: profile(s) or posting(s)
        kind: EntityKind,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .jobmatch/settings.toml")]
    Config,
}

#[derive(Subcommand)]
enum MatchQuery {
    /// Rank profiles for a stored posting (raw similarity, distance order)
    Profiles {
        /// Posting title to match against
        posting: String,

        /// Maximum number of matches
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Rank postings for a stored profile (clamped score plus skill boost)
    Postings {
        /// Profile name to match against
        profile: String,

        /// Maximum number of matches
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Provider stand-in for commands that never embed.
///
/// Match queries and clears run against stored embeddings only; building
/// the real model for them would force a download on machines that only
/// read the snapshot.
struct OfflineProvider {
    dimension: VectorDimension,
}

impl EmbeddingProvider for OfflineProvider {
    fn generate_embeddings(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        Err(VectorError::ModelInit(
            "Embedding model not loaded for this command".to_string(),
        ))
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }
}

fn heading(text: &str) -> String {
    if should_disable_colors() {
        text.to_string()
    } else {
        text.cyan().bold().to_string()
    }
}

fn load_settings(config_override: Option<&PathBuf>) -> Result<Settings, MatchError> {
    let result = match config_override {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    result.map_err(|e| MatchError::ConfigError {
        reason: e.to_string(),
    })
}

/// Open the snapshot at the configured data directory, or start empty.
fn open_store(settings: &Arc<Settings>) -> Result<Arc<MatchStore>, MatchError> {
    let data_dir = settings.resolved_data_dir();
    let store = if MatchStore::snapshot_exists(&data_dir) {
        MatchStore::load(&data_dir, Arc::clone(settings))?
    } else {
        MatchStore::with_settings(VectorDimension::dimension_768(), Arc::clone(settings))
    };
    Ok(Arc::new(store))
}

fn save_store(store: &MatchStore, settings: &Settings) -> Result<(), MatchError> {
    store.save(&settings.resolved_data_dir())?;
    Ok(())
}

/// Build an engine backed by the real embedding model.
fn embedding_engine(
    store: Arc<MatchStore>,
    settings: &Settings,
) -> Result<MatchEngine, MatchError> {
    let provider = FastEmbedProvider::new_with_progress(settings)?;
    MatchEngine::with_settings(store, Arc::new(provider), settings)
}

/// Build an engine that can only query stored embeddings.
fn query_engine(store: Arc<MatchStore>, settings: &Settings) -> Result<MatchEngine, MatchError> {
    let provider = OfflineProvider {
        dimension: store.dimension(),
    };
    MatchEngine::with_settings(store, Arc::new(provider), settings)
}

fn print_matches(target: &str, hits: &[MatchHit]) {
    if hits.is_empty() {
        println!("No matches found for '{target}'");
        return;
    }
    println!("{}", heading(&format!("Matches for '{target}':")));
    println!("{}", match_results_table(hits));
}

/// The demo data set: a pair of profiles and postings written to match
/// nearly word for word, some mid-tier pairs, and deliberate mismatches.
fn demo_profiles() -> Vec<(&'static str, &'static str, &'static str, Vec<&'static str>, &'static str)> {
    vec![
        (
            "resume-perfect-match-1",
            "Senior software engineer with 8+ years of full-stack development experience, specializing in TypeScript, React, Node.js, and AWS. Led development of scalable web applications serving millions of users. Strong expertise in CI/CD pipelines, clean architecture, and performance optimization. Proven ability to mentor junior developers and implement modern front-end and back-end best practices.",
            "Senior",
            vec!["TypeScript", "React", "Node.js", "AWS", "CI/CD", "Full-Stack Development"],
            "Technology",
        ),
        (
            "resume-perfect-match-2",
            "Machine learning engineer with PhD in Computer Science and 5+ years of industry experience in natural language processing and transformer models. Published researcher in the field of large language models. Expert in Python, PyTorch, TensorFlow, and deploying ML models to production. Experience optimizing models for efficiency and developing custom embedding solutions for similarity search applications.",
            "Senior",
            vec!["Machine Learning", "NLP", "Python", "PyTorch", "TensorFlow", "Transformers", "LLMs"],
            "Artificial Intelligence",
        ),
        (
            "resume-101",
            "Software engineer experienced in TypeScript, React, and Node.js. Built several web applications and REST APIs.",
            "Mid-level",
            vec!["TypeScript", "React", "Node.js", "REST APIs"],
            "Technology",
        ),
        (
            "resume-102",
            "Machine learning engineer skilled in NLP, deep learning, and model deployment. Experience with Python and TensorFlow.",
            "Mid-level",
            vec!["Machine Learning", "NLP", "Python", "TensorFlow"],
            "Technology",
        ),
        (
            "resume-103",
            "Graphic designer with a passion for creating stunning visuals. Expert in Adobe Creative Suite.",
            "Mid-level",
            vec!["Graphic Design", "Photoshop", "Illustrator", "UI Design"],
            "Design",
        ),
        (
            "resume-104",
            "Marketing specialist with expertise in digital marketing strategies, SEO, and content creation.",
            "Mid-level",
            vec!["Digital Marketing", "SEO", "Content Creation", "Social Media"],
            "Marketing",
        ),
        (
            "resume-105",
            "pastry chef with no experience in creating gourmet desserts and pastries. Doesn't know anything about French patisserie techniques, chocolate tempering, and sugar art. Doesn't know anything about pastry. Doesn't know anything about culinary arts. Doesn't know anything about desserts. Doesn't know anything about pastries.",
            "No Experience",
            vec![],
            "Culinary Arts",
        ),
    ]
}

fn demo_postings() -> Vec<(&'static str, &'static str, &'static str, Vec<&'static str>, &'static str)> {
    vec![
        (
            "job-perfect-match-1",
            "We are hiring a Senior Full-Stack Software Engineer with 8+ years of experience in scalable web application development. Must be an expert in TypeScript, React, Node.js, AWS, and CI/CD pipelines. Responsibilities include leading development teams, mentoring junior developers, and ensuring high-performance, scalable code aligned with best practices in modern front-end and back-end architectures.",
            "Senior",
            vec!["TypeScript", "React", "Node.js", "AWS", "CI/CD", "Full-Stack Development"],
            "Technology",
        ),
        (
            "job-perfect-match-2",
            "Looking for a machine learning engineer with advanced degree in Computer Science and 5+ years of industry experience in natural language processing and transformer models. Must have publication history in large language models. Required skills: Python, PyTorch, TensorFlow, and experience deploying ML models to production. Will be responsible for optimizing models for efficiency and developing custom embedding solutions for similarity search applications.",
            "Senior",
            vec!["Machine Learning", "NLP", "Python", "PyTorch", "TensorFlow", "Transformers", "LLMs"],
            "Artificial Intelligence",
        ),
        (
            "job-201",
            "Looking for a full-stack software engineer with React and Node.js experience. Must be comfortable with TypeScript and building REST APIs.",
            "Mid-level",
            vec!["React", "Node.js", "TypeScript", "REST APIs"],
            "Technology",
        ),
        (
            "job-202",
            "Seeking a machine learning engineer for NLP projects. Experience with Python and TensorFlow required.",
            "Mid-level",
            vec!["NLP", "Machine Learning", "Python", "TensorFlow"],
            "Technology",
        ),
        (
            "job-203",
            "Hiring a creative graphic designer to join our design team. Must be proficient in Adobe Creative Suite.",
            "Mid-level",
            vec!["Photoshop", "Illustrator", "UI Design"],
            "Design",
        ),
        (
            "job-204",
            "Looking for a marketing specialist to enhance our digital presence through SEO and content creation.",
            "Mid-level",
            vec!["SEO", "Content Creation", "Social Media"],
            "Marketing",
        ),
        (
            "job-205",
            "We are hiring a pastry chef with 10+ years of experience in creating gourmet desserts and pastries. Must be an expert in French patisserie techniques, chocolate tempering, and sugar art. Must have led a team of pastry chefs in a Michelin-starred restaurant. Strong focus on flavor balance, presentation, and innovative dessert creation. We value creativity and candidates who can mentor junior pastry chefs.",
            "Senior",
            vec!["Pastry", "Desserts", "Chocolate Tempering", "Sugar Art", "French Patisserie"],
            "Culinary Arts",
        ),
    ]
}

fn run_demo(engine: &MatchEngine, store: &MatchStore, limit: usize) -> Result<(), MatchError> {
    println!("{}", heading("=== Resume & Job Matching Demo ==="));

    println!("\n{}", heading("Step 1: Adding profiles..."));
    for (name, text, seniority, skills, industry) in demo_profiles() {
        let attributes = RecordAttributes::new(
            seniority,
            skills.into_iter().map(str::to_string).collect(),
            industry,
            text,
        );
        let outcome = engine.upsert_profile(name, attributes)?;
        println!(
            "  {} {name}",
            if outcome.was_created() { "added" } else { "updated" }
        );
    }

    println!("\n{}", heading("Step 2: Adding postings..."));
    for (title, text, seniority, skills, industry) in demo_postings() {
        let attributes = RecordAttributes::new(
            seniority,
            skills.into_iter().map(str::to_string).collect(),
            industry,
            text,
        );
        let outcome = engine.upsert_posting(title, attributes)?;
        println!(
            "  {} {title}",
            if outcome.was_created() { "added" } else { "updated" }
        );
    }

    println!(
        "\n{}",
        counts_table(
            store.count(EntityKind::Profile),
            store.count(EntityKind::Posting)
        )
    );

    println!("{}", heading("Step 3: High-similarity pairs"));
    for profile in ["resume-perfect-match-1", "resume-perfect-match-2"] {
        print_matches(profile, &engine.find_matching_postings(profile, limit)?);
    }
    for posting in ["job-perfect-match-1", "job-perfect-match-2"] {
        print_matches(posting, &engine.find_matching_profiles(posting, limit)?);
    }

    println!("{}", heading("Step 4: Regular matching examples"));
    for profile in ["resume-101", "resume-102", "resume-103", "resume-104"] {
        print_matches(profile, &engine.find_matching_postings(profile, limit)?);
    }
    for posting in ["job-201", "job-202", "job-203", "job-204", "job-205"] {
        print_matches(posting, &engine.find_matching_profiles(posting, limit)?);
    }

    println!("Demo complete.");
    Ok(())
}

fn report_error(error: &MatchError) {
    if should_disable_colors() {
        eprintln!("Error: {error}");
    } else {
        eprintln!("{} {error}", "Error:".red().bold());
    }
    for suggestion in error.recovery_suggestions() {
        eprintln!("  hint: {suggestion}");
    }
}

fn run(cli: Cli) -> Result<ExitCode, MatchError> {
    // Init runs before settings exist
    if let Commands::Init { force } = &cli.command {
        return match Settings::init_config_file(*force) {
            Ok(path) => {
                println!("Created configuration file: {}", path.display());
                Ok(ExitCode::Success)
            }
            Err(e) => Err(MatchError::ConfigError {
                reason: e.to_string(),
            }),
        };
    }

    let settings = Arc::new(load_settings(cli.config.as_ref())?);
    jobmatch::config::set_global_debug(settings.debug);

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),

        Commands::Demo { persist } => {
            let store = Arc::new(MatchStore::with_settings(
                VectorDimension::dimension_768(),
                Arc::clone(&settings),
            ));
            let engine = embedding_engine(Arc::clone(&store), &settings)?;
            run_demo(&engine, &store, settings.matching.default_limit)?;
            if persist {
                save_store(&store, &settings)?;
                println!(
                    "Snapshot saved to {}",
                    settings.resolved_data_dir().display()
                );
            }
            Ok(ExitCode::Success)
        }

        Commands::AddProfile {
            name,
            text,
            seniority,
            skills,
            industry,
        } => {
            let store = open_store(&settings)?;
            let engine = embedding_engine(Arc::clone(&store), &settings)?;
            let attributes = RecordAttributes::new(seniority, skills, industry, text);
            let outcome = engine.upsert_profile(&name, attributes)?;
            save_store(&store, &settings)?;
            println!(
                "{} profile '{name}' (id {})",
                if outcome.was_created() { "Created" } else { "Updated" },
                outcome.record_id().value()
            );
            Ok(ExitCode::Success)
        }

        Commands::AddPosting {
            title,
            text,
            seniority,
            skills,
            industry,
        } => {
            let store = open_store(&settings)?;
            let engine = embedding_engine(Arc::clone(&store), &settings)?;
            let attributes = RecordAttributes::new(seniority, skills, industry, text);
            let outcome = engine.upsert_posting(&title, attributes)?;
            save_store(&store, &settings)?;
            println!(
                "{} posting '{title}' (id {})",
                if outcome.was_created() { "Created" } else { "Updated" },
                outcome.record_id().value()
            );
            Ok(ExitCode::Success)
        }

        Commands::Match { direction } => {
            let store = open_store(&settings)?;
            let engine = query_engine(store, &settings)?;
            let limit = settings.matching.default_limit;

            let (target, hits) = match direction {
                MatchQuery::Profiles { posting, limit: l } => {
                    let hits = engine.find_matching_profiles(&posting, l.unwrap_or(limit))?;
                    (posting, hits)
                }
                MatchQuery::Postings { profile, limit: l } => {
                    let hits = engine.find_matching_postings(&profile, l.unwrap_or(limit))?;
                    (profile, hits)
                }
            };

            print_matches(&target, &hits);
            Ok(ExitCode::from_match_results(&hits))
        }

        Commands::Clear { kind } => {
            let store = open_store(&settings)?;
            store.clear(kind);
            save_store(&store, &settings)?;
            println!("Cleared all {kind} records");
            Ok(ExitCode::Success)
        }

        Commands::Config => {
            let toml = toml::to_string_pretty(settings.as_ref()).map_err(|e| {
                MatchError::ConfigError {
                    reason: format!("Failed to render settings: {e}"),
                }
            })?;
            println!("{}", heading("Active configuration:"));
            println!("{toml}");
            println!("Data directory: {}", settings.resolved_data_dir().display());
            Ok(ExitCode::Success)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(error) => {
            report_error(&error);
            ExitCode::from_error(&error)
        }
    };

    std::process::exit(code.into());
}
