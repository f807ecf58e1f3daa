use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use novelcraft::ai::ProviderKind;
use novelcraft::cli::commands::{ai, chapter, config, project};
use novelcraft::cli::{CommandContext, Output};
use novelcraft::types::{
    AnalyzeRequest, ChapterUpdate, NewChapter, NovelError, Perspective, PolishFocus,
    PolishOptions, PolishRequest, PolishStyle, RewriteLength, RewriteRequest, RewriteTone,
    SuggestionKind, SuggestionRequest,
};

#[derive(Parser)]
#[command(name = "novelcraft")]
#[command(version, about = "Chapter management and AI-assisted editing for novels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Owner id for projects and chapters
    #[arg(long, global = true, env = "USER")]
    user: Option<String>,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(clap::Args)]
struct PolishArgs {
    #[arg(long, help = "Style: formal, casual, literary, modern")]
    style: Option<PolishStyle>,
    #[arg(long, help = "Focus: grammar, style, flow, all")]
    focus: Option<PolishFocus>,
    #[arg(long, help = "Background for the model")]
    context: Option<String>,
    #[arg(long, help = "Provider: deepseek, doubao")]
    provider: Option<ProviderKind>,
}

impl PolishArgs {
    fn options(&self) -> PolishOptions {
        PolishOptions {
            style: self.style,
            focus: self.focus,
            context: self.context.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List AI providers and whether they are configured
    Providers,

    /// Polish a passage of text
    Polish {
        text: String,
        #[command(flatten)]
        args: PolishArgs,
    },

    /// Rewrite a passage with a different tone or length
    Rewrite {
        text: String,
        #[arg(long, help = "Tone: serious, humorous, dramatic, romantic")]
        tone: Option<RewriteTone>,
        #[arg(long, help = "Length: shorter, longer, same")]
        length: Option<RewriteLength>,
        #[arg(long, help = "Perspective: first, third")]
        perspective: Option<Perspective>,
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        provider: Option<ProviderKind>,
    },

    /// Ask for writing suggestions
    Suggest {
        text: String,
        #[arg(
            long = "type",
            value_parser = SuggestionKind::parse_requestable,
            help = "plot, character, dialogue, description"
        )]
        kind: SuggestionKind,
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        provider: Option<ProviderKind>,
    },

    /// Polish several passages concurrently
    BatchPolish {
        texts: Vec<String>,
        #[arg(long, short, help = "File with one passage per line")]
        file: Option<PathBuf>,
        #[command(flatten)]
        args: PolishArgs,
    },

    /// Grammar, style and plot suggestions in one call
    Analyze {
        text: String,
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        provider: Option<ProviderKind>,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage chapters
    Chapter {
        #[command(subcommand)]
        action: ChapterAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create a project
    Create {
        title: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// List your projects
    List,
}

#[derive(Subcommand)]
enum ChapterAction {
    /// Add a chapter, appended unless --order is given
    Add {
        project: String,
        title: String,
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        #[arg(long, short)]
        file: Option<PathBuf>,
        #[arg(long, help = "Insert position (1-based)")]
        order: Option<u32>,
    },
    /// List chapters in reading order
    List { project: String },
    /// Print a chapter
    Show { chapter: String },
    /// Change a chapter's title or content
    Edit {
        chapter: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        #[arg(long, short)]
        file: Option<PathBuf>,
    },
    /// Move a chapter to a new position
    Move {
        chapter: String,
        #[arg(allow_negative_numbers = true)]
        order: i64,
    },
    /// Delete a chapter and close the gap
    Delete { chapter: String },
    /// Repair gaps and duplicates in a project's chapter order
    Normalize { project: String },
    /// Polish a stored chapter
    Polish {
        chapter: String,
        #[command(flatten)]
        args: PolishArgs,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show,
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mnovelcraft encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    let cli = Cli::parse();
    let output = Output::new(cli.json);

    match run_cli(cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<NovelError>() {
                Some(err) => output.report(&err.report()),
                None => output.error(&format!("{:#}", e)),
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli, output: Output) -> anyhow::Result<()> {
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let user = cli.user.unwrap_or_default();

    match cli.command {
        Commands::Providers => {
            let ctx = CommandContext::load_without_db(&user, output)?;
            ai::providers(&ctx)?;
        }
        Commands::Polish { text, args } => {
            let ctx = CommandContext::load_without_db(&user, output)?;
            let request = PolishRequest::with_options(text, &args.options());
            Runtime::new()?.block_on(ai::polish(&ctx, &request, args.provider))?;
        }
        Commands::Rewrite {
            text,
            tone,
            length,
            perspective,
            context,
            provider,
        } => {
            let ctx = CommandContext::load_without_db(&user, output)?;
            let request = RewriteRequest {
                text,
                tone,
                length,
                perspective,
                context,
            };
            Runtime::new()?.block_on(ai::rewrite(&ctx, &request, provider))?;
        }
        Commands::Suggest {
            text,
            kind,
            context,
            provider,
        } => {
            let ctx = CommandContext::load_without_db(&user, output)?;
            let request = SuggestionRequest {
                text,
                kind,
                context,
            };
            Runtime::new()?.block_on(ai::suggest(&ctx, &request, provider))?;
        }
        Commands::BatchPolish { texts, file, args } => {
            let ctx = CommandContext::load_without_db(&user, output)?;
            Runtime::new()?.block_on(ai::batch_polish(
                &ctx,
                texts,
                file.as_deref(),
                &args.options(),
                args.provider,
            ))?;
        }
        Commands::Analyze {
            text,
            context,
            provider,
        } => {
            let ctx = CommandContext::load_without_db(&user, output)?;
            let request = AnalyzeRequest { text, context };
            Runtime::new()?.block_on(ai::analyze(&ctx, &request, provider))?;
        }
        Commands::Project { action } => {
            let ctx = CommandContext::load(&user, output)?;
            match action {
                ProjectAction::Create { title, description } => {
                    project::create(&ctx, &title, description.as_deref())?;
                }
                ProjectAction::List => project::list(&ctx)?,
            }
        }
        Commands::Chapter { action } => {
            let ctx = CommandContext::load(&user, output)?;
            run_chapter(&ctx, action)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => config::show(output)?,
            ConfigAction::Path => config::path()?,
            ConfigAction::Init { global, force } => config::init(output, global, force)?,
        },
    }

    Ok(())
}

fn run_chapter(ctx: &CommandContext, action: ChapterAction) -> anyhow::Result<()> {
    match action {
        ChapterAction::Add {
            project,
            title,
            content,
            file,
            order,
        } => {
            let content = chapter::read_body(content, file.as_deref())?.unwrap_or_default();
            chapter::add(
                ctx,
                &project,
                NewChapter {
                    title,
                    content,
                    order,
                },
            )?;
        }
        ChapterAction::List { project } => chapter::list(ctx, &project)?,
        ChapterAction::Show { chapter: id } => chapter::show(ctx, &id)?,
        ChapterAction::Edit {
            chapter: id,
            title,
            content,
            file,
        } => {
            let content = chapter::read_body(content, file.as_deref())?;
            chapter::edit(ctx, &id, ChapterUpdate { title, content })?;
        }
        ChapterAction::Move { chapter: id, order } => chapter::move_to(ctx, &id, order)?,
        ChapterAction::Delete { chapter: id } => chapter::delete(ctx, &id)?,
        ChapterAction::Normalize { project } => chapter::normalize(ctx, &project)?,
        ChapterAction::Polish { chapter: id, args } => {
            Runtime::new()?.block_on(chapter::polish(ctx, &id, &args.options(), args.provider))?;
        }
    }
    Ok(())
}
