//! # lingua: terminal client for the Lingua API
//!
//! - `lingua ask`: stream an AI analysis of a word or sentence.
//! - `lingua quiz`: practise the words already queried for an article.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use lingua::models::{AiModel, AiQueryRequest, Article, QueryRecord, QueryType};
use lingua::quiz::{circled_number, ArticleFillBoard, FillBlankQuiz, SubmitOutcome};
use lingua::replay::TypingReplay;
use lingua::session::ReaderSession;
use lingua::stream::{AiQueryClient, Callbacks, StreamOutcome};

/// Read articles, ask about words, and quiz yourself on them.
#[derive(Parser)]
#[command(name = "lingua", version, about, long_about = None)]
struct Cli {
    /// Base URL of the Lingua API.
    #[arg(long, env = "LINGUA_SERVER", default_value = "http://127.0.0.1:8080")]
    server: String,

    /// User the records belong to.
    #[arg(long, env = "LINGUA_USER", default_value = "")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the AI about a word or sentence of an article.
    Ask {
        #[arg(long)]
        article_id: Uuid,

        /// Selected word or sentence.
        text: String,

        #[arg(long, value_enum, default_value_t = Depth::Standard)]
        depth: Depth,

        /// Free-form question (implies `--depth ask`).
        #[arg(long)]
        question: Option<String>,

        #[arg(long, value_enum, default_value_t = Model::Deepseek)]
        model: Model,

        #[arg(long, default_value = "en")]
        article_language: String,

        #[arg(long, default_value = "en")]
        mother_tongue: String,

        /// Wait for the full answer, then type it out.
        #[arg(long)]
        replay: bool,
    },

    /// Fill in the words you queried for an article.
    Quiz {
        #[arg(long)]
        article_id: Uuid,

        /// Path to the article text.
        #[arg(long)]
        article: PathBuf,

        #[arg(long, default_value = "en")]
        article_language: String,

        #[arg(long, default_value = "en")]
        mother_tongue: String,

        #[arg(long, value_enum, default_value_t = Mode::Article)]
        mode: Mode,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Depth {
    Quick,
    Standard,
    Deep,
    Ask,
}

impl From<Depth> for QueryType {
    fn from(depth: Depth) -> Self {
        match depth {
            Depth::Quick => QueryType::Quick,
            Depth::Standard => QueryType::Standard,
            Depth::Deep => QueryType::Deep,
            Depth::Ask => QueryType::AskAi,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Model {
    Deepseek,
    Openai,
}

impl From<Model> for AiModel {
    fn from(model: Model) -> Self {
        match model {
            Model::Deepseek => AiModel::Deepseek,
            Model::Openai => AiModel::Openai,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Blanks inside the article; answers are case-sensitive.
    Article,
    /// The queried words alone; answers ignore case.
    Words,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    match cli.command {
        Commands::Ask {
            article_id,
            text,
            depth,
            question,
            model,
            article_language,
            mother_tongue,
            replay,
        } => {
            let query_type = if question.is_some() {
                QueryType::AskAi
            } else {
                depth.into()
            };
            let request = AiQueryRequest {
                article_id,
                user_id: cli.user,
                selected_text: text,
                query_type,
                prompt_label: None,
                prompt_template: None,
                user_question: question,
                ai_model: model.into(),
                article_language,
                mother_tongue,
            };
            ask(&server, &request, replay).await
        }
        Commands::Quiz {
            article_id,
            article,
            article_language,
            mother_tongue,
            mode,
        } => {
            let content = tokio::fs::read_to_string(&article)
                .await
                .with_context(|| format!("Failed to read {}", article.display()))?;
            let records = fetch_records(&server, article_id, &cli.user).await?;

            let mut session = ReaderSession::new();
            session.set_article(Article {
                id: article_id,
                title: article.display().to_string(),
                content,
                article_language,
                mother_tongue,
            });
            session.set_records(records);

            let game = match mode {
                Mode::Article => session.article_fill()?.map(Game::Article),
                Mode::Words => session.word_quiz().map(Game::Words),
            };
            match game {
                Some(game) if !game.quiz().blanks().is_empty() => play(game).await,
                _ => {
                    println!("No queried words for this article and language pair yet.");
                    Ok(())
                }
            }
        }
    }
}

async fn ask(server: &str, request: &AiQueryRequest, replay: bool) -> Result<()> {
    let client = AiQueryClient::new(format!("{server}/api/v1/ai-query"));
    let mut full_response = None;
    let mut failure = None;

    let outcome = {
        let mut handler = Callbacks {
            on_chunk: |content: String| {
                if !replay {
                    print!("{content}");
                    let _ = std::io::stdout().flush();
                }
            },
            on_complete: |text: String| full_response = Some(text),
            on_error: |error: String| failure = Some(error),
        };
        client.query_stream(request, &mut handler).await
    };

    match outcome {
        StreamOutcome::Completed => {
            let text = full_response.unwrap_or_default();
            if replay {
                let mut typing = TypingReplay::new();
                let mut shown = 0;
                typing.start(text, move |prefix: &str| {
                    print!("{}", &prefix[shown..]);
                    let _ = std::io::stdout().flush();
                    shown = prefix.len();
                });
                typing.join().await;
            }
            println!();
            Ok(())
        }
        StreamOutcome::Failed => {
            println!();
            bail!("{}", failure.unwrap_or_else(|| "Unknown error".to_string()))
        }
        StreamOutcome::Ended | StreamOutcome::Cancelled => {
            println!();
            Ok(())
        }
    }
}

async fn fetch_records(server: &str, article_id: Uuid, user: &str) -> Result<Vec<QueryRecord>> {
    let records = reqwest::Client::new()
        .get(format!("{server}/api/v1/queries"))
        .query(&[("article_id", article_id.to_string()), ("user_id", user.to_string())])
        .send()
        .await
        .context("Failed to reach the Lingua API")?
        .error_for_status()?
        .json::<Vec<QueryRecord>>()
        .await
        .context("Failed to decode query records")?;
    Ok(records)
}

enum Game {
    Article(ArticleFillBoard),
    Words(FillBlankQuiz),
}

impl Game {
    fn quiz(&self) -> &FillBlankQuiz {
        match self {
            Game::Article(board) => board.quiz(),
            Game::Words(quiz) => quiz,
        }
    }

    fn quiz_mut(&mut self) -> &mut FillBlankQuiz {
        match self {
            Game::Article(board) => board.quiz_mut(),
            Game::Words(quiz) => quiz,
        }
    }

    fn render(&self) -> String {
        match self {
            Game::Article(board) => board.render(),
            Game::Words(quiz) => quiz
                .batch_range()
                .map(|index| {
                    let blank = &quiz.blanks()[index];
                    if blank.is_solved() {
                        format!("{} {}", circled_number(index), blank.word())
                    } else {
                        let first: String = blank.word().chars().take(1).collect();
                        let rest = "_".repeat(blank.word().chars().count().saturating_sub(1));
                        format!("{} {first}{rest}", circled_number(index))
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

async fn play(mut game: Game) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut redraw = true;

    loop {
        game.quiz_mut().poll(Instant::now());
        if game.quiz().is_finished() {
            println!("{}\n\nAll blanks solved!", game.render());
            return Ok(());
        }

        if redraw {
            let progress = game.quiz().progress();
            println!("\n{}\n", game.render());
            println!(
                "Batch {}/{}: {}/{} solved ({}/{} overall)",
                progress.batch + 1,
                progress.batch_count,
                progress.solved_in_batch,
                progress.batch_len,
                progress.solved_total,
                progress.total
            );
            println!("Answer with `<number> <word>`, or `q` to quit.");
            redraw = false;
        }

        let deadline = game.quiz().next_deadline();
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = sleep_until(deadline) => {
                redraw = true;
                continue;
            }
        };
        let Some(line) = line else {
            return Ok(());
        };
        let line = line.trim();
        if line == "q" {
            return Ok(());
        }

        let Some((number, answer)) = line.split_once(char::is_whitespace) else {
            println!("Expected `<number> <word>`.");
            continue;
        };
        let Some(index) = number.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
            println!("`{number}` is not a blank number.");
            continue;
        };

        let quiz = game.quiz_mut();
        let outcome = match quiz.input(index, answer) {
            Ok(()) => quiz.submit(index, Instant::now()),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(SubmitOutcome::Correct { batch_complete }) => {
                println!("✓ Correct");
                if batch_complete {
                    println!("Batch complete!");
                }
                redraw = true;
            }
            Ok(SubmitOutcome::Incorrect) => {
                println!("✗ Not quite");
                if let Some(hint) = quiz.active_hint().filter(|h| !h.text.is_empty()) {
                    println!("Hint: {}", hint.text);
                }
            }
            Ok(SubmitOutcome::AlreadySolved) => println!("Already solved."),
            Err(e) => println!("{e}"),
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}
