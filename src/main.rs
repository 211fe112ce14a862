use flashquiz::config::QuizConfig;
use flashquiz::storage::FileStorage;
use flashquiz::traits::{CardCount, QuizType, Weights};
use flashquiz::{Answer, Card, CorrectAnswer, Deck, Quiz, QuizError};

use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Flashcard quizzes that favour the cards you struggle with.
#[derive(Parser, Debug)]
#[command(name = "flashquiz", version, long_about = None)]
struct Cli {
    /// Name of log file.
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Verbosity of logging, repeat for more detail.
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new deck.
    Create {
        /// Filename of flashcard deck.
        deck: PathBuf,
    },

    /// Create a new deck by swapping questions and answers.
    Swap {
        /// Filename of source flashcard deck.
        deck: PathBuf,
        /// Filename of destination flashcard deck.
        dest: PathBuf,
    },

    /// Run a quiz.
    Quiz(QuizArgs),
}

#[derive(Args, Debug)]
struct QuizArgs {
    /// Filename of flashcard deck.
    deck: PathBuf,

    /// Use all flashcards in the quiz.
    #[arg(long, conflicts_with = "number")]
    all: bool,

    /// Number of flashcards to use in the quiz.
    #[arg(short, long)]
    number: Option<usize>,

    /// Fill in the blank questions.
    #[arg(short, long, visible_alias = "fill-in-the-blank", conflicts_with = "multiple")]
    fill: bool,

    /// Multiple choice questions.
    #[arg(short, long, visible_alias = "multiple-choice")]
    multiple: bool,

    /// Number of multiple choice answers to offer.
    #[arg(long)]
    selections: Option<usize>,

    /// Hard cards weight.
    #[arg(long)]
    hard: Option<usize>,

    /// Medium cards weight.
    #[arg(long = "med")]
    medium: Option<usize>,

    /// Easy cards weight.
    #[arg(long)]
    easy: Option<usize>,

    /// Yaml file with quiz settings, flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for reproducible shuffles.
    #[arg(long)]
    seed: Option<u64>,
}

impl QuizArgs {
    fn to_config(&self) -> Result<QuizConfig, QuizError> {
        let mut config = match &self.config {
            Some(path) => QuizConfig::load(expand_path(path))?,
            None => QuizConfig::default(),
        };
        if self.all {
            config.card_count = CardCount::All;
        } else if let Some(n) = self.number {
            config.card_count = CardCount::Count(n);
        }
        if self.fill {
            config.quiz_type = QuizType::FillInTheBlank;
        } else if self.multiple {
            config.quiz_type = QuizType::MultipleChoice;
        }
        if let Some(selections) = self.selections {
            config.max_selections = selections;
        }
        config.weights = Weights::new(
            self.hard.unwrap_or(config.weights.hard),
            self.medium.unwrap_or(config.weights.medium),
            self.easy.unwrap_or(config.weights.easy),
        );
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

/// Replace a leading ~ with the home directory.
fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

fn setup_logging(logfile: Option<&Path>, verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    if let Some(path) = logfile {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;
    Ok(())
}

/// Print the prompt and read a line without its line ending.
fn input(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        anyhow::bail!("unexpected end of input");
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}

fn create(path: &Path) -> anyhow::Result<()> {
    log::info!("Creating deck {}.", path.display());
    if path.exists() {
        return Err(QuizError::AlreadyExists(path.to_path_buf()).into());
    }

    let name = input("Deck Name: ")?;
    let mut deck = Deck::new(&name);
    println!("Enter an empty question to finish.");
    for idx in 1.. {
        let question = input(&format!("Question #{idx}: "))?;
        if question.is_empty() {
            break;
        }
        let answer = input(&format!("Answer #{idx}: "))?;
        deck.add_card(Card::new(&question, &answer));
    }
    deck.save(path, false)?;
    Ok(())
}

fn swap(src: &Path, dest: &Path) -> anyhow::Result<()> {
    println!(
        "Swapping questions and answers from {} and saving to {}.",
        src.display(),
        dest.display()
    );
    Deck::load(src)?.swapped().save(dest, false)?;
    Ok(())
}

fn fill_in_the_blank_answer() -> anyhow::Result<Answer> {
    loop {
        let answer = input("==> ")?;
        if !answer.is_empty() {
            return Ok(Answer::Text(answer));
        }
    }
}

fn multiple_choice_answer(options: &[String]) -> anyhow::Result<Answer> {
    let letters: Vec<char> = ('a'..='z').take(options.len()).collect();
    for (letter, choice) in letters.iter().zip(options.iter()) {
        println!("  {letter}) {choice}");
    }
    loop {
        let answer = input("==> ")?;
        let mut chars = answer.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(index) = letters.iter().position(|l| *l == c) {
                return Ok(Answer::Choice(index));
            }
        }
    }
}

fn quiz(args: &QuizArgs) -> anyhow::Result<()> {
    let path = expand_path(&args.deck);
    let config = args.to_config()?;
    log::info!("Quizzing with deck {} using {config:?}", path.display());

    let mut quiz = Quiz::from_config(Box::new(FileStorage::new(&path)), &config)?;
    loop {
        let name = quiz.name();
        println!("{name}");
        println!("{}", "=".repeat(name.chars().count()));

        let mut session = quiz.run(config.card_count, config.quiz_type, config.selections())?;
        for (idx, question) in session.by_ref().enumerate() {
            println!("{}) {}", idx + 1, question.prompt());
            let answer = match question.options() {
                None => fill_in_the_blank_answer()?,
                Some(options) => multiple_choice_answer(options)?,
            };
            let (result, correct) = question.submit(answer);
            let shown = match correct {
                CorrectAnswer::Text(text) => text,
                CorrectAnswer::Choice(i) => question
                    .options()
                    .and_then(|o| o.get(i))
                    .cloned()
                    .unwrap_or_default(),
            };
            println!(
                "{}. The answer is {shown}",
                if result { "Correct" } else { "Incorrect" }
            );
        }

        let (correct, attempts) = session.score();
        session.finish()?;
        println!("You got {correct} out of {attempts} correct.");

        if !input("Play again (y/n)? ")?.to_lowercase().starts_with('y') {
            break;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log.as_deref(), cli.verbosity)?;
    log::info!("{cli:?}");

    match &cli.command {
        Command::Create { deck } => create(&expand_path(deck)),
        Command::Swap { deck, dest } => swap(&expand_path(deck), &expand_path(dest)),
        Command::Quiz(args) => quiz(args),
    }
}
