//! Command-line front end: register cases, run debates, inspect results.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use ai_judge::orchestrator::short_id;
use ai_judge::transcript::Role;
use ai_judge::{
    Case, DebateRunner, DebateStatus, DebateStore, OllamaClient, RoleAssignment, Settings,
};

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Prosecution,
    Defense,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Prosecution => Role::Prosecution,
            RoleArg::Defense => Role::Defense,
        }
    }
}

#[derive(Parser)]
#[command(name = "ai-judge", about = "Three-round AI lawyer debates with an AI judge")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a case for debate.
    Case {
        /// Case title (at least 3 characters).
        #[arg(long)]
        title: String,
        /// Case description (at least 10 characters).
        #[arg(long)]
        description: String,
    },
    /// Run a full debate for a case.
    Run {
        /// Id of a previously registered case.
        #[arg(long, conflicts_with_all = ["title", "description"])]
        case_id: Option<String>,
        /// Title for an ad-hoc case (registered before running).
        #[arg(long, requires = "description")]
        title: Option<String>,
        /// Description for an ad-hoc case.
        #[arg(long, requires = "title")]
        description: Option<String>,
        /// Courtroom side for the emotional lawyer.
        #[arg(long, value_enum, default_value = "prosecution")]
        emotional_role: RoleArg,
    },
    /// Print a stored debate transcript.
    Show {
        debate_id: String,
    },
    /// List all debates, newest first.
    List,
    /// Print aggregate win statistics.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::default();
    let store = DebateStore::new(&settings);
    let cli = Cli::parse();

    match cli.command {
        Command::Case { title, description } => {
            let case = Case::new(&title, &description)?;
            let stored = store.create_case(case)?;
            println!("Created case {}: {}", stored.id, stored.case.title);
        }
        Command::Run {
            case_id,
            title,
            description,
            emotional_role,
        } => {
            let stored = match (case_id, title, description) {
                (Some(id), _, _) => store
                    .get_case(&id)
                    .with_context(|| format!("loading case {}", id))?,
                (None, Some(title), Some(description)) => {
                    store.create_case(Case::new(&title, &description)?)?
                }
                _ => bail!("provide --case-id, or both --title and --description"),
            };

            let client = OllamaClient::new(&settings);
            let roles = RoleAssignment {
                emotional: emotional_role.into(),
            };
            let runner = DebateRunner::new(&client, roles, &settings);

            let debate_id = short_id("deb");
            let pending = ai_judge::DebateTranscript::pending(&debate_id, stored.case.clone());
            store.insert_pending(&stored.id, &pending)?;

            let transcript = runner.run_with_id(&debate_id, stored.case).await;
            store.apply_transcript(&transcript)?;
            print_transcript(&transcript);
            if transcript.status == DebateStatus::Failed {
                bail!("debate {} failed", transcript.id);
            }
        }
        Command::Show { debate_id } => {
            let record = store.get_debate(&debate_id)?;
            print_transcript(&record.transcript);
        }
        Command::List => {
            for row in store.list_debates() {
                println!(
                    "{}  {}  [{}]  winner={}  {}",
                    row.id, row.timestamp.format("%Y-%m-%d %H:%M"), row.status, row.winner, row.title
                );
            }
        }
        Command::Stats => {
            let stats = store.statistics();
            println!("Total debates: {}", stats.total_debates);
            println!("Emotional wins: {}", stats.emotional_wins);
            println!("Logical wins:  {}", stats.logical_wins);
        }
    }
    Ok(())
}

fn print_transcript(transcript: &ai_judge::DebateTranscript) {
    println!("{}", transcript.status_line());
    for (i, round) in transcript.rounds.iter().enumerate() {
        for arg in round {
            println!();
            println!("--- Round {} | {} ({} words) ---", i + 1, arg.agent, arg.word_count);
            println!("{}", arg.content);
        }
    }
    println!();
    println!("=== Verdict ===");
    let v = &transcript.verdict;
    println!("Winner: {}", v.winner);
    println!("Scores: emotional {} / logical {}", v.emotional_score, v.logical_score);
    println!("{}", v.reasoning);
}
