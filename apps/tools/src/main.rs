use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use shared::domain::{LpaId, SessionId};
use storage::{DonorStore, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/lpa.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Starts an empty LPA, owned by a new session unless one is given.
    CreateLpa {
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Prints the stored aggregate as JSON.
    ShowLpa { lpa_id: String },
    ListLpas {
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
}

fn parse_session(raw: &str) -> Result<SessionId> {
    raw.parse()
        .with_context(|| format!("'{raw}' is not a session id"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateLpa { session_id } => {
            let session_id = match session_id {
                Some(raw) => parse_session(&raw)?,
                None => SessionId::new(),
            };
            let provided = storage.create(session_id, Utc::now()).await?;
            println!(
                "created lpa_id={} session_id={}",
                provided.lpa_id, provided.session_id
            );
        }
        Command::ShowLpa { lpa_id } => {
            let lpa_id: LpaId = lpa_id
                .parse()
                .with_context(|| format!("'{lpa_id}' is not an lpa id"))?;
            let provided = storage
                .get(lpa_id)
                .await?
                .with_context(|| format!("lpa {lpa_id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&provided)?);
        }
        Command::ListLpas { session_id, limit } => {
            let lpas = match session_id {
                Some(raw) => storage.list_for_session(parse_session(&raw)?).await?,
                None => storage.list_all(limit).await?,
            };
            for lpa in lpas {
                let lpa_type = lpa
                    .lpa_type
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}\tv{}\t{}\t{}\t{}",
                    lpa.lpa_id,
                    lpa.version,
                    lpa_type,
                    if lpa.lpa_uid.is_empty() { "-" } else { lpa.lpa_uid.as_str() },
                    lpa.donor_full_name
                );
            }
        }
    }

    Ok(())
}
