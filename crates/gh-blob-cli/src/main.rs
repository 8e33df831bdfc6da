//! gh-blob: manage migration archives stored with GitHub.
//!
//! Set GITHUB_TOKEN. GH_BLOB_API_URL and GH_BLOB_UPLOADS_URL override the
//! API endpoints, GH_BLOB_GRAPHQL_ENVELOPE selects `wrapped` or `bare`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::TryStreamExt;
use gh_blob_cli::{format_bytes, init_tracing, with_deadline, COMMAND_DEADLINE};
use gh_blob_client::GitHubClient;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "gh-blob", about = "Upload, list and delete migration archives")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an archive to an organization
    Upload {
        /// Organization login
        #[arg(long)]
        org: String,
        /// Path to the archive file
        #[arg(long)]
        archive_file_path: PathBuf,
    },
    /// List every archive of an organization
    QueryAll {
        /// Organization login
        #[arg(long)]
        org: String,
        /// Print one JSON record per line as pages arrive
        #[arg(long)]
        stream: bool,
    },
    /// Show one archive by node id
    Query {
        /// Archive node id
        #[arg(long)]
        id: String,
    },
    /// Delete one archive by node id
    Delete {
        /// Archive node id
        #[arg(long)]
        id: String,
    },
    /// Resolve an organization login
    Org {
        /// Organization login
        #[arg(long)]
        org: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn run(client: &GitHubClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Upload {
            org,
            archive_file_path,
        } => {
            let organization = client
                .resolve_organization(&org)
                .await
                .with_context(|| format!("Resolve organization '{}'", org))?;
            if let Ok(meta) = std::fs::metadata(&archive_file_path) {
                tracing::info!(
                    file = %archive_file_path.display(),
                    size = %format_bytes(meta.len()),
                    org = %organization.login,
                    "Uploading archive"
                );
            }
            let archive = client
                .upload_blob(&archive_file_path, &organization.numeric_id())
                .await?;
            print_json(&archive)?;
        }
        Commands::QueryAll { org, stream } => {
            if stream {
                let mut records = Box::pin(client.list_blobs(&org).into_stream());
                while let Some(archive) = records.try_next().await? {
                    println!(
                        "{}",
                        serde_json::to_string(&archive).context("Serialize archive")?
                    );
                }
            } else {
                let listing = client.list_blobs(&org).collect_all().await?;
                print_json(&listing)?;
            }
        }
        Commands::Query { id } => {
            let archive = client.get_blob(&id).await?;
            print_json(&archive)?;
        }
        Commands::Delete { id } => {
            client.delete_blob(&id).await?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("Archive {} deleted", id) }),
            )?;
        }
        Commands::Org { org } => {
            let organization = client.resolve_organization(&org).await?;
            print_json(&organization)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let client = GitHubClient::from_env()
        .context("Failed to create GitHub client. Set GITHUB_TOKEN")?;

    let cli = Cli::parse();
    with_deadline(COMMAND_DEADLINE, run(&client, cli.command)).await
}
