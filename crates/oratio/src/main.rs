mod config;
mod service;
mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use oratio_core::generation::LengthHint;
use oratio_core::prayer::{NewPrayer, PrayerRecord, PrayerStatus};
use oratio_core::quota::{CounterKind, QuotaGate};

use crate::config::Config;

/// Oratio - track prayers and how often they are prayed over
#[derive(Parser, Debug)]
#[command(name = "oratio")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all prayers, newest first
    List,
    /// Add a new prayer
    Add {
        /// Prayer text
        text: String,
    },
    /// Show a single prayer
    Show {
        /// Prayer id
        id: Uuid,
    },
    /// Delete a prayer (no-op when absent)
    Delete {
        /// Prayer id
        id: Uuid,
    },
    /// Record that a prayer was prayed over
    PrayedOver {
        /// Prayer id
        id: Uuid,
    },
    /// Change a prayer's status
    SetStatus {
        /// Prayer id
        id: Uuid,
        /// One of: new, praying, accomplished, changed_or_no_longer_needed
        status: String,
    },
    /// Replace a prayer's text
    EditText {
        /// Prayer id
        id: Uuid,
        /// New text
        text: String,
    },
    /// Generate a prayer suggestion, subject to the daily quota
    Suggest {
        /// User identifier the quota is charged against
        user: String,
        /// Prompt describing what to pray about
        prompt: String,
        /// Requested length: short, medium or long
        #[arg(long, default_value = "medium")]
        length: String,
    },
    /// Record a signup attempt from an IP, subject to the daily throttle
    Signup {
        /// Source IP address
        ip: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oratio=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let storage = storage::connect(&config).await?;

    match cli.command {
        Command::List => {
            let prayers = storage.prayers.list_prayers().await?;
            if prayers.is_empty() {
                println!("No prayers recorded.");
            }
            for prayer in prayers {
                print_record(&prayer);
            }
        }
        Command::Add { text } => {
            let record = storage.prayers.create_prayer(NewPrayer::new(text)).await?;
            print_record(&record);
        }
        Command::Show { id } => match storage.prayers.get_prayer(id).await? {
            Some(record) => print_record(&record),
            None => println!("Not found: {id}"),
        },
        Command::Delete { id } => {
            storage.prayers.delete_prayer(id).await?;
        }
        Command::PrayedOver { id } => {
            storage.prayers.increment_prayed_over(id).await?;
        }
        Command::SetStatus { id, status } => {
            // The repository does not validate status values; parsing here
            // is the caller-side validation step.
            let status: PrayerStatus = status
                .parse()
                .context("Invalid status (expected new, praying, accomplished or changed_or_no_longer_needed)")?;
            storage.prayers.update_status(id, status).await?;
        }
        Command::EditText { id, text } => {
            storage.prayers.update_text(id, &text).await?;
        }
        Command::Suggest {
            user,
            prompt,
            length,
        } => {
            let gate = QuotaGate::new(CounterKind::GenerationQuota, config.generation_daily_ceiling);
            // No vendor client ships with the CLI; the flow still runs the
            // quota check and reports the unconfigured generator.
            let suggestions = service::SuggestionService::with_gate(
                storage.prayers.clone(),
                storage.counters.clone(),
                Arc::new(service::UnconfiguredGenerator),
                gate,
            );
            match suggestions
                .suggest(&user, &prompt, LengthHint::parse_lenient(&length))
                .await
            {
                Ok(record) => print_record(&record),
                Err(service::SuggestError::QuotaExceeded) => {
                    println!("Daily generation quota reached for {user}");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Signup { ip } => {
            let gate = QuotaGate::new(CounterKind::SignupThrottle, config.signup_daily_ceiling);
            let policy = service::SignupPolicy::with_gate(storage.counters.clone(), gate);
            if policy.is_open_for_signup(&ip).await? {
                policy.record_signup(&ip).await?;
                println!("Signup recorded for {ip}");
            } else {
                println!("Signup rejected for {ip}: daily limit reached");
            }
        }
    }

    Ok(())
}

fn print_record(record: &PrayerRecord) {
    let origin = if record.is_ai_generated { "ai" } else { "user" };
    println!(
        "{}  [{}] ({}) prayed-over {} times  created {}\n    {}",
        record.id,
        record.status,
        origin,
        record.clicked_as_prayed_over_count,
        record.created_at.format("%Y-%m-%d %H:%M"),
        record.text
    );
}
