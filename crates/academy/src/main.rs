//! `academy` - inquiry desk for academy operations
//!
//! Prints the inquiry board, or a single thread when an identifier is given.
//! Identifiers go through the same resolver the web routes use, so stale row
//! numbers and legacy `row-N` links still land on a thread.
//!
//! ```text
//! academy                          # inquiry board
//! academy <inquiry-id>             # one thread
//! academy status <inquiry-id> <status|next>
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::io::{self, Write};

use academy_core::{
    Audience, InquiryRecord, InquiryStatus, InquiryStore, StatusChangeOptions, StoreConfig,
};
use anyhow::{Context, bail};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "academy=info,academy_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting academy inquiry desk");

    let config = load_config();
    let store = InquiryStore::from_config(&config).context("failed to build inquiry store")?;

    let watcher = store.clone();
    let _subscription = store.subscribe(move || {
        info!(
            inquiries = watcher.get_snapshot().len(),
            "Inquiry snapshot changed"
        );
    });

    let command = Command::parse(std::env::args().skip(1))?;
    let mut out = io::stdout().lock();
    match command {
        Command::Board => print_board(&mut out, &store.get_snapshot())?,
        Command::Show(raw) => print_thread(&mut out, &resolve(&store, &raw)?)?,
        Command::SetStatus { raw, target } => {
            let record = resolve(&store, &raw)?;
            let status = match target {
                StatusTarget::Next => record
                    .status
                    .next()
                    .with_context(|| format!("{} is already {}", record.id, record.status))?,
                StatusTarget::Exact(status) => status,
            };
            store.set_inquiry_status(&record.id, status, StatusChangeOptions::default());
            print_thread(&mut out, &resolve(&store, record.id.as_str())?)?;
        }
    }

    Ok(())
}

/// What to do, from the command line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Board,
    Show(String),
    SetStatus { raw: String, target: StatusTarget },
}

#[derive(Debug, PartialEq, Eq)]
enum StatusTarget {
    Next,
    Exact(InquiryStatus),
}

impl Command {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let Some(first) = args.next() else {
            return Ok(Self::Board);
        };
        if first != "status" {
            return Ok(Self::Show(first));
        }

        let (Some(raw), Some(target)) = (args.next(), args.next()) else {
            bail!("usage: academy status <inquiry-id> <status|next>");
        };
        let target = if target == "next" {
            StatusTarget::Next
        } else {
            let labels: Vec<&str> = InquiryStatus::ALL.iter().map(InquiryStatus::label).collect();
            StatusTarget::Exact(InquiryStatus::parse(&target).with_context(|| {
                format!("unknown status {target:?}; expected one of {}", labels.join(", "))
            })?)
        };
        Ok(Self::SetStatus { raw, target })
    }
}

fn resolve(store: &InquiryStore, raw: &str) -> anyhow::Result<InquiryRecord> {
    store
        .find_resolved(raw)
        .with_context(|| format!("no inquiry matches {raw:?}"))
}

/// Load configuration from disk, falling back to defaults.
fn load_config() -> StoreConfig {
    let path = StoreConfig::default_path();
    match StoreConfig::load(&path) {
        Ok(config) => {
            info!(persistence = ?config.persistence, "Loaded configuration from {:?}", path);
            config
        }
        Err(e) => {
            warn!("Failed to load configuration from {:?}: {}; using defaults", path, e);
            StoreConfig::default()
        }
    }
}

fn print_board(out: &mut impl Write, records: &[InquiryRecord]) -> io::Result<()> {
    for record in records {
        writeln!(
            out,
            "{:<8} {:<16} {} ({}, {} messages)",
            record.id.as_str(),
            record.status.label(),
            record.title,
            record.student.name,
            record.messages.len()
        )?;
    }
    Ok(())
}

fn print_thread(out: &mut impl Write, record: &InquiryRecord) -> io::Result<()> {
    writeln!(out, "[{}] {}", record.id, record.title)?;
    writeln!(
        out,
        "{} · {} · {}",
        record.category,
        record.status.label(),
        record.student.name
    )?;
    writeln!(out)?;

    for message in record.visible_messages(Audience::Staff) {
        writeln!(
            out,
            "{} {} ({})",
            message.created_at.format("%Y-%m-%d %H:%M"),
            message.author,
            message.role.as_str()
        )?;
        writeln!(out, "  {}", message.content)?;
        for attachment in &message.attachments {
            writeln!(out, "  + {}", attachment.label)?;
        }
    }
    Ok(())
}
