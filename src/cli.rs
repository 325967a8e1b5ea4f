use anyhow::Result;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use crate::{
    classifier::Analysis,
    domain::{preview, PendingItem},
    tasks::{ActionError, ActionKind, ActionOutcome, PassStatus, PassSummary},
};

const SUMMARY_PREVIEW_CHARS: usize = 200;
const CONSOLE_PREVIEW_CHARS: usize = 100;

#[derive(Parser)]
#[command(name = "prospect-triage")]
#[command(about = "Flags LinkedIn prospection messages and queues suggested replies", long_about = None)]
pub struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one classification pass over recent conversations
    Check {
        /// Classify without saving the state file
        #[arg(long)]
        dry_run: bool,
    },
    /// Score a single text without touching the state file
    Test {
        #[arg(long)]
        text: String,
        /// Sender display name used in the suggested reply
        #[arg(long, default_value = "")]
        sender: String,
        /// Treat the text as a reply inside an ongoing thread
        #[arg(long)]
        reply: bool,
    },
    /// Resolve a pending message: ignore, send, modify or send-custom
    Action {
        action: ActionKind,
        /// Message id of the pending item
        #[arg(long)]
        id: String,
        /// Reply text for send-custom
        #[arg(long)]
        message: Option<String>,
        /// Show what send would deliver without sending, archiving or saving
        #[arg(long)]
        dry_run: bool,
    },
    /// List messages waiting for a decision
    Pending,
}

#[derive(Serialize)]
struct DryTest<'a> {
    is_spam: bool,
    #[serde(flatten)]
    analysis: &'a Analysis,
}

#[derive(Serialize)]
struct PendingRow<'a> {
    #[serde(flatten)]
    item: &'a PendingItem,
    text_preview: String,
}

fn rows(items: &[PendingItem]) -> Vec<PendingRow<'_>> {
    items
        .iter()
        .map(|item| PendingRow {
            item,
            text_preview: item.text_preview(SUMMARY_PREVIEW_CHARS),
        })
        .collect()
}

pub fn render_pass(summary: &PassSummary, json_output: bool, tz: Tz) -> Result<()> {
    if json_output {
        let value = json!({
            "status": summary.status,
            "detected": summary.detected,
            "messages": rows(&summary.messages),
            "error": summary.error,
            "skipped_conversations": summary.skipped_conversations,
            "pending_total": summary.pending_total,
            "dry_run": summary.dry_run,
        });
        println!("{}", serde_json::to_string(&value)?);
        return Ok(());
    }

    match summary.status {
        PassStatus::Error => {
            println!(
                "Error: {}",
                summary.error.as_deref().unwrap_or("transport unavailable")
            );
        }
        PassStatus::Ok if summary.detected == 0 => {
            println!("LinkedIn: no prospection detected");
        }
        PassStatus::Ok => {
            println!(
                "LinkedIn: {} prospection message(s) detected",
                summary.detected
            );
            for item in &summary.messages {
                print_item(item, tz);
            }
        }
    }
    if summary.skipped_conversations > 0 {
        println!(
            "{} conversation(s) skipped, retried next pass",
            summary.skipped_conversations
        );
    }
    if summary.dry_run {
        println!("(dry run, state not saved)");
    }
    Ok(())
}

pub fn render_test(analysis: &Analysis, json_output: bool) -> Result<()> {
    if json_output {
        let report = DryTest {
            is_spam: analysis.verdict.is_spam,
            analysis,
        };
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    let verdict = &analysis.verdict;
    if verdict.is_spam {
        println!(
            "Prospection detected ({}, score {:.2} >= {:.1})",
            analysis.category, verdict.score, verdict.threshold
        );
    } else {
        println!(
            "Not detected as prospection (score {:.2} < {:.1})",
            verdict.score, verdict.threshold
        );
    }
    for reason in &verdict.reasons {
        println!("  - {reason}");
    }
    if let Some(reply) = &analysis.suggested_response {
        println!("Suggested response: {reply}");
    }
    Ok(())
}

/// Returns whether the action succeeded.
pub fn render_action(
    kind: ActionKind,
    message_id: &str,
    result: &Result<ActionOutcome, ActionError>,
    json_output: bool,
) -> Result<bool> {
    let success = result.is_ok();
    if json_output {
        let value = match result {
            Ok(outcome) => json!({ "success": true, "outcome": outcome }),
            Err(err) => json!({
                "success": false,
                "action": kind.to_string(),
                "message_id": message_id,
                "error": err.to_string(),
            }),
        };
        println!("{}", serde_json::to_string(&value)?);
        return Ok(success);
    }

    match result {
        Ok(ActionOutcome::Ignored { message_id, .. }) => {
            println!("Message ignored ({message_id})");
        }
        Ok(ActionOutcome::Sent {
            message_id,
            archived,
            ..
        }) => {
            if *archived {
                println!("Reply sent and chat archived ({message_id})");
            } else {
                println!("Reply sent, chat not archived ({message_id})");
            }
        }
        Ok(ActionOutcome::WouldSend { chat_id, text, .. }) => {
            println!("[dry run] Would send to {chat_id}:");
            println!("{text}");
            println!("[dry run] Would then archive the chat");
        }
        Ok(ActionOutcome::Modify(prompt)) => {
            println!("{}", prompt.prompt);
            println!("Current response: {}", prompt.current_response);
        }
        Err(err) => {
            eprintln!("{kind} failed: {err}");
        }
    }
    Ok(success)
}

pub fn render_pending(items: &[PendingItem], json_output: bool, tz: Tz) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string(&rows(items))?);
        return Ok(());
    }
    if items.is_empty() {
        println!("Nothing pending");
        return Ok(());
    }
    for item in items {
        print_item(item, tz);
    }
    Ok(())
}

fn print_item(item: &PendingItem, tz: Tz) {
    println!(
        "  - [{}] {} from {} ({}, {})",
        item.message_id,
        item.category,
        item.sender,
        item.status.label(),
        item.detected_at.with_timezone(&tz).format("%Y-%m-%d %H:%M"),
    );
    println!("    Preview: {}", preview(&item.text, CONSOLE_PREVIEW_CHARS));
    println!("    Response: {}", item.suggested_response);
}
