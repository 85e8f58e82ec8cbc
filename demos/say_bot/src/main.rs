//! Say Bot Example
//!
//! A console demonstration of the Tessera framework. Standard input stands
//! in for the platform: each line becomes a [`PlatformEvent`], and replies
//! are printed instead of sent.
//!
//! The `say` command echoes its `content` option together with a Delete
//! button that only the original invoker may press. Nothing about the button
//! is stored in the bot; everything needed to route and authorize the click
//! travels inside its `custom_id`.
//!
//! # Console
//!
//! ```text
//! /say <text>   invoke `say`
//! /ping         invoke `ping`
//! as <user>     act as another user id
//! click <n>     press the n-th button of the last message with components
//! quit          stop
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package say-bot
//! cargo run --package say-bot -- --demo
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use tessera::core::{Component, ComponentEvent, ReplyResult, SlashEvent};
use tessera::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, mpsc};

#[derive(Parser, Debug)]
#[command(about = "A console say bot built on Tessera")]
struct Args {
    /// Configuration file (defaults to searching for tessera.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// User id to start as.
    #[arg(short, long, default_value_t = 1)]
    user: u64,

    /// Run the scripted two-user scenario and exit.
    #[arg(long)]
    demo: bool,
}

// ============================================================================
// Commands
// ============================================================================

fn say_command() -> SlashCommand {
    SlashCommand::new("say", "Make the bot say something")
        .options(|o| {
            o.required_string("content", "What to say");
        })
        .components(|c| {
            c.danger("delete", "Delete")
                .emoji("🗑️")
                .restrict_to_invoker()
                .on_click(delete_message);
        })
        .handler(say)
}

async fn say(ctx: Arc<InvocationContext>) -> ExtractResult<Reply> {
    let content: String = ctx.require("content")?;
    Ok(Reply::text(content).rows(ctx.components()))
}

async fn delete_message(ctx: Arc<ComponentContext>, Invoker(user): Invoker) {
    info!(user = %user.id, "Deleting message");
    if let Err(e) = ctx.delete_message().await {
        error!(error = %e, "Failed to delete message");
    }
}

fn ping_command() -> SlashCommand {
    SlashCommand::new("ping", "Check that the bot is alive").handler(|| async {
        Reply::text("Pong! 🏓").ephemeral(true)
    })
}

// ============================================================================
// Console transport
// ============================================================================

/// Prints replies and remembers the buttons of the last message that had any.
#[derive(Default)]
struct ConsoleResponder {
    last_buttons: Mutex<Vec<String>>,
}

impl ConsoleResponder {
    async fn button(&self, index: usize) -> Option<String> {
        self.last_buttons
            .lock()
            .await
            .get(index.checked_sub(1)?)
            .cloned()
    }

    async fn print(&self, interaction_id: &str, verb: &str, reply: &Reply) {
        let scope = if reply.ephemeral { " (only you)" } else { "" };
        println!("[{interaction_id}] {verb}{scope}: {}", reply.text_content());

        let buttons: Vec<String> = reply
            .components
            .iter()
            .flat_map(|row| &row.components)
            .filter_map(|component| match component {
                Component::Button(button) => {
                    println!("    [{}] custom_id={:?}", button.label, button.custom_id);
                    button.custom_id.clone()
                }
                _ => None,
            })
            .collect();
        if !buttons.is_empty() {
            *self.last_buttons.lock().await = buttons;
        }
    }
}

#[async_trait]
impl Responder for ConsoleResponder {
    async fn reply(&self, interaction_id: &str, reply: Reply) -> ReplyResult<()> {
        self.print(interaction_id, "reply", &reply).await;
        Ok(())
    }

    async fn defer(&self, interaction_id: &str, ephemeral: bool) -> ReplyResult<()> {
        println!("[{interaction_id}] thinking... (ephemeral: {ephemeral})");
        Ok(())
    }

    async fn edit_message(&self, interaction_id: &str, reply: Reply) -> ReplyResult<()> {
        self.print(interaction_id, "edit", &reply).await;
        Ok(())
    }

    async fn delete_message(&self, interaction_id: &str) -> ReplyResult<()> {
        println!("[{interaction_id}] message deleted");
        Ok(())
    }
}

/// Turns console lines into events.
struct Console {
    responder: Arc<ConsoleResponder>,
    user: User,
    counter: u64,
}

impl Console {
    fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("i-{}", self.counter)
    }

    /// Returns `None` for lines that produce no event.
    async fn parse(&mut self, line: &str) -> Option<PlatformEvent> {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix('/') {
            let (command, text) = rest.split_once(' ').unwrap_or((rest, ""));
            let mut event = SlashEvent::new(self.next_id(), command, self.user.clone());
            if !text.is_empty() {
                event = event.option("content", text);
            }
            return Some(event.into());
        }

        match line.split_once(' ') {
            Some(("as", id)) => match id.trim().parse::<u64>() {
                Ok(id) => {
                    self.user = User::new(id, format!("user{id}"));
                    println!("now acting as {id}");
                }
                Err(e) => println!("invalid user id: {e}"),
            },
            Some(("click", n)) => {
                let custom_id = match n.trim().parse() {
                    Ok(index) => self.responder.button(index).await,
                    Err(_) => None,
                };
                match custom_id {
                    Some(custom_id) => {
                        let event =
                            ComponentEvent::button(self.next_id(), custom_id, self.user.clone());
                        return Some(event.into());
                    }
                    None => println!("no such button"),
                }
            }
            _ if line.is_empty() => {}
            _ => println!("unrecognized input: {line}"),
        }
        None
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

async fn run_demo(runtime: &SlashRuntime, responder: &ConsoleResponder) -> Result<()> {
    let alice = User::new(1u64, "alice");
    let bob = User::new(2u64, "bob");

    let outcome = runtime
        .dispatch(SlashEvent::new("i-1", "say", alice.clone()).option("content", "hi").into())
        .await;
    println!("=> {outcome:?}");

    let custom_id = responder
        .button(1)
        .await
        .ok_or_else(|| anyhow::anyhow!("say did not render a button"))?;

    let outcome = runtime
        .dispatch(ComponentEvent::button("i-2", custom_id.clone(), bob).into())
        .await;
    println!("=> {outcome:?}");

    let outcome = runtime
        .dispatch(ComponentEvent::button("i-3", custom_id, alice).into())
        .await;
    println!("=> {outcome:?}");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let responder = Arc::new(ConsoleResponder::default());
    let mut builder = SlashRuntime::builder()
        .command(say_command())
        .command(ping_command());
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    let runtime = builder.build(responder.clone())?;

    if args.demo {
        return run_demo(&runtime, &responder).await;
    }

    let (tx, rx) = mpsc::channel(32);
    let event_loop = {
        let runtime = runtime.clone();
        tokio::spawn(async move { runtime.run(rx).await })
    };

    let mut console = Console {
        responder,
        user: User::new(args.user, format!("user{}", args.user)),
        counter: 0,
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "quit" {
            break;
        }
        if let Some(event) = console.parse(&line).await
            && tx.send(event).await.is_err()
        {
            break;
        }
    }

    drop(tx);
    event_loop.await?;
    Ok(())
}
