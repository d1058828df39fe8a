//! Atrium portal: terminal client for the Atrium API.
//!
//! Signs in, resolves the session to a project, opens the conversation, and
//! keeps both the timeline and the project header live over the sync
//! channel. Lines typed at the prompt are sent as messages; a handful of
//! slash commands cover the rest.
//!
//! # Environment variables
//!
//! | Variable          | Required | Default                 | Description |
//! |-------------------|----------|-------------------------|-------------|
//! | `ATRIUM_API_URL`  | no       | `http://localhost:3000` | Base URL of the API server |
//! | `PORTAL_EMAIL`    | yes      | --                      | Account email to sign in with |
//! | `PORTAL_PASSWORD` | yes      | --                      | Account password |
//! | `PORTAL_ROLE`     | no       | `client`                | Which portal to enter: `client` or `admin` |
//! | `RUST_LOG`        | no       | `atrium_portal=info`    | Log filter |

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use atrium_client::backend::SessionUser;
use atrium_client::conversation::ConversationView;
use atrium_client::progress::{progress_patch, ProjectSync};
use atrium_client::session::{GateState, SessionGate};
use atrium_client::subscriber::ChangeSubscriber;
use atrium_client::{ClientError, HttpBackend, PortalBackend};
use atrium_core::conversation::{ConversationEntry, Delivery};
use atrium_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use atrium_core::sync::{collections, events};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atrium_portal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_url =
        std::env::var("ATRIUM_API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let email = std::env::var("PORTAL_EMAIL").unwrap_or_else(|_| {
        tracing::error!("PORTAL_EMAIL must be set");
        std::process::exit(1);
    });
    let password = std::env::var("PORTAL_PASSWORD").unwrap_or_else(|_| {
        tracing::error!("PORTAL_PASSWORD must be set");
        std::process::exit(1);
    });
    let role = match std::env::var("PORTAL_ROLE").as_deref() {
        Ok("admin") => ROLE_ADMIN,
        Ok("client") | Err(_) => ROLE_CLIENT,
        Ok(other) => {
            tracing::error!(role = other, "PORTAL_ROLE must be 'client' or 'admin'");
            std::process::exit(1);
        }
    };

    let backend = Arc::new(HttpBackend::new(api_url));
    let gate = SessionGate::new(backend.clone(), role);

    match gate.sign_in(&email, &password).await {
        GateState::Ready {
            user,
            project,
            duplicate_warning,
        } => {
            if duplicate_warning {
                tracing::warn!(
                    "More than one project is linked to this account; showing the newest"
                );
            }
            if let Err(e) = run_portal(backend, &gate, user, project).await {
                tracing::error!(error = %e, "Portal session failed");
                std::process::exit(1);
            }
        }
        GateState::NoLinkedProject { email } => {
            println!("No project is linked to {email} yet. Check back soon.");
            gate.sign_out().await;
        }
        GateState::AccessDenied { message } => {
            tracing::error!("{message}");
            std::process::exit(1);
        }
        GateState::Unauthenticated { error } => {
            tracing::error!(
                error = error.as_deref().unwrap_or("no session"),
                "Sign-in failed"
            );
            std::process::exit(1);
        }
    }
}

async fn run_portal(
    backend: Arc<HttpBackend>,
    gate: &SessionGate,
    user: SessionUser,
    project: atrium_client::ProjectRecord,
) -> Result<(), ClientError> {
    let counterparty = if user.role == ROLE_ADMIN {
        project.client_name.clone()
    } else {
        project
            .lead_name
            .clone()
            .unwrap_or_else(|| "Studio".to_string())
    };

    let scope_id = project.id;
    let mut view =
        ConversationView::open(backend.clone(), scope_id, &user.role, &counterparty).await?;
    let mut project_sync = ProjectSync::new(project);

    // One channel per mounted view: messages feed the conversation, project
    // updates feed the header.
    let ws_url = backend.ws_url().await?;
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
    let messages_sub = ChangeSubscriber::new(
        ws_url.clone(),
        collections::MESSAGES,
        events::INSERT,
        scope_id,
        msg_tx,
    )
    .spawn();
    let (proj_tx, mut proj_rx) = mpsc::unbounded_channel();
    let project_sub = ChangeSubscriber::new(
        ws_url,
        collections::PROJECTS,
        events::UPDATE,
        scope_id,
        proj_tx,
    )
    .spawn();

    print_header(&project_sync);
    for entry in view.entries() {
        print_entry(entry, &user.role, view.counterparty_label());
    }
    println!("Type a message, or /invoices, /progress <n> (admin), /retry, /quit");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) | Err(_) => break,
                };
                if !handle_line(&line, &backend, &user, &mut view, &mut project_sync).await {
                    break;
                }
            }
            Some(message) = msg_rx.recv() => {
                let before = view.entries().len();
                view.apply_event(message);
                if view.entries().len() > before {
                    if let Some(entry) = view.entries().last() {
                        print_entry(entry, &user.role, view.counterparty_label());
                    }
                }
            }
            Some(message) = proj_rx.recv() => {
                if project_sync.apply_event(message) {
                    print_header(&project_sync);
                }
            }
        }
    }

    messages_sub.stop();
    project_sub.stop();
    gate.sign_out().await;
    tracing::info!("Signed out");
    Ok(())
}

/// Handle one input line. Returns `false` when the portal should exit.
async fn handle_line(
    line: &str,
    backend: &Arc<HttpBackend>,
    user: &SessionUser,
    view: &mut ConversationView,
    project_sync: &mut ProjectSync,
) -> bool {
    let line = line.trim();
    match line {
        "/quit" => return false,
        "/invoices" => match backend.invoices(view.scope_id()).await {
            Ok(invoices) if invoices.is_empty() => println!("No invoices yet."),
            Ok(invoices) => {
                for invoice in invoices {
                    println!(
                        "{}  {}  {}  [{}]",
                        invoice.date, invoice.description, invoice.amount, invoice.status
                    );
                }
            }
            Err(e) => println!("Could not load invoices: {e}"),
        },
        "/retry" => {
            let failed: Vec<_> = view
                .entries()
                .iter()
                .filter(|e| e.delivery == Delivery::Failed)
                .filter_map(|e| e.client_ref)
                .collect();
            if failed.is_empty() {
                println!("Nothing to retry.");
            }
            for client_ref in failed {
                view.retry(client_ref).await;
            }
        }
        _ if line.starts_with("/progress") => {
            if user.role != ROLE_ADMIN {
                println!("Only the studio updates progress.");
                return true;
            }
            let value = line
                .trim_start_matches("/progress")
                .trim()
                .parse::<i32>();
            match value {
                Ok(value) => {
                    match backend
                        .update_project(view.scope_id(), progress_patch(value))
                        .await
                    {
                        Ok(updated) => println!("Progress set to {}%", updated.progress),
                        Err(e) => println!("Update failed: {e}"),
                    }
                }
                Err(_) => println!("Usage: /progress <0-100>"),
            }
        }
        _ => {
            if view.send(line).await.is_none() {
                // Whitespace-only input stages nothing and sends nothing.
                return true;
            }
            if let Some(entry) = view.entries().last() {
                print_entry(entry, &user.role, view.counterparty_label());
            }
        }
    }
    true
}

fn print_header(project_sync: &ProjectSync) {
    let p = project_sync.project();
    println!(
        "== {} | {} | {}% | health: {} | next: {} ==",
        p.name, p.status, p.progress, p.health, p.next_milestone
    );
}

fn print_entry(entry: &ConversationEntry, own_role: &str, counterparty: &str) {
    let who = if entry.sender_role == own_role {
        "you"
    } else {
        counterparty
    };
    let marker = match entry.delivery {
        Delivery::Pending => " (sending)",
        Delivery::Failed => " (failed, /retry)",
        Delivery::Confirmed => "",
    };
    println!(
        "[{}] {}: {}{}",
        entry.created_at.format("%H:%M"),
        who,
        entry.body,
        marker
    );
}
