use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use flotilla::controller::{validate_multiple_request, validate_request, Request, RequestConfig};
use flotilla::fleet::MemoryFleet;
use flotilla::render::status_table;
use flotilla::store::FsUnitStore;
use flotilla::task::TaskObject;
use flotilla::{Controller, ControllerConfig};

#[derive(Parser, Debug)]
#[command(name = "flotilla")]
#[command(about = "Group-oriented orchestration for fleet-managed systemd units")]
struct Args {
    /// Directory containing group unit files
    #[arg(long, default_value = ".", global = true)]
    unit_root: PathBuf,

    /// Do not block until the dispatched task has finished
    #[arg(long, global = true)]
    no_block: bool,

    /// Show per-unit rows and unit file hashes
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a group to the fleet
    Submit {
        group: String,
        /// Number of slices to instantiate (scalable groups only)
        #[arg(long, default_value_t = 1)]
        scale: usize,
    },
    /// Start a group, or specific slices of it
    Start { group: String, slices: Vec<String> },
    /// Stop a group, or specific slices of it
    Stop { group: String, slices: Vec<String> },
    /// Remove a group's unit definitions from the fleet
    Destroy { group: String, slices: Vec<String> },
    /// Show the status of a group
    Status {
        group: String,
        slices: Vec<String>,
        /// Print machine-readable JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Replace the units of a running group with the local definitions
    Update { group: String },
    /// Validate group unit files
    Validate { groups: Vec<String> },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let store = FsUnitStore::new(&args.unit_root);
    let fleet = Arc::new(MemoryFleet::new());
    let controller = Controller::new(ControllerConfig::default(), fleet);

    if let Err(err) = run(&args, &store, &controller).await {
        tracing::error!(error = %err, "Command failed");
        process::exit(1);
    }
}

async fn run(args: &Args, store: &FsUnitStore, controller: &Controller) -> flotilla::Result<()> {
    match &args.command {
        Command::Submit { group, scale } => {
            let request = Request::from_unit_store(store, group, *scale)?;
            let task = controller.submit(&request).await?;
            block_with_feedback(controller, "submit", &request, task, args.no_block).await;
        }
        Command::Start { group, slices } => {
            let request = slice_request(group, slices);
            let request = controller.extend_with_existing_slice_ids(request).await?;
            let task = controller.start(&request).await?;
            block_with_feedback(controller, "start", &request, task, args.no_block).await;
        }
        Command::Stop { group, slices } => {
            let request = slice_request(group, slices);
            let request = controller.extend_with_existing_slice_ids(request).await?;
            let task = controller.stop(&request).await?;
            block_with_feedback(controller, "stop", &request, task, args.no_block).await;
        }
        Command::Destroy { group, slices } => {
            let request = slice_request(group, slices);
            let request = controller.extend_with_existing_slice_ids(request).await?;
            let task = controller.destroy(&request).await?;
            block_with_feedback(controller, "destroy", &request, task, args.no_block).await;
        }
        Command::Status {
            group,
            slices,
            json,
        } => {
            let request = slice_request(group, slices);
            let request = controller.extend_with_existing_slice_ids(request).await?;
            let mut list = controller.get_status(&request).await?;
            if !args.verbose {
                list = list.group()?;
            }

            if *json {
                let payload = serde_json::to_string_pretty(&list)
                    .expect("status list serializes to JSON");
                println!("{}", payload);
            } else {
                for row in status_table(group, &list, args.verbose) {
                    println!("{}", row);
                }
            }
        }
        Command::Update { group } => {
            let request = Request::from_unit_store(store, group, 1)?;
            let request = controller.extend_with_existing_slice_ids(request).await?;
            let task = controller.update(&request).await?;
            block_with_feedback(controller, "update", &request, task, args.no_block).await;
        }
        Command::Validate { groups } => {
            let mut requests = Vec::with_capacity(groups.len());
            for group in groups {
                let request = Request::from_unit_store(store, group, 1)?;
                validate_request(&request)?;
                requests.push(request);
            }
            validate_multiple_request(&requests)?;
            for request in &requests {
                println!("Group '{}' is valid.", request.group);
            }
        }
    }

    Ok(())
}

/// A request addressing the given slices, or all existing slices when none
/// are listed.
fn slice_request(group: &str, slices: &[String]) -> Request {
    Request::new(RequestConfig {
        group: group.to_string(),
        slice_ids: Some(slices.to_vec()),
        ..RequestConfig::default()
    })
}

/// Block on the dispatched task and report the outcome.
///
/// The phrasing follows the request's slice specifier: the whole group, all
/// slices of it, or an explicit slice list. A failed task exits non-zero.
async fn block_with_feedback(
    controller: &Controller,
    descriptor: &str,
    request: &Request,
    task: TaskObject,
    no_block: bool,
) {
    if !no_block {
        // Ctrl-C only gives up the wait; the dispatched fleet calls are
        // never aborted.
        let closer = CancellationToken::new();
        let interrupt = closer.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, giving up the wait");
                interrupt.cancel();
            }
        });

        match controller.wait_for_task(task.id, closer).await {
            Err(err) => {
                eprintln!("{}", err);
                process::exit(1);
            }
            Ok(None) => return,
            Ok(Some(finished)) if finished.has_failed() => {
                let reason = finished.error.unwrap_or_default();
                match &request.slice_ids {
                    None => println!(
                        "Failed to {} group '{}'. ({})",
                        descriptor, request.group, reason
                    ),
                    Some(ids) if ids.is_empty() => println!(
                        "Failed to {} all slices of group '{}'. ({})",
                        descriptor, request.group, reason
                    ),
                    Some(ids) => println!(
                        "Failed to {} {} slices for group '{}': {:?}. ({})",
                        descriptor,
                        ids.len(),
                        request.group,
                        ids,
                        reason
                    ),
                }
                process::exit(1);
            }
            Ok(Some(_)) => {}
        }
    }

    match &request.slice_ids {
        None => println!("Succeeded to {} group '{}'.", descriptor, request.group),
        Some(ids) if ids.is_empty() => println!(
            "Succeeded to {} all slices of group '{}'.",
            descriptor, request.group
        ),
        Some(ids) => println!(
            "Succeeded to {} {} slices for group '{}': {:?}.",
            descriptor,
            ids.len(),
            request.group,
            ids
        ),
    }
}
