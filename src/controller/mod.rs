//! Group orchestration.
//!
//! The [`Controller`] translates group-level intent into per-unit fleet
//! operations. Every operation expands the request once per concrete slice,
//! dispatches the per-unit calls on a background task and hands the caller
//! a [`TaskObject`] to await.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ControllerConfig;
use crate::error::{FlotillaError, Result};
use crate::fleet::Fleet;
use crate::task::{TaskObject, TaskService};
use crate::unit::{self, Unit};

pub mod aggregator;
pub mod request;
pub mod status;
pub mod validator;

pub use aggregator::{aggregate_status, unit_has_status, Status, StatusContext, STATUS_INDEX};
pub use request::{generate_slice_ids, Request, RequestConfig};
pub use status::UnitStatusList;
pub use validator::{validate_multiple_request, validate_request};

pub struct Controller {
    config: ControllerConfig,
    fleet: Arc<dyn Fleet>,
    tasks: TaskService,
}

/// One per-unit fleet call, expanded from a group request.
enum FleetOp {
    Submit { name: String, content: String },
    Start(String),
    Stop(String),
    Destroy(String),
}

impl FleetOp {
    async fn apply(&self, fleet: &dyn Fleet) -> Result<()> {
        match self {
            FleetOp::Submit { name, content } => fleet.submit(name, content).await,
            FleetOp::Start(name) => fleet.start(name).await,
            FleetOp::Stop(name) => fleet.stop(name).await,
            FleetOp::Destroy(name) => fleet.destroy(name).await,
        }
    }
}

impl Controller {
    pub fn new(config: ControllerConfig, fleet: Arc<dyn Fleet>) -> Self {
        Self {
            config,
            fleet,
            tasks: TaskService::new(),
        }
    }

    /// Submit the request's unit files to the fleet.
    ///
    /// Scalable groups are expanded once per slice: the request's explicit
    /// slice IDs if present, otherwise `desired_slices` freshly generated
    /// ones.
    pub async fn submit(&self, request: &Request) -> Result<TaskObject> {
        validate_request(request)?;

        let ops = match &request.slice_ids {
            None => request
                .units
                .iter()
                .map(|u| FleetOp::Submit {
                    name: u.name.clone(),
                    content: u.content.clone(),
                })
                .collect(),
            Some(ids) => {
                let ids = if ids.is_empty() {
                    generate_slice_ids(request.desired_slices)
                } else {
                    ids.clone()
                };
                ids.iter()
                    .flat_map(|id| {
                        request.units.iter().map(move |u| FleetOp::Submit {
                            name: unit::instantiate(&u.name, id),
                            content: u.content.clone(),
                        })
                    })
                    .collect()
            }
        };

        self.dispatch("submit", &request.group, ops).await
    }

    /// Start every currently-submitted unit in the request's target set.
    pub async fn start(&self, request: &Request) -> Result<TaskObject> {
        let ops = self
            .target_units(request)
            .await?
            .into_iter()
            .map(FleetOp::Start)
            .collect();
        self.dispatch("start", &request.group, ops).await
    }

    /// Stop every currently-submitted unit in the request's target set.
    pub async fn stop(&self, request: &Request) -> Result<TaskObject> {
        let ops = self
            .target_units(request)
            .await?
            .into_iter()
            .map(FleetOp::Stop)
            .collect();
        self.dispatch("stop", &request.group, ops).await
    }

    /// Remove every unit definition in the request's target set.
    pub async fn destroy(&self, request: &Request) -> Result<TaskObject> {
        let ops = self
            .target_units(request)
            .await?
            .into_iter()
            .map(FleetOp::Destroy)
            .collect();
        self.dispatch("destroy", &request.group, ops).await
    }

    /// Replace the group's units with the request's content.
    ///
    /// Slices are processed one after another so the group is never fully
    /// down; within a slice each unit is destroyed, resubmitted and
    /// started in turn.
    pub async fn update(&self, request: &Request) -> Result<TaskObject> {
        validate_request(request)?;

        let passes: Vec<Vec<Unit>> = match &request.slice_ids {
            None => vec![request.units.clone()],
            Some(ids) if ids.is_empty() => {
                return Err(FlotillaError::InvalidArgument(format!(
                    "no slices of group '{}' to update",
                    request.group
                )));
            }
            Some(ids) => ids
                .iter()
                .map(|id| {
                    request
                        .units
                        .iter()
                        .map(|u| Unit::new(unit::instantiate(&u.name, id), u.content.clone()))
                        .collect()
                })
                .collect(),
        };

        let task = self.tasks.create().await;
        self.tasks.mark_running(task.id).await;

        let fleet = Arc::clone(&self.fleet);
        let tasks = self.tasks.clone();
        let task_id = task.id;
        let group = request.group.clone();

        tokio::spawn(async move {
            for pass in passes {
                for u in pass {
                    if let Err(err) = replace_unit(fleet.as_ref(), &u).await {
                        tracing::error!(group = %group, unit = %u.name, error = %err, "Update failed");
                        tasks.mark_failed(task_id, err.to_string()).await;
                        return;
                    }
                }
            }
            tracing::info!(group = %group, "Update finished");
            tasks.mark_succeeded(task_id).await;
        });

        Ok(self.tasks.get(task.id).await.unwrap_or(task))
    }

    /// Per-unit status of the request's target set.
    pub async fn get_status(&self, request: &Request) -> Result<UnitStatusList> {
        let statuses = self.fleet.get_status(&request.group).await?;
        Ok(UnitStatusList::new(
            statuses
                .into_iter()
                .filter(|us| request.selects(&us.name))
                .collect(),
        ))
    }

    /// Populate the request's slice IDs with what is currently submitted.
    ///
    /// A request already targeting explicit slices passes through
    /// unchanged. Otherwise the fleet is consulted: finding no slice
    /// instances leaves the request addressing the group as a single
    /// entity, anything found becomes the concrete target list.
    pub async fn extend_with_existing_slice_ids(&self, mut request: Request) -> Result<Request> {
        if matches!(&request.slice_ids, Some(ids) if !ids.is_empty()) {
            return Ok(request);
        }

        let names = self.fleet.get_units(&request.group).await?;
        let mut found = Vec::new();
        for name in &names {
            if let Some(id) = unit::slice_id(name)? {
                if !id.is_empty() {
                    found.push(id);
                }
            }
        }
        found.sort();
        found.dedup();

        request.slice_ids = if found.is_empty() { None } else { Some(found) };
        Ok(request)
    }

    /// Block until the task is terminal or the closer fires. A cancelled
    /// wait returns `Ok(None)`; the background work keeps running.
    pub async fn wait_for_task(
        &self,
        id: Uuid,
        closer: CancellationToken,
    ) -> Result<Option<TaskObject>> {
        self.tasks.wait_for(id, self.config.wait_sleep, closer).await
    }

    /// Names of the currently-submitted units falling into the request's
    /// target set.
    async fn target_units(&self, request: &Request) -> Result<Vec<String>> {
        let names = self.fleet.get_units(&request.group).await?;
        Ok(names.into_iter().filter(|n| request.selects(n)).collect())
    }

    /// Run the expanded per-unit calls on a background task.
    ///
    /// The calls proceed concurrently; the task succeeds only if every
    /// call does, otherwise the first failure in unit order is recorded.
    async fn dispatch(
        &self,
        action: &'static str,
        group: &str,
        ops: Vec<FleetOp>,
    ) -> Result<TaskObject> {
        let task = self.tasks.create().await;
        self.tasks.mark_running(task.id).await;

        let fleet = Arc::clone(&self.fleet);
        let tasks = self.tasks.clone();
        let task_id = task.id;
        let group = group.to_string();

        tokio::spawn(async move {
            let results =
                futures::future::join_all(ops.iter().map(|op| op.apply(fleet.as_ref()))).await;

            match results.into_iter().find_map(|r| r.err()) {
                Some(err) => {
                    tracing::error!(group = %group, action, error = %err, "Group operation failed");
                    tasks.mark_failed(task_id, err.to_string()).await;
                }
                None => {
                    tracing::info!(group = %group, action, "Group operation finished");
                    tasks.mark_succeeded(task_id).await;
                }
            }
        });

        Ok(self.tasks.get(task.id).await.unwrap_or(task))
    }
}

async fn replace_unit(fleet: &dyn Fleet, u: &Unit) -> Result<()> {
    fleet.destroy(&u.name).await?;
    fleet.submit(&u.name, &u.content).await?;
    fleet.start(&u.name).await
}
