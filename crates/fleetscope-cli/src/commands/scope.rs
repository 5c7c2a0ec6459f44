//! Scope inspection commands

use clap::{Args, Subcommand};
use fleetscope_core::EntityKind;
use fleetscope_engine::commands::entity::{application_get, data_stream_get};
use fleetscope_engine::commands::project::project_scope;
use serde::Serialize;

use super::{print_json, Context};

#[derive(Debug, Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Print the edge IDs the project currently resolves to
    Scope { project_id: String },
}

#[derive(Debug, Args)]
pub struct EntityArgs {
    #[command(subcommand)]
    pub command: EntityCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntityCommand {
    /// Print effective edges, selectors and excludes
    Scope { id: String },
}

#[derive(Serialize)]
struct EntityScopeView<'a> {
    id: &'a str,
    project_id: &'a str,
    edge_ids: &'a std::collections::BTreeSet<String>,
    edge_selectors: &'a fleetscope_core::Selector,
    exclude_edge_ids: &'a std::collections::BTreeSet<String>,
}

pub fn execute_project(ctx: &Context, args: ProjectArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        ProjectCommand::Scope { project_id } => {
            let conn = ctx.connect()?;
            let edges = project_scope(&ctx.scope(), &conn, &project_id)?;
            print_json(&edges)
        }
    }
}

pub fn execute_entity(
    ctx: &Context,
    kind: EntityKind,
    args: EntityArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        EntityCommand::Scope { id } => {
            let conn = ctx.connect()?;
            let entity = match kind {
                EntityKind::Application => application_get(&ctx.scope(), &conn, &id)?,
                EntityKind::DataStream => data_stream_get(&ctx.scope(), &conn, &id)?,
            };
            print_json(&EntityScopeView {
                id: &entity.id,
                project_id: &entity.project_id,
                edge_ids: &entity.edge_ids,
                edge_selectors: &entity.edge_selectors,
                exclude_edge_ids: &entity.exclude_edge_ids,
            })
        }
    }
}
