//! Data-driver binding commands

use clap::{Args, Subcommand};
use fleetscope_engine::commands::data_driver::{
    data_driver_config_get, data_driver_config_update, data_driver_stream_get,
    data_driver_stream_update,
};
use fleetscope_engine::ChangeQueue;

use super::{print_json, Context};

#[derive(Debug, Args)]
pub struct BindingArgs {
    #[command(subcommand)]
    pub command: BindingCommand,
}

#[derive(Debug, Subcommand)]
pub enum BindingCommand {
    /// Print the persisted binding of a configuration or stream
    Show {
        id: String,
        /// The ID names a data-driver stream
        #[arg(long)]
        stream: bool,
    },
    /// Clean the binding up against the project's current scope and store it
    Refresh {
        id: String,
        #[arg(long)]
        stream: bool,
    },
}

pub fn execute(ctx: &Context, args: BindingArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        BindingCommand::Show { id, stream: false } => {
            let conn = ctx.connect()?;
            let config = data_driver_config_get(&ctx.scope(), &conn, &id)?;
            print_json(&serde_json::json!({
                "id": config.id,
                "project_id": config.project_id,
                "mode": config.binding.mode,
                "binding": config.binding,
            }))
        }
        BindingCommand::Show { id, stream: true } => {
            let conn = ctx.connect()?;
            let stream = data_driver_stream_get(&ctx.scope(), &conn, &id)?;
            print_json(&serde_json::json!({
                "id": stream.id,
                "project_id": stream.project_id,
                "direction": stream.direction,
                "mode": stream.binding.mode,
                "binding": stream.binding,
            }))
        }
        BindingCommand::Refresh { id, stream } => {
            let mut conn = ctx.connect()?;
            let scope = ctx.scope();
            let (queue, mut events) = ChangeQueue::bounded(ctx.config.notify.capacity);

            let binding = if stream {
                let current = data_driver_stream_get(&scope, &conn, &id)?;
                data_driver_stream_update(&scope, &mut conn, current, &queue)?.binding
            } else {
                let current = data_driver_config_get(&scope, &conn, &id)?;
                data_driver_config_update(&scope, &mut conn, current, &queue)?.binding
            };
            tracing::info!(
                binding_id = %id,
                events = events.drain().len(),
                "binding refreshed"
            );
            print_json(&binding)
        }
    }
}
