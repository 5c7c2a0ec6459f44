//! Schema migration command

use fleetscope_store::migrations::applied_migrations;

use super::Context;

pub fn execute(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let conn = ctx.connect()?;
    let applied = applied_migrations(&conn)?;

    println!("Store: {}", ctx.config.store.path.display());
    for id in &applied {
        println!("  applied {}", id);
    }
    println!("{} migration(s) applied", applied.len());
    Ok(())
}
