use std::process;

use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::{Migration, MigratorTrait};

use crate::{
    cli::MigrateAction, config::Config, database::migrations::Migrator,
    database::setup_database_connection,
};

pub async fn handle_migrate_command(config: &Config, action: MigrateAction) {
    let result = match setup_database_connection(&config.database).await {
        Ok(db) => handle_migration_command(&db, action).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("❌ Migration failed: {e}");
        process::exit(1);
    }
}

fn print_migrations<'a>(migrations: impl IntoIterator<Item = &'a Migration>, marker: &str) {
    for migration in migrations {
        println!("  {marker} {}", migration.name());
    }
}

/// Number of migrations to touch, capped by how many there are.
fn capped(steps: u32, available: usize) -> u32 {
    u32::try_from(available).map_or(steps, |available| steps.min(available))
}

pub async fn handle_migration_command(
    db: &DatabaseConnection,
    action: MigrateAction,
) -> Result<(), DbErr> {
    match action {
        MigrateAction::Up { steps } => {
            let pending = Migrator::get_pending_migrations(db).await?;

            if pending.is_empty() {
                println!("✅ All migrations are already up to date");
                return Ok(());
            }

            let count = steps.map_or(pending.len(), |steps| capped(steps, pending.len()) as usize);
            println!("Running {count} migration(s) up:");
            print_migrations(&pending[..count], "📄");
            println!();

            Migrator::up(db, steps).await?;
            println!("✅ Migrations completed successfully");
        }
        MigrateAction::Down { steps } => {
            let applied = Migrator::get_applied_migrations(db).await?;

            if applied.is_empty() {
                println!("❌ No migrations to roll back");
                return Ok(());
            }

            let steps = capped(steps, applied.len());
            println!("Rolling back {steps} migration(s):");
            print_migrations(applied.iter().rev().take(steps as usize), "📄");
            println!();

            Migrator::down(db, Some(steps)).await?;
            println!("✅ Rollback completed successfully");
        }
        MigrateAction::Status => {
            let applied = Migrator::get_applied_migrations(db).await?;
            let pending = Migrator::get_pending_migrations(db).await?;

            println!("📋 Applied migrations:");
            print_migrations(&applied, "✓");

            if pending.is_empty() {
                println!("✅ All migrations are up to date");
            } else {
                println!("📋 Pending migrations:");
                print_migrations(&pending, "-");
            }
        }
        MigrateAction::Reset => {
            println!("🔄 Resetting database (this will drop all data!)...");

            Migrator::reset(db).await?;
            println!("✅ All migrations rolled back");

            Migrator::up(db, None).await?;
            println!("✅ Database reset completed successfully");
        }
        MigrateAction::Reapply { steps } => {
            let applied = Migrator::get_applied_migrations(db).await?;

            if applied.is_empty() {
                println!("❌ No migrations to reapply");
                return Ok(());
            }

            let steps = capped(steps, applied.len());
            println!("🔄 Reapplying {steps} migration(s):");
            print_migrations(applied.iter().rev().take(steps as usize), "📄");
            println!();

            Migrator::down(db, Some(steps)).await?;
            Migrator::up(db, Some(steps)).await?;
            println!("✅ Reapply completed successfully");
        }
    }

    Ok(())
}
