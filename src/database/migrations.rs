pub use sea_orm_migration::prelude::*;

mod m20261016_090000_create_job;
mod m20261016_090100_create_content;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261016_090000_create_job::Migration),
            Box::new(m20261016_090100_create_content::Migration),
        ]
    }
}

pub struct Migrator;
