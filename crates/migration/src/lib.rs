pub use sea_orm_migration::prelude::*;

mod m20250601_120000_agency_core;
mod m20250601_130000_stage_history;
mod m20250601_140000_strategies;

pub struct Migrator;
#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_120000_agency_core::Migration),
            Box::new(m20250601_130000_stage_history::Migration),
            Box::new(m20250601_140000_strategies::Migration),
        ]
    }
}
