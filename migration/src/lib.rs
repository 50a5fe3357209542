pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_users;
mod m20251001_000002_create_businesses;
mod m20251001_000003_create_customization_usages;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_users::Migration),
            Box::new(m20251001_000002_create_businesses::Migration),
            Box::new(m20251001_000003_create_customization_usages::Migration),
        ]
    }
}
