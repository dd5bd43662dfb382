use sea_orm_migration::prelude::*;

mod initial_001;
mod pending_unique_002;
mod user_search_columns_003;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(initial_001::Migration),
            Box::new(pending_unique_002::Migration),
            Box::new(user_search_columns_003::Migration),
        ]
    }
}
