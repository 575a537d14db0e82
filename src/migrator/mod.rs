//! Schema history. Revisions are applied in order and never edited once released.

pub use sea_orm_migration::prelude::*;

mod m20160301_000001_create_reference_tables;
mod m20160301_000002_create_catalog_tables;
mod m20170915_000003_create_stock_table;
mod m20180410_000004_create_order_tables;
mod m20190522_000005_create_staff_tables;
mod m20210118_000006_create_integrations_table;
mod m20220707_000007_add_integration_uses_boxes;
mod m20230214_000008_create_marketplace_tables;
mod m20240611_000009_create_product_gtins;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20160301_000001_create_reference_tables::Migration),
            Box::new(m20160301_000002_create_catalog_tables::Migration),
            Box::new(m20170915_000003_create_stock_table::Migration),
            Box::new(m20180410_000004_create_order_tables::Migration),
            Box::new(m20190522_000005_create_staff_tables::Migration),
            Box::new(m20210118_000006_create_integrations_table::Migration),
            Box::new(m20220707_000007_add_integration_uses_boxes::Migration),
            Box::new(m20230214_000008_create_marketplace_tables::Migration),
            Box::new(m20240611_000009_create_product_gtins::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn revision_names_are_unique_and_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, names);
    }
}
