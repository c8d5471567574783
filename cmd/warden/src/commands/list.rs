//! List command implementation.

use super::load_catalog;
use anyhow::Result;
use std::path::Path;
use warden_policy::Catalog;

/// Runs the list command.
pub fn run(catalog_path: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;

    print_summary(&catalog);
    println!("\nPolicies:");
    print_policies(&catalog);
    println!("\nProducts:");
    print_products(&catalog);

    Ok(())
}

/// Prints dashboard totals.
pub fn print_summary(catalog: &Catalog) {
    let summary = catalog.summary();

    println!(
        "{} policies, {} rules, {} products",
        summary.policies, summary.rules, summary.products
    );
    for (policy_type, count) in summary.by_type.iter().filter(|(_, n)| *n > 0) {
        println!("  {policy_type}: {count}");
    }
    for (status, count) in &summary.by_status {
        println!("  {status}: {count}");
    }
}

/// Prints one line per policy.
pub fn print_policies(catalog: &Catalog) {
    for policy in catalog.policies() {
        println!(
            "  {:<12} {} [{}, {}, v{}, {} rules]",
            policy.id,
            policy.name,
            policy.policy_type,
            policy.status,
            policy.version,
            policy.rules.len()
        );
    }
}

/// Prints one line per product.
pub fn print_products(catalog: &Catalog) {
    for product in catalog.products() {
        println!(
            "  {:<12} {} [{}, {}]",
            product.id, product.name, product.product_type, product.status
        );
    }
}
