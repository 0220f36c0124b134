//! Seed the product catalog from a YAML file.
//!
//! The file holds a `products` list; each entry needs a name, a price in
//! minor units and a stock count. Validation runs before anything touches
//! the gateway, and `--dry-run` stops right after it.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use lavka_webapp::WebappConfig;
use lavka_webapp::models::NewProduct;
use lavka_webapp::supabase::{ProductStore, SupabaseClient};

/// The seed file layout.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<SeedProduct>,
}

/// One catalog entry in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub stock: i64,
}

/// Validate every entry; returns one message per problem found.
#[must_use]
pub fn validate(file: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    if file.products.is_empty() {
        errors.push("seed file contains no products".to_string());
    }
    for (index, product) in file.products.iter().enumerate() {
        if product.name.trim().is_empty() {
            errors.push(format!("product #{index}: name is empty"));
        }
        if product.price <= 0 {
            errors.push(format!(
                "product #{index} ({}): price must be positive, got {}",
                product.name, product.price
            ));
        }
        if product.stock < 0 {
            errors.push(format!(
                "product #{index} ({}): stock must not be negative, got {}",
                product.name, product.stock
            ));
        }
    }
    errors
}

/// Seed the catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or the
/// insert fails.
pub async fn catalog(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed file");

    // Read and validate before touching the gateway
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!(products = seed.products.len(), "Seed file validated");

    if dry_run {
        info!("Dry run; nothing inserted");
        return Ok(());
    }

    let config = WebappConfig::from_env()?;
    let client = SupabaseClient::new(&config.supabase)?;

    let rows: Vec<NewProduct> = seed
        .products
        .into_iter()
        .map(|p| NewProduct {
            name: p.name,
            description: p.description,
            price: p.price,
            image_url: p.image_url,
            category: p.category,
            stock: p.stock,
        })
        .collect();

    let inserted = ProductStore::new(&client).insert(&rows).await?;

    info!("Seeding complete!");
    info!("  Products inserted: {}", inserted.len());

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
products:
  - name: Widget
    description: A fine widget
    price: 50
    stock: 10
    category: tools
  - name: Gadget
    price: 20
    stock: 5
";

    #[test]
    fn test_parses_sample_file() {
        let seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(seed.products.len(), 2);
        let gadget = seed.products.last().unwrap();
        assert_eq!(gadget.name, "Gadget");
        assert!(gadget.description.is_none());
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_validation_flags_bad_entries() {
        let seed: SeedFile = serde_yaml::from_str(
            r"
products:
  - name: ''
    price: 0
    stock: -1
",
        )
        .unwrap();
        let errors = validate(&seed);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_validation_flags_empty_file() {
        let seed = SeedFile { products: vec![] };
        assert_eq!(validate(&seed).len(), 1);
    }
}
