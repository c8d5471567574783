//! In-memory policy and product catalog.
//!
//! The catalog is the single owner of both collections. Every mutation goes
//! through `&mut Catalog`; views read slices or clones.

use crate::error::{Error, Result};
use crate::model::{
    new_id, today, ExtractionResult, Policy, PolicyStatus, PolicyType, Product, ProductStatus,
    ProductType, SuggestedPolicy, EDITOR_AUTHOR, GENERATED_AUTHOR,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Traffic label shown for a product that has never served requests.
const NO_TRAFFIC: &str = "0 req/mo";

/// Policies and products known to the console.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    policies: Vec<Policy>,
    #[serde(default)]
    products: Vec<Product>,
}

/// Input of the product registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm {
    /// Product name.
    pub name: String,
    /// Target platform.
    pub product_type: ProductType,
    /// Requirements document text.
    pub prd: String,
}

impl ProductForm {
    /// Returns true when both the name and the requirements text are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.prd.trim().is_empty()
    }
}

/// What a successful registration added to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredProduct {
    /// The new product.
    pub product: Product,
    /// Policies generated for it, in the order they were inserted.
    pub policies: Vec<Policy>,
}

/// Aggregate counts for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    /// Number of policies.
    pub policies: usize,
    /// Number of products.
    pub products: usize,
    /// Number of rules across all policies.
    pub rules: usize,
    /// Policy count per type, in [`PolicyType::ALL`] order.
    pub by_type: Vec<(PolicyType, usize)>,
    /// Policy count per status, in [`PolicyStatus::ALL`] order.
    pub by_status: Vec<(PolicyStatus, usize)>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog from existing collections.
    #[must_use]
    pub const fn from_parts(policies: Vec<Policy>, products: Vec<Product>) -> Self {
        Self { policies, products }
    }

    /// All policies, newest first.
    #[must_use]
    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    /// All products, newest first.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Looks up a policy by id.
    #[must_use]
    pub fn policy(&self, id: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.id == id)
    }

    /// Looks up a product by id.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Looks up a policy by id, failing when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPolicy`] if no policy has this id.
    pub fn require_policy(&self, id: &str) -> Result<&Policy> {
        self.policy(id)
            .ok_or_else(|| Error::UnknownPolicy(id.to_string()))
    }

    /// Saves a policy from the editor.
    ///
    /// A policy whose id is already known replaces the stored one in place.
    /// Anything else is inserted at the front with a fresh id, today's date
    /// and the editor author. Returns the id the policy is stored under.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRuleId`] if two rules share an id.
    pub fn save_policy(&mut self, mut policy: Policy) -> Result<String> {
        policy.validate()?;

        if let Some(slot) = self
            .policies
            .iter_mut()
            .find(|p| !policy.id.is_empty() && p.id == policy.id)
        {
            debug!("Replacing policy {}", policy.id);
            *slot = policy;
            return Ok(slot.id.clone());
        }

        policy.id = new_id();
        policy.last_updated = today();
        policy.author = EDITOR_AUTHOR.to_string();
        info!("Created policy '{}' ({})", policy.name, policy.id);
        let id = policy.id.clone();
        self.policies.insert(0, policy);
        Ok(id)
    }

    /// Merges an extraction result as a new product plus generated policies.
    ///
    /// Every policy and rule receives a fresh id. Generated policies start as
    /// drafts authored by [`GENERATED_AUTHOR`].
    pub fn register_product(
        &mut self,
        form: ProductForm,
        extraction: ExtractionResult,
    ) -> RegisteredProduct {
        let product = Product {
            id: new_id(),
            name: form.name,
            product_type: form.product_type,
            raw_prd: form.prd,
            extracted_features: extraction.extracted_features,
            target_audience: extraction.target_audience,
            status: ProductStatus::Draft,
            traffic: Some(NO_TRAFFIC.to_string()),
        };

        let generated: Vec<Policy> = extraction
            .suggested_policies
            .into_iter()
            .map(SuggestedPolicy::into_policy)
            .collect();

        info!(
            "Registered product '{}' with {} generated policies",
            product.name,
            generated.len()
        );

        self.products.insert(0, product.clone());
        let mut policies = generated.clone();
        policies.append(&mut self.policies);
        self.policies = policies;

        RegisteredProduct {
            product,
            policies: generated,
        }
    }

    /// Policies associated with a product.
    ///
    /// A policy is linked when its name mentions the product or when it was
    /// generated from a requirements document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProduct`] if no product has this id.
    pub fn linked_policies(&self, product_id: &str) -> Result<Vec<&Policy>> {
        let product = self
            .product(product_id)
            .ok_or_else(|| Error::UnknownProduct(product_id.to_string()))?;
        Ok(self
            .policies
            .iter()
            .filter(|p| p.name.contains(&product.name) || p.author == GENERATED_AUTHOR)
            .collect())
    }

    /// Counts for the dashboard.
    #[must_use]
    pub fn summary(&self) -> CatalogSummary {
        let by_type = PolicyType::ALL
            .iter()
            .map(|t| {
                (
                    *t,
                    self.policies.iter().filter(|p| p.policy_type == *t).count(),
                )
            })
            .collect();
        let by_status = PolicyStatus::ALL
            .iter()
            .map(|s| (*s, self.policies.iter().filter(|p| p.status == *s).count()))
            .collect();

        CatalogSummary {
            policies: self.policies.len(),
            products: self.products.len(),
            rules: self.policies.iter().map(|p| p.rules.len()).sum(),
            by_type,
            by_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RuleDraft, SuggestedRule};
    use crate::seed;
    use proptest::prelude::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "Clinic Portal".to_string(),
            product_type: ProductType::WebApplication,
            prd: "Patients book appointments and ask questions.".to_string(),
        }
    }

    fn extraction() -> ExtractionResult {
        ExtractionResult {
            extracted_features: vec!["Booking".to_string()],
            target_audience: "Patients".to_string(),
            suggested_policies: vec![SuggestedPolicy {
                name: "Clinic Portal Triage".to_string(),
                description: "Triage rules".to_string(),
                policy_type: PolicyType::Safety,
                domain: "Healthcare".to_string(),
                rules: vec![SuggestedRule {
                    trigger: "Emergency symptoms".to_string(),
                    allowed_actions: vec!["Escalate".to_string()],
                    disallowed_actions: vec![],
                    required_response: "Call emergency services.".to_string(),
                    priority: 1,
                }],
            }],
        }
    }

    #[test]
    fn save_policy_replaces_by_id() {
        let mut catalog = seed::catalog();
        let before = catalog.policies().len();
        let mut policy = catalog.policies()[1].clone();
        policy.name = "Renamed".to_string();

        let id = catalog.save_policy(policy.clone()).unwrap();

        assert_eq!(id, policy.id);
        assert_eq!(catalog.policies().len(), before);
        assert_eq!(catalog.policies()[1].name, "Renamed");
    }

    #[test]
    fn save_policy_inserts_new_policy_first() {
        let mut catalog = seed::catalog();
        let mut policy = Policy::draft();
        policy.name = "Escalation Paths".to_string();
        policy.add_rule(RuleDraft {
            trigger: "User asks for a human".to_string(),
            ..Default::default()
        });

        let id = catalog.save_policy(policy).unwrap();

        let stored = &catalog.policies()[0];
        assert_eq!(stored.id, id);
        assert_eq!(stored.author, EDITOR_AUTHOR);
        assert_eq!(stored.last_updated, today());
    }

    #[test]
    fn save_policy_rejects_duplicate_rule_ids() {
        let mut catalog = Catalog::new();
        let mut policy = Policy::draft();
        policy.add_rule(RuleDraft {
            trigger: "a".to_string(),
            ..Default::default()
        });
        policy.rules.push(policy.rules[0].clone());

        assert!(catalog.save_policy(policy).is_err());
        assert!(catalog.policies().is_empty());
    }

    #[test]
    fn register_product_prepends_product_and_policies() {
        let mut catalog = seed::catalog();
        let policies_before = catalog.policies().len();

        let registered = catalog.register_product(form(), extraction());

        assert_eq!(catalog.products()[0], registered.product);
        assert_eq!(registered.product.status, ProductStatus::Draft);
        assert_eq!(registered.product.traffic.as_deref(), Some(NO_TRAFFIC));
        assert_eq!(catalog.policies().len(), policies_before + 1);
        assert_eq!(catalog.policies()[0].author, GENERATED_AUTHOR);
        assert_eq!(catalog.policies()[0].status, PolicyStatus::Draft);
        assert!(!catalog.policies()[0].rules[0].id.is_empty());
    }

    #[test]
    fn register_product_with_empty_extraction() {
        let mut catalog = Catalog::new();
        let registered = catalog.register_product(
            form(),
            ExtractionResult {
                extracted_features: vec![],
                target_audience: String::new(),
                suggested_policies: vec![],
            },
        );

        assert!(registered.product.extracted_features.is_empty());
        assert!(registered.policies.is_empty());
        assert_eq!(catalog.products().len(), 1);
        assert!(catalog.policies().is_empty());
    }

    #[test]
    fn linked_policies_match_name_or_generated_author() {
        let mut catalog = seed::catalog();
        let registered = catalog.register_product(form(), extraction());

        let linked = catalog.linked_policies(&registered.product.id).unwrap();

        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].name, "Clinic Portal Triage");
        assert!(catalog.linked_policies("missing").is_err());
    }

    proptest! {
        #[test]
        fn saving_existing_policies_preserves_length(
            picks in proptest::collection::vec(0usize..3, 1..8),
            name in "[A-Za-z ]{1,24}",
        ) {
            let mut catalog = seed::catalog();
            for i in picks {
                let mut policy = catalog.policies()[i].clone();
                policy.name.clone_from(&name);
                let id = catalog.save_policy(policy).unwrap();
                prop_assert_eq!(&catalog.policies()[i].id, &id);
                prop_assert_eq!(&catalog.policies()[i].name, &name);
            }
            prop_assert_eq!(catalog.policies().len(), 3);
        }
    }

    #[test]
    fn summary_counts_types_and_statuses() {
        let summary = seed::catalog().summary();

        assert_eq!(summary.policies, 3);
        assert_eq!(summary.products, 2);
        assert_eq!(summary.rules, 4);
        let approved = summary
            .by_status
            .iter()
            .find(|(s, _)| *s == PolicyStatus::Approved)
            .map(|(_, n)| *n);
        assert_eq!(approved, Some(1));
        assert_eq!(summary.by_type.len(), PolicyType::ALL.len());
    }
}
