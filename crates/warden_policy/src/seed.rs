//! Built-in starter catalog.

use crate::catalog::Catalog;
use crate::model::{Policy, PolicyStatus, PolicyType, Product, ProductStatus, ProductType, Rule};
use chrono::NaiveDate;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn rule(
    id: &str,
    trigger: &str,
    allowed: &[&str],
    disallowed: &[&str],
    response: &str,
    priority: i32,
) -> Rule {
    Rule {
        id: id.to_string(),
        trigger: trigger.to_string(),
        allowed_actions: strings(allowed),
        disallowed_actions: strings(disallowed),
        required_response: response.to_string(),
        priority,
    }
}

/// Starter policies.
#[must_use]
pub fn policies() -> Vec<Policy> {
    vec![
        Policy {
            id: "p1".to_string(),
            name: "Healthcare Advice Guardrails".to_string(),
            description: "Rules for providing medical information without diagnosing.".to_string(),
            policy_type: PolicyType::Safety,
            domain: "Healthcare".to_string(),
            status: PolicyStatus::Approved,
            version: "2.1.0".to_string(),
            last_updated: date(2023, 11, 20),
            author: "Dr. Sarah Smith".to_string(),
            rules: vec![
                rule(
                    "r1",
                    "User asks for a diagnosis",
                    &["Provide general information", "Recommend seeing a doctor"],
                    &["Confirm a diagnosis", "Prescribe medication"],
                    "I am an AI, not a doctor. For specific health concerns, please consult a professional.",
                    1,
                ),
                rule(
                    "r2",
                    "Emergency symptoms mentioned",
                    &["Escalate immediately"],
                    &["Wait for more info"],
                    "If you are experiencing a medical emergency, please call 911 or your local emergency services immediately.",
                    1,
                ),
            ],
        },
        Policy {
            id: "p2".to_string(),
            name: "Tax Filing Assistant Rules".to_string(),
            description: "Ensuring compliance with local tax regulations.".to_string(),
            policy_type: PolicyType::Business,
            domain: "Finance".to_string(),
            status: PolicyStatus::Review,
            version: "1.0.4".to_string(),
            last_updated: date(2023, 12, 1),
            author: "Legal Dept".to_string(),
            rules: vec![rule(
                "r3",
                "Inquiry about deduction limits",
                &["State current official limits"],
                &["Suggest tax evasion loopholes"],
                "Based on current IRS guidelines, the limit for this deduction is...",
                2,
            )],
        },
        Policy {
            id: "p3".to_string(),
            name: "Standard Customer Service Tone".to_string(),
            description: "Maintaining a professional yet friendly voice across all regions.".to_string(),
            policy_type: PolicyType::Behavioral,
            domain: "General".to_string(),
            status: PolicyStatus::Draft,
            version: "0.9.0".to_string(),
            last_updated: date(2023, 12, 5),
            author: "CX Team".to_string(),
            rules: vec![rule(
                "r4",
                "Angry customer",
                &["Empathize", "Offer solution"],
                &["Argue", "Sarcasm"],
                "I understand your frustration. Let me help resolve this as quickly as possible.",
                2,
            )],
        },
    ]
}

/// Starter products.
#[must_use]
pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: "prod1".to_string(),
            name: "Customer Web Portal".to_string(),
            product_type: ProductType::WebApplication,
            raw_prd: "Existing production system focusing on user self-service and account management.".to_string(),
            extracted_features: strings(&["Account Management", "Order History", "Dynamic Pricing"]),
            target_audience: "B2C Customers".to_string(),
            status: ProductStatus::Active,
            traffic: Some("1.2M req/mo".to_string()),
        },
        Product {
            id: "prod2".to_string(),
            name: "iOS Mobile App".to_string(),
            product_type: ProductType::NativeMobile,
            raw_prd: "Mobile companion app for on-the-go tracking and push notification management.".to_string(),
            extracted_features: strings(&["Push Notifications", "Real-time tracking", "Biometric Login"]),
            target_audience: "On-the-go Users".to_string(),
            status: ProductStatus::Active,
            traffic: Some("850k req/mo".to_string()),
        },
    ]
}

/// The starter catalog.
#[must_use]
pub fn catalog() -> Catalog {
    Catalog::from_parts(policies(), products())
}
