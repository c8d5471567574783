//! Typed policy model.
//!
//! Rule triggers, actions and responses are opaque natural-language strings.
//! Nothing in this crate interprets them; the model reading the compiled
//! instruction does.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Author recorded on policies generated from a requirements document.
pub const GENERATED_AUTHOR: &str = "AI Architect";

/// Author recorded on policies created through the editor.
pub const EDITOR_AUTHOR: &str = "Current User";

/// Version assigned to freshly created policies.
pub const INITIAL_VERSION: &str = "1.0.0";

/// Returns a fresh collision-resistant identifier.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns the current UTC calendar date.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A single behavioral constraint within a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Identifier, unique within the owning policy.
    pub id: String,
    /// Natural-language description of when the rule applies.
    pub trigger: String,
    /// Actions the assistant may take.
    #[serde(default)]
    pub allowed_actions: Vec<String>,
    /// Actions the assistant must never take.
    #[serde(default)]
    pub disallowed_actions: Vec<String>,
    /// Response the assistant should give when the trigger fires.
    #[serde(default)]
    pub required_response: String,
    /// Precedence (lower = higher precedence).
    pub priority: i32,
}

/// Editor input for a new rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDraft {
    /// Trigger text; must not be blank.
    pub trigger: String,
    /// Allowed actions.
    pub allowed_actions: Vec<String>,
    /// Disallowed actions.
    pub disallowed_actions: Vec<String>,
    /// Required response, empty when absent.
    pub required_response: Option<String>,
    /// Priority, `1` when absent.
    pub priority: Option<i32>,
}

/// Category of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum PolicyType {
    /// Conversational flow rules.
    #[serde(rename = "Dialogue")]
    Dialogue,
    /// Harmful content and safety rules.
    #[serde(rename = "Safety & Content")]
    Safety,
    /// Tone and behavior rules.
    #[serde(rename = "Behavioral")]
    Behavioral,
    /// Business logic and compliance rules.
    #[serde(rename = "Business Rules")]
    Business,
    /// Data handling and privacy rules.
    #[serde(rename = "Data & Privacy")]
    Privacy,
    /// Hand-off and escalation rules.
    #[serde(rename = "Escalation")]
    Escalation,
}

impl PolicyType {
    /// All policy types in display order.
    pub const ALL: [Self; 6] = [
        Self::Dialogue,
        Self::Safety,
        Self::Behavioral,
        Self::Business,
        Self::Privacy,
        Self::Escalation,
    ];

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dialogue => "Dialogue",
            Self::Safety => "Safety & Content",
            Self::Behavioral => "Behavioral",
            Self::Business => "Business Rules",
            Self::Privacy => "Data & Privacy",
            Self::Escalation => "Escalation",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Review status of a policy. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyStatus {
    /// Being authored.
    #[serde(rename = "Draft")]
    Draft,
    /// Awaiting review.
    #[serde(rename = "In Review")]
    Review,
    /// Approved for use.
    #[serde(rename = "Approved")]
    Approved,
}

impl PolicyStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Draft, Self::Review, Self::Approved];

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Review => "In Review",
            Self::Approved => "Approved",
        }
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named, versioned bundle of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Opaque identifier. Empty for a policy that has never been saved.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// What the policy is for.
    pub description: String,
    /// Category.
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    /// Free-text scope label.
    pub domain: String,
    /// Review status.
    pub status: PolicyStatus,
    /// Semantic-version-like label.
    pub version: String,
    /// Date of the last save.
    pub last_updated: NaiveDate,
    /// Who wrote it.
    pub author: String,
    /// Rules in insertion order.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Policy {
    /// Creates an empty, unsaved draft.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            policy_type: PolicyType::Dialogue,
            domain: String::new(),
            status: PolicyStatus::Draft,
            version: INITIAL_VERSION.to_string(),
            last_updated: today(),
            author: String::new(),
            rules: Vec::new(),
        }
    }

    /// Appends a rule built from `draft` with a fresh id.
    ///
    /// Returns `None` and leaves the policy untouched when the trigger is blank.
    pub fn add_rule(&mut self, draft: RuleDraft) -> Option<&Rule> {
        if draft.trigger.trim().is_empty() {
            return None;
        }
        self.rules.push(Rule {
            id: new_id(),
            trigger: draft.trigger,
            allowed_actions: draft.allowed_actions,
            disallowed_actions: draft.disallowed_actions,
            required_response: draft.required_response.unwrap_or_default(),
            priority: draft.priority.unwrap_or(1),
        });
        self.rules.last()
    }

    /// Removes the rule with the given id.
    pub fn remove_rule(&mut self, id: &str) -> Option<Rule> {
        let index = self.rules.iter().position(|r| r.id == id)?;
        Some(self.rules.remove(index))
    }

    /// Returns the rule with the given id.
    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Iterates over rule triggers in stored order.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.trigger.as_str())
    }

    /// Checks that rule ids are unique.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRuleId`] naming the first repeated id.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(Error::DuplicateRuleId {
                    policy: self.name.clone(),
                    rule_id: rule.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Platform an integration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductType {
    /// Browser application.
    #[serde(rename = "Web Application")]
    WebApplication,
    /// iOS or Android application.
    #[serde(rename = "Native Mobile")]
    NativeMobile,
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WebApplication => "Web Application",
            Self::NativeMobile => "Native Mobile",
        })
    }
}

/// Lifecycle of a product integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Serving traffic.
    Active,
    /// Under maintenance.
    Maintenance,
    /// Registered but not live.
    Draft,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::Draft => "draft",
        })
    }
}

/// An integration target the policy set is associated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque identifier.
    pub id: String,
    /// Product name.
    pub name: String,
    /// Platform.
    #[serde(rename = "type")]
    pub product_type: ProductType,
    /// Requirements document exactly as submitted.
    pub raw_prd: String,
    /// Features extracted from the requirements document.
    #[serde(default)]
    pub extracted_features: Vec<String>,
    /// Primary audience.
    #[serde(default)]
    pub target_audience: String,
    /// Lifecycle status.
    pub status: ProductStatus,
    /// Display-only traffic label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<String>,
}

/// Speaker of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person testing the policy.
    User,
    /// The simulated assistant.
    Assistant,
    /// Out-of-band notes. Never sent to the model.
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        })
    }
}

/// One transcript turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a user message stamped now.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::now(Role::User, content)
    }

    /// Creates an assistant message stamped now.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(Role::Assistant, content)
    }

    fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Structured data extracted from a requirements document.
///
/// This type doubles as the output schema declared to the model, so every
/// field that is not `#[serde(default)]` is required in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// List of key product features extracted from the PRD.
    pub extracted_features: Vec<String>,
    /// Who is this product primarily for?
    pub target_audience: String,
    /// Policies the product should be governed by.
    pub suggested_policies: Vec<SuggestedPolicy>,
}

/// A policy proposed by extraction. Carries no id until merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedPolicy {
    /// Policy name.
    pub name: String,
    /// What the policy is for.
    pub description: String,
    /// Category.
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    /// Scope label.
    pub domain: String,
    /// Proposed rules.
    pub rules: Vec<SuggestedRule>,
}

/// A rule proposed by extraction. Carries no id until merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedRule {
    /// When the rule applies.
    pub trigger: String,
    /// Actions the assistant may take.
    #[serde(default)]
    pub allowed_actions: Vec<String>,
    /// Actions the assistant must never take.
    #[serde(default)]
    pub disallowed_actions: Vec<String>,
    /// Response to give when the trigger fires.
    pub required_response: String,
    /// Precedence (lower = higher precedence).
    pub priority: i32,
}

impl SuggestedPolicy {
    /// Materializes a Draft policy with fresh policy and rule ids.
    #[must_use]
    pub fn into_policy(self) -> Policy {
        Policy {
            id: new_id(),
            name: self.name,
            description: self.description,
            policy_type: self.policy_type,
            domain: self.domain,
            status: PolicyStatus::Draft,
            version: INITIAL_VERSION.to_string(),
            last_updated: today(),
            author: GENERATED_AUTHOR.to_string(),
            rules: self.rules.into_iter().map(SuggestedRule::into_rule).collect(),
        }
    }
}

impl SuggestedRule {
    /// Materializes a rule with a fresh id.
    #[must_use]
    pub fn into_rule(self) -> Rule {
        Rule {
            id: new_id(),
            trigger: self.trigger,
            allowed_actions: self.allowed_actions,
            disallowed_actions: self.disallowed_actions,
            required_response: self.required_response,
            priority: self.priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rule_applies_editor_defaults() {
        let mut policy = Policy::draft();
        let rule = policy
            .add_rule(RuleDraft {
                trigger: "User asks for a refund".to_string(),
                ..Default::default()
            })
            .cloned()
            .unwrap();

        assert_eq!(rule.priority, 1);
        assert!(rule.required_response.is_empty());
        assert!(rule.allowed_actions.is_empty());
        assert!(!rule.id.is_empty());
        assert_eq!(policy.rules.len(), 1);
    }

    #[test]
    fn add_rule_rejects_blank_trigger() {
        let mut policy = Policy::draft();
        let added = policy.add_rule(RuleDraft {
            trigger: "   ".to_string(),
            ..Default::default()
        });
        assert!(added.is_none());
        assert!(policy.rules.is_empty());
    }

    #[test]
    fn remove_rule_keeps_remaining_order() {
        let mut policy = Policy::draft();
        for trigger in ["a", "b", "c"] {
            policy.add_rule(RuleDraft {
                trigger: trigger.to_string(),
                ..Default::default()
            });
        }
        let middle = policy.rules[1].id.clone();

        let removed = policy.remove_rule(&middle).unwrap();
        assert_eq!(removed.trigger, "b");
        assert_eq!(policy.triggers().collect::<Vec<_>>(), ["a", "c"]);
        assert!(policy.remove_rule(&middle).is_none());
    }

    #[test]
    fn validate_rejects_duplicate_rule_ids() {
        let mut policy = Policy::draft();
        policy.add_rule(RuleDraft {
            trigger: "a".to_string(),
            ..Default::default()
        });
        let mut copy = policy.rules[0].clone();
        copy.trigger = "b".to_string();
        policy.rules.push(copy);

        assert!(matches!(
            policy.validate(),
            Err(Error::DuplicateRuleId { .. })
        ));
    }

    #[test]
    fn policy_type_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&PolicyType::Safety).unwrap();
        assert_eq!(json, "\"Safety & Content\"");
        let parsed: PolicyStatus = serde_json::from_str("\"In Review\"").unwrap();
        assert_eq!(parsed, PolicyStatus::Review);
    }

    #[test]
    fn suggested_rule_defaults_missing_action_lists() {
        let rule: SuggestedRule = serde_json::from_str(
            r#"{"trigger":"t","requiredResponse":"r","priority":2}"#,
        )
        .unwrap();
        assert!(rule.allowed_actions.is_empty());
        assert!(rule.disallowed_actions.is_empty());
    }

    #[test]
    fn suggested_policy_becomes_generated_draft() {
        let suggested = SuggestedPolicy {
            name: "Refund Rules".to_string(),
            description: "Refund handling".to_string(),
            policy_type: PolicyType::Business,
            domain: "Commerce".to_string(),
            rules: vec![
                SuggestedRule {
                    trigger: "Refund request".to_string(),
                    allowed_actions: vec![],
                    disallowed_actions: vec![],
                    required_response: "Let me check your order.".to_string(),
                    priority: 1,
                },
                SuggestedRule {
                    trigger: "Chargeback threat".to_string(),
                    allowed_actions: vec![],
                    disallowed_actions: vec![],
                    required_response: "I will escalate this.".to_string(),
                    priority: 2,
                },
            ],
        };

        let policy = suggested.into_policy();
        assert_eq!(policy.status, PolicyStatus::Draft);
        assert_eq!(policy.version, INITIAL_VERSION);
        assert_eq!(policy.author, GENERATED_AUTHOR);
        assert_ne!(policy.rules[0].id, policy.rules[1].id);
        assert!(policy.validate().is_ok());
    }
}
