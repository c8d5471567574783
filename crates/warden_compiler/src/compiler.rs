//! Main compiler implementation.

use tracing::debug;
use warden_policy::{Policy, Rule};

/// Placeholder rendered for an empty action list.
pub const NONE_SPECIFIED: &str = "(none specified)";

/// Marker rendered in place of rule blocks when a policy has no rules.
pub const NO_RULES: &str = "(no rules defined)";

/// Compilation options.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Separator between actions in a list.
    pub delimiter: String,
    /// Text rendered for an empty action list.
    pub empty_list: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            delimiter: ", ".to_string(),
            empty_list: NONE_SPECIFIED.to_string(),
        }
    }
}

/// Compiler that turns a policy into a natural-language system instruction.
///
/// This compiler is **pure and deterministic**:
/// - No network calls
/// - No randomness
/// - Same input always produces same output
///
/// Rules are rendered in stored order. Priorities are described to the model,
/// never applied here.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// Creates a new compiler with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new compiler with the given options.
    #[must_use]
    pub const fn with_options(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Compiles a policy to a system instruction.
    ///
    /// Never fails; a policy without rules yields the header, the mandate and
    /// an empty rule section.
    #[must_use]
    pub fn compile(&self, policy: &Policy) -> String {
        debug!(
            "Compiling policy {} ({} rules)",
            policy.id,
            policy.rules.len()
        );
        let mut out = String::new();

        out.push_str(&format!(
            "You are an AI assistant operating strictly under the following policy: \"{}\" ({}).\n\n",
            policy.name, policy.policy_type
        ));

        out.push_str("YOUR MANDATE:\n");
        out.push_str("- Always prioritize higher priority rules (lower number).\n");
        out.push_str("- Never perform disallowed actions.\n");
        out.push_str("- Always include required responses when triggers are met.\n");
        out.push_str(&format!(
            "- Stay within the domain of \"{}\".\n",
            policy.domain
        ));
        out.push_str(&format!("- Version: {}\n\n", policy.version));

        out.push_str("SPECIFIC RULES:\n\n");
        if policy.rules.is_empty() {
            out.push_str(NO_RULES);
            out.push_str("\n\n");
        }
        for (i, rule) in policy.rules.iter().enumerate() {
            out.push_str(&self.render_rule(i + 1, rule));
        }

        out.push_str(
            "If a user asks something outside the policy or domain, politely refuse and stick to your policy guardrails.\n",
        );
        out
    }

    fn render_rule(&self, ordinal: usize, rule: &Rule) -> String {
        format!(
            "RULE {ordinal}:\n- TRIGGER: {}\n- ALLOWED: {}\n- DISALLOWED: {}\n- MANDATORY RESPONSE: {}\n- PRIORITY: {}\n\n",
            rule.trigger,
            self.join(&rule.allowed_actions),
            self.join(&rule.disallowed_actions),
            rule.required_response,
            rule.priority,
        )
    }

    fn join(&self, actions: &[String]) -> String {
        if actions.is_empty() {
            self.options.empty_list.clone()
        } else {
            actions.join(&self.options.delimiter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use warden_policy::{seed, PolicyStatus, PolicyType};

    fn policy_with(rules: Vec<Rule>) -> Policy {
        Policy {
            id: "p-test".to_string(),
            name: "Refund Desk".to_string(),
            description: "Refund handling".to_string(),
            policy_type: PolicyType::Business,
            domain: "Commerce".to_string(),
            status: PolicyStatus::Draft,
            version: "1.2.0".to_string(),
            last_updated: NaiveDate::MIN,
            author: "Ops".to_string(),
            rules,
        }
    }

    fn rule(id: &str, trigger: &str, priority: i32) -> Rule {
        Rule {
            id: id.to_string(),
            trigger: trigger.to_string(),
            allowed_actions: vec![],
            disallowed_actions: vec![],
            required_response: format!("response for {trigger}"),
            priority,
        }
    }

    #[test]
    fn compile_healthcare_policy() {
        let policy = &seed::policies()[0];
        let output = Compiler::new().compile(policy);

        assert!(output.contains("\"Healthcare Advice Guardrails\" (Safety & Content)"));
        assert!(output.contains("User asks for a diagnosis"));
        assert!(output.contains("I am an AI, not a doctor"));
        assert!(output.contains("- ALLOWED: Provide general information, Recommend seeing a doctor"));
        assert!(output.contains("Stay within the domain of \"Healthcare\""));
        assert!(output.contains("- Version: 2.1.0"));
    }

    #[test]
    fn compile_renders_instruction_layout() {
        let mut first = rule("a", "User requests a refund", 2);
        first.allowed_actions = vec!["Check order status".to_string(), "Open a ticket".to_string()];
        first.disallowed_actions = vec!["Promise a refund".to_string()];
        let policy = policy_with(vec![first, rule("b", "User is abusive", 1)]);

        insta::assert_snapshot!(Compiler::new().compile(&policy), @r#"
        You are an AI assistant operating strictly under the following policy: "Refund Desk" (Business Rules).

        YOUR MANDATE:
        - Always prioritize higher priority rules (lower number).
        - Never perform disallowed actions.
        - Always include required responses when triggers are met.
        - Stay within the domain of "Commerce".
        - Version: 1.2.0

        SPECIFIC RULES:

        RULE 1:
        - TRIGGER: User requests a refund
        - ALLOWED: Check order status, Open a ticket
        - DISALLOWED: Promise a refund
        - MANDATORY RESPONSE: response for User requests a refund
        - PRIORITY: 2

        RULE 2:
        - TRIGGER: User is abusive
        - ALLOWED: (none specified)
        - DISALLOWED: (none specified)
        - MANDATORY RESPONSE: response for User is abusive
        - PRIORITY: 1

        If a user asks something outside the policy or domain, politely refuse and stick to your policy guardrails.
        "#);
    }

    #[test]
    fn compile_zero_rule_policy() {
        let output = Compiler::new().compile(&policy_with(vec![]));

        assert!(output.contains("YOUR MANDATE:"));
        assert!(output.contains("\"Refund Desk\" (Business Rules)"));
        assert!(output.contains("\"Commerce\""));
        assert!(output.contains("- Version: 1.2.0"));
        assert!(output.contains(NO_RULES));
        assert!(!output.contains("- TRIGGER:"));
    }

    #[test]
    fn compile_keeps_stored_order_over_priority() {
        let policy = policy_with(vec![rule("low", "second priority", 5), rule("high", "first priority", 1)]);
        let output = Compiler::new().compile(&policy);

        let low = output.find("second priority").unwrap();
        let high = output.find("first priority").unwrap();
        assert!(low < high);
    }

    #[test]
    fn custom_options_change_list_rendering() {
        let mut r = rule("a", "t", 1);
        r.allowed_actions = vec!["x".to_string(), "y".to_string()];
        let compiler = Compiler::with_options(CompileOptions {
            delimiter: " | ".to_string(),
            empty_list: "none".to_string(),
        });

        let output = compiler.compile(&policy_with(vec![r]));
        assert!(output.contains("- ALLOWED: x | y"));
        assert!(output.contains("- DISALLOWED: none"));
    }

    #[test]
    fn compiler_is_deterministic() {
        let policy = &seed::policies()[1];
        let compiler = Compiler::new();
        assert_eq!(
            compiler.compile(policy),
            compiler.compile(policy),
            "Compiler must be deterministic"
        );
    }

    fn arb_rule() -> impl Strategy<Value = Rule> {
        (
            "[a-z0-9]{8}",
            "[A-Za-z][A-Za-z ]{0,30}",
            prop::collection::vec("[A-Za-z ]{1,12}", 0..3),
            prop::collection::vec("[A-Za-z ]{1,12}", 0..3),
            "[A-Za-z.,' ]{0,40}",
            -3i32..10,
        )
            .prop_map(|(id, trigger, allowed, disallowed, response, priority)| Rule {
                id,
                trigger,
                allowed_actions: allowed,
                disallowed_actions: disallowed,
                required_response: response,
                priority,
            })
    }

    proptest! {
        #[test]
        fn every_rule_renders_one_block_in_order(rules in prop::collection::vec(arb_rule(), 0..6)) {
            let policy = policy_with(rules.clone());
            let output = Compiler::new().compile(&policy);

            let blocks = output.lines().filter(|l| l.starts_with("- TRIGGER: ")).count();
            prop_assert_eq!(blocks, rules.len());

            let mut cursor = 0;
            for rule in &rules {
                let trigger = format!("- TRIGGER: {}\n", rule.trigger);
                let found = output[cursor..].find(&trigger);
                prop_assert!(found.is_some(), "missing trigger {:?}", rule.trigger);
                cursor += found.unwrap_or_default() + trigger.len();

                let response = format!("- MANDATORY RESPONSE: {}\n", rule.required_response);
                let found = output[cursor..].find(&response);
                prop_assert!(found.is_some(), "missing response {:?}", rule.required_response);
                cursor += found.unwrap_or_default() + response.len();
            }
        }
    }
}
