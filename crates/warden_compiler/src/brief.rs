//! Policy brief generation.
//!
//! The brief is the human-facing counterpart of the compiled instruction: a
//! markdown card with the policy metadata and one section per rule.

use warden_policy::Policy;

/// Generates a markdown brief of a policy.
///
/// The brief includes:
/// - Policy overview
/// - Rule-by-rule listing in stored order
#[must_use]
pub fn render_brief(policy: &Policy) -> String {
    let mut brief = String::new();

    brief.push_str(&format!("# {}\n\n", policy.name));
    if !policy.description.is_empty() {
        brief.push_str(&format!("{}\n\n", policy.description));
    }

    brief.push_str("## Overview\n\n");
    brief.push_str(&format!("- **Id**: {}\n", policy.id));
    brief.push_str(&format!("- **Type**: {}\n", policy.policy_type));
    brief.push_str(&format!("- **Domain**: {}\n", policy.domain));
    brief.push_str(&format!("- **Status**: {}\n", policy.status));
    brief.push_str(&format!("- **Version**: {}\n", policy.version));
    brief.push_str(&format!(
        "- **Last updated**: {} by {}\n",
        policy.last_updated, policy.author
    ));
    brief.push_str(&format!("- **Rules**: {}\n\n", policy.rules.len()));

    if policy.rules.is_empty() {
        return brief;
    }

    brief.push_str("## Rules\n\n");
    for (i, rule) in policy.rules.iter().enumerate() {
        brief.push_str(&format!(
            "### {}. {} (priority: {})\n\n",
            i + 1,
            rule.trigger,
            rule.priority
        ));
        brief.push_str(&format!("- **Allowed**: {}\n", bullet_list(&rule.allowed_actions)));
        brief.push_str(&format!(
            "- **Disallowed**: {}\n",
            bullet_list(&rule.disallowed_actions)
        ));
        if !rule.required_response.is_empty() {
            brief.push_str(&format!("- **Response**: \"{}\"\n", rule.required_response));
        }
        brief.push('\n');
    }

    brief
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join("; ")
    }
}
