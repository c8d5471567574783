//! Console navigation.
//!
//! The console shows exactly one [`View`] at a time. Views change only through
//! [`View::apply`], which rejects events that make no sense where the user
//! currently is.

use std::fmt;
use thiserror::Error;
use warden_policy::Policy;

/// Top-level console sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Summary counts and recent policies.
    Dashboard,
    /// Product list.
    Products,
    /// Policy list.
    Policies,
    /// Settings.
    Settings,
}

/// What the console is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Summary counts and recent policies.
    Dashboard,
    /// Product list.
    Products,
    /// One product and its linked policies.
    ProductDetail {
        /// Product shown.
        product_id: String,
    },
    /// The registration form.
    RegisteringProduct,
    /// Policy list.
    Policies,
    /// One policy and its rules.
    PolicyDetail {
        /// Policy shown.
        policy_id: String,
    },
    /// The policy editor.
    EditingPolicy {
        /// Working copy; an empty id means a new policy.
        draft: Box<Policy>,
    },
    /// The simulator, bound to one policy.
    Simulating {
        /// Policy under test.
        policy_id: String,
    },
    /// Settings.
    Settings,
}

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Jump to a top-level section.
    Navigate(Section),
    /// Open a product.
    OpenProduct(String),
    /// Open the registration form.
    StartRegistration,
    /// Registration succeeded with the given product.
    RegistrationFinished(String),
    /// Open a policy.
    OpenPolicy(String),
    /// Start editing a policy (or a new draft).
    EditPolicy(Box<Policy>),
    /// The draft was saved under the given id.
    PolicySaved(String),
    /// Start simulating a policy.
    Simulate(String),
    /// Leave the current view for its parent.
    Back,
}

/// An event that is not valid from the current view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {event} from {from}")]
pub struct InvalidTransition {
    /// View the event was applied to.
    pub from: &'static str,
    /// The rejected event.
    pub event: &'static str,
}

impl View {
    /// Short name of the view.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Products => "products",
            Self::ProductDetail { .. } => "product detail",
            Self::RegisteringProduct => "product registration",
            Self::Policies => "policies",
            Self::PolicyDetail { .. } => "policy detail",
            Self::EditingPolicy { .. } => "policy editor",
            Self::Simulating { .. } => "simulator",
            Self::Settings => "settings",
        }
    }

    /// Computes the view that follows `event`.
    ///
    /// The current view is left as is; callers replace it with the returned
    /// one.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when `event` is not allowed here. The
    /// editor must be left through a save or [`Event::Back`], and a
    /// registration can only finish from the registration form.
    pub fn apply(&self, event: Event) -> Result<Self, InvalidTransition> {
        if let Self::EditingPolicy { .. } = self {
            return match event {
                Event::PolicySaved(_) | Event::Back => Ok(Self::Policies),
                other => Err(self.reject(&other)),
            };
        }

        let next = match (self, event) {
            (_, Event::Navigate(section)) => section.into(),

            (Self::Dashboard | Self::Products, Event::OpenProduct(product_id))
            | (Self::RegisteringProduct, Event::RegistrationFinished(product_id)) => {
                Self::ProductDetail { product_id }
            }
            (Self::Products | Self::ProductDetail { .. }, Event::StartRegistration) => {
                Self::RegisteringProduct
            }

            (
                Self::Dashboard | Self::Policies | Self::ProductDetail { .. },
                Event::OpenPolicy(policy_id),
            ) => Self::PolicyDetail { policy_id },
            (Self::Policies | Self::PolicyDetail { .. }, Event::EditPolicy(draft)) => {
                Self::EditingPolicy { draft }
            }
            (
                Self::Dashboard
                | Self::Policies
                | Self::PolicyDetail { .. }
                | Self::ProductDetail { .. }
                | Self::Simulating { .. },
                Event::Simulate(policy_id),
            ) => Self::Simulating { policy_id },

            (Self::ProductDetail { .. } | Self::RegisteringProduct, Event::Back) => Self::Products,
            (Self::PolicyDetail { .. } | Self::Simulating { .. }, Event::Back) => Self::Policies,
            (Self::Products | Self::Policies | Self::Settings, Event::Back) => Self::Dashboard,

            (_, event) => return Err(self.reject(&event)),
        };
        Ok(next)
    }

    fn reject(&self, event: &Event) -> InvalidTransition {
        InvalidTransition {
            from: self.name(),
            event: event.name(),
        }
    }
}

impl Event {
    const fn name(&self) -> &'static str {
        match self {
            Self::Navigate(_) => "navigate",
            Self::OpenProduct(_) => "open a product",
            Self::StartRegistration => "start a registration",
            Self::RegistrationFinished(_) => "finish a registration",
            Self::OpenPolicy(_) => "open a policy",
            Self::EditPolicy(_) => "edit a policy",
            Self::PolicySaved(_) => "save a policy",
            Self::Simulate(_) => "simulate",
            Self::Back => "go back",
        }
    }
}

impl From<Section> for View {
    fn from(section: Section) -> Self {
        match section {
            Section::Dashboard => Self::Dashboard,
            Section::Products => Self::Products,
            Section::Policies => Self::Policies,
            Section::Settings => Self::Settings,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProductDetail { product_id } => write!(f, "product {product_id}"),
            Self::PolicyDetail { policy_id } => write!(f, "policy {policy_id}"),
            Self::Simulating { policy_id } => write!(f, "simulating {policy_id}"),
            Self::EditingPolicy { draft } if draft.id.is_empty() => f.write_str("new policy"),
            Self::EditingPolicy { draft } => write!(f, "editing {}", draft.id),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(id: &str) -> Event {
        Event::OpenPolicy(id.to_string())
    }

    #[test]
    fn policy_flow() {
        let view = View::Dashboard
            .apply(Event::Navigate(Section::Policies))
            .unwrap()
            .apply(open("p1"))
            .unwrap();
        assert_eq!(view, View::PolicyDetail { policy_id: "p1".to_string() });

        let view = view.apply(Event::Simulate("p1".to_string())).unwrap();
        assert_eq!(view, View::Simulating { policy_id: "p1".to_string() });

        let view = view.apply(Event::Simulate("p2".to_string())).unwrap();
        assert_eq!(view.to_string(), "simulating p2");

        assert_eq!(view.apply(Event::Back).unwrap(), View::Policies);
    }

    #[test]
    fn editor_exits_only_by_save_or_back() {
        let editing = View::Policies
            .apply(Event::EditPolicy(Box::new(Policy::draft())))
            .unwrap();
        assert_eq!(editing.to_string(), "new policy");

        for event in [
            Event::Navigate(Section::Dashboard),
            open("p1"),
            Event::Simulate("p1".to_string()),
        ] {
            let err = editing.apply(event).unwrap_err();
            assert_eq!(err.from, "policy editor");
        }

        assert_eq!(editing.apply(Event::PolicySaved("p9".to_string())).unwrap(), View::Policies);
        assert_eq!(editing.apply(Event::Back).unwrap(), View::Policies);
    }

    #[test]
    fn saving_is_only_valid_while_editing() {
        let err = View::Policies
            .apply(Event::PolicySaved("p1".to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot save a policy from policies");
    }

    #[test]
    fn registration_flow() {
        let form = View::Products.apply(Event::StartRegistration).unwrap();
        assert_eq!(form, View::RegisteringProduct);

        let detail = form.apply(Event::RegistrationFinished("prod9".to_string())).unwrap();
        assert_eq!(detail, View::ProductDetail { product_id: "prod9".to_string() });

        assert!(View::Products
            .apply(Event::RegistrationFinished("prod9".to_string()))
            .is_err());
        assert_eq!(form.apply(Event::Back).unwrap(), View::Products);
    }

    #[test]
    fn navigation_works_from_anywhere_but_the_editor() {
        let views = [
            View::Dashboard,
            View::Products,
            View::ProductDetail { product_id: "prod1".to_string() },
            View::RegisteringProduct,
            View::PolicyDetail { policy_id: "p1".to_string() },
            View::Simulating { policy_id: "p1".to_string() },
            View::Settings,
        ];
        for view in views {
            assert_eq!(view.apply(Event::Navigate(Section::Settings)).unwrap(), View::Settings);
        }
        assert!(View::Dashboard.apply(Event::Back).is_err());
    }
}
