//! The console: catalog, current view and simulator in one place.

use crate::error::{Error, Result};
use crate::registration::Registrar;
use crate::session::{Simulator, TurnOutcome};
use crate::view::{Event, InvalidTransition, View};
use tracing::{debug, info};
use warden_claude::Assistant;
use warden_policy::{Catalog, Policy, ProductForm, RegisteredProduct};

/// Owns the catalog and keeps the simulator in step with the view.
#[derive(Debug)]
pub struct Console {
    catalog: Catalog,
    view: View,
    assistant: Assistant,
    registrar: Registrar,
    simulator: Option<Simulator>,
}

impl Console {
    /// Opens the console on the dashboard.
    #[must_use]
    pub fn new(catalog: Catalog, assistant: Assistant) -> Self {
        Self {
            catalog,
            view: View::Dashboard,
            registrar: Registrar::new(assistant.clone()),
            assistant,
            simulator: None,
        }
    }

    /// Current view.
    pub const fn view(&self) -> &View {
        &self.view
    }

    /// The catalog.
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Consumes the console, returning the catalog.
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// The simulator, present while a policy is being simulated.
    pub const fn simulator(&self) -> Option<&Simulator> {
        self.simulator.as_ref()
    }

    /// The policy draft being edited.
    pub fn draft_mut(&mut self) -> Option<&mut Policy> {
        match &mut self.view {
            View::EditingPolicy { draft } => Some(draft.as_mut()),
            _ => None,
        }
    }

    /// Applies `event` and returns the new view.
    ///
    /// Entering the simulator resets its session for the chosen policy and
    /// loads suggestions. Leaving it drops the session.
    ///
    /// Suggestion loading is awaited under `&mut self`, so through a console
    /// the user cannot switch policies while suggestions are in flight. The
    /// generation check in [`Simulator`] is what guards callers that drive a
    /// shared simulator directly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] for events not valid from the
    /// current view and [`Error::Catalog`] when the event names an unknown
    /// policy or product. The view is unchanged on error.
    pub async fn dispatch(&mut self, event: Event) -> Result<&View> {
        match &event {
            Event::OpenPolicy(id) | Event::Simulate(id) => {
                self.catalog.require_policy(id)?;
            }
            Event::OpenProduct(id) => {
                self.catalog
                    .product(id)
                    .ok_or_else(|| warden_policy::Error::UnknownProduct(id.clone()))?;
            }
            _ => {}
        }

        let next = self.view.apply(event)?;
        debug!("View {} -> {}", self.view, next);

        if let View::Simulating { policy_id } = &next {
            let policy = self.catalog.require_policy(policy_id)?.clone();
            if let Some(simulator) = &self.simulator {
                simulator.reset_session(policy).await;
            } else {
                let simulator = Simulator::new(self.assistant.clone(), policy);
                simulator.load_suggestions().await;
                self.simulator = Some(simulator);
            }
        } else {
            self.simulator = None;
        }

        self.view = next;
        Ok(&self.view)
    }

    /// Saves the draft being edited and returns to the policy list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside the editor and
    /// [`Error::Catalog`] when the draft has duplicate rule ids.
    pub fn save_draft(&mut self) -> Result<String> {
        let draft = match &self.view {
            View::EditingPolicy { draft } => (**draft).clone(),
            other => {
                return Err(InvalidTransition {
                    from: other.name(),
                    event: "save a policy",
                }
                .into())
            }
        };

        let id = self.catalog.save_policy(draft)?;
        self.view = self.view.apply(Event::PolicySaved(id.clone()))?;
        Ok(id)
    }

    /// Registers a product from the registration form.
    ///
    /// On success the new product is shown. On failure the form stays open
    /// and the catalog is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside the registration form,
    /// [`Error::IncompleteForm`] for a blank name or document, and
    /// [`Error::ExtractionFailed`] when extraction fails.
    pub async fn register(&mut self, form: ProductForm) -> Result<RegisteredProduct> {
        if self.view != View::RegisteringProduct {
            return Err(InvalidTransition {
                from: self.view.name(),
                event: "finish a registration",
            }
            .into());
        }

        let registered = self.registrar.register(&mut self.catalog, form).await?;
        self.view = self
            .view
            .apply(Event::RegistrationFinished(registered.product.id.clone()))?;
        info!(
            "Product {} registered with {} policies",
            registered.product.id,
            registered.policies.len()
        );
        Ok(registered)
    }

    /// Sends a chat turn to the simulator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSimulating`] outside the simulator and
    /// [`Error::Rejected`] for blank text or while a reply is pending.
    pub async fn say(&self, text: &str) -> Result<TurnOutcome> {
        let simulator = self.simulator.as_ref().ok_or(Error::NotSimulating)?;
        Ok(simulator.submit_turn(text).await?)
    }

    /// Clears the conversation and reloads suggestions for the same policy.
    ///
    /// The policy is re-read from the catalog, so saved edits take effect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSimulating`] outside the simulator.
    pub async fn reset_simulation(&self) -> Result<()> {
        let simulator = self.simulator.as_ref().ok_or(Error::NotSimulating)?;
        let policy = self.catalog.require_policy(&simulator.policy_id())?.clone();
        simulator.reset_session(policy).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SuggestionState, TurnState};
    use crate::view::Section;
    use async_trait::async_trait;
    use std::sync::Arc;
    use warden_claude::{CompletionRequest, CompletionService};
    use warden_policy::{seed, ProductType, RuleDraft};

    struct Echo;

    #[async_trait]
    impl CompletionService for Echo {
        async fn complete(&self, request: CompletionRequest) -> warden_claude::Result<String> {
            if request.schema.is_some() {
                let prompt = &request.turns[0].text;
                if prompt.contains("Product Requirements Document") {
                    return Ok("no structured data here".to_string());
                }
                return Ok(r#"{"prompts": ["one", "two", "three"]}"#.to_string());
            }
            Ok(format!("echo: {}", request.turns.last().unwrap().text))
        }
    }

    fn console() -> Console {
        Console::new(seed::catalog(), Assistant::new(Arc::new(Echo)))
    }

    #[tokio::test]
    async fn simulating_loads_suggestions_and_accepts_turns() {
        let mut console = console();
        console.dispatch(Event::Simulate("p2".to_string())).await.unwrap();

        let session = console.simulator().unwrap().snapshot();
        assert_eq!(session.policy().id, "p2");
        assert_eq!(session.suggestion_state(), SuggestionState::Ready);
        assert_eq!(session.suggestions(), ["one", "two", "three"]);

        let outcome = console.say("Can I deduct my cat?").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Replied("echo: Can I deduct my cat?".to_string()));

        console.dispatch(Event::Simulate("p3".to_string())).await.unwrap();
        let session = console.simulator().unwrap().snapshot();
        assert_eq!(session.policy().id, "p3");
        assert!(session.transcript().is_empty());
        assert_eq!(session.turn_state(), TurnState::Idle);

        console.dispatch(Event::Back).await.unwrap();
        assert!(console.simulator().is_none());
        assert!(matches!(console.say("hi").await, Err(Error::NotSimulating)));
    }

    #[tokio::test]
    async fn unknown_policy_leaves_view_unchanged() {
        let mut console = console();
        let err = console.dispatch(Event::Simulate("missing".to_string())).await.unwrap_err();

        assert!(matches!(err, Error::Catalog(_)));
        assert_eq!(console.view(), &View::Dashboard);
        assert!(console.simulator().is_none());
    }

    #[tokio::test]
    async fn editing_and_saving_a_new_policy() {
        let mut console = console();
        assert!(console.save_draft().is_err());

        console.dispatch(Event::Navigate(Section::Policies)).await.unwrap();
        console
            .dispatch(Event::EditPolicy(Box::new(Policy::draft())))
            .await
            .unwrap();

        let draft = console.draft_mut().unwrap();
        draft.name = "Refund Rules".to_string();
        draft.add_rule(RuleDraft {
            trigger: "Refund request".to_string(),
            ..Default::default()
        });

        let id = console.save_draft().unwrap();

        assert_eq!(console.view(), &View::Policies);
        assert_eq!(console.catalog().policies()[0].id, id);
        assert_eq!(console.catalog().policies()[0].rules.len(), 1);
    }

    #[tokio::test]
    async fn failed_registration_keeps_form_open() {
        let mut console = console();
        console.dispatch(Event::Navigate(Section::Products)).await.unwrap();
        console.dispatch(Event::StartRegistration).await.unwrap();
        let before = console.catalog().clone();

        let err = console
            .register(ProductForm {
                name: "Shop".to_string(),
                product_type: ProductType::NativeMobile,
                prd: "Users buy things.".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ExtractionFailed(_)));
        assert_eq!(console.view(), &View::RegisteringProduct);
        assert_eq!(console.catalog(), &before);
    }
}
