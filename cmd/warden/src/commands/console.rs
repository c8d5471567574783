//! Console command implementation.
//!
//! A line-oriented front end over [`Console`]: every input line is one
//! command, and the current view is printed after each navigation. With
//! `--catalog` the catalog is written back on exit.

use super::list::{print_policies, print_products, print_summary};
use super::{load_catalog, save_catalog, ServiceArgs};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use warden_compiler::render_brief;
use warden_console::{Console, Event, Section, TurnOutcome, View};
use warden_policy::{Policy, ProductForm, ProductType, RuleDraft};

const HELP: &str = "\
Commands:
  dashboard                  show catalog totals
  policies                   list policies
  products                   list products
  open <id>                  open a policy or product
  simulate <id>              start simulating a policy
  say <text>                 send a message to the simulated assistant
  reset                      clear the conversation and reload suggestions
  new                        start a new policy
  edit <id>                  edit a policy
  set <field> <text>         set the draft's name, description, domain or author
  rule <trigger> => <reply>  add a rule to the draft
  drop <rule-id>             remove a rule from the draft
  save                       save the draft
  register                   open the product registration form
  submit <web|mobile> <prd-file> <name>
                             register a product from a requirements document
  back                       leave the current view
  help                       show this help
  quit                       exit";

/// Draft field settable with `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    Domain,
    Author,
}

impl Field {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "domain" => Some(Self::Domain),
            "author" => Some(Self::Author),
            _ => None,
        }
    }
}

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Dashboard,
    Policies,
    Products,
    Open(String),
    Simulate(String),
    Say(String),
    Reset,
    New,
    Edit(String),
    Set(Field, String),
    Rule { trigger: String, reply: String },
    Drop(String),
    Save,
    Register,
    Submit {
        product_type: ProductType,
        prd: PathBuf,
        name: String,
    },
    Back,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let parsed = match (word, rest) {
            ("", _) => Some(Self::Empty),
            ("dashboard", "") => Some(Self::Dashboard),
            ("policies", "") => Some(Self::Policies),
            ("products", "") => Some(Self::Products),
            ("open", id) if !id.is_empty() => Some(Self::Open(id.to_string())),
            ("simulate", id) if !id.is_empty() => Some(Self::Simulate(id.to_string())),
            ("say", text) => Some(Self::Say(text.to_string())),
            ("reset", "") => Some(Self::Reset),
            ("new", "") => Some(Self::New),
            ("edit", id) if !id.is_empty() => Some(Self::Edit(id.to_string())),
            ("set", rest) => Self::parse_set(rest),
            ("rule", rest) => Self::parse_rule(rest),
            ("drop", id) if !id.is_empty() => Some(Self::Drop(id.to_string())),
            ("save", "") => Some(Self::Save),
            ("register", "") => Some(Self::Register),
            ("submit", rest) => Self::parse_submit(rest),
            ("back", "") => Some(Self::Back),
            ("help", "") => Some(Self::Help),
            ("quit" | "exit", "") => Some(Self::Quit),
            _ => None,
        };
        parsed.unwrap_or_else(|| Self::Unknown(line.to_string()))
    }

    fn parse_set(rest: &str) -> Option<Self> {
        let (field, value) = rest.split_once(char::is_whitespace)?;
        Some(Self::Set(Field::parse(field)?, value.trim().to_string()))
    }

    fn parse_rule(rest: &str) -> Option<Self> {
        let (trigger, reply) = rest
            .split_once("=>")
            .map_or((rest, ""), |(t, r)| (t.trim(), r.trim()));
        if trigger.is_empty() {
            return None;
        }
        Some(Self::Rule {
            trigger: trigger.to_string(),
            reply: reply.to_string(),
        })
    }

    fn parse_submit(rest: &str) -> Option<Self> {
        let mut parts = rest.splitn(3, char::is_whitespace);
        let product_type = match parts.next()? {
            "web" => ProductType::WebApplication,
            "mobile" => ProductType::NativeMobile,
            _ => return None,
        };
        let prd = parts.next().filter(|p| !p.is_empty())?;
        let name = parts.next().map(str::trim).filter(|n| !n.is_empty())?;
        Some(Self::Submit {
            product_type,
            prd: PathBuf::from(prd),
            name: name.to_string(),
        })
    }
}

/// Runs the console command.
pub async fn run(catalog_path: Option<&Path>, service: &ServiceArgs) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let mut console = Console::new(catalog, service.assistant()?);

    println!("{HELP}\n");
    render(&console);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}> ", console.view());
        std::io::stdout().flush().with_context(|| "Failed to flush stdout")?;

        let Some(line) = lines
            .next_line()
            .await
            .with_context(|| "Failed to read input")?
        else {
            break;
        };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Empty => {}
            Command::Help => println!("{HELP}"),
            Command::Unknown(line) => println!("Unknown command: {line} (try 'help')"),
            command => {
                if let Err(e) = execute(&mut console, command).await {
                    println!("error: {e:#}");
                }
            }
        }
    }

    debug!("Console closed");
    save_catalog(&console.into_catalog(), catalog_path)
}

async fn execute(console: &mut Console, command: Command) -> Result<()> {
    let event = match command {
        Command::Dashboard => Event::Navigate(Section::Dashboard),
        Command::Policies => Event::Navigate(Section::Policies),
        Command::Products => Event::Navigate(Section::Products),
        Command::Open(id) if console.catalog().policy(&id).is_some() => Event::OpenPolicy(id),
        Command::Open(id) => Event::OpenProduct(id),
        Command::Simulate(id) => Event::Simulate(id),
        Command::New => Event::EditPolicy(Box::new(Policy::draft())),
        Command::Edit(id) => {
            Event::EditPolicy(Box::new(console.catalog().require_policy(&id)?.clone()))
        }
        Command::Register => Event::StartRegistration,
        Command::Back => Event::Back,
        Command::Say(text) => {
            match console.say(&text).await? {
                TurnOutcome::Replied(reply) => println!("assistant: {reply}"),
                TurnOutcome::Failed(reason) => println!("turn failed: {reason}"),
                TurnOutcome::Discarded => {}
            }
            return Ok(());
        }
        Command::Reset => {
            console.reset_simulation().await?;
            render(console);
            return Ok(());
        }
        Command::Save => {
            let id = console.save_draft()?;
            println!("Saved policy {id}");
            render(console);
            return Ok(());
        }
        Command::Submit {
            product_type,
            prd,
            name,
        } => {
            submit(console, product_type, &prd, name).await?;
            render(console);
            return Ok(());
        }
        command @ (Command::Set(..) | Command::Rule { .. } | Command::Drop(_)) => {
            edit_draft(console, command)?;
            render(console);
            return Ok(());
        }
        Command::Help | Command::Quit | Command::Empty | Command::Unknown(_) => return Ok(()),
    };

    console.dispatch(event).await?;
    render(console);
    Ok(())
}

fn edit_draft(console: &mut Console, command: Command) -> Result<()> {
    let draft = console
        .draft_mut()
        .context("Not editing a policy (try 'new' or 'edit <id>')")?;

    match command {
        Command::Set(field, value) => match field {
            Field::Name => draft.name = value,
            Field::Description => draft.description = value,
            Field::Domain => draft.domain = value,
            Field::Author => draft.author = value,
        },
        Command::Rule { trigger, reply } => {
            let rule = draft
                .add_rule(RuleDraft {
                    trigger,
                    required_response: (!reply.is_empty()).then_some(reply),
                    ..RuleDraft::default()
                })
                .context("Rule trigger must not be blank")?;
            debug!("Added rule {}", rule.id);
        }
        Command::Drop(id) => {
            draft
                .remove_rule(&id)
                .with_context(|| format!("No rule {id} in the draft"))?;
        }
        _ => {}
    }
    Ok(())
}

async fn submit(
    console: &mut Console,
    product_type: ProductType,
    prd_path: &Path,
    name: String,
) -> Result<()> {
    let prd = std::fs::read_to_string(prd_path).with_context(|| {
        format!(
            "Failed to read requirements document: {}",
            prd_path.display()
        )
    })?;
    let registered = console
        .register(ProductForm {
            name,
            product_type,
            prd,
        })
        .await?;
    println!(
        "Registered '{}' with {} draft policies",
        registered.product.name,
        registered.policies.len()
    );
    Ok(())
}

fn render(console: &Console) {
    let catalog = console.catalog();
    match console.view() {
        View::Dashboard => print_summary(catalog),
        View::Policies => print_policies(catalog),
        View::Products => print_products(catalog),
        View::PolicyDetail { policy_id } => {
            if let Some(policy) = catalog.policy(policy_id) {
                print!("{}", render_brief(policy));
            }
        }
        View::ProductDetail { product_id } => {
            if let Some(product) = catalog.product(product_id) {
                println!("{} [{}, {}]", product.name, product.product_type, product.status);
                println!("Audience: {}", product.target_audience);
                for feature in &product.extracted_features {
                    println!("  - {feature}");
                }
            }
            if let Ok(linked) = catalog.linked_policies(product_id) {
                println!("Linked policies:");
                for policy in linked {
                    println!("  {:<12} {}", policy.id, policy.name);
                }
            }
        }
        View::EditingPolicy { draft } => {
            println!("Name:        {}", draft.name);
            println!("Description: {}", draft.description);
            println!("Domain:      {}", draft.domain);
            println!("Author:      {}", draft.author);
            println!("Rules:");
            for rule in &draft.rules {
                println!("  {:<38} {}", rule.id, rule.trigger);
            }
        }
        View::RegisteringProduct => {
            println!("Register a product: submit <web|mobile> <prd-file> <name>");
        }
        View::Simulating { .. } => {
            if let Some(simulator) = console.simulator() {
                let session = simulator.snapshot();
                println!("Simulating '{}'", session.policy().name);
                println!("Try:");
                for suggestion in session.suggestions() {
                    println!("  say {suggestion}");
                }
            }
        }
        View::Settings => println!("{}", console.view()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{assistant, scratch, EXTRACTION};
    use warden_policy::seed;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("  policies "), Command::Policies);
        assert_eq!(Command::parse("open p1"), Command::Open("p1".to_string()));
        assert_eq!(
            Command::parse("say  Can I skip the doctor?"),
            Command::Say("Can I skip the doctor?".to_string())
        );
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse("exit"), Command::Quit);
        assert_eq!(Command::parse("open"), Command::Unknown("open".to_string()));
        assert_eq!(
            Command::parse("policies now"),
            Command::Unknown("policies now".to_string())
        );
    }

    #[test]
    fn bare_say_is_passed_through_for_rejection() {
        assert_eq!(Command::parse("say"), Command::Say(String::new()));
    }

    #[test]
    fn parses_editor_commands() {
        assert_eq!(
            Command::parse("set name Refund Rules"),
            Command::Set(Field::Name, "Refund Rules".to_string())
        );
        assert_eq!(
            Command::parse("set color red"),
            Command::Unknown("set color red".to_string())
        );
        assert_eq!(
            Command::parse("rule Refund over $500 => Escalate to a manager."),
            Command::Rule {
                trigger: "Refund over $500".to_string(),
                reply: "Escalate to a manager.".to_string(),
            }
        );
        assert_eq!(
            Command::parse("rule Greeting"),
            Command::Rule {
                trigger: "Greeting".to_string(),
                reply: String::new(),
            }
        );
        assert_eq!(Command::parse("rule => x"), Command::Unknown("rule => x".to_string()));
    }

    #[test]
    fn parses_submit() {
        assert_eq!(
            Command::parse("submit mobile prd.md Pocket Shop"),
            Command::Submit {
                product_type: ProductType::NativeMobile,
                prd: PathBuf::from("prd.md"),
                name: "Pocket Shop".to_string(),
            }
        );
        assert!(matches!(Command::parse("submit desktop prd.md Shop"), Command::Unknown(_)));
        assert!(matches!(Command::parse("submit web prd.md"), Command::Unknown(_)));
    }

    #[tokio::test]
    async fn new_policy_is_built_and_saved_from_the_prompt() {
        let mut console = Console::new(seed::catalog(), assistant(EXTRACTION));
        for line in [
            "policies",
            "new",
            "set name Refund Rules",
            "set domain Retail",
            "rule Refund request => Confirm the order number.",
            "rule Chargeback",
        ] {
            execute(&mut console, Command::parse(line)).await.unwrap();
        }
        let draft = console.draft_mut().unwrap();
        let dropped = draft.rules[1].id.clone();
        execute(&mut console, Command::Drop(dropped)).await.unwrap();
        execute(&mut console, Command::Save).await.unwrap();

        assert_eq!(console.view(), &View::Policies);
        let saved = &console.catalog().policies()[0];
        assert_eq!(saved.name, "Refund Rules");
        assert_eq!(saved.domain, "Retail");
        assert_eq!(saved.rules.len(), 1);
        assert_eq!(saved.rules[0].required_response, "Confirm the order number.");
    }

    #[tokio::test]
    async fn editor_commands_need_an_open_draft() {
        let mut console = Console::new(seed::catalog(), assistant(EXTRACTION));
        let err = execute(&mut console, Command::parse("set name X")).await.unwrap_err();
        assert!(err.to_string().contains("Not editing"));
        assert!(execute(&mut console, Command::Save).await.is_err());
    }

    #[tokio::test]
    async fn product_is_registered_from_the_form_and_saved_on_exit() {
        let prd = scratch("console-prd.md");
        let snapshot = scratch("console-catalog.yaml");
        std::fs::write(&prd, "Users buy things.").unwrap();

        let mut console = Console::new(seed::catalog(), assistant(EXTRACTION));
        execute(&mut console, Command::parse("products")).await.unwrap();
        execute(&mut console, Command::parse("register")).await.unwrap();
        assert_eq!(console.view(), &View::RegisteringProduct);
        let line = format!("submit web {} Shop", prd.display());
        execute(&mut console, Command::parse(&line)).await.unwrap();

        let product_id = console.catalog().products()[0].id.clone();
        assert_eq!(console.view(), &View::ProductDetail { product_id });

        save_catalog(&console.into_catalog(), Some(&snapshot)).unwrap();
        let reloaded = load_catalog(Some(&snapshot)).unwrap();
        std::fs::remove_file(&prd).ok();
        std::fs::remove_file(&snapshot).ok();

        assert_eq!(reloaded.products()[0].name, "Shop");
        assert_eq!(reloaded.policies()[0].name, "Refund Limits");
    }
}
