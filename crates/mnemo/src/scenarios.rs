// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo test` command implementation.
//!
//! Scripted conversations that exercise both memory tiers against the
//! configured model and report pass/fail per check. Checks that inspect the
//! model's wording depend on the model and are informational.

use std::str::FromStr;

use colored::Colorize;
use mnemo_agent::{MemoryWorkflow, TurnResult, create_memory_workflow};
use mnemo_config::MnemoConfig;
use mnemo_core::MnemoError;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::info;

use crate::backends::{Backends, preflight};

/// Identity whose global namespace holds scenario memories.
const SCENARIO_USER: &str = "scenario_runner";

/// A runnable scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Scenario {
    BasicMemoryStorage,
    ShortTermMemory,
    LongTermMemoryPersistence,
    MemoryTypes,
    MemorySearchAccuracy,
    MemoryStatistics,
    #[strum(to_string = "all", serialize = "all_scenarios")]
    All,
}

impl Scenario {
    /// Parses a scenario name; a leading `test_` is accepted.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::from_str(name.strip_prefix("test_").unwrap_or(name)).ok()
    }
}

/// Outcome of one check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub details: String,
}

/// Runs scenarios against one workflow and collects check results.
pub struct ScenarioRunner {
    workflow: MemoryWorkflow,
    results: Vec<CheckResult>,
}

impl ScenarioRunner {
    pub fn new(workflow: MemoryWorkflow) -> Self {
        Self {
            workflow,
            results: Vec::new(),
        }
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// `(passed, total)` over every check run so far.
    pub fn tally(&self) -> (usize, usize) {
        let passed = self.results.iter().filter(|r| r.passed).count();
        (passed, self.results.len())
    }

    /// Runs `scenario`. `All` runs every scenario, clears both memory tiers
    /// afterwards, and prints a summary.
    pub async fn run(&mut self, scenario: Scenario) -> Result<(), MnemoError> {
        if scenario != Scenario::All {
            return self.run_one(scenario).await;
        }

        println!("{}", "Running all scenarios...".bold());
        println!("{}", "=".repeat(60));
        let mut outcome = Ok(());
        for scenario in Scenario::iter().filter(|s| *s != Scenario::All) {
            outcome = self.run_one(scenario).await;
            if outcome.is_err() {
                break;
            }
        }
        self.teardown().await?;
        outcome?;
        self.print_summary();
        Ok(())
    }

    async fn run_one(&mut self, scenario: Scenario) -> Result<(), MnemoError> {
        println!("\n{} {}", "Scenario:".bold(), scenario);
        info!(%scenario, "running scenario");
        match scenario {
            Scenario::BasicMemoryStorage => self.basic_memory_storage().await,
            Scenario::ShortTermMemory => self.short_term_memory().await,
            Scenario::LongTermMemoryPersistence => self.long_term_memory_persistence().await,
            Scenario::MemoryTypes => self.memory_types().await,
            Scenario::MemorySearchAccuracy => self.memory_search_accuracy().await,
            Scenario::MemoryStatistics => self.memory_statistics().await?,
            Scenario::All => {}
        }
        Ok(())
    }

    async fn turn(&mut self, input: &str) -> TurnResult {
        self.workflow.run(input).await
    }

    fn record(&mut self, name: &'static str, passed: bool, details: impl Into<String>) {
        let details = details.into();
        let status = if passed { "PASS".green() } else { "FAIL".red() };
        println!("{status} {name}");
        if !details.is_empty() {
            println!("   {}", details.dimmed());
        }
        self.results.push(CheckResult {
            name,
            passed,
            details,
        });
    }

    async fn basic_memory_storage(&mut self) {
        let first = self.turn("I love pizza, especially pepperoni pizza!").await;
        self.record(
            "Basic memory suggestion generation",
            !first.memory_suggestions.is_empty(),
            format!("Generated {} suggestions", first.memory_suggestions.len()),
        );

        let second = self.turn("What kind of food do I like?").await;
        self.record(
            "Basic memory retrieval",
            !second.relevant_memories.is_empty(),
            format!("Retrieved {} memories", second.relevant_memories.len()),
        );
        self.record(
            "Memory-informed response",
            mentions(&second.response, &["pizza"]),
            "Response includes remembered preference",
        );
    }

    async fn short_term_memory(&mut self) {
        self.workflow.agent_mut().clear_short_term();

        self.turn("My name is Alice and I'm a software engineer.").await;
        let result = self.turn("What did I just tell you about myself?").await;
        self.record(
            "Short-term memory recall",
            mentions(&result.response, &["alice"])
                && mentions(&result.response, &["software", "engineer"]),
            "Agent remembered name and profession from previous message",
        );

        let context = self.workflow.agent().short_term().len();
        self.record(
            "Conversation context maintenance",
            context >= 4,
            format!("Maintained {context} messages in context"),
        );
    }

    async fn long_term_memory_persistence(&mut self) {
        self.turn("Remember that my birthday is on December 25th and I'm allergic to peanuts.")
            .await;
        self.workflow.agent_mut().clear_short_term();

        let birthday = self.turn("When is my birthday?").await;
        self.record(
            "Long-term memory persistence",
            mentions(&birthday.response, &["december", "25"])
                && !birthday.relevant_memories.is_empty(),
            "Retrieved birthday information after clearing short-term memory",
        );

        let allergy = self.turn("What foods should I avoid?").await;
        self.record(
            "Multiple long-term memories",
            mentions(&allergy.response, &["peanut"]),
            "Retrieved allergy information",
        );
    }

    async fn memory_types(&mut self) {
        self.turn("I prefer working in the morning and I don't like loud music.")
            .await;
        self.turn("Remember that the capital of France is Paris.").await;
        self.turn("I work at TechCorp as a data scientist.").await;

        let preferences = self.turn("What are my work preferences?").await;
        let facts = self.turn("What's the capital of France?").await;
        let personal = self.turn("Where do I work?").await;

        self.record(
            "Preference memory",
            mentions(&preferences.response, &["morning"]),
            "Retrieved work preference",
        );
        self.record(
            "Factual memory",
            mentions(&facts.response, &["paris"]),
            "Retrieved factual information",
        );
        self.record(
            "Personal information memory",
            mentions(&personal.response, &["techcorp"]),
            "Retrieved personal information",
        );
    }

    async fn memory_search_accuracy(&mut self) {
        self.turn("I love Italian food, especially pasta and pizza.").await;
        self.turn("My favorite color is blue and I enjoy reading science fiction books.")
            .await;
        self.turn("I have a cat named Whiskers and a dog named Max.").await;

        let pets = self.turn("What pets do I have?").await;
        let cuisine = self.turn("What's my favorite cuisine?").await;
        let books = self.turn("What books do I like?").await;

        self.record(
            "Pet information retrieval",
            mentions(&pets.response, &["cat", "whiskers", "dog", "max"]),
            "Correctly retrieved pet information",
        );
        self.record(
            "Food preference retrieval",
            mentions(&cuisine.response, &["italian", "pasta"]),
            "Correctly retrieved food preferences",
        );
        self.record(
            "Book preference retrieval",
            mentions(&books.response, &["science fiction", "sci-fi", "scifi"]),
            "Correctly retrieved reading preferences",
        );
    }

    async fn memory_statistics(&mut self) -> Result<(), MnemoError> {
        self.turn("Hello, I'm testing the memory system.").await;
        self.turn("I like chocolate ice cream.").await;
        self.turn("My favorite movie is The Matrix.").await;

        let stats = self.workflow.memory_stats().await?;
        self.record(
            "Memory statistics generation",
            stats.short_term.total_messages > 0,
            format!(
                "Short-term: {} messages, Long-term: {} memories",
                stats.short_term.total_messages, stats.long_term.total_memories
            ),
        );

        self.workflow.agent_mut().clear_short_term();
        let after = self.workflow.memory_stats().await?;
        self.record(
            "Short-term memory clearing",
            after.short_term.total_messages == 0,
            "Successfully cleared short-term memory",
        );
        Ok(())
    }

    async fn teardown(&mut self) -> Result<(), MnemoError> {
        println!("\n{}", "Cleaning up scenario memories...".dimmed());
        self.workflow.agent_mut().clear_short_term();
        self.workflow.agent().clear_long_term().await
    }

    fn print_summary(&self) {
        let (passed, total) = self.tally();
        println!("\n{}", "=".repeat(60));
        println!("{}", "Scenario Summary".bold());
        println!("{}", "=".repeat(60));
        for result in self.results.iter().filter(|r| !r.passed) {
            println!("{} {}", "FAIL".red(), result.name);
        }
        let rate = if total == 0 {
            0.0
        } else {
            passed as f64 * 100.0 / total as f64
        };
        println!("Passed {passed}/{total} checks ({rate:.1}%)");
    }
}

/// Case-insensitive: does `text` contain any of `needles`?
fn mentions(text: &str, needles: &[&str]) -> bool {
    let text = text.to_lowercase();
    needles.iter().any(|n| text.contains(n))
}

/// Runs the named scenario, or all of them, against the configured backends.
pub async fn run_scenarios(config: MnemoConfig, name: Option<&str>) -> Result<(), MnemoError> {
    let scenario = match name {
        None => Scenario::All,
        Some(name) => match Scenario::parse(name) {
            Some(scenario) => scenario,
            None => {
                eprintln!("Unknown scenario '{name}'. Available scenarios:");
                for scenario in Scenario::iter() {
                    eprintln!("  - {scenario}");
                }
                return Err(MnemoError::NotFound {
                    kind: "scenario",
                    id: name.to_string(),
                });
            }
        },
    };

    let backends = Backends::open(&config).await?;
    println!("{}", "Checking adapters".bold());
    if let Err(e) = preflight(&backends.health().await) {
        backends.close().await?;
        return Err(e);
    }
    let workflow = create_memory_workflow(
        &config,
        backends.provider.clone(),
        backends.embedder.clone(),
        backends.index.clone(),
        Some(SCENARIO_USER),
        None,
    )?;

    let mut runner = ScenarioRunner::new(workflow);
    let outcome = runner.run(scenario).await;
    drop(runner);
    backends.close().await?;
    outcome
}
