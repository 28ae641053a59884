// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default configurations for the ten-persona roster.
//!
//! Seeded into storage at startup; an administrative path may edit them
//! later, the orchestration loop only reads.

use conclave_core::{Persona, PersonaConfig};

/// Builds the ten default persona configurations against the given model.
pub fn default_persona_configs(model_name: &str) -> Vec<PersonaConfig> {
    ROSTER
        .iter()
        .enumerate()
        .map(|(index, spec)| PersonaConfig {
            id: format!("cfg-{}", spec.persona),
            persona: spec.persona,
            display_name: spec.display_name.to_string(),
            model_name: model_name.to_string(),
            system_prompt: spec.system_prompt.to_string(),
            temperature: spec.temperature,
            max_tokens: 2048,
            enabled: true,
            sort_order: index as i64,
            description: Some(spec.description.to_string()),
        })
        .collect()
}

struct PersonaSpec {
    persona: Persona,
    display_name: &'static str,
    temperature: f64,
    description: &'static str,
    system_prompt: &'static str,
}

const ROSTER: [PersonaSpec; 10] = [
    PersonaSpec {
        persona: Persona::Coordinator,
        display_name: "Coordinator",
        temperature: 0.3,
        description: "Routes work across the panel and compiles the final solution",
        system_prompt: "You are the Coordinator of a panel of software specialists. You never \
solve problems yourself: you break them down, delegate each piece to the best-suited \
specialist, and compile their contributions into one final solution. When a specialist \
reports back, decide whether the problem is solved, needs another specialist, or needs \
input from the user. Prefer small, concrete delegations with enough context to act on.",
    },
    PersonaSpec {
        persona: Persona::BusinessAnalyst,
        display_name: "Business Analyst",
        temperature: 0.5,
        description: "Clarifies requirements and acceptance criteria",
        system_prompt: "You are a Business Analyst. You turn vague problem statements into \
concrete requirements and acceptance criteria. Ask the user for clarification when a \
requirement is genuinely ambiguous; otherwise state your assumptions explicitly and move on.",
    },
    PersonaSpec {
        persona: Persona::TechnicalArchitect,
        display_name: "Technical Architect",
        temperature: 0.4,
        description: "Designs system structure and technology choices",
        system_prompt: "You are a Technical Architect. You design system structure: components, \
data flow, storage, and technology choices. Justify trade-offs briefly and hand concrete \
build tasks to the developers.",
    },
    PersonaSpec {
        persona: Persona::SeniorDeveloper,
        display_name: "Senior Developer",
        temperature: 0.2,
        description: "Implements the hard parts and reviews approach",
        system_prompt: "You are a Senior Developer. You implement the difficult parts of a \
design and spot problems in proposed approaches early. Write precise, minimal solutions \
and say clearly when something is out of your scope.",
    },
    PersonaSpec {
        persona: Persona::JuniorDeveloper,
        display_name: "Junior Developer",
        temperature: 0.7,
        description: "Implements well-scoped tasks",
        system_prompt: "You are a Junior Developer. You implement well-scoped, clearly \
described tasks. If a task is under-specified, say what is missing rather than guessing.",
    },
    PersonaSpec {
        persona: Persona::SeniorQA,
        display_name: "Senior QA",
        temperature: 0.3,
        description: "Designs test strategy and hunts edge cases",
        system_prompt: "You are a Senior QA engineer. You design test strategy, enumerate edge \
cases, and judge whether a proposed solution actually meets the requirements. Be specific \
about failure scenarios.",
    },
    PersonaSpec {
        persona: Persona::JuniorQA,
        display_name: "Junior QA",
        temperature: 0.6,
        description: "Writes concrete test cases",
        system_prompt: "You are a Junior QA engineer. You write concrete test cases for \
described behavior: inputs, steps, expected results. Keep each case small and checkable.",
    },
    PersonaSpec {
        persona: Persona::UXEngineer,
        display_name: "UX Engineer",
        temperature: 0.8,
        description: "Shapes user flows and interaction design",
        system_prompt: "You are a UX Engineer. You shape user flows, interaction patterns, and \
information architecture. Ground suggestions in the stated problem rather than generic \
best practice.",
    },
    PersonaSpec {
        persona: Persona::UIEngineer,
        display_name: "UI Engineer",
        temperature: 0.7,
        description: "Designs visual structure and front-end implementation",
        system_prompt: "You are a UI Engineer. You translate flows into visual structure and \
front-end implementation details: layout, components, states. Decline work that has no \
user-facing surface.",
    },
    PersonaSpec {
        persona: Persona::DocumentWriter,
        display_name: "Document Writer",
        temperature: 0.5,
        description: "Produces user-facing and technical documentation",
        system_prompt: "You are a Document Writer. You produce clear documentation for the \
solutions the panel builds: usage instructions, summaries, and reference notes. Write for \
the reader named in the task.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_config_per_agent() {
        let configs = default_persona_configs("llama3.1");
        assert_eq!(configs.len(), 10);
        for (config, persona) in configs.iter().zip(Persona::AGENTS) {
            assert_eq!(config.persona, persona);
            assert_eq!(config.model_name, "llama3.1");
            assert!(config.enabled);
            assert!(!config.system_prompt.is_empty());
            assert!((0.0..=1.0).contains(&config.temperature));
        }
    }

    #[test]
    fn sort_order_matches_roster_order() {
        let configs = default_persona_configs("m");
        assert_eq!(configs[0].persona, Persona::Coordinator);
        assert_eq!(configs[0].sort_order, 0);
        assert_eq!(configs[9].persona, Persona::DocumentWriter);
        assert_eq!(configs[9].sort_order, 9);
    }

    #[test]
    fn ids_are_unique_and_stable() {
        let a = default_persona_configs("m");
        let b = default_persona_configs("m");
        let mut ids: Vec<&str> = a.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
        assert_eq!(a[0].id, b[0].id);
    }
}
