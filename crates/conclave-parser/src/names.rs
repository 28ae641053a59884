// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona name resolution with alias support.
//!
//! Model output spells persona names loosely ("Sr Dev", "business_analyst",
//! "TA"). Resolution lowercases the input, drops whitespace, underscores and
//! hyphens, then checks canonical names and a fixed alias table.

use conclave_core::Persona;

/// Resolves a loosely spelled persona name to its canonical identifier.
///
/// Returns `None` for unknown names; the caller must treat a delegation with
/// an unresolvable target as malformed.
pub fn resolve_persona(name: &str) -> Option<Persona> {
    let normalized: String = name
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect::<String>()
        .to_lowercase();

    let persona = match normalized.as_str() {
        "user" => Persona::User,
        "coordinator" => Persona::Coordinator,
        "businessanalyst" | "ba" => Persona::BusinessAnalyst,
        "technicalarchitect" | "ta" => Persona::TechnicalArchitect,
        "seniordeveloper" | "srdev" => Persona::SeniorDeveloper,
        "juniordeveloper" | "jrdev" => Persona::JuniorDeveloper,
        "seniorqa" | "srqa" => Persona::SeniorQA,
        "juniorqa" | "jrqa" => Persona::JuniorQA,
        "uxengineer" | "ux" => Persona::UXEngineer,
        "uiengineer" | "ui" => Persona::UIEngineer,
        "documentwriter" | "doc" | "docs" | "docwriter" => Persona::DocumentWriter,
        _ => return None,
    };
    Some(persona)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_resolve() {
        assert_eq!(
            resolve_persona("Coordinator"),
            Some(Persona::Coordinator)
        );
        assert_eq!(
            resolve_persona("BusinessAnalyst"),
            Some(Persona::BusinessAnalyst)
        );
        assert_eq!(
            resolve_persona("DocumentWriter"),
            Some(Persona::DocumentWriter)
        );
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(resolve_persona("BA"), Some(Persona::BusinessAnalyst));
        assert_eq!(resolve_persona("TA"), Some(Persona::TechnicalArchitect));
        assert_eq!(resolve_persona("SrDev"), Some(Persona::SeniorDeveloper));
        assert_eq!(resolve_persona("JrDev"), Some(Persona::JuniorDeveloper));
        assert_eq!(resolve_persona("SrQA"), Some(Persona::SeniorQA));
        assert_eq!(resolve_persona("JrQA"), Some(Persona::JuniorQA));
        assert_eq!(resolve_persona("UX"), Some(Persona::UXEngineer));
        assert_eq!(resolve_persona("UI"), Some(Persona::UIEngineer));
        assert_eq!(resolve_persona("Doc"), Some(Persona::DocumentWriter));
        assert_eq!(resolve_persona("Docs"), Some(Persona::DocumentWriter));
        assert_eq!(resolve_persona("DocWriter"), Some(Persona::DocumentWriter));
    }

    #[test]
    fn separators_and_case_are_tolerated() {
        assert_eq!(
            resolve_persona("senior_developer"),
            Some(Persona::SeniorDeveloper)
        );
        assert_eq!(
            resolve_persona("Senior Developer"),
            Some(Persona::SeniorDeveloper)
        );
        assert_eq!(
            resolve_persona("technical-architect"),
            Some(Persona::TechnicalArchitect)
        );
        assert_eq!(resolve_persona("  ux engineer "), Some(Persona::UXEngineer));
        assert_eq!(resolve_persona("SENIOR QA"), Some(Persona::SeniorQA));
    }

    #[test]
    fn unknown_names_return_none() {
        assert_eq!(resolve_persona("ProjectManager"), None);
        assert_eq!(resolve_persona(""), None);
        assert_eq!(resolve_persona("dev"), None);
    }
}
