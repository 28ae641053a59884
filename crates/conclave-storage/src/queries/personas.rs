// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona configuration operations.

use rusqlite::{params, OptionalExtension, Row};

use conclave_core::{ConclaveError, Persona};

use crate::database::Database;
use crate::models::{self, PersonaConfig};

const CONFIG_COLUMNS: &str = "id, persona, display_name, model_name, system_prompt, \
                              temperature, max_tokens, enabled, sort_order, description";

fn config_from_row(row: &Row<'_>) -> rusqlite::Result<PersonaConfig> {
    Ok(PersonaConfig {
        id: row.get(0)?,
        persona: models::parse_persona(1, row.get(1)?)?,
        display_name: row.get(2)?,
        model_name: row.get(3)?,
        system_prompt: row.get(4)?,
        temperature: row.get(5)?,
        max_tokens: row.get(6)?,
        enabled: row.get(7)?,
        sort_order: row.get(8)?,
        description: row.get(9)?,
    })
}

/// Get the configuration for one persona.
pub async fn get_by_persona(
    db: &Database,
    persona: Persona,
) -> Result<Option<PersonaConfig>, ConclaveError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONFIG_COLUMNS} FROM persona_configurations WHERE persona = ?1"
            ))?;
            let config = stmt
                .query_row(params![persona.to_string()], config_from_row)
                .optional()?;
            Ok(config)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All configurations in sort order.
pub async fn list_all(db: &Database) -> Result<Vec<PersonaConfig>, ConclaveError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONFIG_COLUMNS} FROM persona_configurations ORDER BY sort_order ASC"
            ))?;
            let rows = stmt.query_map([], config_from_row)?;
            let mut configs = Vec::new();
            for row in rows {
                configs.push(row?);
            }
            Ok(configs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert each default unless a row for that persona already exists.
pub async fn seed_defaults(
    db: &Database,
    defaults: &[PersonaConfig],
) -> Result<(), ConclaveError> {
    let defaults = defaults.to_vec();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "INSERT OR IGNORE INTO persona_configurations
                     (id, persona, display_name, model_name, system_prompt,
                      temperature, max_tokens, enabled, sort_order, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for config in &defaults {
                stmt.execute(params![
                    config.id,
                    config.persona.to_string(),
                    config.display_name,
                    config.model_name,
                    config.system_prompt,
                    config.temperature,
                    config.max_tokens,
                    config.enabled,
                    config.sort_order,
                    config.description,
                ])?;
            }
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_config(persona: Persona, sort_order: i64) -> PersonaConfig {
        PersonaConfig {
            id: format!("cfg-{persona}"),
            persona,
            display_name: persona.to_string(),
            model_name: "llama3.1".to_string(),
            system_prompt: format!("You are the {persona}."),
            temperature: 0.7,
            max_tokens: 2048,
            enabled: true,
            sort_order,
            description: None,
        }
    }

    #[tokio::test]
    async fn seed_then_get_round_trips() {
        let (db, _dir) = setup_db().await;
        let defaults = vec![
            make_config(Persona::Coordinator, 0),
            make_config(Persona::BusinessAnalyst, 1),
        ];
        seed_defaults(&db, &defaults).await.unwrap();

        let got = get_by_persona(&db, Persona::Coordinator)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.persona, Persona::Coordinator);
        assert_eq!(got.model_name, "llama3.1");
        assert!(got.enabled);

        assert!(get_by_persona(&db, Persona::SeniorQA).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn seed_does_not_overwrite_existing_rows() {
        let (db, _dir) = setup_db().await;
        let mut first = make_config(Persona::Coordinator, 0);
        first.system_prompt = "customized".to_string();
        seed_defaults(&db, &[first]).await.unwrap();

        // Re-seeding with the stock prompt must not clobber the custom one.
        seed_defaults(&db, &[make_config(Persona::Coordinator, 0)])
            .await
            .unwrap();

        let got = get_by_persona(&db, Persona::Coordinator)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.system_prompt, "customized");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_all_respects_sort_order() {
        let (db, _dir) = setup_db().await;
        seed_defaults(
            &db,
            &[
                make_config(Persona::DocumentWriter, 9),
                make_config(Persona::Coordinator, 0),
                make_config(Persona::SeniorDeveloper, 3),
            ],
        )
        .await
        .unwrap();

        let all = list_all(&db).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].persona, Persona::Coordinator);
        assert_eq!(all[1].persona, Persona::SeniorDeveloper);
        assert_eq!(all[2].persona, Persona::DocumentWriter);
        db.close().await.unwrap();
    }
}
