//! Folds analysis results into the user's skill profile.

use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::analysis::FoundSkill;
use crate::models::skill::{ProficiencyLevel, SkillRow, UserSkillRow};

/// Upserts every found skill into `skills` and `user_skills`.
///
/// One failing skill is logged and skipped; it never fails the analysis.
pub async fn sync_user_skills(pool: &PgPool, user_id: Uuid, found: &[FoundSkill]) {
    for skill in found {
        if let Err(e) = sync_skill(pool, user_id, skill).await {
            warn!("Error syncing skill {} for user {user_id}: {e}", skill.name);
        }
    }
}

async fn sync_skill(pool: &PgPool, user_id: Uuid, skill: &FoundSkill) -> Result<(), sqlx::Error> {
    let skill_id = find_or_create_skill(pool, skill).await?;
    let proficiency = ProficiencyLevel::from_confidence(skill.confidence);

    let existing: Option<UserSkillRow> =
        sqlx::query_as("SELECT * FROM user_skills WHERE user_id = $1 AND skill_id = $2")
            .bind(user_id)
            .bind(skill_id)
            .fetch_optional(pool)
            .await?;

    match existing {
        None => {
            sqlx::query(
                r#"
                INSERT INTO user_skills (user_id, skill_id, proficiency_level, years_of_experience)
                VALUES ($1, $2, $3, 0)
                ON CONFLICT (user_id, skill_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(skill_id)
            .bind(proficiency.as_str())
            .execute(pool)
            .await?;
        }
        Some(row) if should_upgrade(&row.proficiency_level, proficiency) => {
            sqlx::query(
                r#"
                UPDATE user_skills SET proficiency_level = $3, updated_at = NOW()
                WHERE user_id = $1 AND skill_id = $2
                "#,
            )
            .bind(user_id)
            .bind(skill_id)
            .bind(proficiency.as_str())
            .execute(pool)
            .await?;
            debug!("Upgraded {} to {} for user {user_id}", skill.name, proficiency.as_str());
        }
        Some(_) => {}
    }

    Ok(())
}

async fn find_or_create_skill(pool: &PgPool, skill: &FoundSkill) -> Result<Uuid, sqlx::Error> {
    let existing: Option<SkillRow> =
        sqlx::query_as("SELECT * FROM skills WHERE LOWER(name) = LOWER($1)")
            .bind(&skill.name)
            .fetch_optional(pool)
            .await?;
    if let Some(row) = existing {
        return Ok(row.id);
    }

    // A concurrent insert of the same name resolves to the existing row.
    sqlx::query_scalar(
        r#"
        INSERT INTO skills (id, name, category) VALUES ($1, $2, $3)
        ON CONFLICT ((LOWER(name))) DO UPDATE SET name = skills.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&skill.name)
    .bind(skill.category.label())
    .fetch_one(pool)
    .await
}

/// Only strictly higher proficiency replaces a stored one. Unknown stored
/// labels are treated as replaceable.
pub fn should_upgrade(stored: &str, candidate: ProficiencyLevel) -> bool {
    ProficiencyLevel::parse(stored)
        .map(|current| candidate > current)
        .unwrap_or(true)
}
