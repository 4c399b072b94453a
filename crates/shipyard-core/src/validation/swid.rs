//! SWID tags.

use super::checks::Checks;
use crate::activation::Active;
use crate::error::ValidationResult;
use crate::model::Model;
use crate::model::swid::{DEFAULT_REGID, Entity};
use crate::msg;
use crate::text::{Blank, default_to};

const DEFAULT_ROLES: [&str; 2] = ["tagCreator", "softwareCreator"];

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let project = &model.project;
    for (name, tag) in &mut model.swid {
        tag.name.clone_from(name);
        if !checks.resolve(tag, Active::Always) {
            continue;
        }
        let scope = format!("swid.{name}");
        if tag.tag_id.is_blank() {
            tag.tag_id = Some(format!(
                "{}-{}",
                project.name.as_deref().unwrap_or(name),
                project.version.as_deref().unwrap_or_default()
            ));
        }
        tag.tag_version.get_or_insert(1);
        default_to(&mut tag.path, "swidtag");
        default_to(&mut tag.lang, "en-US");
        tag.corpus.get_or_insert(false);
        tag.patch.get_or_insert(false);

        if tag.entities.is_empty() {
            tag.entities.push(Entity {
                name: project.vendor.clone().or_else(|| project.name.clone()),
                ..Entity::default()
            });
        }
        for (index, entity) in tag.entities.iter_mut().enumerate() {
            let field = format!("{scope}.entities[{index}]");
            checks.not_blank(entity.name.as_deref(), &format!("{field}.name"));
            default_to(&mut entity.regid, DEFAULT_REGID);
            if entity.roles.is_empty() {
                entity.roles = DEFAULT_ROLES.iter().map(|r| (*r).to_string()).collect();
            }
            if entity.roles.iter().any(|r| r.is_blank()) {
                checks.error(msg!("validation_must_not_be_blank", field = format!("{field}.roles")));
            }
        }
    }
    Ok(())
}
