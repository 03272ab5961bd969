//! Action payloads (§6.2).
//!
//! `StepPayload` is an adjacently-tagged enum keyed by the `action` field, with the
//! per-action record carried in `payload` — this is the wire shape spec.md §6.1
//! describes for a step (`{stepId, status, action, payload, ...}`) and it gives us
//! "validated by construction" payload/action pairing for free: a step whose `action`
//! doesn't match a known payload shape fails to deserialize rather than needing a
//! runtime shape check.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemStack {
    pub template_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceDistribution {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwardAssetPayload {
    pub character_id: u32,
    pub item: ItemStack,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwardExperiencePayload {
    pub character_id: u32,
    pub world_id: u32,
    pub channel_id: u32,
    pub distributions: Vec<ExperienceDistribution>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwardLevelPayload {
    pub character_id: u32,
    pub world_id: u32,
    pub channel_id: u32,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwardMesosPayload {
    pub character_id: u32,
    pub world_id: u32,
    pub channel_id: u32,
    pub actor_id: u32,
    pub actor_type: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WarpToRandomPortalPayload {
    pub character_id: u32,
    pub field_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WarpToPortalPayload {
    pub character_id: u32,
    pub field_id: u32,
    pub portal_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DestroyAssetPayload {
    pub character_id: u32,
    pub template_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquipAssetPayload {
    pub character_id: u32,
    pub inventory_type: i32,
    pub source: i16,
    pub destination: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAndEquipAssetPayload {
    pub character_id: u32,
    pub item: ItemStack,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeJobPayload {
    pub character_id: u32,
    pub world_id: u32,
    pub channel_id: u32,
    pub job_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillPayload {
    pub character_id: u32,
    pub skill_id: i64,
    pub level: i32,
    pub master_level: i32,
    pub expiration: i64,
}

/// One predicate checked by the validation collaborator (§4.7, §6.2).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionInput {
    #[serde(rename = "type")]
    pub kind: ConditionType,
    pub operator: ConditionOperator,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ConditionType {
    JobId,
    Meso,
    MapId,
    Fame,
    Item,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConditionOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
}

impl ConditionInput {
    /// B3: an `item` condition without `itemId` is malformed.
    pub fn validate(&self) -> Result<(), crate::error::SagaError> {
        if self.kind == ConditionType::Item && self.item_id.is_none() {
            return Err(crate::error::SagaError::MissingItemId);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCharacterStatePayload {
    pub character_id: u32,
    pub conditions: Vec<ConditionInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuildActionPayload {
    pub character_id: u32,
    pub world_id: u32,
    pub channel_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterPayload {
    pub account_id: u32,
    pub name: String,
    pub world_id: u32,
    pub job_id: u32,
    pub face: u32,
    pub hair: u32,
    pub hair_color: u32,
    pub skin: u32,
    pub top: u32,
    pub bottom: u32,
    pub shoes: u32,
    pub weapon: u32,
    pub map_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitePayload {
    pub invite_type: String,
    pub actor_id: u32,
    pub world_id: u32,
    pub reference_id: u32,
    pub target_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitePayload {
    pub invite_type: String,
    pub world_id: u32,
    pub reference_id: u32,
    pub target_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RejectInvitePayload {
    pub invite_type: String,
    pub world_id: u32,
    pub originator_id: u32,
    pub target_id: u32,
}

/// The complete set of step actions (§6.2), tagged by `action` with the matching
/// record carried in `payload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum StepPayload {
    #[serde(alias = "award_inventory")]
    AwardAsset(AwardAssetPayload),
    AwardExperience(AwardExperiencePayload),
    AwardLevel(AwardLevelPayload),
    AwardMesos(AwardMesosPayload),
    WarpToRandomPortal(WarpToRandomPortalPayload),
    WarpToPortal(WarpToPortalPayload),
    DestroyAsset(DestroyAssetPayload),
    EquipAsset(EquipAssetPayload),
    UnequipAsset(EquipAssetPayload),
    CreateAndEquipAsset(CreateAndEquipAssetPayload),
    ChangeJob(ChangeJobPayload),
    CreateSkill(SkillPayload),
    UpdateSkill(SkillPayload),
    ValidateCharacterState(ValidateCharacterStatePayload),
    RequestGuildName(GuildActionPayload),
    RequestGuildEmblem(GuildActionPayload),
    RequestGuildDisband(GuildActionPayload),
    RequestGuildCapacityIncrease(GuildActionPayload),
    CreateCharacter(CreateCharacterPayload),
    CreateInvite(CreateInvitePayload),
    AcceptInvite(AcceptInvitePayload),
    RejectInvite(RejectInvitePayload),
}

impl StepPayload {
    /// Stable, wire-facing name of this action, e.g. `"award_mesos"`.
    pub fn action_name(&self) -> &'static str {
        match self {
            StepPayload::AwardAsset(_) => "award_asset",
            StepPayload::AwardExperience(_) => "award_experience",
            StepPayload::AwardLevel(_) => "award_level",
            StepPayload::AwardMesos(_) => "award_mesos",
            StepPayload::WarpToRandomPortal(_) => "warp_to_random_portal",
            StepPayload::WarpToPortal(_) => "warp_to_portal",
            StepPayload::DestroyAsset(_) => "destroy_asset",
            StepPayload::EquipAsset(_) => "equip_asset",
            StepPayload::UnequipAsset(_) => "unequip_asset",
            StepPayload::CreateAndEquipAsset(_) => "create_and_equip_asset",
            StepPayload::ChangeJob(_) => "change_job",
            StepPayload::CreateSkill(_) => "create_skill",
            StepPayload::UpdateSkill(_) => "update_skill",
            StepPayload::ValidateCharacterState(_) => "validate_character_state",
            StepPayload::RequestGuildName(_) => "request_guild_name",
            StepPayload::RequestGuildEmblem(_) => "request_guild_emblem",
            StepPayload::RequestGuildDisband(_) => "request_guild_disband",
            StepPayload::RequestGuildCapacityIncrease(_) => "request_guild_capacity_increase",
            StepPayload::CreateCharacter(_) => "create_character",
            StepPayload::CreateInvite(_) => "create_invite",
            StepPayload::AcceptInvite(_) => "accept_invite",
            StepPayload::RejectInvite(_) => "reject_invite",
        }
    }

    /// True for the one action that completes synchronously over HTTP rather than
    /// through a bus round-trip (§4.5.2).
    pub fn is_synchronous(&self) -> bool {
        matches!(self, StepPayload::ValidateCharacterState(_))
    }

    /// Validates payload-internal invariants that the type system can't express
    /// (B3: `item` conditions require `itemId`).
    pub fn validate(&self) -> Result<(), crate::error::SagaError> {
        if let StepPayload::ValidateCharacterState(p) = self {
            for condition in &p.conditions {
                condition.validate()?;
            }
        }
        Ok(())
    }
}
