//! Command Emitters (C2, §4.2, §6.2).
//!
//! Each emitter is a pure function: given a saga's transaction id and a step's
//! payload, it returns the `OutboundMessage`(s) that dispatching that step
//! produces. No I/O, no lookups — partition key and envelope shape only.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::action::*;
use crate::domain::{OutboundMessage, Topic};

/// `{transactionId, type, body}`, the envelope shape every command shares (§3).
fn envelope(transaction_id: Uuid, command_type: &str, body: Value) -> Value {
    json!({
        "transactionId": transaction_id,
        "type": command_type,
        "body": body,
    })
}

fn character_message(
    transaction_id: Uuid,
    character_id: u32,
    topic: Topic,
    command_type: &str,
    body: Value,
) -> OutboundMessage {
    OutboundMessage::new(
        topic,
        character_id.to_string(),
        envelope(transaction_id, command_type, body),
    )
}

pub fn award_asset(transaction_id: Uuid, p: &AwardAssetPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCompartment,
        "CREATE_ASSET",
        json!({"templateId": p.item.template_id, "quantity": p.item.quantity}),
    )
}

pub fn award_experience(transaction_id: Uuid, p: &AwardExperiencePayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCharacter,
        "AWARD_EXPERIENCE",
        json!({
            "worldId": p.world_id,
            "channelId": p.channel_id,
            "distributions": p.distributions,
        }),
    )
}

pub fn award_level(transaction_id: Uuid, p: &AwardLevelPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCharacter,
        "AWARD_LEVEL",
        json!({"worldId": p.world_id, "channelId": p.channel_id, "amount": p.amount}),
    )
}

pub fn award_mesos(transaction_id: Uuid, p: &AwardMesosPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCharacter,
        "REQUEST_CHANGE_MESO",
        json!({
            "worldId": p.world_id,
            "channelId": p.channel_id,
            "actorId": p.actor_id,
            "actorType": p.actor_type,
            "amount": p.amount,
        }),
    )
}

pub fn warp_to_random_portal(transaction_id: Uuid, p: &WarpToRandomPortalPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCharacter,
        "CHANGE_MAP",
        json!({"fieldId": p.field_id, "portalId": Value::Null}),
    )
}

pub fn warp_to_portal(transaction_id: Uuid, p: &WarpToPortalPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCharacter,
        "CHANGE_MAP",
        json!({"fieldId": p.field_id, "portalId": p.portal_id}),
    )
}

pub fn destroy_asset(transaction_id: Uuid, p: &DestroyAssetPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCompartment,
        "DESTROY",
        json!({"templateId": p.template_id, "quantity": p.quantity}),
    )
}

pub fn equip_asset(transaction_id: Uuid, p: &EquipAssetPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCompartment,
        "EQUIP",
        json!({"inventoryType": p.inventory_type, "source": p.source, "destination": p.destination}),
    )
}

pub fn unequip_asset(transaction_id: Uuid, p: &EquipAssetPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCompartment,
        "UNEQUIP",
        json!({"inventoryType": p.inventory_type, "source": p.source, "destination": p.destination}),
    )
}

pub fn create_and_equip_asset(transaction_id: Uuid, p: &CreateAndEquipAssetPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCompartment,
        "CREATE_AND_EQUIP",
        json!({"templateId": p.item.template_id, "quantity": p.item.quantity}),
    )
}

pub fn change_job(transaction_id: Uuid, p: &ChangeJobPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandCharacter,
        "CHANGE_JOB",
        json!({"worldId": p.world_id, "channelId": p.channel_id, "jobId": p.job_id}),
    )
}

pub fn create_skill(transaction_id: Uuid, p: &SkillPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandSkill,
        "REQUEST_CREATE",
        skill_body(p),
    )
}

pub fn update_skill(transaction_id: Uuid, p: &SkillPayload) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandSkill,
        "REQUEST_UPDATE",
        skill_body(p),
    )
}

fn skill_body(p: &SkillPayload) -> Value {
    json!({
        "skillId": p.skill_id,
        "level": p.level,
        "masterLevel": p.master_level,
        "expiration": p.expiration,
    })
}

pub fn guild_action(transaction_id: Uuid, p: &GuildActionPayload, command_type: &str) -> OutboundMessage {
    character_message(
        transaction_id,
        p.character_id,
        Topic::CommandGuild,
        command_type,
        json!({"worldId": p.world_id, "channelId": p.channel_id}),
    )
}

pub fn create_character(transaction_id: Uuid, p: &CreateCharacterPayload) -> OutboundMessage {
    OutboundMessage::new(
        Topic::CommandCharacter,
        p.account_id.to_string(),
        envelope(
            transaction_id,
            "CREATE_CHARACTER",
            json!({
                "worldId": p.world_id,
                "accountId": p.account_id,
                "name": p.name,
                "jobId": p.job_id,
                "face": p.face,
                "hair": p.hair,
                "hairColor": p.hair_color,
                "skin": p.skin,
                "top": p.top,
                "bottom": p.bottom,
                "shoes": p.shoes,
                "weapon": p.weapon,
                "mapId": p.map_id,
            }),
        ),
    )
}

/// Invite creation/accept key by `referenceId` (§4.2).
pub fn create_invite(transaction_id: Uuid, p: &CreateInvitePayload) -> OutboundMessage {
    OutboundMessage::new(
        Topic::CommandInvite,
        p.reference_id.to_string(),
        envelope(
            transaction_id,
            "CREATE",
            json!({
                "inviteType": p.invite_type,
                "worldId": p.world_id,
                "actorId": p.actor_id,
                "referenceId": p.reference_id,
                "targetId": p.target_id,
            }),
        ),
    )
}

pub fn accept_invite(transaction_id: Uuid, p: &AcceptInvitePayload) -> OutboundMessage {
    OutboundMessage::new(
        Topic::CommandInvite,
        p.reference_id.to_string(),
        envelope(
            transaction_id,
            "ACCEPT",
            json!({
                "inviteType": p.invite_type,
                "worldId": p.world_id,
                "referenceId": p.reference_id,
                "targetId": p.target_id,
            }),
        ),
    )
}

/// Invite rejection keys by `targetId` (§4.2).
pub fn reject_invite(transaction_id: Uuid, p: &RejectInvitePayload) -> OutboundMessage {
    OutboundMessage::new(
        Topic::CommandInvite,
        p.target_id.to_string(),
        envelope(
            transaction_id,
            "REJECT",
            json!({
                "inviteType": p.invite_type,
                "worldId": p.world_id,
                "originatorId": p.originator_id,
                "targetId": p.target_id,
            }),
        ),
    )
}

/// Builds the outbound message(s) for a step's payload. `validate_character_state`
/// dispatches over HTTP (§4.7) and never reaches the bus, so it yields none.
pub fn emit(transaction_id: Uuid, payload: &StepPayload) -> Vec<OutboundMessage> {
    match payload {
        StepPayload::AwardAsset(p) => vec![award_asset(transaction_id, p)],
        StepPayload::AwardExperience(p) => vec![award_experience(transaction_id, p)],
        StepPayload::AwardLevel(p) => vec![award_level(transaction_id, p)],
        StepPayload::AwardMesos(p) => vec![award_mesos(transaction_id, p)],
        StepPayload::WarpToRandomPortal(p) => vec![warp_to_random_portal(transaction_id, p)],
        StepPayload::WarpToPortal(p) => vec![warp_to_portal(transaction_id, p)],
        StepPayload::DestroyAsset(p) => vec![destroy_asset(transaction_id, p)],
        StepPayload::EquipAsset(p) => vec![equip_asset(transaction_id, p)],
        StepPayload::UnequipAsset(p) => vec![unequip_asset(transaction_id, p)],
        StepPayload::CreateAndEquipAsset(p) => vec![create_and_equip_asset(transaction_id, p)],
        StepPayload::ChangeJob(p) => vec![change_job(transaction_id, p)],
        StepPayload::CreateSkill(p) => vec![create_skill(transaction_id, p)],
        StepPayload::UpdateSkill(p) => vec![update_skill(transaction_id, p)],
        StepPayload::ValidateCharacterState(_) => vec![],
        StepPayload::RequestGuildName(p) => vec![guild_action(transaction_id, p, "REQUEST_NAME")],
        StepPayload::RequestGuildEmblem(p) => vec![guild_action(transaction_id, p, "REQUEST_EMBLEM")],
        StepPayload::RequestGuildDisband(p) => vec![guild_action(transaction_id, p, "REQUEST_DISBAND")],
        StepPayload::RequestGuildCapacityIncrease(p) => {
            vec![guild_action(transaction_id, p, "REQUEST_CAPACITY_INCREASE")]
        }
        StepPayload::CreateCharacter(p) => vec![create_character(transaction_id, p)],
        StepPayload::CreateInvite(p) => vec![create_invite(transaction_id, p)],
        StepPayload::AcceptInvite(p) => vec![accept_invite(transaction_id, p)],
        StepPayload::RejectInvite(p) => vec![reject_invite(transaction_id, p)],
    }
}
