//! Action Dispatch Table (C3, §4.3, §6.2).
//!
//! A static mapping from `(action, event topic, event type)` to whether that event
//! completes the step successfully, fails it, or is irrelevant to this action. Kept
//! as a data-driven match rather than a switch per consumer, so every consumer can
//! share the same `completion_for` lookup (§9 "Correlation table").

/// The six topics downstream services emit status events on. Distinct from
/// [`crate::domain::Topic`], which is the set of *outbound* command topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    AssetStatus,
    CompartmentStatus,
    CharacterStatus,
    SkillStatus,
    GuildStatus,
    InviteStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Success,
    Failure,
}

/// Resolves whether `(topic, eventType)` completes a step of the given action, and
/// if so, with what outcome. Returns `None` when the event is not one this action
/// recognizes at all — the correlator must drop such events rather than guess (§4.6
/// "never silently applied to the wrong step").
pub fn completion_for(action_name: &str, topic: EventTopic, event_type: &str) -> Option<Completion> {
    use Completion::*;
    use EventTopic::*;

    match (action_name, topic, event_type) {
        ("award_asset", AssetStatus, "CREATED") => Some(Success),
        ("award_asset", AssetStatus, "QUANTITY_CHANGED") => Some(Success),
        ("award_asset", CompartmentStatus, "ERROR") => Some(Failure),
        ("award_asset", CompartmentStatus, "CREATION_FAILED") => Some(Failure),

        ("award_experience", CharacterStatus, "EXPERIENCE_CHANGED") => Some(Success),
        ("award_experience", CharacterStatus, "ERROR") => Some(Failure),

        ("award_level", CharacterStatus, "LEVEL_CHANGED") => Some(Success),
        ("award_level", CharacterStatus, "ERROR") => Some(Failure),

        ("award_mesos", CharacterStatus, "MESO_CHANGED") => Some(Success),
        ("award_mesos", CharacterStatus, "ERROR") => Some(Failure),
        ("award_mesos", CharacterStatus, "NOT_ENOUGH_MESO") => Some(Failure),

        ("warp_to_random_portal", CharacterStatus, "MAP_CHANGED") => Some(Success),
        ("warp_to_random_portal", CharacterStatus, "ERROR") => Some(Failure),
        ("warp_to_portal", CharacterStatus, "MAP_CHANGED") => Some(Success),
        ("warp_to_portal", CharacterStatus, "ERROR") => Some(Failure),

        ("destroy_asset", AssetStatus, "DELETED") => Some(Success),
        ("destroy_asset", CompartmentStatus, "ERROR") => Some(Failure),

        ("equip_asset", CompartmentStatus, "EQUIPPED") => Some(Success),
        ("equip_asset", AssetStatus, "MOVED") => Some(Success),
        ("equip_asset", CompartmentStatus, "ERROR") => Some(Failure),

        ("unequip_asset", CompartmentStatus, "UNEQUIPPED") => Some(Success),
        ("unequip_asset", AssetStatus, "MOVED") => Some(Success),
        ("unequip_asset", CompartmentStatus, "ERROR") => Some(Failure),

        ("create_and_equip_asset", AssetStatus, "CREATED") => Some(Success),
        ("create_and_equip_asset", CompartmentStatus, "CREATION_FAILED") => Some(Failure),
        ("create_and_equip_asset", CompartmentStatus, "ERROR") => Some(Failure),

        ("change_job", CharacterStatus, "JOB_CHANGED") => Some(Success),
        ("change_job", CharacterStatus, "ERROR") => Some(Failure),

        ("create_skill", SkillStatus, "CREATED") => Some(Success),
        ("update_skill", SkillStatus, "UPDATED") => Some(Success),

        ("request_guild_name", GuildStatus, "REQUEST_AGREEMENT") => Some(Success),
        ("request_guild_name", GuildStatus, "ERROR") => Some(Failure),
        ("request_guild_emblem", GuildStatus, "EMBLEM_UPDATED") => Some(Success),
        ("request_guild_emblem", GuildStatus, "ERROR") => Some(Failure),
        ("request_guild_disband", GuildStatus, "DISBANDED") => Some(Success),
        ("request_guild_disband", GuildStatus, "ERROR") => Some(Failure),
        ("request_guild_capacity_increase", GuildStatus, "CAPACITY_UPDATED") => Some(Success),
        ("request_guild_capacity_increase", GuildStatus, "ERROR") => Some(Failure),

        ("create_character", CharacterStatus, "CREATED") => Some(Success),
        ("create_character", CharacterStatus, "CREATION_FAILED") => Some(Failure),
        ("create_character", CharacterStatus, "ERROR") => Some(Failure),

        ("create_invite", InviteStatus, "CREATED") => Some(Success),
        ("create_invite", InviteStatus, "REJECTED") => Some(Failure),
        ("accept_invite", InviteStatus, "ACCEPTED") => Some(Success),
        ("reject_invite", InviteStatus, "REJECTED") => Some(Failure),

        _ => None,
    }
}

/// Whether `create_and_equip_asset`'s success event also carries the asset slot
/// that seeds the auto-equip step's `source` (§4.5.6, P6). Kept distinct from
/// `completion_for` since it's consulted only by the executor's insertion logic,
/// not by the generic correlator drop/accept decision.
pub fn triggers_auto_equip(action_name: &str, topic: EventTopic, event_type: &str) -> bool {
    action_name == "create_and_equip_asset" && matches!(topic, EventTopic::AssetStatus) && event_type == "CREATED"
}
