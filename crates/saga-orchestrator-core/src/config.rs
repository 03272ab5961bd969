//! Environment-bound configuration shared by the bus wiring, the REST API, and the
//! application entry point. Mirrors the env-var-with-typed-error loading style used
//! throughout the example pack rather than a config file.

use std::env;

use crate::domain::Topic;

/// Topic tokens resolved from the environment, one per logical topic in use.
#[derive(Debug, Clone)]
pub struct TopicConfig {
    pub command_topic_saga: String,
    pub command_topic_character: String,
    pub command_topic_compartment: String,
    pub command_topic_skill: String,
    pub command_topic_guild: String,
    pub command_topic_invite: String,
    pub event_topic_asset_status: String,
    pub event_topic_compartment_status: String,
    pub event_topic_character_status: String,
    pub event_topic_skill_status: String,
    pub event_topic_guild_status: String,
    pub event_topic_invite_status: String,
}

/// Top-level configuration for the orchestrator process.
#[derive(Debug, Clone)]
pub struct SagaConfig {
    pub bootstrap_servers: String,
    pub consumer_group_id: String,
    pub rest_host: String,
    pub rest_port: u16,
    pub query_aggregator_url: String,
    pub topics: TopicConfig,
}

/// A required environment variable was absent, or present but unparsable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("environment variable {name} could not be parsed: {message}")]
    Invalid { name: &'static str, message: String },
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl TopicConfig {
    /// Resolves a logical outbound topic to the broker topic string configured for
    /// it, keeping the mapping in one place rather than scattered through emitters.
    pub fn resolve(&self, topic: Topic) -> &str {
        match topic {
            Topic::CommandCharacter => &self.command_topic_character,
            Topic::CommandCompartment => &self.command_topic_compartment,
            Topic::CommandSkill => &self.command_topic_skill,
            Topic::CommandGuild => &self.command_topic_guild,
            Topic::CommandInvite => &self.command_topic_invite,
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            command_topic_saga: required("COMMAND_TOPIC_SAGA")?,
            command_topic_character: required("COMMAND_TOPIC_CHARACTER")?,
            command_topic_compartment: required("COMMAND_TOPIC_COMPARTMENT")?,
            command_topic_skill: required("COMMAND_TOPIC_SKILL")?,
            command_topic_guild: required("COMMAND_TOPIC_GUILD")?,
            command_topic_invite: required("COMMAND_TOPIC_INVITE")?,
            event_topic_asset_status: required("EVENT_TOPIC_ASSET_STATUS")?,
            event_topic_compartment_status: required("EVENT_TOPIC_COMPARTMENT_STATUS")?,
            event_topic_character_status: required("EVENT_TOPIC_CHARACTER_STATUS")?,
            event_topic_skill_status: required("EVENT_TOPIC_SKILL_STATUS")?,
            event_topic_guild_status: required("EVENT_TOPIC_GUILD_STATUS")?,
            event_topic_invite_status: required("EVENT_TOPIC_INVITE_STATUS")?,
        })
    }
}

impl SagaConfig {
    /// Load configuration from environment variables, failing fast if anything
    /// required is missing rather than starting with a partial configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        let rest_port = optional("PORT", "8080")
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "PORT",
                message: format!("{e}"),
            })?;

        Ok(Self {
            bootstrap_servers: required("BOOTSTRAP_SERVERS")?,
            consumer_group_id: optional("CONSUMER_GROUP_ID", "saga-orchestrator"),
            rest_host: optional("HOST", "127.0.0.1"),
            rest_port,
            query_aggregator_url: required("QUERY_AGGREGATOR")?,
            topics: TopicConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_all_required() {
        env::set_var("BOOTSTRAP_SERVERS", "localhost:9092");
        env::set_var("QUERY_AGGREGATOR", "http://localhost:9000");
        env::set_var("COMMAND_TOPIC_SAGA", "saga");
        env::set_var("COMMAND_TOPIC_CHARACTER", "character");
        env::set_var("COMMAND_TOPIC_COMPARTMENT", "compartment");
        env::set_var("COMMAND_TOPIC_SKILL", "skill");
        env::set_var("COMMAND_TOPIC_GUILD", "guild");
        env::set_var("COMMAND_TOPIC_INVITE", "invite");
        env::set_var("EVENT_TOPIC_ASSET_STATUS", "asset-status");
        env::set_var("EVENT_TOPIC_COMPARTMENT_STATUS", "compartment-status");
        env::set_var("EVENT_TOPIC_CHARACTER_STATUS", "character-status");
        env::set_var("EVENT_TOPIC_SKILL_STATUS", "skill-status");
        env::set_var("EVENT_TOPIC_GUILD_STATUS", "guild-status");
        env::set_var("EVENT_TOPIC_INVITE_STATUS", "invite-status");
    }

    #[test]
    fn loads_defaults_when_optional_vars_absent() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_all_required();
        env::remove_var("PORT");
        env::remove_var("HOST");
        env::remove_var("CONSUMER_GROUP_ID");

        let config = SagaConfig::from_env().expect("config should load");
        assert_eq!(config.rest_port, 8080);
        assert_eq!(config.rest_host, "127.0.0.1");
        assert_eq!(config.consumer_group_id, "saga-orchestrator");
    }

    #[test]
    fn resolves_topic_tokens_to_their_configured_strings() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_all_required();
        let config = SagaConfig::from_env().expect("config should load");
        assert_eq!(config.topics.resolve(Topic::CommandGuild), "guild");
    }

    #[test]
    fn missing_required_var_fails_fast() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_all_required();
        env::remove_var("BOOTSTRAP_SERVERS");

        let err = SagaConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("BOOTSTRAP_SERVERS")));
        env::set_var("BOOTSTRAP_SERVERS", "localhost:9092");
    }
}
