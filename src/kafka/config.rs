use rdkafka::ClientConfig;

/// Kafka client configuration builder with defaults for the inspector.
///
/// The tail consumer is assign-only: it never joins a consumer group, so no
/// session/heartbeat/auto-commit settings are applied. `group.id` is still
/// required by rdkafka. `enable.partition.eof` is on so the poll loop receives
/// an explicit end-of-partition marker instead of silently idling.
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Config for the assign-only tail consumer.
    pub fn for_tail_consumer(bootstrap_servers: &str, group_id: &str) -> Self {
        let mut config = ClientConfig::new();

        config
            .set("bootstrap.servers", bootstrap_servers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "true")
            .set("socket.timeout.ms", "10000");

        Self { config }
    }

    /// Config for the one-shot record producer.
    pub fn for_producer(bootstrap_servers: &str) -> Self {
        let mut config = ClientConfig::new();

        config
            .set("bootstrap.servers", bootstrap_servers)
            .set("message.timeout.ms", "5000");

        Self { config }
    }

    /// Config for the admin client (topic create/delete/list).
    pub fn for_admin(bootstrap_servers: &str) -> Self {
        let mut config = ClientConfig::new();

        config
            .set("bootstrap.servers", bootstrap_servers)
            .set("socket.timeout.ms", "10000");

        Self { config }
    }

    /// Enable TLS/SSL for the Kafka connection
    pub fn with_tls(mut self, enabled: bool) -> Self {
        if enabled {
            self.config
                .set("security.protocol", "ssl")
                .set("enable.ssl.certificate.verification", "false");
        }
        self
    }

    /// Add any custom configuration
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.config.set(key, value);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_consumer_config_is_assign_only() {
        let config = ClientConfigBuilder::for_tail_consumer("localhost:9092", "inspector").build();

        assert_eq!(config.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(config.get("group.id"), Some("inspector"));
        assert_eq!(config.get("enable.partition.eof"), Some("true"));
        assert_eq!(config.get("enable.auto.commit"), Some("false"));
        assert_eq!(config.get("session.timeout.ms"), None);
    }

    #[test]
    fn producer_config_bounds_delivery() {
        let config = ClientConfigBuilder::for_producer("localhost:9092").build();

        assert_eq!(config.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(config.get("message.timeout.ms"), Some("5000"));
        assert_eq!(config.get("group.id"), None);
    }

    #[test]
    fn tls_adds_security_protocol() {
        let config = ClientConfigBuilder::for_admin("localhost:9092")
            .with_tls(true)
            .build();
        assert_eq!(config.get("security.protocol"), Some("ssl"));

        let config = ClientConfigBuilder::for_admin("localhost:9092")
            .with_tls(false)
            .build();
        assert_eq!(config.get("security.protocol"), None);
    }
}
