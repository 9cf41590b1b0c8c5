//! Scenario tests spanning the registry, the hierarchy and the systems
